// src/app/guard.rs

/// Generation captured when a request is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

/// Monotonic generation counter. A result is applied only if the token it was
/// dispatched with is still the latest; older ones are dropped, not cancelled.
#[derive(Debug, Default)]
pub struct StaleGuard {
    latest: u64,
}

impl StaleGuard {
    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Make every outstanding token stale without starting a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::StaleGuard;

    #[test]
    fn only_latest_token_is_current() {
        let mut g = StaleGuard::default();
        let a = g.begin();
        assert!(g.is_current(a));
        let b = g.begin();
        assert!(!g.is_current(a));
        assert!(g.is_current(b));
    }

    #[test]
    fn invalidate_retires_outstanding_tokens() {
        let mut g = StaleGuard::default();
        let a = g.begin();
        g.invalidate();
        assert!(!g.is_current(a));
        let b = g.begin();
        assert_ne!(a, b);
        assert!(g.is_current(b));
    }
}
