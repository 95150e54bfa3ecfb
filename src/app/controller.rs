// src/app/controller.rs
//
// UI-agnostic state machine behind the grid and the detail overlay. The egui
// layer renders whatever state this holds and turns clicks into calls here;
// any network work comes back out as a request for the caller to dispatch.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::app::guard::{RequestToken, StaleGuard};
use crate::app::omdb::ServiceError;
use crate::app::store::KeyValueStore;
use crate::app::types::{
    DetailRequest, GridState, Movie, MovieDetail, MovieSummary, OverlayState, SearchRequest,
    Toast, ToastKind, ViewSource,
};
use crate::app::watchlist::Watchlist;

pub const EMPTY_SEARCH_MSG: &str = "Please enter a movie title to search.";
pub const EMPTY_WATCHLIST_MSG: &str = "Your watchlist is empty. Add some movies!";
pub const DETAIL_ERROR_MSG: &str = "Could not load movie details.";

const TOAST_TTL: Duration = Duration::from_secs(3);
const MAX_TOASTS: usize = 4;

pub struct ViewController<S> {
    watchlist: Watchlist<S>,
    grid: GridState,
    overlay: OverlayState,
    search_guard: StaleGuard,
    detail_guard: StaleGuard,
    badge: usize,
    toasts: Vec<Toast>,
    // held until the first frame so their TTL starts on screen
    startup_notices: Vec<(String, ToastKind)>,
}

impl<S: KeyValueStore> ViewController<S> {
    pub fn new(watchlist: Watchlist<S>) -> Self {
        let badge = watchlist.count();
        Self {
            watchlist,
            grid: GridState::Idle,
            overlay: OverlayState::Hidden,
            search_guard: StaleGuard::default(),
            detail_guard: StaleGuard::default(),
            badge,
            toasts: Vec::new(),
            startup_notices: Vec::new(),
        }
    }

    /// Startup view: the saved watchlist if there is one, otherwise nothing.
    pub fn bootstrap(&mut self) {
        for (text, kind) in std::mem::take(&mut self.startup_notices) {
            self.push_toast(text, kind);
        }
        if let Err(e) = self.watchlist.upgrade_untagged() {
            warn!("could not retag saved watchlist: {e}");
        }
        self.refresh_badge();
        if self.badge > 0 {
            self.show_watchlist();
        }
    }

    // ---- read side ----

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn badge(&self) -> usize {
        self.badge
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Poster URLs on screen: the grid's cards plus the open overlay.
    pub fn visible_posters(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = match &self.grid {
            GridState::Populated { cards, .. } => cards.iter().filter_map(Movie::poster).collect(),
            _ => Vec::new(),
        };
        if let OverlayState::Shown { detail, .. } = &self.overlay {
            urls.extend(detail.poster.as_deref());
        }
        urls
    }

    // ---- search ----

    /// Blank input is rejected in place; otherwise the grid goes to Loading and
    /// the caller must run the returned request.
    pub fn submit_search(&mut self, input: &str) -> Option<SearchRequest> {
        let term = input.trim();
        if term.is_empty() {
            self.grid = GridState::Error(EMPTY_SEARCH_MSG.into());
            return None;
        }
        self.grid = GridState::Loading;
        let token = self.search_guard.begin();
        info!("search `{term}` dispatched");
        Some(SearchRequest {
            token,
            term: term.to_string(),
        })
    }

    /// Returns false when the result was stale and dropped.
    pub fn apply_search(
        &mut self,
        token: RequestToken,
        result: Result<Vec<MovieSummary>, ServiceError>,
    ) -> bool {
        if !self.search_guard.is_current(token) {
            debug!("dropping stale search result");
            return false;
        }
        self.grid = match result {
            Ok(hits) if hits.is_empty() => GridState::Error("Movie not found!".into()),
            Ok(hits) => GridState::Populated {
                source: ViewSource::Search,
                cards: hits.into_iter().map(Movie::Summary).collect(),
            },
            Err(e) => {
                warn!("search failed: {e}");
                GridState::Error(e.user_message())
            }
        };
        true
    }

    // ---- watchlist view ----

    /// Also retires any search still in flight, so it cannot replace this view.
    pub fn show_watchlist(&mut self) {
        self.search_guard.invalidate();
        let list = self.watchlist.list();
        self.badge = list.len();
        self.grid = if list.is_empty() {
            GridState::Error(EMPTY_WATCHLIST_MSG.into())
        } else {
            GridState::Populated {
                source: ViewSource::Watchlist,
                cards: list,
            }
        };
    }

    // ---- detail overlay ----

    /// Open the overlay for card `idx`. A card that already holds the details is
    /// shown directly; a summary needs the returned request run first.
    pub fn select_card(&mut self, idx: usize) -> Option<DetailRequest> {
        let GridState::Populated { cards, .. } = &self.grid else {
            return None;
        };
        let movie = cards.get(idx)?.clone();
        match movie {
            Movie::Detail(detail) => {
                self.detail_guard.invalidate();
                self.open_detail(detail);
                None
            }
            Movie::Summary(summary) => {
                let token = self.detail_guard.begin();
                self.overlay = OverlayState::Loading {
                    id: summary.id.clone(),
                    title: summary.title,
                };
                Some(DetailRequest {
                    token,
                    id: summary.id,
                })
            }
        }
    }

    /// Returns false when the result was stale or the overlay was closed meanwhile.
    pub fn apply_detail(
        &mut self,
        token: RequestToken,
        result: Result<MovieDetail, ServiceError>,
    ) -> bool {
        if !self.detail_guard.is_current(token) || !matches!(self.overlay, OverlayState::Loading { .. })
        {
            debug!("dropping stale detail result");
            return false;
        }
        match result {
            Ok(detail) => self.open_detail(detail),
            Err(e) => {
                warn!("detail fetch failed: {e}");
                self.overlay = OverlayState::Error(format!("{DETAIL_ERROR_MSG} {}", e.user_message()));
            }
        }
        true
    }

    pub fn close_overlay(&mut self) {
        self.detail_guard.invalidate();
        self.overlay = OverlayState::Hidden;
    }

    fn open_detail(&mut self, detail: MovieDetail) {
        let in_watchlist = self.watchlist.contains(&detail.id);
        self.overlay = OverlayState::Shown {
            detail,
            in_watchlist,
        };
    }

    // ---- watchlist mutations from the overlay ----

    pub fn add_current(&mut self) {
        let OverlayState::Shown { detail, .. } = &self.overlay else {
            return;
        };
        let detail = detail.clone();
        match self.watchlist.add(Movie::Detail(detail.clone())) {
            Ok(added) => {
                if added {
                    self.push_toast(
                        format!("\"{}\" has been added to your watchlist.", detail.title),
                        ToastKind::Info,
                    );
                }
            }
            Err(e) => {
                warn!("watchlist add failed: {e}");
                self.push_toast(format!("Could not save watchlist: {e}"), ToastKind::Error);
            }
        }
        self.refresh_badge();
        self.refresh_membership();
    }

    pub fn remove_current(&mut self) {
        let OverlayState::Shown { detail, .. } = &self.overlay else {
            return;
        };
        let (id, title) = (detail.id.clone(), detail.title.clone());
        if let Err(e) = self.watchlist.remove(&id) {
            warn!("watchlist remove failed: {e}");
            self.push_toast(format!("Could not save watchlist: {e}"), ToastKind::Error);
            self.refresh_membership();
            return;
        }
        self.push_toast(
            format!("\"{title}\" has been removed from your watchlist."),
            ToastKind::Info,
        );
        self.refresh_badge();
        self.refresh_membership();

        // Live removal only when the grid is the watchlist itself.
        if let GridState::Populated {
            source: ViewSource::Watchlist,
            cards,
        } = &mut self.grid
        {
            cards.retain(|m| m.id() != id);
            if cards.is_empty() {
                self.grid = GridState::Error(EMPTY_WATCHLIST_MSG.into());
            }
        }
    }

    fn refresh_membership(&mut self) {
        if let OverlayState::Shown {
            detail,
            in_watchlist,
        } = &mut self.overlay
        {
            *in_watchlist = self.watchlist.contains(&detail.id);
        }
    }

    fn refresh_badge(&mut self) {
        self.badge = self.watchlist.count();
    }

    // ---- misc ----

    pub fn backup_watchlist(&mut self, dir: &Path) {
        match self.watchlist.backup_to(dir) {
            Ok(path) => {
                info!("watchlist backed up to {}", path.display());
                self.push_toast(format!("Watchlist saved to {}", path.display()), ToastKind::Info);
            }
            Err(e) => {
                warn!("watchlist backup failed: {e}");
                self.push_toast(format!("Backup failed: {e}"), ToastKind::Error);
            }
        }
    }

    /// Toast shown once [`bootstrap`](Self::bootstrap) runs.
    pub fn queue_startup_notice(&mut self, text: String, kind: ToastKind) {
        self.startup_notices.push((text, kind));
    }

    pub fn push_toast(&mut self, text: String, kind: ToastKind) {
        self.toasts.push(Toast {
            text,
            kind,
            created: Instant::now(),
        });
        if self.toasts.len() > MAX_TOASTS {
            let extra = self.toasts.len() - MAX_TOASTS;
            self.toasts.drain(..extra);
        }
    }

    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created) < TOAST_TTL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::store::MemoryStore;
    use crate::app::watchlist::WATCHLIST_KEY;

    fn summary(id: &str, title: &str) -> MovieSummary {
        MovieSummary {
            id: id.into(),
            title: title.into(),
            year: "2005".into(),
            poster: None,
        }
    }

    fn detail(id: &str, title: &str) -> MovieDetail {
        MovieDetail {
            id: id.into(),
            title: title.into(),
            year: "2005".into(),
            poster: None,
            rated: "PG-13".into(),
            runtime: "140 min".into(),
            imdb_rating: "8.2".into(),
            plot: "Bruce Wayne begins.".into(),
            genre: "Action".into(),
            director: "Christopher Nolan".into(),
            actors: "Christian Bale".into(),
        }
    }

    fn batman_hits() -> Vec<MovieSummary> {
        vec![
            summary("tt0372784", "Batman Begins"),
            summary("tt1877830", "The Batman"),
            summary("tt0096895", "Batman"),
        ]
    }

    fn controller() -> ViewController<MemoryStore> {
        ViewController::new(Watchlist::new(MemoryStore::default()))
    }

    fn card_ids(c: &ViewController<MemoryStore>) -> Vec<String> {
        match c.grid() {
            GridState::Populated { cards, .. } => cards.iter().map(|m| m.id().to_string()).collect(),
            other => panic!("grid not populated: {other:?}"),
        }
    }

    #[test]
    fn visible_posters_follow_grid_and_overlay() {
        let mut c = controller();
        assert!(c.visible_posters().is_empty());

        let mut hits = batman_hits();
        hits[0].poster = Some("https://img.example/bb.jpg".into());
        let req = c.submit_search("batman").unwrap();
        c.apply_search(req.token, Ok(hits));
        assert_eq!(c.visible_posters(), vec!["https://img.example/bb.jpg"]);

        let dreq = c.select_card(2).unwrap();
        let mut d = detail("tt0096895", "Batman");
        d.poster = Some("https://img.example/b89.jpg".into());
        c.apply_detail(dreq.token, Ok(d));
        assert_eq!(
            c.visible_posters(),
            vec!["https://img.example/bb.jpg", "https://img.example/b89.jpg"]
        );

        // a new search replaces the old cards
        let req = c.submit_search("alien").unwrap();
        c.apply_search(req.token, Ok(vec![summary("tt0078748", "Alien")]));
        c.close_overlay();
        assert!(c.visible_posters().is_empty());
    }

    #[test]
    fn startup_notices_wait_for_the_first_frame() {
        let mut c = controller();
        c.queue_startup_notice("No OMDb API key configured.".into(), ToastKind::Error);
        assert!(c.toasts().is_empty());

        std::thread::sleep(Duration::from_millis(20));
        let shown_at = Instant::now();
        c.bootstrap();
        assert_eq!(c.toasts().len(), 1);
        assert_eq!(c.toasts()[0].kind, ToastKind::Error);
        assert!(c.toasts()[0].created >= shown_at);

        // still visible just short of the TTL measured from the first frame
        c.prune_toasts(shown_at + TOAST_TTL - Duration::from_millis(1));
        assert_eq!(c.toasts().len(), 1);

        c.bootstrap();
        assert_eq!(c.toasts().len(), 1);
    }

    #[test]
    fn blank_search_is_rejected_without_dispatch() {
        let mut c = controller();
        assert!(c.submit_search("   ").is_none());
        assert_eq!(c.grid(), &GridState::Error(EMPTY_SEARCH_MSG.into()));
    }

    #[test]
    fn one_card_per_result_tagged_with_id() {
        let mut c = controller();
        let req = c.submit_search("  batman ").unwrap();
        assert_eq!(req.term, "batman");
        assert_eq!(c.grid(), &GridState::Loading);
        assert!(c.apply_search(req.token, Ok(batman_hits())));
        assert_eq!(card_ids(&c), vec!["tt0372784", "tt1877830", "tt0096895"]);
    }

    #[test]
    fn older_search_arriving_late_is_never_rendered() {
        let mut c = controller();
        let a = c.submit_search("alien").unwrap();
        let b = c.submit_search("batman").unwrap();
        assert!(c.apply_search(b.token, Ok(batman_hits())));
        assert!(!c.apply_search(a.token, Ok(vec![summary("tt0078748", "Alien")])));
        assert_eq!(card_ids(&c).len(), 3);

        // also when the stale one fails
        assert!(!c.apply_search(a.token, Err(ServiceError::Transport("boom".into()))));
        assert!(matches!(c.grid(), GridState::Populated { .. }));
    }

    #[test]
    fn search_errors_replace_the_grid() {
        let mut c = controller();
        let req = c.submit_search("zzzz").unwrap();
        c.apply_search(req.token, Err(ServiceError::Service("Movie not found!".into())));
        assert_eq!(c.grid(), &GridState::Error("Movie not found!".into()));

        let req = c.submit_search("zzzz").unwrap();
        c.apply_search(req.token, Err(ServiceError::Transport("HTTP 503".into())));
        assert_eq!(c.grid(), &GridState::Error("An error occurred: HTTP 503".into()));
    }

    #[test]
    fn watchlist_view_supersedes_in_flight_search() {
        let mut c = controller();
        let req = c.submit_search("batman").unwrap();
        c.show_watchlist();
        assert!(!c.apply_search(req.token, Ok(batman_hits())));
        assert_eq!(c.grid(), &GridState::Error(EMPTY_WATCHLIST_MSG.into()));
    }

    #[test]
    fn batman_walkthrough() {
        let mut c = controller();
        let req = c.submit_search("batman").unwrap();
        c.apply_search(req.token, Ok(batman_hits()));
        assert_eq!(card_ids(&c).len(), 3);

        let dreq = c.select_card(1).unwrap();
        assert_eq!(dreq.id, "tt1877830");
        assert!(matches!(c.overlay(), OverlayState::Loading { .. }));

        assert!(c.apply_detail(dreq.token, Ok(detail("tt1877830", "The Batman"))));
        assert!(matches!(
            c.overlay(),
            OverlayState::Shown { in_watchlist: false, .. }
        ));

        let before = c.badge();
        c.add_current();
        assert!(matches!(c.overlay(), OverlayState::Shown { in_watchlist: true, .. }));
        assert_eq!(c.badge(), before + 1);
        assert_eq!(
            c.toasts().last().map(|t| t.text.as_str()),
            Some("\"The Batman\" has been added to your watchlist.")
        );

        // second add is a no-op
        c.add_current();
        assert_eq!(c.badge(), before + 1);
        assert_eq!(c.toasts().len(), 1);
    }

    #[test]
    fn detail_card_opens_without_fetch() {
        let mut wl_store = MemoryStore::default();
        wl_store
            .set(
                WATCHLIST_KEY,
                &serde_json::to_string(&vec![Movie::Detail(detail("tt1", "Saved"))]).unwrap(),
            )
            .unwrap();
        let mut c = ViewController::new(Watchlist::new(wl_store));
        c.show_watchlist();
        assert!(c.select_card(0).is_none());
        assert!(matches!(c.overlay(), OverlayState::Shown { in_watchlist: true, .. }));
        assert!(c.select_card(9).is_none());
    }

    #[test]
    fn detail_failure_keeps_overlay_open_with_error() {
        let mut c = controller();
        let req = c.submit_search("batman").unwrap();
        c.apply_search(req.token, Ok(batman_hits()));
        let dreq = c.select_card(0).unwrap();
        c.apply_detail(dreq.token, Err(ServiceError::Transport("timeout".into())));
        match c.overlay() {
            OverlayState::Error(msg) => assert!(msg.starts_with(DETAIL_ERROR_MSG)),
            other => panic!("unexpected overlay {other:?}"),
        }
    }

    #[test]
    fn out_of_order_detail_results_are_dropped() {
        let mut c = controller();
        let req = c.submit_search("batman").unwrap();
        c.apply_search(req.token, Ok(batman_hits()));
        let first = c.select_card(0).unwrap();
        let second = c.select_card(2).unwrap();
        assert!(c.apply_detail(second.token, Ok(detail("tt0096895", "Batman"))));
        assert!(!c.apply_detail(first.token, Ok(detail("tt0372784", "Batman Begins"))));
        match c.overlay() {
            OverlayState::Shown { detail, .. } => assert_eq!(detail.id, "tt0096895"),
            other => panic!("unexpected overlay {other:?}"),
        }
    }

    #[test]
    fn closing_overlay_discards_pending_detail() {
        let mut c = controller();
        let req = c.submit_search("batman").unwrap();
        c.apply_search(req.token, Ok(batman_hits()));
        let dreq = c.select_card(0).unwrap();
        c.close_overlay();
        assert!(!c.apply_detail(dreq.token, Ok(detail("tt0372784", "Batman Begins"))));
        assert_eq!(c.overlay(), &OverlayState::Hidden);
    }

    #[test]
    fn removal_while_viewing_watchlist_drops_card_live() {
        let mut c = controller();
        for (id, title) in [("tt1", "One"), ("tt2", "Two")] {
            let req = c.submit_search(title).unwrap();
            c.apply_search(req.token, Ok(vec![summary(id, title)]));
            let dreq = c.select_card(0).unwrap();
            c.apply_detail(dreq.token, Ok(detail(id, title)));
            c.add_current();
            c.close_overlay();
        }
        assert_eq!(c.badge(), 2);

        c.show_watchlist();
        assert_eq!(card_ids(&c), vec!["tt1", "tt2"]);

        c.select_card(0);
        c.remove_current();
        assert_eq!(card_ids(&c), vec!["tt2"]);
        assert!(matches!(c.overlay(), OverlayState::Shown { in_watchlist: false, .. }));
        assert_eq!(c.badge(), 1);

        c.select_card(0);
        c.remove_current();
        assert_eq!(c.grid(), &GridState::Error(EMPTY_WATCHLIST_MSG.into()));
        assert_eq!(c.badge(), 0);
    }

    #[test]
    fn removal_while_viewing_search_leaves_grid_alone() {
        let mut c = controller();
        let req = c.submit_search("batman").unwrap();
        c.apply_search(req.token, Ok(batman_hits()));
        let dreq = c.select_card(0).unwrap();
        c.apply_detail(dreq.token, Ok(detail("tt0372784", "Batman Begins")));
        c.add_current();
        c.remove_current();
        c.remove_current();
        assert_eq!(card_ids(&c).len(), 3);
        assert_eq!(c.badge(), 0);
    }

    #[test]
    fn empty_watchlist_then_one_add_shows_one_card() {
        let mut c = controller();
        c.show_watchlist();
        assert_eq!(c.grid(), &GridState::Error(EMPTY_WATCHLIST_MSG.into()));

        let req = c.submit_search("batman").unwrap();
        c.apply_search(req.token, Ok(batman_hits()));
        let dreq = c.select_card(0).unwrap();
        c.apply_detail(dreq.token, Ok(detail("tt0372784", "Batman Begins")));
        c.add_current();

        c.show_watchlist();
        assert_eq!(card_ids(&c), vec!["tt0372784"]);
    }

    #[test]
    fn bootstrap_shows_saved_watchlist_only_when_non_empty() {
        let mut empty = controller();
        empty.bootstrap();
        assert_eq!(empty.grid(), &GridState::Idle);

        let raw = serde_json::to_string(&vec![Movie::Summary(summary("tt1", "One"))]).unwrap();
        let mut c = ViewController::new(Watchlist::new(MemoryStore::with_value(WATCHLIST_KEY, &raw)));
        c.bootstrap();
        assert_eq!(c.badge(), 1);
        assert_eq!(card_ids(&c), vec!["tt1"]);
    }

    #[test]
    fn toasts_expire_and_are_capped() {
        let mut c = controller();
        for i in 0..6 {
            c.push_toast(format!("t{i}"), ToastKind::Info);
        }
        assert_eq!(c.toasts().len(), MAX_TOASTS);
        assert_eq!(c.toasts()[0].text, "t2");
        c.prune_toasts(Instant::now() + TOAST_TTL + Duration::from_millis(1));
        assert!(c.toasts().is_empty());
    }
}
