// src/app/watchlist.rs
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::store::{KeyValueStore, StoreError};
use crate::app::types::Movie;

pub const WATCHLIST_KEY: &str = "watchlist";

/// Saved movies, persisted as one JSON array under [`WATCHLIST_KEY`].
///
/// Nothing is cached: every call re-reads the stored list, and mutations
/// rewrite it wholesale. Two processes sharing a store can lose an update
/// between one's read and its write.
pub struct Watchlist<S> {
    store: S,
}

impl<S: KeyValueStore> Watchlist<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn entries(&self) -> Vec<Value> {
        let raw = match self.store.get(WATCHLIST_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("watchlist read failed: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("watchlist is not valid JSON, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Absent or undecodable state reads as an empty list. Untagged entries
    /// (plain OMDb objects) are classified by their fields.
    pub fn list(&self) -> Vec<Movie> {
        match self
            .entries()
            .into_iter()
            .map(Movie::from_stored)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(list) => list,
            Err(e) => {
                warn!("watchlist entry undecodable, treating list as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Rewrite the stored list with every entry tagged. Returns whether anything changed.
    pub fn upgrade_untagged(&mut self) -> Result<bool, StoreError> {
        let entries = self.entries();
        let untagged = entries.iter().filter(|v| Movie::is_untagged(v)).count();
        if untagged == 0 {
            return Ok(false);
        }
        let list = self.list();
        if list.is_empty() {
            return Ok(false);
        }
        self.write(&list)?;
        info!("tagged {untagged} legacy watchlist entries");
        Ok(true)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|m| m.id() == id)
    }

    pub fn count(&self) -> usize {
        self.list().len()
    }

    /// Appends unless an entry with the same id exists. Returns whether it was added.
    pub fn add(&mut self, movie: Movie) -> Result<bool, StoreError> {
        let mut list = self.list();
        if list.iter().any(|m| m.id() == movie.id()) {
            debug!("{} already in watchlist", movie.id());
            return Ok(false);
        }
        list.push(movie);
        self.write(&list)?;
        Ok(true)
    }

    /// Drops every entry with `id` and rewrites the list. Returns whether anything was dropped.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let list = self.list();
        let before = list.len();
        let kept: Vec<Movie> = list.into_iter().filter(|m| m.id() != id).collect();
        self.write(&kept)?;
        Ok(kept.len() != before)
    }

    /// Copy the persisted JSON to a timestamped file in `dir`.
    pub fn backup_to(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        let raw = self
            .store
            .get(WATCHLIST_KEY)?
            .unwrap_or_else(|| "[]".to_string());
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let dest = dir.join(format!("watchlist_backup_{stamp}.json"));
        fs::write(&dest, raw)?;
        Ok(dest)
    }

    fn write(&mut self, list: &[Movie]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(list)?;
        self.store.set(WATCHLIST_KEY, &raw)
    }
}
