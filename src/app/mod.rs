// src/app/mod.rs: OMDb search + local watchlist over background request threads

// ---- Standard lib imports ----
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---- Crates ----
use eframe::egui as eg;
use tracing::{info, warn};

// ---- Local modules ----
pub mod cache;
pub mod controller;
pub mod detail;
pub mod gfx;
pub mod guard;
pub mod omdb;
pub mod prefetch;
pub mod store;
pub mod types;
pub mod ui;
pub mod utils;
pub mod watchlist;
pub mod worker;

use crate::config::AppConfig;
use controller::ViewController;
use omdb::{MovieService, OmdbClient};
use prefetch::{PosterLoader, MAX_SLOTS};
use store::{SqliteStore, StoreError};
use types::{NetMsg, ToastKind};
use ui::UiAction;
use watchlist::Watchlist;

pub struct CinelistApp {
    controller: ViewController<SqliteStore>,
    service: Arc<dyn MovieService>,

    // request plumbing
    net_tx: Sender<NetMsg>,
    net_rx: Receiver<NetMsg>,

    posters: PosterLoader,

    search_input: String,
    data_dir: PathBuf,

    // one-time init guard
    did_init: bool,
}

impl CinelistApp {
    /// Falls back to an in-memory store (with a warning toast) if the on-disk
    /// one cannot be opened.
    pub fn new(cfg: AppConfig) -> Result<Self, StoreError> {
        let mut startup_warnings = Vec::new();

        let store = match SqliteStore::open(&cfg.store_path()) {
            Ok(s) => s,
            Err(e) => {
                warn!("store {} unavailable ({e}); using memory", cfg.store_path().display());
                startup_warnings.push(format!(
                    "Watchlist storage unavailable ({e}); changes will not be saved."
                ));
                SqliteStore::open_in_memory()?
            }
        };

        if cfg.omdb_api_key.is_none() {
            warn!("no OMDb API key configured");
            startup_warnings.push(
                "No OMDb API key configured; set omdb_api_key in config.json or CINELIST_OMDB_API_KEY."
                    .to_string(),
            );
        }

        let service: Arc<dyn MovieService> = Arc::new(OmdbClient::new(&cfg));
        let posters = PosterLoader::new(
            cfg.poster_dir(),
            cfg.poster_workers,
            Duration::from_secs(cfg.request_timeout_secs),
        );
        let (net_tx, net_rx) = mpsc::channel::<NetMsg>();

        let mut controller = ViewController::new(Watchlist::new(store));
        for w in startup_warnings {
            controller.queue_startup_notice(w, ToastKind::Error);
        }

        Ok(Self {
            controller,
            service,
            net_tx,
            net_rx,
            posters,
            search_input: String::new(),
            data_dir: cfg.data_dir(),
            did_init: false,
        })
    }

    /// Drain finished requests into the controller; stale ones are dropped there.
    fn poll_network(&mut self) {
        loop {
            match self.net_rx.try_recv() {
                Ok(NetMsg::Search { token, result }) => {
                    self.controller.apply_search(token, result);
                }
                Ok(NetMsg::Detail { token, result }) => {
                    self.controller.apply_detail(token, result);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn dispatch(&mut self, ctx: &eg::Context, action: UiAction) {
        match action {
            UiAction::Search => {
                if let Some(req) = self.controller.submit_search(&self.search_input) {
                    worker::spawn_search(
                        Arc::clone(&self.service),
                        req,
                        self.net_tx.clone(),
                        ctx.clone(),
                    );
                }
            }
            UiAction::ShowWatchlist => self.controller.show_watchlist(),
            UiAction::SelectCard(idx) => {
                if let Some(req) = self.controller.select_card(idx) {
                    worker::spawn_detail(
                        Arc::clone(&self.service),
                        req,
                        self.net_tx.clone(),
                        ctx.clone(),
                    );
                }
            }
            UiAction::AddCurrent => self.controller.add_current(),
            UiAction::RemoveCurrent => self.controller.remove_current(),
            UiAction::CloseOverlay => self.controller.close_overlay(),
            UiAction::Backup => {
                let dir = self.data_dir.clone();
                self.controller.backup_watchlist(&dir);
            }
        }
    }
}

// ========== App impl ==========
impl eframe::App for CinelistApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        // First frame
        if !self.did_init {
            self.did_init = true;
            self.controller.bootstrap();
            info!("watchlist has {} entries", self.controller.badge());
        }

        self.poll_network();
        self.posters.poll();
        self.controller.prune_toasts(Instant::now());
        if !self.controller.toasts().is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        let mut actions: Vec<UiAction> = Vec::new();

        eg::TopBottomPanel::top("topbar").show(ctx, |ui| {
            actions.extend(self.ui_render_topbar(ui));
        });
        eg::CentralPanel::default().show(ctx, |ui| {
            actions.extend(self.ui_render_grid(ui, ctx));
        });
        actions.extend(self.ui_render_detail_overlay(ctx));
        self.ui_render_toasts(ctx);

        if self.controller.overlay().is_open() && ctx.input(|i| i.key_pressed(eg::Key::Escape)) {
            actions.push(UiAction::CloseOverlay);
        }

        for action in actions {
            self.dispatch(ctx, action);
        }

        if self.posters.len() > MAX_SLOTS {
            let visible = self.controller.visible_posters();
            self.posters.trim(visible);
        }
    }
}
