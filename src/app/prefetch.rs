// src/app/prefetch.rs
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui::{self as eg, TextureHandle};
use tracing::{debug, info, warn};

use crate::app::cache::{
    download_and_store_resized_with_client, find_cached, prune_poster_cache, url_to_cache_key,
};
use crate::app::types::{PosterDone, PosterJob, PosterSlot, PosterState};

const RESIZE_MAX_W: u32 = 320;
const RESIZE_QUALITY: u8 = 80;
pub const MAX_DONE_PER_FRAME: usize = 12;
pub const MAX_UPLOADS_PER_FRAME: usize = 4;
/// Slots (and their textures) kept before unseen posters are dropped.
pub const MAX_SLOTS: usize = 96;

/// Background poster downloads feeding lazily uploaded textures, keyed by URL.
pub struct PosterLoader {
    dir: PathBuf,
    workers: usize,
    timeout: Duration,
    slots: HashMap<String, PosterSlot>,
    work_tx: Option<Sender<PosterJob>>,
    done_rx: Option<Receiver<PosterDone>>,
    started: bool,
    disabled: bool,
}

impl PosterLoader {
    pub fn new(dir: PathBuf, workers: usize, timeout: Duration) -> Self {
        Self {
            dir,
            workers: workers.max(1),
            timeout,
            slots: HashMap::new(),
            work_tx: None,
            done_rx: None,
            started: false,
            disabled: false,
        }
    }

    pub fn state(&self, url: &str) -> Option<PosterState> {
        self.slots.get(url).map(|s| s.state)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Past [`MAX_SLOTS`], drop every slot not in `keep` (textures included).
    /// Downloads still in flight for a dropped URL land on disk and are ignored here.
    pub fn trim<'a>(&mut self, keep: impl IntoIterator<Item = &'a str>) -> usize {
        if self.slots.len() <= MAX_SLOTS {
            return 0;
        }
        let keep: HashSet<&str> = keep.into_iter().collect();
        let before = self.slots.len();
        self.slots.retain(|url, _| keep.contains(url.as_str()));
        let dropped = before - self.slots.len();
        debug!("evicted {dropped} poster slots ({} kept)", self.slots.len());
        dropped
    }

    /// Spin up the worker pool on first use. Workers share one HTTP client.
    fn start(&mut self, ctx: &eg::Context) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("poster cache dir {} unavailable: {e}", self.dir.display());
        }
        match prune_poster_cache(&self.dir) {
            Ok(n) if n > 0 => info!("pruned {n} stale posters"),
            Ok(_) => {}
            Err(e) => warn!("poster cache prune failed: {e}"),
        }

        let client = match reqwest::blocking::Client::builder()
            .user_agent("cinelist/posters")
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.workers)
            .default_headers({
                use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build()
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                // Posters stay placeholders; everything else keeps working.
                warn!("poster http client build failed: {e}");
                self.disabled = true;
                return;
            }
        };

        let (work_tx, work_rx) = mpsc::channel::<PosterJob>();
        let (done_tx, done_rx) = mpsc::channel::<PosterDone>();
        self.work_tx = Some(work_tx);
        self.done_rx = Some(done_rx);
        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..self.workers {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);
            let dir = self.dir.clone();
            let ctx = ctx.clone();

            std::thread::spawn(move || loop {
                let job = {
                    let Ok(rx) = work_rx.lock() else { break };
                    rx.recv()
                };
                let Ok(PosterJob { url, key }) = job else { break };

                let result = download_and_store_resized_with_client(
                    &client,
                    &url,
                    &dir,
                    &key,
                    RESIZE_MAX_W,
                    RESIZE_QUALITY,
                );
                if done_tx.send(PosterDone { url, result }).is_err() {
                    break;
                }
                ctx.request_repaint();
            });
        }
        debug!("poster workers started ({})", self.workers);
    }

    /// Queue `url` once. Cache hits on disk skip the network entirely.
    pub fn request(&mut self, ctx: &eg::Context, url: &str) {
        if self.slots.contains_key(url) {
            return;
        }
        let key = url_to_cache_key(url);
        if let Some(path) = find_cached(&self.dir, &key) {
            self.slots.insert(
                url.to_string(),
                PosterSlot {
                    key,
                    path: Some(path),
                    tex: None,
                    state: PosterState::Cached,
                },
            );
            return;
        }

        self.start(ctx);
        let queued = !self.disabled
            && self.work_tx.as_ref().is_some_and(|tx| {
                tx.send(PosterJob {
                    url: url.to_string(),
                    key: key.clone(),
                })
                .is_ok()
            });
        self.slots.insert(
            url.to_string(),
            PosterSlot {
                key,
                path: None,
                tex: None,
                state: if queued {
                    PosterState::Pending
                } else {
                    PosterState::Failed
                },
            },
        );
    }

    /// Drain finished downloads (bounded per frame).
    pub fn poll(&mut self) {
        let mut drained = 0usize;
        while drained < MAX_DONE_PER_FRAME {
            let Some(rx) = &self.done_rx else { break };
            match rx.try_recv() {
                Ok(PosterDone { url, result }) => {
                    drained += 1;
                    let Some(slot) = self.slots.get_mut(&url) else {
                        continue;
                    };
                    match result {
                        Ok(path) => {
                            slot.path = Some(path);
                            slot.state = PosterState::Cached;
                        }
                        Err(e) => {
                            debug!("poster failed: {e}");
                            slot.state = PosterState::Failed;
                        }
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Texture for `url` if ready; uploads a cached file when budget allows.
    pub fn texture(
        &mut self,
        ctx: &eg::Context,
        url: &str,
        uploads_left: &mut usize,
    ) -> Option<TextureHandle> {
        let slot = self.slots.get_mut(url)?;
        if let Some(tex) = &slot.tex {
            return Some(tex.clone());
        }
        if slot.state != PosterState::Cached || *uploads_left == 0 {
            return None;
        }
        let path = slot.path.clone()?;
        *uploads_left -= 1;
        match crate::app::gfx::load_texture_from_path(ctx, &path, &slot.key) {
            Ok(tex) => {
                slot.tex = Some(tex.clone());
                slot.state = PosterState::Ready;
                Some(tex)
            }
            Err(e) => {
                debug!("poster upload failed: {e}");
                slot.state = PosterState::Failed;
                None
            }
        }
    }
}
