// src/app/worker.rs
use std::sync::mpsc::Sender;
use std::sync::Arc;

use eframe::egui as eg;
use tracing::debug;

use crate::app::omdb::MovieService;
use crate::app::types::{DetailRequest, NetMsg, SearchRequest};

pub fn run_search(service: &dyn MovieService, req: &SearchRequest) -> NetMsg {
    NetMsg::Search {
        token: req.token,
        result: service.search_by_title(&req.term),
    }
}

pub fn run_detail(service: &dyn MovieService, req: &DetailRequest) -> NetMsg {
    NetMsg::Detail {
        token: req.token,
        result: service.fetch_detail(&req.id),
    }
}

/// One short-lived thread per request; the result comes back on `tx`.
/// Nothing cancels it: a superseded request still runs to completion.
pub fn spawn_search(
    service: Arc<dyn MovieService>,
    req: SearchRequest,
    tx: Sender<NetMsg>,
    ctx: eg::Context,
) {
    std::thread::spawn(move || {
        let msg = run_search(service.as_ref(), &req);
        if tx.send(msg).is_err() {
            debug!("search result for `{}` dropped: UI gone", req.term);
        }
        ctx.request_repaint();
    });
}

pub fn spawn_detail(
    service: Arc<dyn MovieService>,
    req: DetailRequest,
    tx: Sender<NetMsg>,
    ctx: eg::Context,
) {
    std::thread::spawn(move || {
        let msg = run_detail(service.as_ref(), &req);
        if tx.send(msg).is_err() {
            debug!("detail result for {} dropped: UI gone", req.id);
        }
        ctx.request_repaint();
    });
}
