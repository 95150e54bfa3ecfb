// src/app/ui/mod.rs
pub mod grid;
pub mod toast;
pub mod topbar;

/// What the user did this frame; applied once rendering is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    Search,
    ShowWatchlist,
    SelectCard(usize),
    AddCurrent,
    RemoveCurrent,
    CloseOverlay,
    Backup,
}
