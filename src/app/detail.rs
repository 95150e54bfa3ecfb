// src/app/detail.rs
use eframe::egui as eg;

use crate::app::prefetch::MAX_UPLOADS_PER_FRAME;
use crate::app::types::{MovieDetail, OverlayState};
use crate::app::ui::UiAction;
use crate::app::utils::{detail_meta_line, or_dash};

const PANEL_MAX_W: f32 = 560.0;
const PANEL_MAX_H: f32 = 640.0;
const POSTER_W: f32 = 180.0;

fn close_row(ui: &mut eg::Ui, action: &mut Option<UiAction>) {
    ui.with_layout(eg::Layout::right_to_left(eg::Align::Min), |ui| {
        if ui.small_button("✕").on_hover_text("Close (Esc)").clicked() {
            *action = Some(UiAction::CloseOverlay);
        }
    });
}

fn labeled(ui: &mut eg::Ui, label: &str, value: &str) {
    ui.horizontal_wrapped(|ui| {
        ui.label(eg::RichText::new(format!("{label}:")).strong());
        ui.label(or_dash(value));
    });
}

impl crate::app::CinelistApp {
    /// Modal overlay over the grid. Clicking the dimmed backdrop closes it.
    pub(crate) fn ui_render_detail_overlay(&mut self, ctx: &eg::Context) -> Option<UiAction> {
        let Self {
            controller,
            posters,
            ..
        } = self;

        let overlay = controller.overlay();
        if !overlay.is_open() {
            return None;
        }

        let mut action = None;
        let screen = ctx.screen_rect();
        let panel_size = eg::vec2(
            PANEL_MAX_W.min(screen.width() - 40.0).max(200.0),
            PANEL_MAX_H.min(screen.height() - 80.0).max(160.0),
        );
        let panel_rect = eg::Rect::from_center_size(screen.center(), panel_size);

        eg::Area::new(eg::Id::new("detail_overlay"))
            .order(eg::Order::Foreground)
            .fixed_pos(eg::Pos2::ZERO)
            .show(ctx, |ui| {
                let backdrop = ui.allocate_rect(screen, eg::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, eg::Color32::from_black_alpha(160));

                ui.allocate_ui_at_rect(panel_rect, |ui| {
                    eg::Frame::window(ui.style()).show(ui, |ui| {
                        ui.set_width(panel_rect.width() - 16.0);
                        match overlay {
                            OverlayState::Hidden => {}
                            OverlayState::Loading { title, .. } => {
                                close_row(ui, &mut action);
                                ui.vertical_centered(|ui| {
                                    ui.add_space(24.0);
                                    ui.add(eg::Spinner::new().size(28.0));
                                    ui.add_space(8.0);
                                    ui.label(format!("Loading {title}…"));
                                    ui.add_space(24.0);
                                });
                            }
                            OverlayState::Error(msg) => {
                                close_row(ui, &mut action);
                                let color = ui.visuals().error_fg_color;
                                ui.add_space(8.0);
                                ui.label(eg::RichText::new(msg.as_str()).color(color));
                                ui.add_space(8.0);
                                if ui.button("Close").clicked() {
                                    action = Some(UiAction::CloseOverlay);
                                }
                            }
                            OverlayState::Shown {
                                detail,
                                in_watchlist,
                            } => {
                                close_row(ui, &mut action);
                                eg::ScrollArea::vertical()
                                    .max_height(panel_rect.height() - 48.0)
                                    .show(ui, |ui| {
                                        ui.horizontal_top(|ui| {
                                            let size = eg::vec2(POSTER_W, POSTER_W * 1.5);
                                            let tex = detail.poster.as_deref().and_then(|url| {
                                                posters.request(ctx, url);
                                                let mut budget = MAX_UPLOADS_PER_FRAME;
                                                posters.texture(ctx, url, &mut budget)
                                            });
                                            if let Some(tex) = tex {
                                                ui.image((tex.id(), size));
                                            } else {
                                                let (rect, _) =
                                                    ui.allocate_exact_size(size, eg::Sense::hover());
                                                ui.painter()
                                                    .rect_filled(rect, 8.0, eg::Color32::from_gray(40));
                                                let label = if detail.poster.is_some() {
                                                    "Poster loading…"
                                                } else {
                                                    "No Poster Available"
                                                };
                                                ui.painter().text(
                                                    rect.center(),
                                                    eg::Align2::CENTER_CENTER,
                                                    label,
                                                    eg::FontId::proportional(13.0),
                                                    eg::Color32::from_gray(170),
                                                );
                                            }

                                            ui.vertical(|ui| {
                                                detail_header(ui, detail);
                                                ui.add_space(10.0);
                                                if *in_watchlist {
                                                    if ui.button("Remove from Watchlist").clicked() {
                                                        action = Some(UiAction::RemoveCurrent);
                                                    }
                                                } else if ui.button("Add to Watchlist").clicked() {
                                                    action = Some(UiAction::AddCurrent);
                                                }
                                            });
                                        });

                                        ui.add_space(10.0);
                                        ui.separator();
                                        ui.label(or_dash(&detail.plot));
                                        ui.add_space(8.0);
                                        labeled(ui, "Genre", &detail.genre);
                                        labeled(ui, "Director", &detail.director);
                                        labeled(ui, "Actors", &detail.actors);
                                    });
                            }
                        }
                    });
                });

                if backdrop.clicked()
                    && backdrop
                        .interact_pointer_pos()
                        .is_some_and(|p| !panel_rect.contains(p))
                {
                    action = Some(UiAction::CloseOverlay);
                }
            });

        action
    }
}

fn detail_header(ui: &mut eg::Ui, d: &MovieDetail) {
    ui.heading(d.title.as_str());
    let meta = detail_meta_line(d);
    if !meta.is_empty() {
        ui.label(eg::RichText::new(meta).weak());
    }
    ui.add_space(6.0);
    ui.label(format!("⭐ IMDb Rating: {}", or_dash(&d.imdb_rating)));
}
