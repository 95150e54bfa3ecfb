// src/app/ui/grid.rs
use eframe::egui as eg;

use super::UiAction;
use crate::app::prefetch::{PosterLoader, MAX_UPLOADS_PER_FRAME};
use crate::app::types::{GridState, Movie, PosterState, ViewSource};
use crate::app::utils::title_line;

pub const H_SPACING: f32 = 8.0;
pub const V_SPACING: f32 = 12.0;
const CARD_W: f32 = 160.0;
const TEXT_H: f32 = 44.0;

fn draw_poster_placeholder(p: &eg::Painter, rect: eg::Rect, label: &str) {
    p.rect_filled(rect, 6.0, eg::Color32::from_gray(40));
    if !label.is_empty() {
        p.text(
            rect.center(),
            eg::Align2::CENTER_CENTER,
            label,
            eg::FontId::proportional(13.0),
            eg::Color32::from_gray(170),
        );
    }
}

fn centered_message(ui: &mut eg::Ui, text: eg::RichText) {
    ui.vertical_centered(|ui| {
        ui.add_space(48.0);
        ui.label(text);
    });
}

/// One card: poster (or placeholder) over its title. The whole card is the
/// click target, tagged with the movie id.
fn card_ui(
    ui: &mut eg::Ui,
    ctx: &eg::Context,
    movie: &Movie,
    idx: usize,
    posters: &mut PosterLoader,
    uploads_left: &mut usize,
) -> eg::Response {
    let card_h = CARD_W * 1.5 + TEXT_H;
    ui.allocate_ui_with_layout(
        eg::vec2(CARD_W, card_h),
        eg::Layout::top_down(eg::Align::Min),
        |ui| {
            ui.set_min_size(eg::vec2(CARD_W, card_h));
            let rect = ui.max_rect();

            let id = eg::Id::new(("card", movie.id(), idx));
            let resp = ui.interact(rect, id, eg::Sense::click());

            let poster_rect = eg::Rect::from_min_max(
                rect.min,
                eg::pos2(rect.min.x + CARD_W, rect.min.y + CARD_W * 1.5),
            );
            let text_rect =
                eg::Rect::from_min_max(eg::pos2(rect.min.x, poster_rect.max.y + 4.0), rect.max);

            match movie.poster() {
                Some(url) => {
                    posters.request(ctx, url);
                    if let Some(tex) = posters.texture(ctx, url, uploads_left) {
                        ui.painter().image(
                            tex.id(),
                            poster_rect,
                            eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                            eg::Color32::WHITE,
                        );
                    } else if posters.state(url) == Some(PosterState::Failed) {
                        draw_poster_placeholder(ui.painter(), poster_rect, "No Poster Available");
                    } else {
                        draw_poster_placeholder(ui.painter(), poster_rect, "");
                    }
                }
                None => draw_poster_placeholder(ui.painter(), poster_rect, "No Poster Available"),
            }

            // not selectable, so clicks on the title reach the card
            ui.allocate_ui_at_rect(text_rect, |ui| {
                ui.add(
                    eg::Label::new(
                        eg::RichText::new(title_line(movie.title(), movie.year())).size(14.0),
                    )
                    .wrap()
                    .selectable(false),
                );
            });

            if resp.hovered() {
                ui.painter().rect_stroke(
                    rect.shrink(1.0),
                    6.0,
                    eg::Stroke::new(2.0, ui.visuals().selection.stroke.color),
                );
            }
            resp
        },
    )
    .inner
}

impl crate::app::CinelistApp {
    pub(crate) fn ui_render_grid(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) -> Option<UiAction> {
        let Self {
            controller,
            posters,
            ..
        } = self;

        let (source, cards) = match controller.grid() {
            GridState::Idle => {
                centered_message(ui, eg::RichText::new("Search for a movie to get started.").weak());
                return None;
            }
            GridState::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(48.0);
                    ui.add(eg::Spinner::new().size(28.0));
                });
                return None;
            }
            GridState::Error(msg) => {
                let color = ui.visuals().error_fg_color;
                centered_message(ui, eg::RichText::new(msg.as_str()).color(color));
                return None;
            }
            GridState::Populated { source, cards } => (*source, cards),
        };

        let mut action = None;
        let mut uploads_left = MAX_UPLOADS_PER_FRAME;

        ui.horizontal(|ui| {
            ui.heading(match source {
                ViewSource::Search => "Results",
                ViewSource::Watchlist => "Your watchlist",
            });
            ui.label(eg::RichText::new(format!("{} titles", cards.len())).weak());
        });
        ui.add_space(6.0);

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);

                    for (idx, movie) in cards.iter().enumerate() {
                        if card_ui(ui, ctx, movie, idx, posters, &mut uploads_left).clicked() {
                            action = Some(UiAction::SelectCard(idx));
                        }
                    }
                });
            });

        // upload budget spent; the rest go up next frame
        if uploads_left == 0 {
            ctx.request_repaint();
        }

        action
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::types::MovieSummary;

    fn frame(
        ctx: &eg::Context,
        events: Vec<eg::Event>,
        movie: &Movie,
        posters: &mut PosterLoader,
    ) -> eg::Response {
        let input = eg::RawInput {
            screen_rect: Some(eg::Rect::from_min_size(eg::Pos2::ZERO, eg::vec2(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let mut out = None;
        let _ = ctx.run(input, |ctx| {
            eg::CentralPanel::default().show(ctx, |ui| {
                let mut budget = MAX_UPLOADS_PER_FRAME;
                out = Some(card_ui(ui, ctx, movie, 0, posters, &mut budget));
            });
        });
        out.expect("card rendered")
    }

    fn button(pos: eg::Pos2, pressed: bool) -> eg::Event {
        eg::Event::PointerButton {
            pos,
            button: eg::PointerButton::Primary,
            pressed,
            modifiers: eg::Modifiers::NONE,
        }
    }

    #[test]
    fn clicking_the_title_opens_the_card() {
        let dir = tempfile::tempdir().unwrap();
        let mut posters = PosterLoader::new(dir.path().to_path_buf(), 1, Duration::from_secs(1));
        let movie = Movie::Summary(MovieSummary {
            id: "tt0096895".into(),
            title: "Batman".into(),
            year: "1989".into(),
            poster: None,
        });
        let ctx = eg::Context::default();

        let card = frame(&ctx, vec![], &movie, &mut posters);
        // first glyph of the title line, below the poster
        let on_title = eg::pos2(card.rect.min.x + 4.0, card.rect.min.y + CARD_W * 1.5 + 12.0);

        let _ = frame(&ctx, vec![eg::Event::PointerMoved(on_title)], &movie, &mut posters);
        let _ = frame(&ctx, vec![button(on_title, true)], &movie, &mut posters);
        let released = frame(&ctx, vec![button(on_title, false)], &movie, &mut posters);
        assert!(released.clicked());
    }
}
