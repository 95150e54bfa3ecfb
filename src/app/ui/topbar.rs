// src/app/ui/topbar.rs
use eframe::egui as eg;

use super::UiAction;

impl crate::app::CinelistApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui) -> Option<UiAction> {
        let mut action = None;

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.heading("Cinelist");
            ui.separator();

            // Search
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search movies by title…")
                    .desired_width(280.0),
            );
            let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter));
            if ui.button("Search").clicked() || enter {
                action = Some(UiAction::Search);
            }

            ui.separator();

            // Watchlist + live count badge
            if ui
                .button("Watchlist")
                .on_hover_text("Show your saved movies")
                .clicked()
            {
                action = Some(UiAction::ShowWatchlist);
            }
            let visuals = ui.visuals().clone();
            ui.label(
                eg::RichText::new(format!(" {} ", self.controller.badge()))
                    .strong()
                    .color(visuals.strong_text_color())
                    .background_color(visuals.selection.bg_fill),
            );

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                if ui
                    .small_button("Backup")
                    .on_hover_text("Save a timestamped copy of the watchlist")
                    .clicked()
                {
                    action = Some(UiAction::Backup);
                }
            });
        });
        ui.add_space(4.0);

        action
    }
}
