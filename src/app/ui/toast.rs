// src/app/ui/toast.rs
use eframe::egui as eg;

use crate::app::types::ToastKind;

impl crate::app::CinelistApp {
    /// Stack of short-lived notices in the bottom-right corner, newest last.
    pub(crate) fn ui_render_toasts(&self, ctx: &eg::Context) {
        let toasts = self.controller.toasts();
        if toasts.is_empty() {
            return;
        }

        eg::Area::new(eg::Id::new("toasts"))
            .order(eg::Order::Tooltip)
            .anchor(eg::Align2::RIGHT_BOTTOM, eg::vec2(-12.0, -12.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                for toast in toasts {
                    let color = match toast.kind {
                        ToastKind::Info => ui.visuals().text_color(),
                        ToastKind::Error => ui.visuals().error_fg_color,
                    };
                    eg::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(eg::RichText::new(toast.text.as_str()).color(color));
                    });
                    ui.add_space(4.0);
                }
            });
    }
}
