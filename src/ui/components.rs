//! Shared UI components.

use eframe::egui::{self, Color32, ProgressBar, Response, RichText, Ui};

/// Status indicator colors.
pub mod colors {
    use super::Color32;

    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(255, 100, 100);
    pub const WARNING: Color32 = Color32::from_rgb(255, 200, 100);
    pub const NEUTRAL: Color32 = Color32::from_rgb(150, 150, 150);
    pub const ACCENT: Color32 = Color32::from_rgb(68, 114, 196);

    pub const GOLD: Color32 = Color32::from_rgb(230, 185, 50);
    pub const SILVER: Color32 = Color32::from_rgb(180, 185, 195);
    pub const BRONZE: Color32 = Color32::from_rgb(200, 125, 70);
}

/// Render a panel header with title and subtitle.
pub fn panel_header(ui: &mut Ui, title: &str, subtitle: &str) {
    ui.heading(RichText::new(title).size(24.0));
    ui.label(RichText::new(subtitle).weak());
    ui.add_space(10.0);
    ui.separator();
    ui.add_space(10.0);
}

/// Button with a leading phosphor icon.
pub fn styled_button_with_icon(ui: &mut Ui, icon: &str, text: &str) -> Response {
    ui.button(format!("{icon} {text}"))
}

/// Accent-filled button with a leading phosphor icon.
pub fn primary_button_with_icon(ui: &mut Ui, icon: &str, text: &str) -> Response {
    ui.add(
        egui::Button::new(RichText::new(format!("{icon} {text}")).color(Color32::WHITE)).fill(colors::ACCENT),
    )
}

/// Labelled percentage gauge driven by a 0-100 rate.
pub fn rate_gauge(ui: &mut Ui, label: &str, rate: f64, width: f32) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).small());
        ui.add(
            ProgressBar::new(gauge_fraction(rate))
                .desired_width(width)
                .text(format!("{rate:.1}%")),
        );
    });
}

/// Map a 0-100 rate onto the progress bar range.
pub fn gauge_fraction(rate: f64) -> f32 {
    if rate.is_nan() {
        return 0.0;
    }
    (rate / 100.0).clamp(0.0, 1.0) as f32
}
