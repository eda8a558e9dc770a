//! Performance card for a single user.

use eframe::egui::{self, Color32, CornerRadius, Margin, RichText, Stroke, Ui};
use egui_phosphor::regular::{MEDAL, USER};

use crate::models::{PerformanceRecord, TaskCategory};
use crate::ranking::RankBadge;

use super::components::{colors, rate_gauge};

/// Fixed card width so cards wrap into a grid.
pub const CARD_WIDTH: f32 = 320.0;

/// Render one card. `rank` is `None` for the caller's own card.
pub fn show(ui: &mut Ui, record: &PerformanceRecord, rank: Option<usize>) {
    let badge = RankBadge::for_rank(rank);

    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .stroke(Stroke::new(1.5, badge_color(badge)))
        .inner_margin(Margin::same(14))
        .outer_margin(Margin::same(6))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);

            // Header: badge + name
            ui.horizontal(|ui| {
                badge_label(ui, badge, rank);
                ui.label(RichText::new(&record.user_name).size(16.0).strong());
            });

            ui.add_space(8.0);

            ui.horizontal(|ui| {
                stat(ui, "Total", record.total_tasks);
                ui.add_space(12.0);
                stat(ui, "Completed", record.completed_across_categories());
                ui.add_space(12.0);
                stat(ui, "Pending", record.pending_tasks);
                ui.add_space(12.0);
                stat(ui, "On time", record.on_time_completed);
            });

            ui.add_space(8.0);

            // Gauges come straight from the backend rates
            rate_gauge(ui, "Completion", record.completion_rate, CARD_WIDTH - 90.0);
            rate_gauge(ui, "On-time", record.on_time_rate, CARD_WIDTH - 90.0);

            ui.add_space(8.0);
            ui.separator();

            breakdown_grid(ui, record, rank);
        });
}

fn badge_label(ui: &mut Ui, badge: RankBadge, rank: Option<usize>) {
    let color = badge_color(badge);
    let text = match (badge, rank) {
        (RankBadge::Standard, Some(r)) => format!("#{r}"),
        (RankBadge::Standard, None) => USER.to_string(),
        (b, _) => format!("{MEDAL} {}", b.label()),
    };
    ui.label(RichText::new(text).color(color).strong());
}

fn badge_color(badge: RankBadge) -> Color32 {
    match badge {
        RankBadge::Gold => colors::GOLD,
        RankBadge::Silver => colors::SILVER,
        RankBadge::Bronze => colors::BRONZE,
        RankBadge::Standard => colors::NEUTRAL,
    }
}

fn stat(ui: &mut Ui, label: &str, value: u32) {
    ui.vertical(|ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value.to_string()).strong());
    });
}

fn breakdown_grid(ui: &mut Ui, record: &PerformanceRecord, rank: Option<usize>) {
    let id = match rank {
        Some(r) => format!("breakdown_rank_{r}"),
        None => "breakdown_self".to_string(),
    };

    egui::Grid::new(id)
        .num_columns(4)
        .striped(true)
        .spacing([14.0, 4.0])
        .show(ui, |ui| {
            ui.label(RichText::new("Type").small().strong());
            ui.label(RichText::new("Total").small().strong());
            ui.label(RichText::new("Pending").small().strong());
            ui.label(RichText::new("Done").small().strong());
            ui.end_row();

            for (category, stats) in record.breakdown() {
                ui.label(RichText::new(category.label()).small());
                ui.label(RichText::new(stats.total.to_string()).small());
                ui.label(RichText::new(stats.pending.to_string()).small());
                ui.label(RichText::new(stats.completed.to_string()).small());
                ui.end_row();

                if category == TaskCategory::OneTime
                    && let Some(extra) = one_time_extra(stats.revised, stats.rejected)
                {
                    ui.label("");
                    ui.label(RichText::new(extra).small().color(colors::WARNING));
                    ui.end_row();
                }
            }
        });
}

/// Revised/rejected note for the one-time row, if either count is present.
fn one_time_extra(revised: Option<u32>, rejected: Option<u32>) -> Option<String> {
    match (revised, rejected) {
        (None, None) => None,
        (Some(rv), None) => Some(format!("Revised {rv}")),
        (None, Some(rj)) => Some(format!("Rejected {rj}")),
        (Some(rv), Some(rj)) => Some(format!("Revised {rv} / Rejected {rj}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_time_extra() {
        assert_eq!(one_time_extra(None, None), None);
        assert_eq!(one_time_extra(Some(2), None).as_deref(), Some("Revised 2"));
        assert_eq!(one_time_extra(None, Some(1)).as_deref(), Some("Rejected 1"));
        assert_eq!(
            one_time_extra(Some(0), Some(3)).as_deref(),
            Some("Revised 0 / Rejected 3")
        );
    }
}
