//! Scorecard page: window filters, export actions, and performance cards.

use chrono::{Local, NaiveDate};
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use egui_phosphor::regular::{
    ARROWS_CLOCKWISE, CALENDAR_BLANK, CARET_DOWN, DOWNLOAD_SIMPLE, EXPORT, FILE_PDF, FILE_XLS, TROPHY,
};

use crate::export::ExportFormat;
use crate::report_window::{WindowMode, month_options, same_month};

use super::app::{App, OpenMenu};
use super::card;
use super::components::{colors, panel_header, primary_button_with_icon, styled_button_with_icon};

/// Show the scorecard page.
pub fn show(app: &mut App, ui: &mut Ui) {
    let subtitle = format!("Task completion and on-time delivery - {}", app.selector.window().describe());
    panel_header(ui, "Team Performance", &subtitle);

    show_filter_bar(app, ui);

    match app.open_menu {
        OpenMenu::MonthPicker => show_month_picker(app, ui),
        OpenMenu::ExportMenu => show_export_menu(app, ui),
        OpenMenu::None => {}
    }

    ui.add_space(10.0);
    ui.separator();
    ui.add_space(10.0);

    ScrollArea::vertical().show(ui, |ui| {
        show_cards(app, ui);
    });
}

fn show_filter_bar(app: &mut App, ui: &mut Ui) {
    let today = Local::now().date_naive();

    ui.horizontal(|ui| {
        ui.label("Period:");
        ui.add_space(6.0);

        for mode in WindowMode::ALL {
            if ui.selectable_label(app.selector.mode() == mode, mode.name()).clicked() {
                app.selector.select_mode(mode, today);
                app.open_menu = OpenMenu::None;
            }
        }

        ui.add_space(16.0);

        match app.selector.mode() {
            WindowMode::CurrentMonth => {
                let label = format!("{CALENDAR_BLANK} {} {CARET_DOWN}", app.selector.anchor().format("%B %Y"));
                if ui.button(label).clicked() {
                    app.open_menu.toggle(OpenMenu::MonthPicker);
                }
            }
            WindowMode::Custom => show_custom_range(app, ui),
            WindowMode::AllTime => {
                ui.label(RichText::new("All recorded tasks").weak());
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = format!("{EXPORT} Export {CARET_DOWN}");
            if ui.add_enabled(!app.is_exporting(), egui::Button::new(label)).clicked() {
                app.open_menu.toggle(OpenMenu::ExportMenu);
            }

            if styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh").clicked() {
                app.refresh();
            }
        });
    });
}

fn show_custom_range(app: &mut App, ui: &mut Ui) {
    let (mut from, mut to) = app.selector.custom_range();

    ui.label("From:");
    if ui
        .add(DatePickerButton::new(&mut from).id_salt("custom_from"))
        .changed()
    {
        app.selector.set_custom_from(from);
    }

    ui.add_space(10.0);

    ui.label("To:");
    if ui.add(DatePickerButton::new(&mut to).id_salt("custom_to")).changed() {
        app.selector.set_custom_to(to);
    }

    if to < from {
        ui.label(RichText::new("End date is before start date").small().color(colors::WARNING));
    }
}

fn show_month_picker(app: &mut App, ui: &mut Ui) {
    let today = Local::now().date_naive();
    let anchor = app.selector.anchor();
    let mut picked: Option<NaiveDate> = None;

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for month in month_options(today) {
                let label = month.format("%b %Y").to_string();
                if ui.selectable_label(same_month(month, anchor), label).clicked() {
                    picked = Some(month);
                }
            }
        });
    });

    if let Some(month) = picked {
        app.selector.select_month(month);
        app.open_menu = OpenMenu::None;
    }
}

fn show_export_menu(app: &mut App, ui: &mut Ui) {
    let busy = app.is_exporting();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!busy, |ui| {
                if primary_button_with_icon(ui, FILE_XLS, "Excel report").clicked() {
                    app.open_menu = OpenMenu::None;
                    app.start_export(ExportFormat::Spreadsheet);
                }

                if primary_button_with_icon(ui, FILE_PDF, "PDF scorecard").clicked() {
                    app.open_menu = OpenMenu::None;
                    app.start_export(ExportFormat::Document);
                }
            });

            ui.add_space(10.0);

            if styled_button_with_icon(ui, DOWNLOAD_SIMPLE, "Save leaderboard locally").clicked() {
                app.open_menu = OpenMenu::None;
                app.save_leaderboard();
            }
        });
    });
}

fn show_cards(app: &App, ui: &mut Ui) {
    let ranked = app.ranked();
    let self_record = app
        .data
        .self_performance
        .as_ref()
        .filter(|_| app.config.ui.show_self_card || ranked.is_empty());

    if app.is_loading && app.data.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.spinner();
            ui.label("Loading performance data...");
        });
        return;
    }

    if ranked.is_empty() && self_record.is_none() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(RichText::new("No performance data for this period").size(16.0));
            ui.label(RichText::new("Try another period or refresh.").weak());
        });
        return;
    }

    if let Some(record) = self_record {
        ui.label(RichText::new("My Performance").strong().size(16.0));
        ui.add_space(4.0);
        card::show(ui, record, None);
        ui.add_space(12.0);
    }

    if !ranked.is_empty() {
        ui.label(RichText::new(format!("{TROPHY} Top Performers")).strong().size(16.0));
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            for entry in &ranked {
                card::show(ui, entry.record, Some(entry.rank));
            }
        });
    }
}
