//! Main application state.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use eframe::egui::{self, Align, Layout, RichText, ScrollArea};
use tokio::sync::mpsc;

use crate::client::AnalyticsClient;
use crate::config::AppConfig;
use crate::error::Result;
use crate::export::{self, ExportFormat, ExportRequest};
use crate::models::{CurrentUser, PerformanceData};
use crate::query::{FetchTracker, PerformanceQuery};
use crate::ranking::{self, RankedEntry};
use crate::report_window::DateRangeSelector;

use super::components::colors;
use super::scorecard_panel;

/// Keep only this many activity log entries.
const MAX_LOG_ENTRIES: usize = 100;

/// Which dropdown panel is open. At most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMenu {
    #[default]
    None,
    MonthPicker,
    ExportMenu,
}

impl OpenMenu {
    /// Open `menu`, or close it if it is already open.
    pub fn toggle(&mut self, menu: OpenMenu) {
        *self = if *self == menu { OpenMenu::None } else { menu };
    }
}

/// Export operation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    InProgress(ExportFormat),
}

/// Messages from async tasks to UI.
pub enum UiMessage {
    PerformanceLoaded { seq: u64, data: PerformanceData },
    PerformanceFailed { seq: u64, error: String },
    ExportCompleted { format: ExportFormat, path: PathBuf },
    ExportFailed(String),
}

/// Log level for UI messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Log entry for display in the UI.
#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub level: LogLevel,
}

/// Main application state.
pub struct App {
    // Runtime and backend
    pub rt: tokio::runtime::Runtime,
    pub client: AnalyticsClient,

    // Message channel for async communication
    pub tx: mpsc::UnboundedSender<UiMessage>,
    pub rx: mpsc::UnboundedReceiver<UiMessage>,

    // Identity and configuration
    pub config: AppConfig,
    pub user: CurrentUser,

    // Filters
    pub selector: DateRangeSelector,
    pub open_menu: OpenMenu,

    // Fetched data
    tracker: FetchTracker,
    pub data: PerformanceData,
    pub is_loading: bool,
    pub last_loaded: Option<DateTime<Local>>,

    // Export
    pub export_state: ExportState,

    // Log messages
    pub log_messages: Vec<LogEntry>,

    // Dialogs
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl App {
    pub fn new(config: AppConfig, rt: tokio::runtime::Runtime) -> Result<Self> {
        let client = AnalyticsClient::new(&config.api.base_url, config.api.timeout_secs)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let user = config.current_user();

        let mut app = Self {
            rt,
            client,
            tx,
            rx,
            user,
            config,
            selector: DateRangeSelector::new(Local::now().date_naive()),
            open_menu: OpenMenu::default(),
            tracker: FetchTracker::default(),
            data: PerformanceData::default(),
            is_loading: false,
            last_loaded: None,
            export_state: ExportState::default(),
            log_messages: Vec::new(),
            error_message: None,
            success_message: None,
        };

        // Load initial data
        app.refresh_if_changed();

        Ok(app)
    }

    /// Log a message to the UI log.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_messages.push(LogEntry {
            timestamp: Local::now(),
            message: message.into(),
            level,
        });

        if self.log_messages.len() > MAX_LOG_ENTRIES {
            self.log_messages.remove(0);
        }
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_success(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Query for the current user and selected window.
    pub fn current_query(&self) -> PerformanceQuery {
        PerformanceQuery::new(&self.user, &self.selector.window())
    }

    /// Fetch if the resolved query changed since the last fetch.
    pub fn refresh_if_changed(&mut self) {
        let query = self.current_query();
        if let Some(seq) = self.tracker.begin(&query) {
            self.spawn_fetch(seq, query);
        }
    }

    /// Fetch the current query unconditionally.
    pub fn refresh(&mut self) {
        let query = self.current_query();
        let seq = self.tracker.force(&query);
        self.spawn_fetch(seq, query);
    }

    fn spawn_fetch(&mut self, seq: u64, query: PerformanceQuery) {
        tracing::info!("Fetching performance (request {}) for {}", seq, self.selector.window().describe());
        self.is_loading = true;

        let client = self.client.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match client.fetch_performance(&query).await {
                Ok(data) => {
                    let _ = tx.send(UiMessage::PerformanceLoaded { seq, data });
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::PerformanceFailed {
                        seq,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    /// Leaderboard for the current team data.
    pub fn ranked(&self) -> Vec<RankedEntry<'_>> {
        ranking::rank(self.data.team_records())
    }

    pub fn is_exporting(&self) -> bool {
        matches!(self.export_state, ExportState::InProgress(_))
    }

    /// Ask the backend to export the data currently on screen.
    pub fn start_export(&mut self, format: ExportFormat) {
        if self.is_exporting() {
            return;
        }
        if self.data.is_empty() {
            self.error_message = Some("There is no data to export for this period".to_string());
            return;
        }

        let window = self.selector.window();
        let filename = format.filename(&window);
        let Some(path) = export::show_save_dialog(format, &filename) else {
            self.log_info("Export cancelled");
            return;
        };

        let request = ExportRequest::new(&self.data, &window, &self.user);
        self.begin_export(format, request, path);
    }

    fn begin_export(&mut self, format: ExportFormat, request: ExportRequest, path: PathBuf) {
        self.export_state = ExportState::InProgress(format);
        self.log_info(format!("Exporting {} report...", format.name()));

        let client = self.client.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result = match client.export(format, &request).await {
                Ok(bytes) => export::save_bytes(&bytes, &path),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => {
                    let _ = tx.send(UiMessage::ExportCompleted { format, path });
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::ExportFailed(e.to_string()));
                }
            }
        });
    }

    /// Save the current leaderboard to a local workbook.
    pub fn save_leaderboard(&mut self) {
        let window = self.selector.window();
        let filename = export::leaderboard_filename(&window);
        let Some(path) = export::show_save_dialog(ExportFormat::Spreadsheet, &filename) else {
            return;
        };

        let result = export::write_leaderboard_xlsx(&self.ranked(), &window, &path);
        match result {
            Ok(()) => {
                self.success_message = Some(format!("Saved to: {}", path.display()));
                self.log_success(format!("Leaderboard saved: {}", path.display()));
            }
            Err(e) => {
                self.error_message = Some(format!("Save failed: {e}"));
                self.log_error(format!("Save failed: {e}"));
            }
        }
    }

    /// Apply one async result to the page state.
    pub fn handle_message(&mut self, msg: UiMessage) {
        match msg {
            UiMessage::PerformanceLoaded { seq, data } => {
                if !self.tracker.is_current(seq) {
                    tracing::debug!("Discarding stale response for request {}", seq);
                    return;
                }
                tracing::info!(
                    "Loaded {} team records (self record: {})",
                    data.team_records().len(),
                    data.self_performance.is_some()
                );
                self.data = data;
                self.is_loading = false;
                self.last_loaded = Some(Local::now());
            }
            UiMessage::PerformanceFailed { seq, error } => {
                if !self.tracker.is_current(seq) {
                    return;
                }
                // Fetch failures only show the empty state
                tracing::warn!("Performance fetch failed: {}", error);
                self.log_warning(format!("Could not load performance data: {error}"));
                self.data = PerformanceData::default();
                self.is_loading = false;
            }
            UiMessage::ExportCompleted { format, path } => {
                self.export_state = ExportState::Idle;
                self.success_message = Some(format!("Exported to: {}", path.display()));
                self.log_success(format!("{} export saved: {}", format.name(), path.display()));
            }
            UiMessage::ExportFailed(e) => {
                self.export_state = ExportState::Idle;
                tracing::error!("Export failed: {}", e);
                self.error_message = Some(format!("Export failed: {e}"));
                self.log_error(format!("Export failed: {e}"));
            }
        }
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
        }
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(
                        colors::NEUTRAL,
                        format!("{} ({})  |  {}", self.user.name, self.user.role.name(), self.client.base_url()),
                    );

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.is_loading {
                            ui.spinner();
                            ui.label("Loading...");
                        } else if let Some(ts) = self.last_loaded {
                            ui.label(RichText::new(format!("Updated {}", ts.format("%H:%M:%S"))).weak());
                        }
                        if let ExportState::InProgress(format) = self.export_state {
                            ui.spinner();
                            ui.colored_label(colors::WARNING, format!("Exporting {}...", format.name()));
                        }
                    });
                });
            });
    }

    /// Render the activity log side panel.
    fn show_activity_panel(&self, ctx: &egui::Context) {
        egui::SidePanel::right("activity_log")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.label(RichText::new("Recent Activity").strong());
                ui.add_space(6.0);

                ScrollArea::vertical().show(ui, |ui| {
                    if self.log_messages.is_empty() {
                        ui.label(RichText::new("No recent activity").weak());
                    }
                    for entry in self.log_messages.iter().rev() {
                        let color = match entry.level {
                            LogLevel::Info => colors::NEUTRAL,
                            LogLevel::Success => colors::SUCCESS,
                            LogLevel::Warning => colors::WARNING,
                            LogLevel::Error => colors::ERROR,
                        };
                        ui.horizontal_wrapped(|ui| {
                            ui.label(RichText::new(entry.timestamp.format("%H:%M:%S").to_string()).small().weak());
                            ui.label(RichText::new(&entry.message).small().color(color));
                        });
                    }
                });
            });
    }

    /// Render modal dialogs (error, success).
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        // Error dialog
        if let Some(ref error) = self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::ERROR, error);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }

        // Success dialog
        if let Some(ref msg) = self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::SUCCESS, msg);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.success_message = None;
                    }
                });
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async results
        self.poll_async_results();

        // Request repaint during async operations
        if self.is_loading || self.is_exporting() {
            ctx.request_repaint();
        }

        self.show_status_bar(ctx);
        self.show_activity_panel(ctx);
        self.show_dialogs(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            scorecard_panel::show(self, ui);
        });

        // Filter edits made this frame
        self.refresh_if_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use crate::models::{PerformanceRecord, UserRole};
    use crate::report_window::WindowMode;

    fn test_app() -> App {
        let config = AppConfig {
            user: UserConfig {
                id: "1".to_string(),
                name: "Ana".to_string(),
                role: UserRole::Admin,
            },
            ..Default::default()
        };
        let rt = tokio::runtime::Runtime::new().unwrap();
        App::new(config, rt).unwrap()
    }

    fn team(names: &[&str]) -> PerformanceData {
        PerformanceData {
            team_performance: Some(
                names
                    .iter()
                    .map(|n| PerformanceRecord {
                        user_name: n.to_string(),
                        total_tasks: 1,
                        ..Default::default()
                    })
                    .collect(),
            ),
            self_performance: None,
        }
    }

    #[test]
    fn test_initial_fetch_is_issued() {
        let app = test_app();
        assert!(app.is_loading);
    }

    #[test]
    fn test_current_response_is_applied() {
        let mut app = test_app();
        app.handle_message(UiMessage::PerformanceLoaded {
            seq: 1,
            data: team(&["a", "b"]),
        });

        assert!(!app.is_loading);
        assert_eq!(app.ranked().len(), 2);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut app = test_app();
        app.selector.select_mode(WindowMode::AllTime, Local::now().date_naive());
        app.refresh_if_changed();

        // Request 1 resolves after request 2
        app.handle_message(UiMessage::PerformanceLoaded {
            seq: 2,
            data: team(&["new"]),
        });
        app.handle_message(UiMessage::PerformanceLoaded {
            seq: 1,
            data: team(&["old"]),
        });

        assert_eq!(app.data.team_records()[0].user_name, "new");
    }

    #[test]
    fn test_stale_failure_keeps_newer_data() {
        let mut app = test_app();
        app.selector.select_mode(WindowMode::AllTime, Local::now().date_naive());
        app.refresh_if_changed();

        app.handle_message(UiMessage::PerformanceLoaded {
            seq: 2,
            data: team(&["new"]),
        });
        let logged = app.log_messages.len();

        // Request 1 fails after request 2 already succeeded
        app.handle_message(UiMessage::PerformanceFailed {
            seq: 1,
            error: "connection reset".to_string(),
        });

        assert_eq!(app.data.team_records().len(), 1);
        assert_eq!(app.data.team_records()[0].user_name, "new");
        assert!(!app.is_loading);
        assert_eq!(app.log_messages.len(), logged);
    }

    #[test]
    fn test_fetch_failure_shows_empty_state_without_dialog() {
        let mut app = test_app();
        app.handle_message(UiMessage::PerformanceLoaded {
            seq: 1,
            data: team(&["a"]),
        });
        app.refresh();
        app.handle_message(UiMessage::PerformanceFailed {
            seq: 2,
            error: "connection refused".to_string(),
        });

        assert!(app.data.is_empty());
        assert!(app.error_message.is_none());
        assert!(!app.is_loading);
        assert_eq!(app.log_messages.last().unwrap().level, LogLevel::Warning);
    }

    #[test]
    fn test_unchanged_filters_do_not_refetch() {
        let mut app = test_app();
        app.handle_message(UiMessage::PerformanceLoaded {
            seq: 1,
            data: PerformanceData::default(),
        });
        app.refresh_if_changed();
        assert!(!app.is_loading);
    }

    #[test]
    fn test_export_failure_clears_busy_flag() {
        let mut app = test_app();
        app.export_state = ExportState::InProgress(ExportFormat::Document);

        app.handle_message(UiMessage::ExportFailed("timeout".to_string()));

        assert_eq!(app.export_state, ExportState::Idle);
        assert!(app.error_message.as_deref().unwrap().contains("timeout"));
    }

    #[test]
    fn test_export_success_clears_busy_flag() {
        let mut app = test_app();
        app.export_state = ExportState::InProgress(ExportFormat::Spreadsheet);

        app.handle_message(UiMessage::ExportCompleted {
            format: ExportFormat::Spreadsheet,
            path: PathBuf::from("performance-report-all-time.xlsx"),
        });

        assert_eq!(app.export_state, ExportState::Idle);
        assert!(app.error_message.is_none());
        assert!(app.success_message.is_some());
    }

    #[test]
    fn test_export_with_no_data_is_rejected() {
        let mut app = test_app();
        app.start_export(ExportFormat::Spreadsheet);

        assert_eq!(app.export_state, ExportState::Idle);
        assert!(app.error_message.is_some());
    }

    #[test]
    fn test_open_menu_toggle() {
        let mut menu = OpenMenu::None;
        menu.toggle(OpenMenu::MonthPicker);
        assert_eq!(menu, OpenMenu::MonthPicker);
        menu.toggle(OpenMenu::ExportMenu);
        assert_eq!(menu, OpenMenu::ExportMenu);
        menu.toggle(OpenMenu::ExportMenu);
        assert_eq!(menu, OpenMenu::None);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut app = test_app();
        for i in 0..(MAX_LOG_ENTRIES + 20) {
            app.log_info(format!("entry {i}"));
        }
        assert_eq!(app.log_messages.len(), MAX_LOG_ENTRIES);
        assert_eq!(app.log_messages[0].message, "entry 20");
    }
}
