//! Export payloads, filenames, and local leaderboard workbooks.

use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{CurrentUser, PerformanceData, PerformanceRecord, UserRole};
use crate::query::utc_instant_string;
use crate::ranking::RankedEntry;
use crate::report_window::ReportWindow;

/// Server-side export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Excel workbook.
    Spreadsheet,
    /// PDF scorecard.
    Document,
}

impl ExportFormat {
    /// Endpoint path relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "/api/analytics/export/excel",
            ExportFormat::Document => "/api/analytics/export/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Document => "pdf",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "Excel",
            ExportFormat::Document => "PDF",
        }
    }

    /// Default filename for an export of `window`.
    pub fn filename(&self, window: &ReportWindow) -> String {
        let prefix = match self {
            ExportFormat::Spreadsheet => "performance-report",
            ExportFormat::Document => "performance-scorecard",
        };
        format!("{prefix}-{period}.{ext}", period = window.period_slug(), ext = self.extension())
    }

    fn filter_name(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "Excel Files",
            ExportFormat::Document => "PDF Files",
        }
    }
}

/// Period description sent with an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPeriod {
    pub mode: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl ExportPeriod {
    /// Period for `window` with bounds in the local timezone.
    pub fn from_window(window: &ReportWindow) -> Self {
        Self::from_window_in(window, &Local)
    }

    /// Period for `window` with bounds interpreted in `tz`, sent as UTC instants
    /// exactly like the fetch parameters.
    pub fn from_window_in<Tz: TimeZone>(window: &ReportWindow, tz: &Tz) -> Self {
        let bounds = window.resolve();
        Self {
            mode: window.mode().key(),
            label: window.describe(),
            start_date: bounds.map(|(start, _)| utc_instant_string(tz, &start)),
            end_date: bounds.map(|(_, end)| utc_instant_string(tz, &end)),
        }
    }
}

/// Identity of the user requesting the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportUser {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

/// Body posted to the export endpoints.
///
/// Built from the data currently shown on screen; exporting never refetches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub team_performance: Vec<PerformanceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_performance: Option<PerformanceRecord>,
    pub period: ExportPeriod,
    pub user: ExportUser,
}

impl ExportRequest {
    pub fn new(data: &PerformanceData, window: &ReportWindow, user: &CurrentUser) -> Self {
        Self {
            team_performance: data.team_records().to_vec(),
            self_performance: data.self_performance.clone(),
            period: ExportPeriod::from_window(window),
            user: ExportUser {
                id: user.id.clone(),
                name: user.name.clone(),
                role: user.role,
            },
        }
    }
}

/// Open save file dialog and return selected path.
pub fn show_save_dialog(format: ExportFormat, default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter(format.filter_name(), &[format.extension()])
        .save_file()
}

/// Write an exported payload to disk.
pub fn save_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    if bytes.is_empty() {
        return Err(AppError::export("Server returned an empty file"));
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Write the current leaderboard to a local Excel file.
pub fn write_leaderboard_xlsx(entries: &[RankedEntry<'_>], window: &ReportWindow, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Leaderboard")?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    let percent_format = Format::new().set_num_format("0.0");

    worksheet.write_string(0, 0, format!("Period: {}", window.describe()))?;

    let headers = [
        "Rank",
        "Name",
        "Total Tasks",
        "Completed",
        "Pending",
        "Completion %",
        "On-time %",
        "Score",
    ];

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(1, col as u16, *header, &header_format)?;
    }

    worksheet.set_column_width(0, 8)?; // Rank
    worksheet.set_column_width(1, 30)?; // Name
    for col in 2..headers.len() as u16 {
        worksheet.set_column_width(col, 14)?;
    }

    for (idx, entry) in entries.iter().enumerate() {
        let row = (idx + 2) as u32;
        let record = entry.record;

        worksheet.write_number(row, 0, entry.rank as f64)?;
        worksheet.write_string(row, 1, &record.user_name)?;
        worksheet.write_number(row, 2, record.total_tasks)?;
        worksheet.write_number(row, 3, record.completed_across_categories())?;
        worksheet.write_number(row, 4, record.pending_tasks)?;
        worksheet.write_number_with_format(row, 5, record.completion_rate, &percent_format)?;
        worksheet.write_number_with_format(row, 6, record.on_time_rate, &percent_format)?;
        worksheet.write_number_with_format(row, 7, entry.score, &percent_format)?;
    }

    if !entries.is_empty() {
        let last_row = (entries.len() + 1) as u32;
        worksheet.autofilter(1, 0, last_row, (headers.len() - 1) as u16)?;
    }

    worksheet.set_freeze_panes(2, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Default filename for the local leaderboard workbook.
pub fn leaderboard_filename(window: &ReportWindow) -> String {
    format!("leaderboard-{}.xlsx", window.period_slug())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PerformanceQuery;
    use crate::ranking::rank;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: "7".to_string(),
            name: "Lee".to_string(),
            role: UserRole::Manager,
        }
    }

    #[test]
    fn test_spreadsheet_filename_custom_range() {
        let window = ReportWindow::Custom {
            from: date(2024, 2, 1),
            to: date(2024, 2, 5),
        };
        assert_eq!(
            ExportFormat::Spreadsheet.filename(&window),
            "performance-report-2024-02-01-to-2024-02-05.xlsx"
        );
    }

    #[test]
    fn test_document_filenames() {
        let month = ReportWindow::CurrentMonth {
            anchor: date(2024, 3, 15),
        };
        assert_eq!(
            ExportFormat::Document.filename(&month),
            "performance-scorecard-2024-03.pdf"
        );
        assert_eq!(
            ExportFormat::Document.filename(&ReportWindow::AllTime),
            "performance-scorecard-all-time.pdf"
        );
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(ExportFormat::Spreadsheet.endpoint(), "/api/analytics/export/excel");
        assert_eq!(ExportFormat::Document.endpoint(), "/api/analytics/export/pdf");
    }

    #[test]
    fn test_export_request_shape() {
        let data = PerformanceData {
            team_performance: Some(vec![PerformanceRecord {
                user_name: "a".to_string(),
                total_tasks: 3,
                ..Default::default()
            }]),
            self_performance: None,
        };
        let window = ReportWindow::Custom {
            from: date(2024, 1, 10),
            to: date(2024, 1, 12),
        };

        let request = ExportRequest::new(&data, &window, &user());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["teamPerformance"][0]["userName"], "a");
        assert!(json.get("selfPerformance").is_none());
        assert_eq!(json["period"]["mode"], "custom");
        assert_eq!(request.period, ExportPeriod::from_window(&window));
        assert_eq!(json["user"]["role"], "manager");
    }

    #[test]
    fn test_period_dates_are_utc_instants() {
        let window = ReportWindow::Custom {
            from: date(2024, 1, 10),
            to: date(2024, 1, 12),
        };
        let period = ExportPeriod::from_window_in(&window, &chrono::Utc);

        assert_eq!(period.start_date.as_deref(), Some("2024-01-10T00:00:00.000Z"));
        assert_eq!(period.end_date.as_deref(), Some("2024-01-12T23:59:59.999Z"));
    }

    #[test]
    fn test_period_matches_fetch_params_off_utc() {
        let window = ReportWindow::CurrentMonth {
            anchor: date(2024, 3, 15),
        };
        let plus_two = chrono::FixedOffset::east_opt(2 * 3600).unwrap();

        let period = ExportPeriod::from_window_in(&window, &plus_two);
        let params = PerformanceQuery::new(&user(), &window).to_params_in(&plus_two);
        let param = |key: &str| params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone());

        assert_eq!(period.start_date.as_deref(), Some("2024-02-29T22:00:00.000Z"));
        assert_eq!(period.start_date, param("startDate"));
        assert_eq!(period.end_date, param("endDate"));
    }

    #[test]
    fn test_all_time_period_has_no_dates() {
        let period = ExportPeriod::from_window(&ReportWindow::AllTime);
        let json = serde_json::to_value(&period).unwrap();

        assert_eq!(json["mode"], "all-time");
        assert!(json.get("startDate").is_none());
        assert!(json.get("endDate").is_none());
    }

    #[test]
    fn test_save_bytes_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");

        assert!(save_bytes(&[], &path).is_err());
        assert!(!path.exists());

        save_bytes(b"%PDF-1.7", &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn test_write_leaderboard_xlsx() {
        let records = vec![
            PerformanceRecord {
                user_name: "a".to_string(),
                total_tasks: 10,
                completion_rate: 80.0,
                on_time_rate: 60.0,
                ..Default::default()
            },
            PerformanceRecord {
                user_name: "b".to_string(),
                total_tasks: 5,
                ..Default::default()
            },
        ];
        let ranked = rank(&records);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(leaderboard_filename(&ReportWindow::AllTime));

        write_leaderboard_xlsx(&ranked, &ReportWindow::AllTime, &path).unwrap();

        assert!(path.ends_with("leaderboard-all-time.xlsx"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
