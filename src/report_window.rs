//! Reporting window selection and resolution.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Number of months offered on each side of the current month.
const MONTH_PICKER_SPAN: u32 = 5;

/// Window mode picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    #[default]
    CurrentMonth,
    Custom,
    AllTime,
}

impl WindowMode {
    pub const ALL: [WindowMode; 3] = [WindowMode::CurrentMonth, WindowMode::Custom, WindowMode::AllTime];

    /// Get the display name for the mode.
    pub fn name(&self) -> &'static str {
        match self {
            WindowMode::CurrentMonth => "Month",
            WindowMode::Custom => "Custom Range",
            WindowMode::AllTime => "All Time",
        }
    }

    /// Identifier used in export payloads.
    pub fn key(&self) -> &'static str {
        match self {
            WindowMode::CurrentMonth => "month",
            WindowMode::Custom => "custom",
            WindowMode::AllTime => "all-time",
        }
    }
}

/// The reporting window a fetch or export applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// The whole calendar month containing `anchor`.
    CurrentMonth { anchor: NaiveDate },
    /// Inclusive day range.
    Custom { from: NaiveDate, to: NaiveDate },
    AllTime,
}

impl ReportWindow {
    pub fn mode(&self) -> WindowMode {
        match self {
            ReportWindow::CurrentMonth { .. } => WindowMode::CurrentMonth,
            ReportWindow::Custom { .. } => WindowMode::Custom,
            ReportWindow::AllTime => WindowMode::AllTime,
        }
    }

    /// Resolve to local wall-clock bounds, `None` for all-time.
    pub fn resolve(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match *self {
            ReportWindow::CurrentMonth { anchor } => {
                let first = first_of_month(anchor);
                Some((start_of_day(first), end_of_day(last_of_month(first))))
            }
            ReportWindow::Custom { from, to } => Some((start_of_day(from), end_of_day(to))),
            ReportWindow::AllTime => None,
        }
    }

    /// Period fragment used in export filenames.
    pub fn period_slug(&self) -> String {
        match self {
            ReportWindow::CurrentMonth { anchor } => anchor.format("%Y-%m").to_string(),
            ReportWindow::Custom { from, to } => {
                format!("{}-to-{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
            ReportWindow::AllTime => "all-time".to_string(),
        }
    }

    /// Human-readable label for headers and export payloads.
    pub fn describe(&self) -> String {
        match self {
            ReportWindow::CurrentMonth { anchor } => anchor.format("%B %Y").to_string(),
            ReportWindow::Custom { from, to } => {
                format!("{} to {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
            ReportWindow::AllTime => "All time".to_string(),
        }
    }
}

/// Holds the active window mode plus the last value of every mode.
///
/// Switching modes keeps the other modes' values, so returning to a mode
/// restores its previous selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeSelector {
    mode: WindowMode,
    anchor: NaiveDate,
    custom_from: NaiveDate,
    custom_to: NaiveDate,
}

impl DateRangeSelector {
    /// Start in current-month mode anchored on `today`.
    ///
    /// The custom range defaults to the first of the month through today.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mode: WindowMode::CurrentMonth,
            anchor: today,
            custom_from: first_of_month(today),
            custom_to: today,
        }
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn custom_range(&self) -> (NaiveDate, NaiveDate) {
        (self.custom_from, self.custom_to)
    }

    /// Switch mode. Selecting current-month also resets the anchor to `today`.
    pub fn select_mode(&mut self, mode: WindowMode, today: NaiveDate) {
        if mode == WindowMode::CurrentMonth {
            self.anchor = today;
        }
        self.mode = mode;
    }

    /// Pick a month from the month picker.
    pub fn select_month(&mut self, date: NaiveDate) {
        self.anchor = date;
    }

    pub fn set_custom_from(&mut self, date: NaiveDate) {
        self.custom_from = date;
    }

    /// Set the end of the custom range. Never earlier than the start.
    pub fn set_custom_to(&mut self, date: NaiveDate) {
        self.custom_to = date.max(self.custom_from);
    }

    /// The active window.
    pub fn window(&self) -> ReportWindow {
        match self.mode {
            WindowMode::CurrentMonth => ReportWindow::CurrentMonth { anchor: self.anchor },
            WindowMode::Custom => ReportWindow::Custom {
                from: self.custom_from,
                to: self.custom_to,
            },
            WindowMode::AllTime => ReportWindow::AllTime,
        }
    }
}

/// First-of-month dates offered by the month picker.
///
/// Always five months before `today`'s month through five months after,
/// independent of the selected anchor.
pub fn month_options(today: NaiveDate) -> Vec<NaiveDate> {
    let current = first_of_month(today);
    let Some(start) = current.checked_sub_months(Months::new(MONTH_PICKER_SPAN)) else {
        return vec![current];
    };

    (0..=MONTH_PICKER_SPAN * 2)
        .filter_map(|offset| start.checked_add_months(Months::new(offset)))
        .collect()
}

/// True when both dates fall in the same calendar month.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default();
    date.and_time(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f").unwrap()
    }

    #[test]
    fn test_current_month_resolution() {
        let window = ReportWindow::CurrentMonth {
            anchor: date(2024, 3, 15),
        };
        let (start, end) = window.resolve().unwrap();
        assert_eq!(start, datetime("2024-03-01T00:00:00.000"));
        assert_eq!(end, datetime("2024-03-31T23:59:59.999"));
    }

    #[test]
    fn test_current_month_leap_february() {
        let window = ReportWindow::CurrentMonth {
            anchor: date(2024, 2, 3),
        };
        let (_, end) = window.resolve().unwrap();
        assert_eq!(end, datetime("2024-02-29T23:59:59.999"));
    }

    #[test]
    fn test_december_rolls_over_year() {
        let window = ReportWindow::CurrentMonth {
            anchor: date(2023, 12, 31),
        };
        let (start, end) = window.resolve().unwrap();
        assert_eq!(start, datetime("2023-12-01T00:00:00.000"));
        assert_eq!(end, datetime("2023-12-31T23:59:59.999"));
    }

    #[test]
    fn test_custom_resolution() {
        let window = ReportWindow::Custom {
            from: date(2024, 1, 10),
            to: date(2024, 1, 12),
        };
        let (start, end) = window.resolve().unwrap();
        assert_eq!(start, datetime("2024-01-10T00:00:00.000"));
        assert_eq!(end, datetime("2024-01-12T23:59:59.999"));
    }

    #[test]
    fn test_all_time_has_no_bounds() {
        assert_eq!(ReportWindow::AllTime.resolve(), None);
    }

    #[test]
    fn test_period_slugs() {
        let month = ReportWindow::CurrentMonth {
            anchor: date(2024, 3, 15),
        };
        assert_eq!(month.period_slug(), "2024-03");

        let custom = ReportWindow::Custom {
            from: date(2024, 2, 1),
            to: date(2024, 2, 5),
        };
        assert_eq!(custom.period_slug(), "2024-02-01-to-2024-02-05");

        assert_eq!(ReportWindow::AllTime.period_slug(), "all-time");
    }

    #[test]
    fn test_month_options_span() {
        let today = date(2024, 3, 15);
        let options = month_options(today);

        assert_eq!(options.len(), 11);
        assert_eq!(options[0], date(2023, 10, 1));
        assert_eq!(options[5], date(2024, 3, 1));
        assert_eq!(options[10], date(2024, 8, 1));
    }

    #[test]
    fn test_month_options_ignore_anchor() {
        let today = date(2024, 3, 15);
        let mut selector = DateRangeSelector::new(today);
        selector.select_month(date(2023, 10, 1));

        assert_eq!(month_options(today)[5], date(2024, 3, 1));
    }

    #[test]
    fn test_selecting_current_month_resets_anchor() {
        let today = date(2024, 3, 15);
        let mut selector = DateRangeSelector::new(today);
        selector.select_month(date(2023, 11, 1));
        selector.select_mode(WindowMode::AllTime, today);
        selector.select_mode(WindowMode::CurrentMonth, today);

        assert_eq!(selector.anchor(), today);
    }

    #[test]
    fn test_switching_modes_keeps_custom_range() {
        let today = date(2024, 3, 15);
        let mut selector = DateRangeSelector::new(today);
        selector.select_mode(WindowMode::Custom, today);
        selector.set_custom_from(date(2024, 1, 10));
        selector.set_custom_to(date(2024, 1, 12));

        selector.select_mode(WindowMode::AllTime, today);
        assert_eq!(selector.window(), ReportWindow::AllTime);

        selector.select_mode(WindowMode::Custom, today);
        assert_eq!(
            selector.window(),
            ReportWindow::Custom {
                from: date(2024, 1, 10),
                to: date(2024, 1, 12),
            }
        );
    }

    #[test]
    fn test_custom_to_never_before_from() {
        let today = date(2024, 3, 15);
        let mut selector = DateRangeSelector::new(today);
        selector.set_custom_from(date(2024, 2, 10));
        selector.set_custom_to(date(2024, 2, 1));

        assert_eq!(selector.custom_range(), (date(2024, 2, 10), date(2024, 2, 10)));
    }

    #[test]
    fn test_describe() {
        let month = ReportWindow::CurrentMonth {
            anchor: date(2024, 3, 15),
        };
        assert_eq!(month.describe(), "March 2024");
        assert_eq!(ReportWindow::AllTime.describe(), "All time");
    }

    #[test]
    fn test_same_month() {
        assert!(same_month(date(2024, 3, 1), date(2024, 3, 31)));
        assert!(!same_month(date(2024, 3, 1), date(2023, 3, 1)));
    }
}
