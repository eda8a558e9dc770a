//! Resolved fetch queries and request sequencing.

use chrono::{Local, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Utc};

use crate::models::CurrentUser;
use crate::report_window::ReportWindow;

/// Everything a performance fetch depends on.
///
/// A new fetch is issued only when this value changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceQuery {
    pub user_id: String,
    pub privileged: bool,
    /// Local wall-clock bounds. Both present or both absent.
    pub bounds: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl PerformanceQuery {
    /// Build the query for a user and window.
    pub fn new(user: &CurrentUser, window: &ReportWindow) -> Self {
        Self {
            user_id: user.id.clone(),
            privileged: user.is_privileged(),
            bounds: window.resolve(),
        }
    }

    /// Query parameters with bounds interpreted in the local timezone.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        self.to_params_in(&Local)
    }

    /// Query parameters with bounds interpreted in `tz`, sent as UTC instants.
    pub fn to_params_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("userId", self.user_id.clone()),
            ("isAdmin", self.privileged.to_string()),
        ];

        if let Some((start, end)) = &self.bounds {
            params.push(("startDate", utc_instant_string(tz, start)));
            params.push(("endDate", utc_instant_string(tz, end)));
        }

        params
    }
}

/// Local wall-clock time in `tz` as a UTC RFC 3339 instant with milliseconds.
///
/// Fetches and exports both send their bounds through this, so the two always
/// name the same instants.
pub fn utc_instant_string<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> String {
    // A time inside a DST gap resolves to the first instant after the gap.
    let utc = tz
        .from_local_datetime(naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(*naive + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(naive));
    utc.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Issues sequence numbers for fetches so stale responses can be dropped.
#[derive(Debug, Default)]
pub struct FetchTracker {
    last_query: Option<PerformanceQuery>,
    latest_seq: u64,
}

impl FetchTracker {
    /// Start a fetch if `query` differs from the last one issued.
    ///
    /// Returns the new sequence number, or `None` when nothing changed.
    pub fn begin(&mut self, query: &PerformanceQuery) -> Option<u64> {
        if self.last_query.as_ref() == Some(query) {
            return None;
        }
        Some(self.force(query))
    }

    /// Start a fetch regardless of whether the query changed.
    pub fn force(&mut self, query: &PerformanceQuery) -> u64 {
        self.last_query = Some(query.clone());
        self.latest_seq += 1;
        self.latest_seq
    }

    /// True if `seq` belongs to the most recently issued fetch.
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    /// Forget the last query so the next `begin` always fetches.
    pub fn invalidate(&mut self) {
        self.last_query = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::{FixedOffset, LocalResult, NaiveDate};

    /// Zone that jumps from +02:00 to +03:00 at local midnight on 2024-03-01,
    /// so 00:00 to 01:00 that night does not exist.
    #[derive(Debug, Clone, Copy)]
    struct MidnightSpringForward;

    impl MidnightSpringForward {
        fn before() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::east_opt(3 * 3600).unwrap()
        }

        fn gap_start() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        }
    }

    impl TimeZone for MidnightSpringForward {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            MidnightSpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::gap_start();
            if *local < gap_start {
                LocalResult::Single(Self::before())
            } else if *local < gap_start + TimeDelta::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::after())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::gap_start() - TimeDelta::hours(2) {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: "u-42".to_string(),
            name: "Dana".to_string(),
            role,
        }
    }

    fn march() -> ReportWindow {
        ReportWindow::CurrentMonth {
            anchor: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    #[test]
    fn test_params_with_bounds() {
        let query = PerformanceQuery::new(&user(UserRole::Admin), &march());
        let params = query.to_params_in(&Utc);

        assert_eq!(
            params,
            vec![
                ("userId", "u-42".to_string()),
                ("isAdmin", "true".to_string()),
                ("startDate", "2024-03-01T00:00:00.000Z".to_string()),
                ("endDate", "2024-03-31T23:59:59.999Z".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_time_omits_dates() {
        let query = PerformanceQuery::new(&user(UserRole::Member), &ReportWindow::AllTime);
        let params = query.to_params_in(&Utc);

        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|(k, _)| *k != "startDate" && *k != "endDate"));
        assert_eq!(params[1], ("isAdmin", "false".to_string()));
    }

    #[test]
    fn test_params_shift_to_utc() {
        let query = PerformanceQuery::new(&user(UserRole::Member), &march());
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let params = query.to_params_in(&plus_two);

        assert_eq!(params[2].1, "2024-02-29T22:00:00.000Z");
    }

    #[test]
    fn test_bound_inside_dst_gap_moves_past_gap() {
        let query = PerformanceQuery::new(&user(UserRole::Member), &march());
        let params = query.to_params_in(&MidnightSpringForward);

        // Local midnight does not exist; 01:00 at +03:00 is the first instant of the day
        assert_eq!(params[2].1, "2024-02-29T22:00:00.000Z");
        assert_eq!(params[3].1, "2024-03-31T20:59:59.999Z");
    }

    #[test]
    fn test_tracker_skips_unchanged_query() {
        let mut tracker = FetchTracker::default();
        let query = PerformanceQuery::new(&user(UserRole::Admin), &march());

        assert_eq!(tracker.begin(&query), Some(1));
        assert_eq!(tracker.begin(&query), None);

        let other = PerformanceQuery::new(&user(UserRole::Admin), &ReportWindow::AllTime);
        assert_eq!(tracker.begin(&other), Some(2));
    }

    #[test]
    fn test_stale_response_is_not_current() {
        let mut tracker = FetchTracker::default();
        let first = tracker.force(&PerformanceQuery::new(&user(UserRole::Admin), &march()));
        let second = tracker.force(&PerformanceQuery::new(&user(UserRole::Admin), &ReportWindow::AllTime));

        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }

    #[test]
    fn test_invalidate_forces_next_begin() {
        let mut tracker = FetchTracker::default();
        let query = PerformanceQuery::new(&user(UserRole::Admin), &march());

        tracker.begin(&query);
        tracker.invalidate();
        assert_eq!(tracker.begin(&query), Some(2));
    }
}
