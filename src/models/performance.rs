//! Performance DTOs returned by the analytics endpoint.

use serde::{Deserialize, Serialize};

/// Task buckets tracked by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCategory {
    OneTime,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Recurring,
}

impl TaskCategory {
    /// Categories shown in the card breakdown, in display order.
    pub const DISPLAYED: [TaskCategory; 6] = [
        TaskCategory::OneTime,
        TaskCategory::Daily,
        TaskCategory::Weekly,
        TaskCategory::Monthly,
        TaskCategory::Quarterly,
        TaskCategory::Yearly,
    ];

    /// Get the display label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::OneTime => "One-time",
            TaskCategory::Daily => "Daily",
            TaskCategory::Weekly => "Weekly",
            TaskCategory::Monthly => "Monthly",
            TaskCategory::Quarterly => "Quarterly",
            TaskCategory::Yearly => "Yearly",
            TaskCategory::Recurring => "Recurring",
        }
    }
}

/// Total/pending/completed counts for one task category.
///
/// `revised` and `rejected` are only reported for one-time tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryStats {
    pub total: u32,
    pub pending: u32,
    pub completed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<u32>,
}

/// Aggregated task statistics for a single user over a report window.
///
/// Rates are computed by the backend and trusted as-is (0-100).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceRecord {
    pub user_name: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub pending_tasks: u32,
    pub one_time: CategoryStats,
    pub daily: CategoryStats,
    pub weekly: CategoryStats,
    pub monthly: CategoryStats,
    pub quarterly: CategoryStats,
    pub yearly: CategoryStats,
    pub recurring: CategoryStats,
    pub completion_rate: f64,
    pub on_time_rate: f64,
    pub on_time_completed: u32,
    pub recurring_on_time_completed: u32,
}

impl PerformanceRecord {
    /// Get the stats for one category.
    pub fn category(&self, category: TaskCategory) -> &CategoryStats {
        match category {
            TaskCategory::OneTime => &self.one_time,
            TaskCategory::Daily => &self.daily,
            TaskCategory::Weekly => &self.weekly,
            TaskCategory::Monthly => &self.monthly,
            TaskCategory::Quarterly => &self.quarterly,
            TaskCategory::Yearly => &self.yearly,
            TaskCategory::Recurring => &self.recurring,
        }
    }

    /// Completed count summed over the displayed categories.
    ///
    /// Recurring tasks are not part of this sum.
    pub fn completed_across_categories(&self) -> u32 {
        TaskCategory::DISPLAYED
            .iter()
            .map(|c| self.category(*c).completed)
            .sum()
    }

    /// Breakdown rows for the card, in display order.
    pub fn breakdown(&self) -> impl Iterator<Item = (TaskCategory, &CategoryStats)> {
        TaskCategory::DISPLAYED.into_iter().map(|c| (c, self.category(c)))
    }
}

/// Response of the performance endpoint.
///
/// Privileged callers get `team_performance`, everyone may get
/// `self_performance`. Either can be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceData {
    pub team_performance: Option<Vec<PerformanceRecord>>,
    pub self_performance: Option<PerformanceRecord>,
}

impl PerformanceData {
    /// True when neither a team list nor a self record is present.
    pub fn is_empty(&self) -> bool {
        self.team_records().is_empty() && self.self_performance.is_none()
    }

    /// Team records, or an empty slice when the team list is absent.
    pub fn team_records(&self) -> &[PerformanceRecord] {
        self.team_performance.as_deref().unwrap_or(&[])
    }
}
