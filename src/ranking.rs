//! Leaderboard ranking over performance records.

use std::cmp::Ordering;

use crate::models::PerformanceRecord;

/// Maximum number of entries on the leaderboard.
pub const TOP_N: usize = 10;

/// A record with its leaderboard position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedEntry<'a> {
    /// 1-based position.
    pub rank: usize,
    pub score: f64,
    pub record: &'a PerformanceRecord,
}

/// Badge shown on a performance card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Standard,
}

impl RankBadge {
    /// Badge for a leaderboard position. Unranked cards get the standard badge.
    pub fn for_rank(rank: Option<usize>) -> Self {
        match rank {
            Some(1) => RankBadge::Gold,
            Some(2) => RankBadge::Silver,
            Some(3) => RankBadge::Bronze,
            _ => RankBadge::Standard,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankBadge::Gold => "1st",
            RankBadge::Silver => "2nd",
            RankBadge::Bronze => "3rd",
            RankBadge::Standard => "",
        }
    }
}

/// Equal-weighted average of completion rate and on-time rate.
pub fn composite_score(record: &PerformanceRecord) -> f64 {
    record.completion_rate * 0.5 + record.on_time_rate * 0.5
}

/// Leaderboard order between two records.
///
/// Scored records are ordered by score, unscored ones by activity, and any
/// scored record sorts ahead of an unscored one.
pub fn compare(a: &PerformanceRecord, b: &PerformanceRecord) -> Ordering {
    let score_a = composite_score(a);
    let score_b = composite_score(b);

    if score_a == 0.0 && score_b == 0.0 {
        b.total_tasks.cmp(&a.total_tasks)
    } else {
        score_b.total_cmp(&score_a)
    }
}

/// Rank the records with activity and keep the top [`TOP_N`].
///
/// The sort is stable: records tied on both score and total tasks keep their
/// input order.
pub fn rank(records: &[PerformanceRecord]) -> Vec<RankedEntry<'_>> {
    let mut active: Vec<&PerformanceRecord> = records.iter().filter(|r| r.total_tasks > 0).collect();
    active.sort_by(|a, b| compare(a, b));

    active
        .into_iter()
        .take(TOP_N)
        .enumerate()
        .map(|(idx, record)| RankedEntry {
            rank: idx + 1,
            score: composite_score(record),
            record,
        })
        .collect()
}
