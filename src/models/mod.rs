//! Data models for performance records and the signed-in user.

pub mod performance;
pub mod user;

pub use performance::{CategoryStats, PerformanceData, PerformanceRecord, TaskCategory};
pub use user::{CurrentUser, UserRole};
