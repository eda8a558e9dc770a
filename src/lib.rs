pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod query;
pub mod ranking;
pub mod report_window;
pub mod ui;

pub use error::{AppError, Result};
