//! GUI panels and application state.

pub mod app;
pub mod card;
pub mod components;
pub mod scorecard_panel;
pub mod setup_wizard;

pub use app::App;
pub use setup_wizard::{SetupApp, SetupWizard};
