//! TUI module: Terminal User Interface using Ratatui.
//!
//! One screen holding:
//! - The gender selector and a slider/text pair per clinical feature
//! - The last prediction, colored by severity
//! - A blocking notification when a prediction fails

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::ClinicTheme;
