//! Application command handlers for eqview.
//!
//! # Commands
//! - `view`: live equalizer display fed from stdin (default)
//! - `analyze`: PCM to band-magnitude lines, the producer stage for `view`
//! - `config`: open the configuration file in the user's preferred editor
//! - `logs`: display recent log entries

pub mod analyze;
pub mod config;
pub mod logs;
pub mod view;

pub use analyze::{handle_analyze, AnalyzeOverrides};
pub use config::handle_config;
pub use logs::handle_logs;
pub use view::{handle_view, ViewOverrides};
