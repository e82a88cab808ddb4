//! Configuration management for eqview.
//!
//! Loads and saves the TOML configuration that selects the normalization formula,
//! the cell highlight style, the status-line filter and the analyzer parameters.

pub mod file;

pub use file::{
    config_path, AnalyzeConfig, EqviewConfig, HighlightStyle, NormalizationMode, RenderConfig,
};
