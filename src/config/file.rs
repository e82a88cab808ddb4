//! Configuration file management for eqview.
//!
//! This module handles loading and saving application configuration from TOML files.
//! The file is optional: every field carries a default, and a missing file means
//! the defaults apply.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Formula used to map raw magnitudes to column heights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Scale the span between the lowest and highest value onto the full height
    #[default]
    MinMax,
    /// Scale relative to the highest value only
    Peak,
}

impl std::fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinMax => write!(f, "minmax"),
            Self::Peak => write!(f, "peak"),
        }
    }
}

/// How filled cells are distinguished from empty ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStyle {
    /// Filled cells use the standout attribute, empty cells the configured color pair
    #[default]
    ColorPair,
    /// Filled cells draw a glyph, empty cells stay blank
    Glyph,
}

impl std::fmt::Display for HighlightStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColorPair => write!(f, "colorpair"),
            Self::Glyph => write!(f, "glyph"),
        }
    }
}

/// Frame rendering and display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Normalization formula: "minmax" or "peak"
    pub normalization: NormalizationMode,
    /// Cell style: "colorpair" (highlighted blocks) or "glyph" (drawn characters)
    pub highlight: HighlightStyle,
    /// Skip input lines containing `status_marker` instead of parsing them
    pub status_filter: bool,
    /// Substring identifying producer status lines
    pub status_marker: String,
    /// Glyph drawn for filled cells in glyph mode
    pub filled_glyph: String,
    /// Draw a "width/height/bars" overlay in the top-right corner
    pub show_stats: bool,
    /// Foreground of empty cells in color-pair mode (name, index or #rrggbb)
    pub empty_fg: String,
    /// Background of empty cells in color-pair mode (name, index or #rrggbb)
    pub empty_bg: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationMode::default(),
            highlight: HighlightStyle::default(),
            status_filter: true,
            status_marker: "Running".to_string(),
            filled_glyph: "|".to_string(),
            show_stats: false,
            empty_fg: "black".to_string(),
            empty_bg: "blue".to_string(),
        }
    }
}

/// PCM analysis configuration for the `analyze` stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Samples per channel fed to each FFT
    pub fft_size: usize,
    /// Interleaved channels in the input stream
    pub channels: usize,
    /// Input sample rate in Hz, used to report the frequency span of each band
    pub sample_rate: u32,
    /// Number of output bands per line
    pub bands: usize,
    /// Which channel to analyze (0-based)
    pub channel: usize,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            channels: 2,
            sample_rate: 44100,
            bands: 32,
            channel: 0,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EqviewConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub analyze: AnalyzeConfig,
}

impl EqviewConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// Returns defaults when no config file exists.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_toml(&config_content)
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

/// Retrieves the path to the config file (`~/.config/eqview/eqview.toml`).
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("eqview").join("eqview.toml"))
}
