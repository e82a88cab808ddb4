//! Configuration file editor command.
//!
//! Opens the eqview configuration file in the user's preferred editor, writing
//! a file with the default settings first if none exists yet.

use std::process::Command;

use crate::config::{config_path, EqviewConfig};

/// Opens the eqview configuration file in the user's preferred editor.
///
/// Tries editors in this order:
/// 1. $EDITOR environment variable
/// 2. nano
/// 3. vi
///
/// # Errors
/// - If the default config cannot be written
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config_path()?;
    if !config_path.exists() {
        tracing::info!("Writing default config to {}", config_path.display());
        EqviewConfig::default().save()?;
    }

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor(std::env::var("EDITOR").ok(), is_editor_available)?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    // Catch mistakes now rather than on the next run
    EqviewConfig::load()?;
    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Picks `$EDITOR` if set, otherwise the first available fallback.
fn find_editor(
    env_editor: Option<String>,
    available: impl Fn(&str) -> bool,
) -> anyhow::Result<String> {
    if let Some(editor) = env_editor.filter(|e| !e.is_empty()) {
        return Ok(editor);
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| available(editor))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

/// Checks if an editor is available in the system PATH.
fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_editor_wins() {
        let editor = find_editor(Some("hx".to_string()), |_| true).unwrap();
        assert_eq!(editor, "hx");
    }

    #[test]
    fn test_falls_back_in_order() {
        assert_eq!(find_editor(None, |_| true).unwrap(), "nano");
        assert_eq!(find_editor(Some(String::new()), |e| e == "vi").unwrap(), "vi");
        assert!(find_editor(None, |_| false).is_err());
    }
}
