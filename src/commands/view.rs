//! Live equalizer display.
//!
//! Reads comma-separated magnitudes from stdin and draws one bar-graph frame per
//! line until the input ends, a quit key is pressed, or the process is signalled.

use anyhow::anyhow;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::{EqviewConfig, HighlightStyle, NormalizationMode, RenderConfig};
use crate::display::{DisplaySurface, Palette, Screen};
use crate::render::FrameRenderer;
use crate::view::{spawn_control_watcher, LineFilter, Shutdown, ViewLoop};

/// Command-line overrides for the render configuration.
#[derive(Debug, Clone, Default)]
pub struct ViewOverrides {
    pub normalization: Option<NormalizationMode>,
    pub glyph: bool,
    pub no_status_filter: bool,
    pub stats: bool,
}

impl ViewOverrides {
    fn apply(&self, render: &mut RenderConfig) {
        if let Some(mode) = self.normalization {
            render.normalization = mode;
        }
        if self.glyph {
            render.highlight = HighlightStyle::Glyph;
        }
        if self.no_status_filter {
            render.status_filter = false;
        }
        if self.stats {
            render.show_stats = true;
        }
    }
}

/// Runs the visualizer against stdin.
///
/// # Errors
/// - If the configuration is invalid
/// - If the terminal cannot be acquired
/// - If input cannot be read or the display is lost mid-session
pub async fn handle_view(overrides: ViewOverrides) -> anyhow::Result<()> {
    tracing::info!("=== eqview started ===");

    let mut config = match EqviewConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err:#}");
            let message = format!(
                "Configuration Error:\n\n{err:#}\n\nPlease check your ~/.config/eqview/eqview.toml file and try again."
            );
            let mut screen = Screen::enter(Palette::default())?;
            screen.show_error(&message)?;
            return Err(anyhow!("Configuration error: {err:#}"));
        }
    };
    overrides.apply(&mut config.render);
    let render = config.render;

    let palette = Palette::from_config(&render)?;
    let shutdown = Shutdown::install()?;
    let mut screen = Screen::enter(palette)?;

    let (columns, rows) = screen.size()?;
    let renderer = FrameRenderer::new(render.normalization, columns as usize, rows as usize);
    tracing::info!(
        "Display {}x{}, normalization={}, highlight={}, status_filter={}",
        renderer.width(),
        renderer.height(),
        render.normalization,
        render.highlight,
        render.status_filter
    );

    let (tx, mut rx) = mpsc::channel(16);
    let watcher = spawn_control_watcher(shutdown.clone(), tx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut view = ViewLoop::new(
        &mut screen,
        renderer,
        LineFilter::from_config(&render),
        render.show_stats,
    );
    let outcome = view.run(&mut lines, &mut rx, &shutdown).await;
    let stats = view.stats();

    shutdown.trigger();
    drop(screen);
    if let Err(e) = watcher.await {
        tracing::warn!("Control watcher ended abnormally: {e}");
    }

    let reason = outcome?;
    tracing::info!(
        "Stopped ({:?}): {} frames rendered, {} skipped, {} status lines ignored",
        reason,
        stats.rendered,
        stats.skipped,
        stats.ignored
    );
    Ok(())
}
