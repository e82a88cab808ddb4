//! The render loop: read a line, render it, present it, repeat.
//!
//! One line is fully processed and drawn before the next is read. The pending read
//! is raced against control events and the shutdown flag so the loop can stop
//! without waiting for more input.

pub mod control;

pub use control::{spawn_control_watcher, ControlEvent, Shutdown};

use anyhow::Context;
use std::time::Duration;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::mpsc;

use crate::config::RenderConfig;
use crate::display::DisplaySurface;
use crate::render::{FrameError, FrameRenderer};

const SHUTDOWN_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Drops producer status lines before they reach the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFilter {
    marker: Option<String>,
}

impl LineFilter {
    pub fn from_config(config: &RenderConfig) -> Self {
        let marker = (config.status_filter && !config.status_marker.is_empty())
            .then(|| config.status_marker.clone());
        Self { marker }
    }

    /// Whether the line should be rendered.
    pub fn accepts(&self, line: &str) -> bool {
        match &self.marker {
            Some(marker) => !line.contains(marker.as_str()),
            None => true,
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    Quit,
    Signal,
}

/// Per-session frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewStats {
    pub rendered: u64,
    pub skipped: u64,
    pub ignored: u64,
}

/// Drives a [`FrameRenderer`] against a [`DisplaySurface`].
pub struct ViewLoop<'a, S: DisplaySurface> {
    surface: &'a mut S,
    renderer: FrameRenderer,
    filter: LineFilter,
    show_stats: bool,
    stats: ViewStats,
}

impl<'a, S: DisplaySurface> ViewLoop<'a, S> {
    pub fn new(
        surface: &'a mut S,
        renderer: FrameRenderer,
        filter: LineFilter,
        show_stats: bool,
    ) -> Self {
        Self {
            surface,
            renderer,
            filter,
            show_stats,
            stats: ViewStats::default(),
        }
    }

    /// Runs until end of input, a quit key, or a shutdown signal.
    ///
    /// # Errors
    /// - If reading input fails
    /// - If the display surface can no longer be drawn to
    pub async fn run<R>(
        &mut self,
        lines: &mut Lines<R>,
        control: &mut mpsc::Receiver<ControlEvent>,
        shutdown: &Shutdown,
    ) -> anyhow::Result<StopReason>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut tick = tokio::time::interval(SHUTDOWN_CHECK_INTERVAL);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        return Ok(StopReason::EndOfStream);
                    };
                    if self.handle_line(&line)? {
                        return Ok(StopReason::EndOfStream);
                    }
                }
                Some(event) = control.recv() => match event {
                    ControlEvent::Quit => return Ok(StopReason::Quit),
                    ControlEvent::Resize(columns, rows) => {
                        self.renderer.resize(columns as usize, rows as usize);
                    }
                },
                _ = tick.tick() => {
                    if shutdown.is_triggered() {
                        return Ok(StopReason::Signal);
                    }
                }
            }
        }
    }

    /// Renders and presents one line. Returns `true` at end of stream.
    fn handle_line(&mut self, line: &str) -> anyhow::Result<bool> {
        if !self.filter.accepts(line) {
            tracing::trace!("Ignoring status line: {}", line.trim());
            self.stats.ignored += 1;
            return Ok(false);
        }

        match self.renderer.render_line(line) {
            Ok(frame) => {
                let overlay = self
                    .show_stats
                    .then(|| self.renderer.stats_line(frame.bars));
                self.surface
                    .present(&frame.grid, overlay.as_deref())
                    .context("Lost the display surface")?;
                self.stats.rendered += 1;
                Ok(false)
            }
            Err(FrameError::EndOfStream) => Ok(true),
            Err(e) => {
                tracing::warn!("Skipping frame: {e}");
                self.stats.skipped += 1;
                Ok(false)
            }
        }
    }

    pub fn stats(&self) -> ViewStats {
        self.stats
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizationMode;
    use crate::render::{Cell, DisplayGrid};
    use tokio::io::{AsyncBufReadExt, BufReader};

    #[derive(Default)]
    struct RecordingSurface {
        frames: Vec<DisplayGrid>,
        overlays: Vec<Option<String>>,
    }

    impl DisplaySurface for RecordingSurface {
        fn size(&self) -> anyhow::Result<(u16, u16)> {
            Ok((4, 4))
        }

        fn present(&mut self, grid: &DisplayGrid, overlay: Option<&str>) -> anyhow::Result<()> {
            self.frames.push(grid.clone());
            self.overlays.push(overlay.map(str::to_string));
            Ok(())
        }
    }

    async fn run_input(
        input: &'static str,
        config: &RenderConfig,
    ) -> (StopReason, ViewStats, RecordingSurface) {
        let mut surface = RecordingSurface::default();
        let renderer = FrameRenderer::new(config.normalization, 4, 4);
        let mut view = ViewLoop::new(
            &mut surface,
            renderer,
            LineFilter::from_config(config),
            config.show_stats,
        );

        let (_tx, mut rx) = mpsc::channel(4);
        let mut lines = BufReader::new(input.as_bytes()).lines();
        let reason = view.run(&mut lines, &mut rx, &Shutdown::new()).await.unwrap();
        let stats = view.stats();
        (reason, stats, surface)
    }

    fn peak_config() -> RenderConfig {
        RenderConfig {
            normalization: NormalizationMode::Peak,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_filter_matches_substring() {
        let filter = LineFilter::from_config(&RenderConfig::default());
        assert!(!filter.accepts("Running"));
        assert!(!filter.accepts("Stream Running at 44100Hz"));
        assert!(filter.accepts("1,2,3"));
    }

    #[test]
    fn test_filter_can_be_disabled() {
        let config = RenderConfig {
            status_filter: false,
            ..RenderConfig::default()
        };
        assert!(LineFilter::from_config(&config).accepts("Running"));

        let config = RenderConfig {
            status_marker: String::new(),
            ..RenderConfig::default()
        };
        assert!(LineFilter::from_config(&config).accepts("Running"));
    }

    #[tokio::test]
    async fn test_blank_line_ends_session() {
        let (reason, stats, surface) = run_input("1,2,3,4\n\n5,6,7,8\n", &peak_config()).await;
        assert_eq!(reason, StopReason::EndOfStream);
        assert_eq!(stats.rendered, 1);
        assert_eq!(surface.frames.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_input_ends_session() {
        let (reason, stats, _) = run_input("1,2,3,4\n4,3,2,1", &peak_config()).await;
        assert_eq!(reason, StopReason::EndOfStream);
        assert_eq!(stats.rendered, 2);
    }

    #[tokio::test]
    async fn test_bad_line_is_skipped_and_loop_continues() {
        let (reason, stats, surface) =
            run_input("1,2,3,4\n1,x,3\n4,3,2,1\n", &peak_config()).await;
        assert_eq!(reason, StopReason::EndOfStream);
        assert_eq!(stats.rendered, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(surface.frames[1].filled_in_column(0), 4);
    }

    #[tokio::test]
    async fn test_status_lines_are_ignored() {
        let (_, stats, surface) = run_input("Running\n1,2,3,4\n", &peak_config()).await;
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.rendered, 1);
        assert_eq!(surface.frames[0].get(3, 0), Some(Cell::Filled));
    }

    #[tokio::test]
    async fn test_stats_overlay() {
        let config = RenderConfig {
            show_stats: true,
            ..peak_config()
        };
        let (_, _, surface) = run_input("1,2\n", &config).await;
        assert_eq!(
            surface.overlays[0].as_deref(),
            Some("width: 4, height: 4, bars: 2")
        );
    }

    #[tokio::test]
    async fn test_quit_event_stops_loop() {
        let mut surface = RecordingSurface::default();
        let renderer = FrameRenderer::new(NormalizationMode::MinMax, 4, 4);
        let mut view = ViewLoop::new(&mut surface, renderer, LineFilter { marker: None }, false);

        let (tx, mut rx) = mpsc::channel(4);
        tx.send(ControlEvent::Resize(8, 2)).await.unwrap();
        tx.send(ControlEvent::Quit).await.unwrap();

        // stdin-like source that never yields a line
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();

        let reason = view.run(&mut lines, &mut rx, &Shutdown::new()).await.unwrap();
        assert_eq!(reason, StopReason::Quit);
        assert_eq!(view.renderer().width(), 8);
        assert_eq!(view.renderer().height(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_flag_stops_loop() {
        let mut surface = RecordingSurface::default();
        let renderer = FrameRenderer::new(NormalizationMode::MinMax, 4, 4);
        let mut view = ViewLoop::new(&mut surface, renderer, LineFilter { marker: None }, false);

        let (_tx, mut rx) = mpsc::channel(4);
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();

        let shutdown = Shutdown::new();
        shutdown.trigger();
        let reason = view.run(&mut lines, &mut rx, &shutdown).await.unwrap();
        assert_eq!(reason, StopReason::Signal);
        assert_eq!(view.stats(), ViewStats::default());
    }
}
