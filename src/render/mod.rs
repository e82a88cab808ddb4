//! Frame rendering: one input line in, one bar-graph grid out.
//!
//! The pipeline is parse → bin to the display width → normalize to the display
//! height → rasterize. Every stage is pure, so the same line rendered twice at the
//! same dimensions produces the same grid.

pub mod binning;
pub mod error;
pub mod grid;
pub mod normalize;
pub mod parse;

pub use binning::bin_to_width;
pub use error::FrameError;
pub use grid::{rasterize, Cell, DisplayGrid};
pub use normalize::normalize;
pub use parse::parse_line;

use crate::config::NormalizationMode;

/// A rendered frame and the number of bars that carried data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub grid: DisplayGrid,
    pub bars: usize,
}

/// Turns raw input lines into grids sized to the captured terminal dimensions.
pub struct FrameRenderer {
    mode: NormalizationMode,
    width: usize,
    height: usize,
}

impl FrameRenderer {
    pub fn new(mode: NormalizationMode, width: usize, height: usize) -> Self {
        Self {
            mode,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Updates the dimensions used for subsequent frames.
    pub fn resize(&mut self, width: usize, height: usize) {
        tracing::debug!(
            "Display resized from {}x{} to {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
    }

    /// Renders one line of comma-separated magnitudes.
    ///
    /// # Errors
    /// - `EndOfStream` for a blank line
    /// - `Parse` if any token is not a number
    /// - `BinningInvariant` if the frame cannot be fitted to the width
    pub fn render_line(&self, line: &str) -> Result<RenderedFrame, FrameError> {
        let samples = parse_line(line)?;
        self.render_samples(&samples)
    }

    /// Renders an already-parsed sample frame.
    pub fn render_samples(&self, samples: &[f64]) -> Result<RenderedFrame, FrameError> {
        let binned = bin_to_width(samples, self.width)?;
        let heights = normalize(&binned, self.mode, self.height);
        Ok(RenderedFrame {
            grid: rasterize(&heights, self.height, self.width),
            bars: heights.len(),
        })
    }

    /// Text for the stats overlay.
    pub fn stats_line(&self, bars: usize) -> String {
        format!(
            "width: {}, height: {}, bars: {}",
            self.width, self.height, bars
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_example_frame() {
        let renderer = FrameRenderer::new(NormalizationMode::Peak, 4, 4);
        let frame = renderer.render_line("1,2,3,4").unwrap();

        assert_eq!(frame.bars, 4);
        assert_eq!(frame.grid.filled_in_column(0), 1);
        assert_eq!(frame.grid.get(3, 0), Some(Cell::Filled));
        assert_eq!(frame.grid.filled_in_column(3), 4);
    }

    #[test]
    fn test_all_zero_frame_is_empty() {
        let renderer = FrameRenderer::new(NormalizationMode::Peak, 4, 4);
        let frame = renderer.render_line("0,0,0,0").unwrap();
        assert!(frame
            .grid
            .rows()
            .all(|row| row.iter().all(|&c| c == Cell::Empty)));
    }

    #[test]
    fn test_wide_line_is_binned() {
        let renderer = FrameRenderer::new(NormalizationMode::MinMax, 4, 6);
        let line = (0..10).map(|v| v.to_string()).collect::<Vec<_>>().join(",");
        let frame = renderer.render_line(&line).unwrap();

        assert_eq!(frame.bars, 3);
        // bins average to 1, 4, 7 -> heights 0, 3, 6
        assert_eq!(frame.grid.filled_in_column(0), 0);
        assert_eq!(frame.grid.filled_in_column(1), 3);
        assert_eq!(frame.grid.filled_in_column(2), 6);
        assert_eq!(frame.grid.filled_in_column(3), 0);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let renderer = FrameRenderer::new(NormalizationMode::MinMax, 8, 5);
        let line = "0.3, 9.1, 4.4, 2.0, 7.7, 1.1";
        assert_eq!(
            renderer.render_line(line).unwrap(),
            renderer.render_line(line).unwrap()
        );
    }

    #[test]
    fn test_errors_pass_through() {
        let renderer = FrameRenderer::new(NormalizationMode::MinMax, 8, 5);
        assert_eq!(renderer.render_line(""), Err(FrameError::EndOfStream));
        assert!(matches!(
            renderer.render_line("1,x,3"),
            Err(FrameError::Parse { .. })
        ));
    }

    #[test]
    fn test_resize_changes_grid_shape() {
        let mut renderer = FrameRenderer::new(NormalizationMode::Peak, 4, 4);
        renderer.resize(2, 3);
        let frame = renderer.render_line("1,2,3,4,5,6").unwrap();
        assert_eq!(frame.grid.width(), 2);
        assert_eq!(frame.grid.height(), 3);
        assert_eq!(frame.bars, 1);
        assert_eq!(renderer.stats_line(frame.bars), "width: 2, height: 3, bars: 1");
    }
}
