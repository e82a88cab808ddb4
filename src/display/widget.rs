//! Ratatui widget that paints a [`DisplayGrid`].

use anyhow::{anyhow, bail};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::str::FromStr;

use crate::config::{HighlightStyle, RenderConfig};
use crate::render::{Cell, DisplayGrid};

/// Symbols and styles used for filled and empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    highlight: HighlightStyle,
    filled_glyph: String,
    empty_pair: Style,
}

impl Palette {
    /// Builds the palette from the render configuration.
    ///
    /// # Errors
    /// - If a configured color cannot be parsed
    /// - If `filled_glyph` is longer than one character
    pub fn from_config(config: &RenderConfig) -> anyhow::Result<Self> {
        let fg = parse_color(&config.empty_fg)?;
        let bg = parse_color(&config.empty_bg)?;
        let filled_glyph = match config.filled_glyph.chars().count() {
            0 => "|".to_string(),
            1 => config.filled_glyph.clone(),
            _ => bail!(
                "filled_glyph must be a single character, got '{}'",
                config.filled_glyph
            ),
        };

        Ok(Self {
            highlight: config.highlight,
            filled_glyph,
            empty_pair: Style::default().fg(fg).bg(bg),
        })
    }

    /// Symbol and style for one cell.
    pub fn cell(&self, cell: Cell) -> (&str, Style) {
        match (self.highlight, cell) {
            (HighlightStyle::ColorPair, Cell::Filled) => {
                (" ", Style::default().add_modifier(Modifier::REVERSED))
            }
            (HighlightStyle::ColorPair, Cell::Empty) => (" ", self.empty_pair),
            (HighlightStyle::Glyph, Cell::Filled) => (self.filled_glyph.as_str(), Style::default()),
            (HighlightStyle::Glyph, Cell::Empty) => (" ", Style::default()),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            highlight: HighlightStyle::ColorPair,
            filled_glyph: "|".to_string(),
            empty_pair: Style::default().fg(Color::Black).bg(Color::Blue),
        }
    }
}

fn parse_color(name: &str) -> anyhow::Result<Color> {
    Color::from_str(name).map_err(|_| anyhow!("Unknown color '{name}'"))
}

/// Paints a grid cell by cell, with an optional one-line overlay in the top-right corner.
pub struct EqualizerWidget<'a> {
    grid: &'a DisplayGrid,
    palette: &'a Palette,
    overlay: Option<&'a str>,
}

impl<'a> EqualizerWidget<'a> {
    pub fn new(grid: &'a DisplayGrid, palette: &'a Palette) -> Self {
        Self {
            grid,
            palette,
            overlay: None,
        }
    }

    pub fn overlay(mut self, text: Option<&'a str>) -> Self {
        self.overlay = text;
        self
    }
}

impl Widget for EqualizerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.grid.height().min(area.height as usize);
        let columns = self.grid.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..columns {
                let Some(cell) = self.grid.get(row, col) else {
                    continue;
                };
                let (symbol, style) = self.palette.cell(cell);
                let position = (area.x + col as u16, area.y + row as u16);
                if let Some(target) = buf.cell_mut(position) {
                    target.set_symbol(symbol).set_style(style);
                }
            }
        }

        if let Some(text) = self.overlay {
            let len = text.chars().count() as u16;
            if len < area.width && area.height > 0 {
                let x = area.x + area.width - len - 1;
                buf.set_string(x, area.y, text, Style::default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::rasterize;

    fn symbol_at(buf: &Buffer, x: u16, y: u16) -> String {
        buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default()
    }

    #[test]
    fn test_glyph_mode_draws_bars() {
        let config = RenderConfig {
            highlight: HighlightStyle::Glyph,
            filled_glyph: "#".to_string(),
            ..RenderConfig::default()
        };
        let palette = Palette::from_config(&config).unwrap();
        let grid = rasterize(&[1, 3], 3, 2);

        let area = Rect::new(0, 0, 2, 3);
        let mut buf = Buffer::empty(area);
        EqualizerWidget::new(&grid, &palette).render(area, &mut buf);

        assert_eq!(symbol_at(&buf, 0, 0), " ");
        assert_eq!(symbol_at(&buf, 0, 2), "#");
        assert_eq!(symbol_at(&buf, 1, 0), "#");
        assert_eq!(symbol_at(&buf, 1, 2), "#");
    }

    #[test]
    fn test_color_pair_mode_uses_standout_and_pair() {
        let palette = Palette::from_config(&RenderConfig::default()).unwrap();
        let grid = rasterize(&[1], 2, 1);

        let area = Rect::new(0, 0, 1, 2);
        let mut buf = Buffer::empty(area);
        EqualizerWidget::new(&grid, &palette).render(area, &mut buf);

        let filled = buf.cell((0, 1)).unwrap();
        assert!(filled.modifier.contains(Modifier::REVERSED));

        let empty = buf.cell((0, 0)).unwrap();
        assert_eq!(empty.fg, Color::Black);
        assert_eq!(empty.bg, Color::Blue);
    }

    #[test]
    fn test_grid_larger_than_area_is_clipped() {
        let palette = Palette::default();
        let grid = rasterize(&[5, 5, 5, 5, 5], 5, 5);

        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        EqualizerWidget::new(&grid, &palette).render(area, &mut buf);

        assert_eq!(buf.area, area);
    }

    #[test]
    fn test_overlay_is_right_aligned() {
        let palette = Palette::default();
        let grid = DisplayGrid::new(10, 2);

        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        EqualizerWidget::new(&grid, &palette)
            .overlay(Some("abc"))
            .render(area, &mut buf);

        assert_eq!(symbol_at(&buf, 6, 0), "a");
        assert_eq!(symbol_at(&buf, 8, 0), "c");
        assert_eq!(symbol_at(&buf, 9, 0), " ");
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let config = RenderConfig {
            empty_bg: "not-a-color".to_string(),
            ..RenderConfig::default()
        };
        assert!(Palette::from_config(&config).is_err());
    }

    #[test]
    fn test_multi_character_glyph_is_rejected() {
        let config = RenderConfig {
            highlight: HighlightStyle::Glyph,
            filled_glyph: "##".to_string(),
            ..RenderConfig::default()
        };
        assert!(Palette::from_config(&config).is_err());

        let config = RenderConfig {
            filled_glyph: "█".to_string(),
            ..config
        };
        assert!(Palette::from_config(&config).is_ok());
    }
}
