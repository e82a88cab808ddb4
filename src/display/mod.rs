//! Terminal display surface.
//!
//! The terminal is acquired once at startup as an owned [`Screen`]. Dropping the
//! screen restores the terminal (raw mode off, main screen, cursor shown), so every
//! exit path, including errors, leaves the user's shell usable.

pub mod widget;

pub use widget::{EqualizerWidget, Palette};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::io::{self, Stdout};

use crate::render::DisplayGrid;

/// Sink for rendered frames.
pub trait DisplaySurface {
    /// Current size as (columns, rows).
    fn size(&self) -> anyhow::Result<(u16, u16)>;

    /// Draws a grid and flushes it to the screen.
    fn present(&mut self, grid: &DisplayGrid, overlay: Option<&str>) -> anyhow::Result<()>;
}

/// Owned terminal handle.
pub struct Screen<B: Backend> {
    terminal: Terminal<B>,
    palette: Palette,
    owns_tty: bool,
}

impl Screen<CrosstermBackend<Stdout>> {
    /// Takes over the terminal: raw mode, alternate screen, hidden cursor.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    /// - If the terminal cannot be initialized
    pub fn enter(palette: Palette) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        match Self::attach() {
            Ok(terminal) => Ok(Self {
                terminal,
                palette,
                owns_tty: true,
            }),
            Err(e) => {
                let _ = restore_terminal();
                Err(e)
            }
        }
    }

    fn attach() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(terminal)
    }
}

impl<B: Backend> Screen<B> {
    /// Wraps an arbitrary backend without touching the tty.
    #[cfg(test)]
    pub fn with_backend(backend: B, palette: Palette) -> anyhow::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            palette,
            owns_tty: false,
        })
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    /// Shows a message on a full red screen until a key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering fails
    /// - If event polling fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                let red = Style::default().bg(Color::Rgb(255, 0, 0));
                frame.buffer_mut().set_style(area, red);

                let padding_x = area.width / 10;
                let text = Line::from(Span::styled(
                    message,
                    Style::default().fg(Color::Rgb(255, 255, 255)).bg(Color::Rgb(255, 0, 0)),
                ));
                let paragraph = Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });

                let centered = Rect {
                    x: area.x + padding_x,
                    y: area.y + area.height / 2,
                    width: area.width * 8 / 10,
                    height: area.height / 2,
                };
                frame.render_widget(paragraph, centered);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    return Ok(());
                }
            }
        }
    }
}

impl<B: Backend> DisplaySurface for Screen<B> {
    fn size(&self) -> anyhow::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }

    fn present(&mut self, grid: &DisplayGrid, overlay: Option<&str>) -> anyhow::Result<()> {
        let palette = &self.palette;
        self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(EqualizerWidget::new(grid, palette).overlay(overlay), area);
        })?;
        Ok(())
    }
}

impl<B: Backend> Drop for Screen<B> {
    fn drop(&mut self) {
        if self.owns_tty {
            let _ = self.terminal.show_cursor();
            if let Err(e) = restore_terminal() {
                tracing::warn!("Failed to restore terminal: {e}");
            }
        }
    }
}

fn restore_terminal() -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
