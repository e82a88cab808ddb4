//! Shutdown signalling and keyboard/resize control events.
//!
//! Process signals and key presses both end the view loop. Signals set a shared
//! flag through `signal_hook`; key presses and terminal resizes are read by a
//! blocking watcher and forwarded over a channel.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Out-of-band requests to the view loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Stop rendering and exit (q, Escape, Ctrl+C)
    Quit,
    /// Terminal changed size to (columns, rows)
    Resize(u16, u16),
}

/// Cloneable shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a flag that SIGINT, SIGTERM and SIGHUP will set.
    ///
    /// # Errors
    /// - If a signal handler cannot be registered
    pub fn install() -> anyhow::Result<Self> {
        let shutdown = Self::new();
        for signal in [SIGINT, SIGTERM, SIGHUP] {
            signal_hook::flag::register(signal, Arc::clone(&shutdown.flag))
                .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;
        }
        Ok(shutdown)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Maps a terminal event to a control event, if it is one.
pub fn classify(event: &Event) -> Option<ControlEvent> {
    match event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(ControlEvent::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(ControlEvent::Quit)
            }
            _ => None,
        },
        Event::Resize(columns, rows) => Some(ControlEvent::Resize(*columns, *rows)),
        _ => None,
    }
}

/// Polls terminal events on a blocking thread until shutdown or the receiver goes away.
pub fn spawn_control_watcher(
    shutdown: Shutdown,
    tx: mpsc::Sender<ControlEvent>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !shutdown.is_triggered() {
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!("Event polling failed: {e}");
                    return;
                }
            }

            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Event read failed: {e}");
                    return;
                }
            };

            if let Some(control) = classify(&event) {
                tracing::debug!("Control event: {:?}", control);
                if tx.blocking_send(control).is_err() {
                    return;
                }
            }
        }
    })
}
