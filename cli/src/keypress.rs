use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often the reader thread checks whether the session ended on its own
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Cancels a token on any keypress (or Ctrl+C)
///
/// The terminal is held in raw mode until the listener is dropped.
pub(crate) struct Keypress {
    token: CancellationToken,
    raw_mode: bool,
}

impl Keypress {
    /// Start listening, must be called within a tokio runtime
    pub(crate) fn listen() -> Self {
        let token = CancellationToken::new();

        let raw_mode = match enable_raw_mode() {
            Ok(()) => true,
            Err(error) => {
                log::warn!("Terminal does not support raw mode, only Ctrl+C stops: {error:?}");
                false
            }
        };

        if raw_mode {
            let token = token.clone();
            // A plain thread, so a pending read never holds up the runtime shutdown
            std::thread::spawn(move || wait_for_key(&token));
        }

        let ctrl_c = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = ctrl_c.cancelled() => {}
                result = tokio::signal::ctrl_c() => {
                    if let Err(error) = result {
                        log::warn!("Failed to listen for Ctrl+C: {error:?}");
                    } else {
                        ctrl_c.cancel();
                    }
                }
            }
        });

        Keypress { token, raw_mode }
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for Keypress {
    fn drop(&mut self) {
        self.token.cancel();

        if self.raw_mode {
            if let Err(error) = disable_raw_mode() {
                log::warn!("Failed to restore the terminal: {error:?}");
            }
        }
    }
}

fn wait_for_key(token: &CancellationToken) {
    while !token.is_cancelled() {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(error) => {
                log::warn!("Failed to poll terminal events: {error:?}");
                return;
            }
        }

        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                log::debug!("Key {:?} pressed", key.code);
                token.cancel();
            }
            Ok(_) => {}
            Err(error) => {
                log::warn!("Failed to read terminal events: {error:?}");
                return;
            }
        }
    }
}
