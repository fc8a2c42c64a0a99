use crate::error::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::{Stdout, Write};

/// Write all tailing output in the app
///
/// While a keypress listener holds the terminal in raw mode line feeds do not
/// return the carriage, so every newline is written as CRLF then.
pub(crate) struct Writer<W: Write = Stdout> {
    stream: W,
}

impl Writer<Stdout> {
    pub(crate) fn stdout() -> Self {
        Writer {
            stream: std::io::stdout(),
        }
    }
}

impl<W: Write> Writer<W> {
    #[cfg(test)]
    pub(crate) fn new(stream: W) -> Self {
        Writer { stream }
    }

    /// Output a line of plain text
    pub(crate) fn text(&mut self, output: &str) -> Result<(), Error> {
        self.write(&format!("{output}\n"))
    }

    /// Output a received message preceded by the receive timestamp
    pub(crate) fn message(&mut self, received_at: DateTime<Utc>, body: &str) -> Result<(), Error> {
        let timestamp = received_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        self.write(&format!(
            "{}\n{}\n",
            console::style(timestamp).black().on_white().bold(),
            body
        ))
    }

    fn write(&mut self, output: &str) -> Result<(), Error> {
        let output = if crossterm::terminal::is_raw_mode_enabled().unwrap_or(false) {
            output.replace('\n', "\r\n")
        } else {
            output.to_string()
        };

        self.stream
            .write_all(output.as_bytes())
            .and_then(|_| self.stream.flush())
            .map_err(|e| {
                log::error!("Error while writing to stdout: {e:?}");
                Error::new("Output error", None)
            })
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.stream
    }
}
