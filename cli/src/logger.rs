use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;

/// Set up log levels, formatting, and other configurations for the logger
pub(crate) struct Logger {
    multi_progress: MultiProgress,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

impl<'a> Logger {
    pub(crate) fn init() -> &'a Self {
        LOGGER.get_or_init(|| {
            let logger = env_logger::Builder::from_env(
                // No logs shown by default, only human-friendly messages
                // Enable logs output with "export RUST_LOG=debug" in terminal
                env_logger::Env::default().default_filter_or("off"),
            )
            .build();

            let level = logger.filter();
            let multi_progress = MultiProgress::new();

            // Another logger might already be installed, e.g. in tests
            if let Err(error) = LogWrapper::new(multi_progress.clone(), logger).try_init() {
                eprintln!("Failed to initialize logger: {error}");
            }

            log::set_max_level(level);
            Self { multi_progress }
        })
    }

    pub(crate) fn multi_progress() -> &'a MultiProgress {
        &Self::init().multi_progress
    }

    /// A spinner which keeps log lines above it
    pub(crate) fn spinner(message: String) -> ProgressBar {
        let spinner = Self::multi_progress().add(ProgressBar::new_spinner());

        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}
