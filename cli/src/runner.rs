use crate::config::{self, Settings};
use crate::error::Error;
use aws_config::SdkConfig;
use std::error::Error as StdError;

pub(crate) trait Runner {
    /// Settings from the user's config file
    fn settings(&self) -> Result<Settings, Error> {
        Settings::load().map_err(|e| {
            self.error(
                Some("Invalid config file"),
                Some("Fix or remove ~/.cloudtail/config.toml"),
                Some(e.into()),
            )
        })
    }

    /// Shared AWS configuration for all clients of the command
    async fn aws_config(&self, region: Option<&str>, profile: Option<&str>) -> SdkConfig {
        log::debug!("Loading AWS config for region {region:?}, profile {profile:?}");
        config::aws_config(region, profile).await
    }

    /// Run the command
    ///
    /// Returns an error shown to the user in case of failure
    async fn run(&mut self) -> Result<(), Error>;

    /// Construct an error shown to the user
    fn error(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        origin: Option<Box<dyn StdError>>,
    ) -> Error {
        if let Some(origin) = origin {
            log::error!("{origin:?}");
        }

        if let Some(title) = title {
            Error::new(title, description)
        } else {
            Error::new(
                "Failed to run the command",
                Some("Run with RUST_LOG=debug to see what happened"),
            )
        }
    }
}

/// Return a runner for a command
pub(crate) trait Runnable {
    fn runner(&self) -> impl Runner;
}
