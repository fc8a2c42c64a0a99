use aws_config::{BehaviorVersion, Region, SdkConfig};
use eyre::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Regions scanned by `list-functions` when neither a flag nor the config file narrows them
pub(crate) const DEFAULT_REGIONS: [&str; 16] = [
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ap-south-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "sa-east-1",
];

/// Env var pointing to a config file other than ~/.cloudtail/config.toml
const CONFIG_PATH_ENV: &str = "CLOUDTAIL_CONFIG";

/// User settings read from the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Settings {
    /// AWS CLI profile used when --profile is not passed
    profile: Option<String>,

    /// Regions to scan instead of the default list
    regions: Option<Vec<String>>,
}

impl Settings {
    pub(crate) fn load() -> eyre::Result<Self> {
        match Self::path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    fn path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        std::env::var("HOME")
            .ok()
            .map(|home| Path::new(&home).join(".cloudtail").join("config.toml"))
    }

    pub(crate) fn from_path(path: &Path) -> eyre::Result<Self> {
        if let Ok(toml_string) = std::fs::read_to_string(path) {
            toml::from_str(&toml_string)
                .wrap_err(format!("Failed to parse {}", path.display()))
        } else {
            // Just use a default config if the file is not found.
            Ok(Self::default())
        }
    }

    /// A profile from the command line takes precedence over the configured one
    pub(crate) fn profile(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.profile.clone())
    }

    pub(crate) fn regions(&self) -> Vec<String> {
        match &self.regions {
            Some(regions) if !regions.is_empty() => regions.clone(),
            _ => DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Load shared AWS configuration once, to be passed to every client
///
/// Credentials are resolved by the default provider chain, optionally for a named profile.
pub(crate) async fn aws_config(region: Option<&str>, profile: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }

    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}
