use cargo_metadata::semver::Version;
use eyre::Context;
use serde::Deserialize;
use std::time::Duration;

const CRATE_URL: &str = concat!("https://crates.io/api/v1/crates/", env!("CARGO_PKG_NAME"));
const CURRENT: &str = env!("CARGO_PKG_VERSION");

#[derive(Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Deserialize)]
struct CrateInfo {
    max_stable_version: Option<String>,
    max_version: String,
}

/// Tell the user when a newer version is published
///
/// Best effort: a slow or failing registry never gets in the way of the command.
pub(crate) async fn check() {
    match latest().await.and_then(|latest| newer(CURRENT, &latest)) {
        Ok(Some(version)) => println!("{}", notice(&version)),
        Ok(None) => log::debug!("{CURRENT} is the latest version"),
        Err(error) => log::debug!("Version check skipped: {error:?}"),
    }
}

async fn latest() -> eyre::Result<String> {
    let response: CrateResponse = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(2))
        .build()?
        .get(CRATE_URL)
        .send()
        .await
        .wrap_err("Failed to reach crates.io")?
        .error_for_status()?
        .json()
        .await
        .wrap_err("Unexpected crates.io response")?;

    Ok(response
        .krate
        .max_stable_version
        .unwrap_or(response.krate.max_version))
}

/// The published version if it is newer than the running one
fn newer(current: &str, published: &str) -> eyre::Result<Option<Version>> {
    let current = Version::parse(current)?;
    let published = Version::parse(published)?;
    Ok((published > current).then_some(published))
}

fn notice(version: &Version) -> String {
    format!(
        "\n{} {}\n{}\n",
        console::style(format!("v{version}")).bold().green(),
        console::style("of cloudtail is now available.").green(),
        console::style(format!("Run \"cargo install {}\" to update", env!("CARGO_PKG_NAME"))).dim(),
    )
}
