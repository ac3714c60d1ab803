use crate::settings::FeedSettings;
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Downloads the raw bodies of the two upstream feeds.
///
/// Bodies are returned as text; parsing and validation happen in the
/// player pool so that feed errors name the offending field.
pub struct FeedFetcher {
    client: Client,
    settings: FeedSettings,
}

impl FeedFetcher {
    pub fn new(settings: FeedSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, settings })
    }

    pub fn projections_url(&self) -> String {
        self.settings
            .projections_url
            .replace("{season}", &self.settings.season.to_string())
            .replace("{week}", &self.settings.week.to_string())
    }

    pub fn slate_url(&self) -> Result<String> {
        let draft_group_id = self
            .settings
            .draft_group_id
            .context("No draft group configured; pass --draft-group or --slate-file")?;
        Ok(self.settings.slate_url.replace("{draft_group_id}", &draft_group_id.to_string()))
    }

    pub async fn fetch_projections(&self) -> Result<String> {
        self.get(&self.projections_url(), "projections").await
    }

    pub async fn fetch_slate(&self) -> Result<String> {
        self.get(&self.slate_url()?, "slate").await
    }

    async fn get(&self, url: &str, what: &str) -> Result<String> {
        info!("Fetching {} from: {}", what, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {what}"))?;

        if !response.status().is_success() {
            anyhow::bail!("{} request failed with status: {}", what, response.status());
        }

        let body = response.text().await.with_context(|| format!("Failed to read {what} body"))?;
        info!("Fetched {} bytes of {}", body.len(), what);
        Ok(body)
    }
}

/// Read a previously saved feed body
pub async fn read_feed_file(path: &Path) -> Result<String> {
    info!("Reading feed from {}", path.display());
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read feed file {}", path.display()))
}
