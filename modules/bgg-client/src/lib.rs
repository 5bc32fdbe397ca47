pub mod error;
pub mod parse;
pub mod types;

pub use error::{BggError, Result};
pub use parse::{bgg_id_from_link, first_search_id, parse_collection};
pub use types::{CollectionItem, CollectionStatus};

use std::time::Duration;

use reqwest::StatusCode;

pub const DEFAULT_BASE_URL: &str = "https://boardgamegeek.com";

pub struct BggClient {
    client: reqwest::Client,
    base_url: String,
}

impl BggClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Canonical detail page for a game id.
    pub fn boardgame_url(&self, id: &str) -> String {
        boardgame_url(&self.base_url, id)
    }

    /// One request for a user's owned, non-expansion collection.
    ///
    /// BGG answers 202 while it builds the export; that is surfaced as
    /// `CollectionStatus::Generating` so the caller owns the retry policy.
    pub async fn collection(&self, username: &str) -> Result<CollectionStatus> {
        let resp = self
            .client
            .get(format!("{}/xmlapi2/collection", self.base_url))
            .query(&[
                ("username", username),
                ("own", "1"),
                ("excludesubtype", "boardgameexpansion"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::ACCEPTED {
            return Ok(CollectionStatus::Generating);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BggError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(CollectionStatus::Ready(resp.text().await?))
    }

    /// Search board games by name; returns the first hit's id.
    pub async fn search(&self, query: &str, exact: bool) -> Result<Option<String>> {
        let mut request = self
            .client
            .get(format!("{}/xmlapi2/search", self.base_url))
            .query(&[("query", query), ("type", "boardgame")]);
        if exact {
            request = request.query(&[("exact", "1")]);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BggError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let xml = resp.text().await?;
        let id = first_search_id(&xml);
        tracing::debug!(query, exact, found = id.is_some(), "BGG search");
        Ok(id)
    }
}

/// `{base}/boardgame/{id}`.
pub fn boardgame_url(base_url: &str, id: &str) -> String {
    format!("{}/boardgame/{}", base_url.trim_end_matches('/'), id)
}
