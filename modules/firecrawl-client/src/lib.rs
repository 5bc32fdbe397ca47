pub mod error;
mod types;

pub use error::{FirecrawlError, Result};
pub use types::ScrapedPage;

use std::time::Duration;

use types::{ScrapeRequest, ScrapeResponse};

const BASE_URL: &str = "https://api.firecrawl.dev/v1";

pub struct FirecrawlClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Scrape one URL, requesting both markdown and raw HTML renderings.
    pub async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        let body = ScrapeRequest {
            url,
            formats: ["markdown", "rawHtml"],
            only_main_content: true,
        };

        let resp = self
            .client
            .post(format!("{}/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ScrapeResponse = resp.json().await?;
        let page = parsed.into_page();
        tracing::debug!(
            url,
            markdown_bytes = page.markdown.len(),
            html_bytes = page.raw_html.len(),
            "Scraped page"
        );

        Ok(page)
    }
}
