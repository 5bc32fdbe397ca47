use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::info;

pub const DEFAULT_AI_GATEWAY_URL: &str = "https://ai-gateway.vercel.sh/v1";
pub const DEFAULT_EXTRACTION_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_BGG_BASE_URL: &str = "https://boardgamegeek.com";

/// Importer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Providers
    pub firecrawl_api_key: Option<String>,
    pub ai_gateway_api_key: Option<String>,
    pub ai_gateway_url: String,
    pub extraction_model: String,
    pub bgg_base_url: String,

    // Pipeline tuning
    pub collection_max_attempts: u32,
    pub collection_backoff_ms: u64,
    pub enrichment_pacing_ms: u64,
    pub enrichment_max_chars: usize,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            firecrawl_api_key: optional_env("FIRECRAWL_API_KEY"),
            ai_gateway_api_key: optional_env("AI_GATEWAY_API_KEY"),
            ai_gateway_url: optional_env("AI_GATEWAY_URL")
                .unwrap_or_else(|| DEFAULT_AI_GATEWAY_URL.to_string()),
            extraction_model: optional_env("AI_EXTRACTION_MODEL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string()),
            bgg_base_url: optional_env("BGG_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BGG_BASE_URL.to_string()),
            collection_max_attempts: parsed_env("BGG_COLLECTION_MAX_ATTEMPTS", 5)?,
            collection_backoff_ms: parsed_env("BGG_COLLECTION_BACKOFF_MS", 3000)?,
            enrichment_pacing_ms: parsed_env("ENRICHMENT_PACING_MS", 500)?,
            enrichment_max_chars: parsed_env("ENRICHMENT_MAX_CHARS", 12_000)?,
        })
    }

    /// Log which settings are present without printing any secret.
    pub fn log_redacted(&self) {
        info!(
            database = redact_url(&self.database_url),
            firecrawl = self.firecrawl_api_key.is_some(),
            ai_gateway = self.ai_gateway_api_key.is_some(),
            ai_gateway_url = %self.ai_gateway_url,
            model = %self.extraction_model,
            bgg_base_url = %self.bgg_base_url,
            collection_max_attempts = self.collection_max_attempts,
            collection_backoff_ms = self.collection_backoff_ms,
            enrichment_pacing_ms = self.enrichment_pacing_ms,
            enrichment_max_chars = self.enrichment_max_chars,
            "Loaded config"
        );
    }
}

fn required_env(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} environment variable is required"))
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}

/// Strip credentials from a connection URL: `postgres://user:pw@host/db` → `postgres://***@host/db`.
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_url_hides_credentials() {
        assert_eq!(
            redact_url("postgres://shelf:hunter2@db:5432/gameshelf"),
            "postgres://***@db:5432/gameshelf"
        );
        assert_eq!(redact_url("postgres://db/gameshelf"), "postgres://db/gameshelf");
    }
}
