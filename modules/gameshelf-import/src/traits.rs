// Trait abstractions for the import pipeline's external capabilities.
//
// PageScraper, FieldExtractor, CollectionEndpoint and GameSearch sit in front
// of the scrape service, the model gateway and the board-game database.
// CatalogStore and CapabilityCheck sit in front of Postgres.
//
// Mocks for every seam live in `testing.rs`.

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use bgg_client::{BggClient, BggError, CollectionItem, CollectionStatus};
use firecrawl_client::FirecrawlClient;
use gameshelf_common::{GameRef, NewGame, RawPage, TaxonomyKind};

use crate::extractor::ExtractedGame;

// ---------------------------------------------------------------------------
// PageScraper
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Fetch a detail page as readable text plus raw markup.
    async fn fetch_detail_page(&self, url: &str) -> Result<RawPage>;
}

#[async_trait]
impl PageScraper for FirecrawlClient {
    async fn fetch_detail_page(&self, url: &str) -> Result<RawPage> {
        let page = self.scrape(url).await?;
        Ok(RawPage {
            text: page.markdown,
            html: page.raw_html,
        })
    }
}

// ---------------------------------------------------------------------------
// FieldExtractor
// ---------------------------------------------------------------------------

#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Ask a model for structured game fields from page text.
    async fn extract_fields(&self, page_text: &str) -> Result<ExtractedGame>;
}

// ---------------------------------------------------------------------------
// CollectionEndpoint
// ---------------------------------------------------------------------------

/// Outcome of a single collection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionPoll {
    /// The export is still being built; ask again later.
    Generating,
    Ready(Vec<CollectionItem>),
    /// Any other non-success HTTP status.
    Failed { status: u16 },
}

#[async_trait]
pub trait CollectionEndpoint: Send + Sync {
    async fn poll_collection(&self, username: &str) -> Result<CollectionPoll>;
}

#[async_trait]
impl CollectionEndpoint for BggClient {
    async fn poll_collection(&self, username: &str) -> Result<CollectionPoll> {
        match self.collection(username).await {
            Ok(CollectionStatus::Generating) => Ok(CollectionPoll::Generating),
            Ok(CollectionStatus::Ready(xml)) => {
                Ok(CollectionPoll::Ready(bgg_client::parse_collection(&xml)))
            }
            Err(BggError::Api { status, .. }) => Ok(CollectionPoll::Failed { status }),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// GameSearch
// ---------------------------------------------------------------------------

#[async_trait]
pub trait GameSearch: Send + Sync {
    /// Resolve a title to an external id. Exact match only; fuzzy search is
    /// tried only when the exact request itself fails.
    async fn find_id_by_title(&self, title: &str) -> Result<Option<String>>;
}

#[async_trait]
impl GameSearch for BggClient {
    async fn find_id_by_title(&self, title: &str) -> Result<Option<String>> {
        exact_then_fuzzy(|exact| async move {
            Ok::<_, anyhow::Error>(self.search(title, exact).await?)
        })
        .await
    }
}

/// Run `search(true)`; on error, fall back to `search(false)`. An exact search
/// that succeeds with no hit is final.
pub(crate) async fn exact_then_fuzzy<F, Fut>(search: F) -> Result<Option<String>>
where
    F: Fn(bool) -> Fut,
    Fut: Future<Output = Result<Option<String>>>,
{
    match search(true).await {
        Ok(found) => Ok(found),
        Err(e) => {
            warn!(error = %e, "Exact title search failed, trying fuzzy");
            search(false).await
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Exact, case-sensitive title lookup.
    async fn find_game_by_title(&self, title: &str) -> Result<Option<GameRef>>;

    async fn create_game(&self, game: &NewGame) -> Result<GameRef>;

    /// Insert-if-absent by exact name; returns the id either way.
    async fn upsert_taxonomy(&self, kind: TaxonomyKind, name: &str) -> Result<Uuid>;

    /// Attach mechanics to a game. Existing links are left alone.
    async fn link_mechanics(&self, game_id: Uuid, mechanic_ids: &[Uuid]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// CapabilityCheck
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CapabilityCheck: Send + Sync {
    /// Whether `caller` may run imports.
    async fn is_admin(&self, caller: Uuid) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    async fn run_scripted(
        exact: Result<Option<String>>,
        fuzzy: Result<Option<String>>,
    ) -> (Result<Option<String>>, Vec<bool>) {
        let calls = Mutex::new(Vec::new());
        let scripted = Mutex::new((Some(exact), Some(fuzzy)));
        let result = exact_then_fuzzy(|exact| {
            calls.lock().unwrap().push(exact);
            let mut slots = scripted.lock().unwrap();
            let next = if exact { slots.0.take() } else { slots.1.take() };
            async move { next.expect("each mode is searched at most once") }
        })
        .await;
        (result, calls.into_inner().unwrap())
    }

    #[tokio::test]
    async fn exact_hit_skips_fuzzy() {
        let (result, calls) = run_scripted(Ok(Some("13".into())), Ok(Some("99".into()))).await;
        assert_eq!(result.unwrap().as_deref(), Some("13"));
        assert_eq!(calls, vec![true]);
    }

    #[tokio::test]
    async fn exact_miss_is_final() {
        let (result, calls) = run_scripted(Ok(None), Ok(Some("99".into()))).await;
        assert_eq!(result.unwrap(), None);
        assert_eq!(calls, vec![true]);
    }

    #[tokio::test]
    async fn exact_failure_falls_back_to_fuzzy() {
        let (result, calls) = run_scripted(Err(anyhow!("HTTP 503")), Ok(Some("822".into()))).await;
        assert_eq!(result.unwrap().as_deref(), Some("822"));
        assert_eq!(calls, vec![true, false]);
    }

    #[tokio::test]
    async fn fuzzy_failure_propagates() {
        let (result, calls) = run_scripted(Err(anyhow!("HTTP 503")), Err(anyhow!("HTTP 500"))).await;
        assert!(result.unwrap_err().to_string().contains("500"));
        assert_eq!(calls, vec![true, false]);
    }
}
