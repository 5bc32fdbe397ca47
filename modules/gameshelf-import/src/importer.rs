//! Batch orchestration: build the candidate list for the chosen mode, then
//! take every candidate through enrich → dedup → taxonomy → persist, in order.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use gameshelf_common::{
    BatchResult, CandidateItem, CandidateSource, EnrichedFields, GameRef, ImportError,
    ImportOptions, ImportRequest, NewGame, TaxonomyKind,
};

use crate::collection::{self, CollectionFetcher};
use crate::dedup::{self, DedupVerdict};
use crate::enrichment::DetailEnricher;
use crate::tabular;
use crate::taxonomy::TaxonomyResolver;
use crate::traits::{
    CapabilityCheck, CatalogStore, CollectionEndpoint, FieldExtractor, GameSearch, PageScraper,
};

pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Capabilities the importer runs against.
///
/// Enrichment is available only when both `scraper` and `extractor` are set.
#[derive(Clone, TypedBuilder)]
pub struct ImportDeps {
    pub store: Arc<dyn CatalogStore>,
    pub collection: Arc<dyn CollectionEndpoint>,
    #[builder(default, setter(strip_option))]
    pub scraper: Option<Arc<dyn PageScraper>>,
    #[builder(default, setter(strip_option))]
    pub extractor: Option<Arc<dyn FieldExtractor>>,
    #[builder(default, setter(strip_option))]
    pub search: Option<Arc<dyn GameSearch>>,
    #[builder(default, setter(strip_option))]
    pub access: Option<Arc<dyn CapabilityCheck>>,
    #[builder(default = bgg_client::DEFAULT_BASE_URL.to_string(), setter(into))]
    pub bgg_base_url: String,
    #[builder(default = collection::DEFAULT_MAX_ATTEMPTS)]
    pub collection_max_attempts: u32,
    #[builder(default = collection::DEFAULT_BACKOFF)]
    pub collection_backoff: Duration,
    #[builder(default = DEFAULT_PACING)]
    pub enrichment_pacing: Duration,
}

/// Why a single candidate was not imported. The `Display` text is what lands
/// in `BatchResult::errors`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemFailure {
    #[error("\"{0}\" already exists")]
    Duplicate(String),

    #[error("Could not determine title for BGG ID: {0}")]
    MissingTitle(String),

    #[error("Failed to create \"{title}\": {reason}")]
    Create { title: String, reason: String },

    #[error("Error importing \"{label}\": {reason}")]
    Other { label: String, reason: String },
}

impl ItemFailure {
    fn other(label: &str, err: anyhow::Error) -> Self {
        ItemFailure::Other {
            label: label.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Per-batch mutable state.
struct Batch {
    result: BatchResult,
    taxonomy: TaxonomyResolver,
    enrichments: u32,
}

pub struct BatchImporter {
    deps: ImportDeps,
    enricher: Option<DetailEnricher>,
    fetcher: CollectionFetcher,
}

impl BatchImporter {
    pub fn new(deps: ImportDeps) -> Self {
        let enricher = match (&deps.scraper, &deps.extractor) {
            (Some(scraper), Some(extractor)) => Some(
                DetailEnricher::new(scraper.clone(), extractor.clone())
                    .with_base_url(&deps.bgg_base_url),
            ),
            _ => None,
        };
        let fetcher = CollectionFetcher::new(deps.collection.clone())
            .with_retry(deps.collection_max_attempts, deps.collection_backoff);

        Self {
            deps,
            enricher,
            fetcher,
        }
    }

    pub fn enrichment_available(&self) -> bool {
        self.enricher.is_some()
    }

    /// Check the caller's admin capability, then run the batch.
    pub async fn run_as(
        &self,
        caller: Uuid,
        request: &ImportRequest,
    ) -> Result<BatchResult, ImportError> {
        let access = self
            .deps
            .access
            .as_ref()
            .ok_or_else(|| ImportError::Unavailable("no capability check configured".into()))?;

        match access.is_admin(caller).await {
            Ok(true) => self.run(request).await,
            Ok(false) => {
                warn!(%caller, "Import refused: caller is not an admin");
                Err(ImportError::Forbidden)
            }
            Err(e) => Err(ImportError::Unavailable(e.to_string())),
        }
    }

    /// Run one batch. Assumes the caller is already authorised.
    ///
    /// Errors only when the candidate list cannot be built; per-item problems
    /// are recorded in the returned `BatchResult`.
    pub async fn run(&self, request: &ImportRequest) -> Result<BatchResult, ImportError> {
        let source = request.source()?;
        let candidates = self.build_candidates(source).await?;
        let options = request.options();

        let enrich = request.enhance_with_bgg && self.enricher.is_some();
        if request.enhance_with_bgg && !enrich {
            warn!("Enrichment requested but scrape/extraction providers are not configured");
        }
        info!(
            mode = ?request.mode,
            candidates = candidates.len(),
            enrich,
            "Starting import batch"
        );

        let mut batch = Batch {
            result: BatchResult::default(),
            taxonomy: TaxonomyResolver::new(self.deps.store.clone()),
            enrichments: 0,
        };

        for candidate in &candidates {
            match self.import_one(&mut batch, candidate, enrich, &options).await {
                Ok(game) => {
                    info!(title = game.title.as_str(), id = %game.id, "Imported game");
                    batch.result.record_success(game);
                }
                Err(failure) => {
                    warn!(item = candidate.display_label(), reason = %failure, "Game import failed");
                    batch.result.record_failure(failure.to_string());
                }
            }
        }

        info!(
            imported = batch.result.imported,
            failed = batch.result.failed,
            taxonomy_cached = batch.taxonomy.cached(),
            "Import batch finished"
        );
        Ok(batch.result)
    }

    async fn build_candidates(
        &self,
        source: CandidateSource<'_>,
    ) -> Result<Vec<CandidateItem>, ImportError> {
        let candidates = match source {
            CandidateSource::Tabular(blob) => tabular::candidates_from_table(blob),
            CandidateSource::Collection(username) => self
                .fetcher
                .fetch(username)
                .await?
                .into_iter()
                .map(|item| CandidateItem {
                    bgg_url: Some(bgg_client::boardgame_url(&self.deps.bgg_base_url, &item.id)),
                    bgg_id: Some(item.id),
                    title: item.name,
                })
                .collect(),
            CandidateSource::Links(links) => links
                .iter()
                .filter_map(|link| {
                    let id = bgg_client::bgg_id_from_link(link);
                    if id.is_none() {
                        debug!(link = link.as_str(), "Skipping link without a game id");
                    }
                    Some(CandidateItem {
                        title: String::new(),
                        bgg_id: Some(id?),
                        bgg_url: Some(link.trim().to_string()),
                    })
                })
                .collect(),
        };
        Ok(candidates)
    }

    async fn import_one(
        &self,
        batch: &mut Batch,
        candidate: &CandidateItem,
        enrich: bool,
        options: &ImportOptions,
    ) -> Result<GameRef, ItemFailure> {
        let mut title = candidate.title.trim().to_string();
        let mut bgg_id = candidate.bgg_id.clone();
        let mut enriched: Option<EnrichedFields> = None;

        if let (true, Some(enricher)) = (enrich, &self.enricher) {
            if bgg_id.is_none() && !title.is_empty() {
                bgg_id = self.search_id(&title).await;
            }
            if let Some(id) = &bgg_id {
                if batch.enrichments > 0 {
                    tokio::time::sleep(self.deps.enrichment_pacing).await;
                }
                batch.enrichments += 1;

                let fields = enricher.enrich(id).await;
                if title.is_empty() {
                    if let Some(found) = &fields.title {
                        title = found.clone();
                    }
                }
                enriched = Some(fields);
            }
        }

        if title.is_empty() {
            if let Some(derived) = candidate.bgg_url.as_deref().and_then(title_from_link) {
                title = derived;
            }
        }
        if title.is_empty() {
            return Err(ItemFailure::MissingTitle(
                bgg_id.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        let store = self.deps.store.as_ref();
        let verdict = dedup::check_title(store, &title)
            .await
            .map_err(|e| ItemFailure::other(&title, e))?;
        if let DedupVerdict::Duplicate(_) = verdict {
            return Err(ItemFailure::Duplicate(title));
        }

        let (mechanics, publisher) = match &enriched {
            Some(fields) => (fields.mechanics.as_slice(), fields.publisher.as_deref()),
            None => (&[][..], None),
        };
        let mechanic_ids = batch
            .taxonomy
            .resolve_all(TaxonomyKind::Mechanic, mechanics)
            .await
            .map_err(|e| ItemFailure::other(&title, e))?;
        let publisher_id = match publisher {
            Some(name) => Some(
                batch
                    .taxonomy
                    .resolve(TaxonomyKind::Publisher, name)
                    .await
                    .map_err(|e| ItemFailure::other(&title, e))?,
            ),
            None => None,
        };

        let bgg_url = candidate.bgg_url.clone().or_else(|| {
            bgg_id
                .as_deref()
                .map(|id| bgg_client::boardgame_url(&self.deps.bgg_base_url, id))
        });
        let game = NewGame::assemble(title, bgg_id, bgg_url, enriched.as_ref(), publisher_id, options);

        let created = store
            .create_game(&game)
            .await
            .map_err(|e| ItemFailure::Create {
                title: game.title.clone(),
                reason: e.to_string(),
            })?;

        if !mechanic_ids.is_empty() {
            store
                .link_mechanics(created.id, &mechanic_ids)
                .await
                .map_err(|e| ItemFailure::other(&created.title, e))?;
        }

        Ok(created)
    }

    /// Title search degrades silently.
    async fn search_id(&self, title: &str) -> Option<String> {
        let search = self.deps.search.as_ref()?;
        match search.find_id_by_title(title).await {
            Ok(found) => {
                debug!(title, found = found.is_some(), "Title search");
                found
            }
            Err(e) => {
                warn!(title, error = %e, "Title search failed");
                None
            }
        }
    }
}

/// Title from a link's last path segment: hyphens become spaces and each word
/// is capitalized. A purely numeric segment yields nothing.
pub fn title_from_link(link: &str) -> Option<String> {
    let slug = link.split('/').rev().find(|s| !s.is_empty())?;
    if slug.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let title = slug
        .replace('-', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    (!title.trim().is_empty()).then_some(title)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
