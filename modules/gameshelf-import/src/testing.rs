// Test mocks for the import pipeline.
//
// One mock per trait boundary:
// - MockScraper (PageScraper): URL → RawPage, Err for unregistered URLs
// - MockExtractor (FieldExtractor): fixed extraction or fixed failure
// - MockCollection (CollectionEndpoint): scripted sequence of polls
// - MockSearch (GameSearch): title → id
// - MemoryCatalogStore (CatalogStore): stateful in-memory catalog
// - FixedCapability (CapabilityCheck): allow or deny everyone

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use gameshelf_common::{GameRef, NewGame, RawPage, TaxonomyKind};

use crate::extractor::ExtractedGame;
use crate::traits::{
    CapabilityCheck, CatalogStore, CollectionEndpoint, CollectionPoll, FieldExtractor, GameSearch,
    PageScraper,
};

// ---------------------------------------------------------------------------
// MockScraper
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockScraper {
    pages: HashMap<String, RawPage>,
    calls: Mutex<Vec<String>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, page: RawPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageScraper for MockScraper {
    async fn fetch_detail_page(&self, url: &str) -> Result<RawPage> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("MockScraper: no page registered for {url}"))
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

pub struct MockExtractor {
    outcome: std::result::Result<ExtractedGame, String>,
    seen: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn returning(game: ExtractedGame) -> Self {
        Self {
            outcome: Ok(game),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen_texts(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FieldExtractor for MockExtractor {
    async fn extract_fields(&self, page_text: &str) -> Result<ExtractedGame> {
        self.seen.lock().unwrap().push(page_text.to_string());
        match &self.outcome {
            Ok(game) => Ok(game.clone()),
            Err(message) => bail!("MockExtractor: {message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockCollection
// ---------------------------------------------------------------------------

/// Replays scripted polls in order; the last one repeats once the script runs out.
pub struct MockCollection {
    script: Vec<CollectionPoll>,
    error: Option<String>,
    calls: Mutex<usize>,
}

impl MockCollection {
    pub fn new(script: Vec<CollectionPoll>) -> Self {
        Self {
            script,
            error: None,
            calls: Mutex::new(0),
        }
    }

    pub fn always_generating() -> Self {
        Self::new(vec![CollectionPoll::Generating])
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: Vec::new(),
            error: Some(message.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CollectionEndpoint for MockCollection {
    async fn poll_collection(&self, _username: &str) -> Result<CollectionPoll> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if let Some(message) = &self.error {
            bail!("MockCollection: {message}");
        }
        self.script
            .get(n - 1)
            .or_else(|| self.script.last())
            .cloned()
            .ok_or_else(|| anyhow!("MockCollection: empty script"))
    }
}

// ---------------------------------------------------------------------------
// MockSearch
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockSearch {
    ids: HashMap<String, String>,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_title(mut self, title: &str, id: &str) -> Self {
        self.ids.insert(title.to_string(), id.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn searched(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GameSearch for MockSearch {
    async fn find_id_by_title(&self, title: &str) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(title.to_string());
        if self.fail {
            bail!("MockSearch: search unavailable");
        }
        Ok(self.ids.get(title).cloned())
    }
}

// ---------------------------------------------------------------------------
// MemoryCatalogStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CatalogState {
    games: Vec<(GameRef, NewGame)>,
    seeded: Vec<GameRef>,
    taxonomy: Vec<(TaxonomyKind, String, Uuid)>,
    links: Vec<(Uuid, Uuid)>,
    upsert_calls: usize,
}

/// In-memory catalog with optional injected failures.
#[derive(Default)]
pub struct MemoryCatalogStore {
    state: Mutex<CatalogState>,
    fail_create: Option<String>,
    fail_links: bool,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-existing catalog entry.
    pub fn with_game(self, title: &str) -> Self {
        self.state.lock().unwrap().seeded.push(GameRef {
            id: Uuid::new_v4(),
            title: title.to_string(),
        });
        self
    }

    /// `create_game` fails for this title.
    pub fn failing_create(mut self, title: &str) -> Self {
        self.fail_create = Some(title.to_string());
        self
    }

    pub fn failing_links(mut self) -> Self {
        self.fail_links = true;
        self
    }

    /// Games created through the store, in insertion order.
    pub fn created(&self) -> Vec<NewGame> {
        self.state
            .lock()
            .unwrap()
            .games
            .iter()
            .map(|(_, g)| g.clone())
            .collect()
    }

    /// Seeded plus created games.
    pub fn game_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.seeded.len() + state.games.len()
    }

    pub fn taxonomy_names(&self, kind: TaxonomyKind) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .taxonomy
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, name, _)| name.clone())
            .collect()
    }

    pub fn taxonomy_id(&self, kind: TaxonomyKind, name: &str) -> Option<Uuid> {
        self.state
            .lock()
            .unwrap()
            .taxonomy
            .iter()
            .find(|(k, n, _)| *k == kind && n == name)
            .map(|(_, _, id)| *id)
    }

    /// Mechanic ids linked to a game.
    pub fn mechanics_of(&self, game_id: Uuid) -> Vec<Uuid> {
        self.state
            .lock()
            .unwrap()
            .links
            .iter()
            .filter(|(g, _)| *g == game_id)
            .map(|(_, m)| *m)
            .collect()
    }

    pub fn upsert_calls(&self) -> usize {
        self.state.lock().unwrap().upsert_calls
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_game_by_title(&self, title: &str) -> Result<Option<GameRef>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .seeded
            .iter()
            .chain(state.games.iter().map(|(r, _)| r))
            .find(|g| g.title == title)
            .cloned())
    }

    async fn create_game(&self, game: &NewGame) -> Result<GameRef> {
        if self.fail_create.as_deref() == Some(game.title.as_str()) {
            bail!("insert rejected");
        }
        let created = GameRef {
            id: Uuid::new_v4(),
            title: game.title.clone(),
        };
        self.state
            .lock()
            .unwrap()
            .games
            .push((created.clone(), game.clone()));
        Ok(created)
    }

    async fn upsert_taxonomy(&self, kind: TaxonomyKind, name: &str) -> Result<Uuid> {
        let mut state = self.state.lock().unwrap();
        state.upsert_calls += 1;
        if let Some((_, _, id)) = state
            .taxonomy
            .iter()
            .find(|(k, n, _)| *k == kind && n == name)
        {
            return Ok(*id);
        }
        let id = Uuid::new_v4();
        state.taxonomy.push((kind, name.to_string(), id));
        Ok(id)
    }

    async fn link_mechanics(&self, game_id: Uuid, mechanic_ids: &[Uuid]) -> Result<()> {
        if self.fail_links {
            bail!("link insert rejected");
        }
        let mut state = self.state.lock().unwrap();
        for id in mechanic_ids {
            if !state.links.contains(&(game_id, *id)) {
                state.links.push((game_id, *id));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FixedCapability
// ---------------------------------------------------------------------------

pub struct FixedCapability {
    admin: bool,
}

impl FixedCapability {
    pub fn allow() -> Self {
        Self { admin: true }
    }

    pub fn deny() -> Self {
        Self { admin: false }
    }
}

#[async_trait]
impl CapabilityCheck for FixedCapability {
    async fn is_admin(&self, _caller: Uuid) -> Result<bool> {
        Ok(self.admin)
    }
}
