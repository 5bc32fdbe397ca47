use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::buckets::{Difficulty, GameType, PlayTime};

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A provisional catalog entry produced by one of the source adapters.
///
/// `title` may be empty for link-list candidates until enrichment (or the link
/// slug) supplies one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub title: String,
    pub bgg_id: Option<String>,
    pub bgg_url: Option<String>,
}

impl CandidateItem {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Label used in per-item error messages: the title, else the external id.
    pub fn display_label(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else {
            self.bgg_id.as_deref().unwrap_or("unknown")
        }
    }
}

/// Page content fetched for one game id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    /// Readable text rendering (markdown).
    pub text: String,
    /// Raw markup, used for image discovery.
    pub html: String,
}

/// Metadata gathered for one game. Everything but `bgg_id` is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFields {
    pub bgg_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub suggested_age: Option<String>,
    pub play_time: Option<PlayTime>,
    pub difficulty: Option<Difficulty>,
    pub game_type: Option<GameType>,
    /// Mechanic tags in the order the source listed them.
    pub mechanics: Vec<String>,
    pub publisher: Option<String>,
}

impl EnrichedFields {
    /// A record carrying only the identifier.
    pub fn bare(bgg_id: impl Into<String>) -> Self {
        Self {
            bgg_id: bgg_id.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Options applied to every created game
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub is_coming_soon: bool,
    pub is_for_sale: bool,
    pub sale_price: Option<f64>,
    pub sale_condition: Option<String>,
    pub location_room: Option<String>,
    pub location_shelf: Option<String>,
    pub location_misc: Option<String>,
    pub sleeved: bool,
    pub upgraded_components: bool,
    pub crowdfunded: bool,
    pub inserts: bool,
}

// ---------------------------------------------------------------------------
// Persistence rows
// ---------------------------------------------------------------------------

pub const DEFAULT_MIN_PLAYERS: u32 = 2;
pub const DEFAULT_MAX_PLAYERS: u32 = 4;

/// A fully-resolved game ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub bgg_id: Option<String>,
    pub bgg_url: Option<String>,
    pub min_players: u32,
    pub max_players: u32,
    pub suggested_age: Option<String>,
    pub play_time: PlayTime,
    pub difficulty: Difficulty,
    pub game_type: GameType,
    pub publisher_id: Option<Uuid>,
    pub options: ImportOptions,
}

impl NewGame {
    /// Merge enrichment onto batch defaults. Fields the enrichment left unset
    /// fall back to catalog defaults.
    pub fn assemble(
        title: String,
        bgg_id: Option<String>,
        bgg_url: Option<String>,
        enriched: Option<&EnrichedFields>,
        publisher_id: Option<Uuid>,
        options: &ImportOptions,
    ) -> Self {
        let e = enriched.cloned().unwrap_or_default();
        let bgg_id = bgg_id.or_else(|| Some(e.bgg_id.clone()).filter(|id| !id.is_empty()));
        Self {
            title,
            description: e.description.filter(|s| !s.trim().is_empty()),
            image_url: e.image_url,
            bgg_id,
            bgg_url,
            min_players: e.min_players.filter(|n| *n > 0).unwrap_or(DEFAULT_MIN_PLAYERS),
            max_players: e.max_players.filter(|n| *n > 0).unwrap_or(DEFAULT_MAX_PLAYERS),
            suggested_age: e.suggested_age.filter(|s| !s.trim().is_empty()),
            play_time: e.play_time.unwrap_or_default(),
            difficulty: e.difficulty.unwrap_or_default(),
            game_type: e.game_type.unwrap_or_default(),
            publisher_id,
            options: options.clone(),
        }
    }
}

/// A persisted catalog game (id + display key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRef {
    pub id: Uuid,
    pub title: String,
}

/// Taxonomy tables the importer writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
    Mechanic,
    Publisher,
}

impl TaxonomyKind {
    pub fn table(self) -> &'static str {
        match self {
            TaxonomyKind::Mechanic => "mechanics",
            TaxonomyKind::Publisher => "publishers",
        }
    }
}

// ---------------------------------------------------------------------------
// Batch result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedGame {
    pub title: String,
    pub id: Uuid,
}

/// Outcome of one batch. Only ever grows; a partial batch keeps what it created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub imported: u32,
    pub failed: u32,
    pub errors: Vec<String>,
    pub games: Vec<CreatedGame>,
}

impl BatchResult {
    pub fn record_success(&mut self, game: GameRef) {
        self.imported += 1;
        self.games.push(CreatedGame {
            title: game.title,
            id: game.id,
        });
    }

    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.failed += 1;
        self.errors.push(reason.into());
    }

    pub fn attempted(&self) -> u32 {
        self.imported + self.failed
    }
}
