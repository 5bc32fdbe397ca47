use ai_client::{truncate_chars, OpenAi};
use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gameshelf_common::{Difficulty, GameType, PlayTime};

use crate::traits::FieldExtractor;

pub const EXTRACT_TOOL: &str = "extract_game";
pub const DEFAULT_MAX_CHARS: usize = 12_000;

/// What the model returns for one game page.
///
/// Bucket fields are advertised to the model as enums but read back as plain
/// strings; the enricher maps them onto the closed vocabularies and drops
/// anything that doesn't fit. Every field is read leniently: a value of the
/// wrong JSON type becomes `None` (or an empty list) instead of failing the
/// whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedGame {
    /// The game's name as printed on the page
    #[serde(default, deserialize_with = "lenient::text")]
    #[schemars(with = "Option<String>")]
    pub title: Option<String>,
    /// 100-150 words: a brief overview followed by Quick Gameplay bullet points
    #[serde(default, deserialize_with = "lenient::text")]
    #[schemars(with = "Option<String>")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    #[schemars(with = "Option<Difficulty>")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    #[schemars(with = "Option<PlayTime>")]
    pub play_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    #[schemars(with = "Option<GameType>")]
    pub game_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    #[schemars(with = "Option<f64>")]
    pub min_players: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    #[schemars(with = "Option<f64>")]
    pub max_players: Option<f64>,
    /// Minimum recommended age, e.g. "10+"
    #[serde(default, deserialize_with = "lenient::text")]
    #[schemars(with = "Option<String>")]
    pub suggested_age: Option<String>,
    /// Mechanic names, e.g. "Hand Management"
    #[serde(default, deserialize_with = "lenient::list")]
    #[schemars(with = "Vec<String>")]
    pub mechanics: Vec<String>,
    /// Primary publisher
    #[serde(default, deserialize_with = "lenient::text")]
    #[schemars(with = "Option<String>")]
    pub publisher: Option<String>,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Value::String(s) => vec![s],
            _ => Vec::new(),
        })
    }
}

pub fn system_prompt() -> String {
    format!(
        "Extract board game data. Use EXACT enum values:\n\
         - difficulty: {}\n\
         - play_time: {}\n\
         - game_type: {}\n\n\
         Keep description CONCISE (100-150 words). Include a brief overview and Quick Gameplay bullet points.",
        Difficulty::label_list(),
        PlayTime::label_list(),
        GameType::label_list(),
    )
}

/// Structured extraction through an OpenAI-compatible gateway.
pub struct GameFieldExtractor {
    ai: OpenAi,
    max_chars: usize,
}

impl GameFieldExtractor {
    pub fn new(ai: OpenAi) -> Self {
        Self {
            ai,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn user_prompt(&self, page_text: &str) -> String {
        format!(
            "Extract game data from: {}",
            truncate_chars(page_text, self.max_chars)
        )
    }
}

#[async_trait]
impl FieldExtractor for GameFieldExtractor {
    async fn extract_fields(&self, page_text: &str) -> Result<ExtractedGame> {
        debug!(model = self.ai.model(), chars = page_text.chars().count(), "Extracting game fields");
        let game = self
            .ai
            .extract_with_tool::<ExtractedGame>(
                EXTRACT_TOOL,
                system_prompt(),
                self.user_prompt(page_text),
            )
            .await?;
        Ok(game)
    }
}
