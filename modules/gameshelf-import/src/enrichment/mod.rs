//! Detail enrichment: scrape a game's page, then ask a model for structured
//! fields. Every provider failure degrades to fewer populated fields.

pub mod images;

use std::sync::Arc;

use tracing::{debug, info, warn};

use gameshelf_common::{Difficulty, EnrichedFields, GameType, PlayTime};

use crate::extractor::ExtractedGame;
use crate::traits::{FieldExtractor, PageScraper};

pub struct DetailEnricher {
    scraper: Arc<dyn PageScraper>,
    extractor: Arc<dyn FieldExtractor>,
    base_url: String,
}

impl DetailEnricher {
    pub fn new(scraper: Arc<dyn PageScraper>, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            scraper,
            extractor,
            base_url: bgg_client::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn detail_url(&self, bgg_id: &str) -> String {
        bgg_client::boardgame_url(&self.base_url, bgg_id)
    }

    /// Never fails. The result always carries `bgg_id`.
    pub async fn enrich(&self, bgg_id: &str) -> EnrichedFields {
        let url = self.detail_url(bgg_id);

        let page = match self.scraper.fetch_detail_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(bgg_id, error = %e, "Scrape failed, continuing without enrichment");
                return EnrichedFields::bare(bgg_id);
            }
        };

        let image_url = images::primary_image(&page.html);
        debug!(bgg_id, has_image = image_url.is_some(), "Scraped detail page");

        match self.extractor.extract_fields(&page.text).await {
            Ok(extracted) => {
                let fields = normalize(bgg_id, image_url, extracted);
                info!(
                    bgg_id,
                    mechanics = fields.mechanics.len(),
                    has_publisher = fields.publisher.is_some(),
                    "Enriched game"
                );
                fields
            }
            Err(e) => {
                warn!(bgg_id, error = %e, "Field extraction failed, keeping image only");
                EnrichedFields {
                    image_url,
                    ..EnrichedFields::bare(bgg_id)
                }
            }
        }
    }
}

/// Map raw model output onto validated fields. Out-of-vocabulary bucket values
/// and nonsensical player counts are dropped.
pub fn normalize(bgg_id: &str, image_url: Option<String>, raw: ExtractedGame) -> EnrichedFields {
    let mut min_players = raw.min_players.and_then(player_count);
    let mut max_players = raw.max_players.and_then(player_count);
    if let (Some(min), Some(max)) = (min_players, max_players) {
        if min > max {
            min_players = Some(max);
            max_players = Some(min);
        }
    }

    let mut mechanics: Vec<String> = Vec::new();
    for name in raw.mechanics {
        let name = name.trim();
        if !name.is_empty() && !mechanics.iter().any(|m| m == name) {
            mechanics.push(name.to_string());
        }
    }

    EnrichedFields {
        bgg_id: bgg_id.to_string(),
        title: non_empty(raw.title),
        description: non_empty(raw.description),
        image_url,
        min_players,
        max_players,
        suggested_age: non_empty(raw.suggested_age),
        play_time: raw.play_time.as_deref().and_then(PlayTime::normalize),
        difficulty: raw.difficulty.as_deref().and_then(Difficulty::normalize),
        game_type: raw.game_type.as_deref().and_then(GameType::normalize),
        mechanics,
        publisher: non_empty(raw.publisher),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn player_count(n: f64) -> Option<u32> {
    (1.0..=1000.0).contains(&n).then(|| n.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExtractor, MockScraper};
    use gameshelf_common::RawPage;

    const CATAN_URL: &str = "https://boardgamegeek.com/boardgame/13";

    fn catan_page() -> RawPage {
        RawPage {
            text: "# Catan\nTrade, build, settle.".into(),
            html: r#"<img src="https://cf.geekdo-images.com/x__itemrep/img/catan.jpg">"#.into(),
        }
    }

    fn catan_extraction() -> ExtractedGame {
        ExtractedGame {
            title: Some("Catan".into()),
            description: Some("  Trade and build.  ".into()),
            difficulty: Some("2 - medium light".into()),
            play_time: Some("90".into()),
            game_type: Some("Board Game".into()),
            min_players: Some(3.0),
            max_players: Some(4.0),
            suggested_age: Some("10+".into()),
            mechanics: vec!["Dice Rolling".into(), " Trading ".into(), "Dice Rolling".into(), "".into()],
            publisher: Some("KOSMOS".into()),
        }
    }

    #[tokio::test]
    async fn full_enrichment_normalizes_model_output() {
        let enricher = DetailEnricher::new(
            Arc::new(MockScraper::new().on_page(CATAN_URL, catan_page())),
            Arc::new(MockExtractor::returning(catan_extraction())),
        );

        let fields = enricher.enrich("13").await;

        assert_eq!(fields.bgg_id, "13");
        assert_eq!(fields.title.as_deref(), Some("Catan"));
        assert_eq!(fields.description.as_deref(), Some("Trade and build."));
        assert_eq!(
            fields.image_url.as_deref(),
            Some("https://cf.geekdo-images.com/x__itemrep/img/catan.jpg")
        );
        assert_eq!(fields.difficulty, Some(Difficulty::MediumLight));
        assert_eq!(fields.play_time, Some(PlayTime::Over60));
        assert_eq!(fields.game_type, Some(GameType::BoardGame));
        assert_eq!(fields.mechanics, vec!["Dice Rolling", "Trading"]);
        assert_eq!(fields.publisher.as_deref(), Some("KOSMOS"));
    }

    #[tokio::test]
    async fn scrape_failure_yields_bare_record() {
        let extractor = Arc::new(MockExtractor::returning(catan_extraction()));
        let enricher = DetailEnricher::new(Arc::new(MockScraper::new()), extractor.clone());

        let fields = enricher.enrich("13").await;

        assert_eq!(fields, EnrichedFields::bare("13"));
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn extraction_failure_keeps_scraped_image() {
        let enricher = DetailEnricher::new(
            Arc::new(MockScraper::new().on_page(CATAN_URL, catan_page())),
            Arc::new(MockExtractor::failing("model unavailable")),
        );

        let fields = enricher.enrich("13").await;

        assert_eq!(
            fields,
            EnrichedFields {
                image_url: Some("https://cf.geekdo-images.com/x__itemrep/img/catan.jpg".into()),
                ..EnrichedFields::bare("13")
            }
        );
    }

    #[tokio::test]
    async fn extractor_receives_page_text() {
        let extractor = Arc::new(MockExtractor::returning(ExtractedGame::default()));
        let enricher = DetailEnricher::new(
            Arc::new(MockScraper::new().on_page(CATAN_URL, catan_page())),
            extractor.clone(),
        );

        enricher.enrich("13").await;

        assert_eq!(extractor.seen_texts(), vec!["# Catan\nTrade, build, settle.".to_string()]);
    }

    #[test]
    fn out_of_vocabulary_buckets_are_discarded() {
        let raw = ExtractedGame {
            difficulty: Some("Brain burner".into()),
            play_time: Some("an evening".into()),
            game_type: Some("Abstract".into()),
            ..ExtractedGame::default()
        };
        let fields = normalize("1", None, raw);
        assert_eq!(fields.difficulty, None);
        assert_eq!(fields.play_time, None);
        assert_eq!(fields.game_type, None);
    }

    #[test]
    fn numeric_weight_and_swapped_player_counts() {
        let raw = ExtractedGame {
            difficulty: Some("3.9".into()),
            min_players: Some(5.0),
            max_players: Some(2.0),
            ..ExtractedGame::default()
        };
        let fields = normalize("1", None, raw);
        assert_eq!(fields.difficulty, Some(Difficulty::MediumHeavy));
        assert_eq!((fields.min_players, fields.max_players), (Some(2), Some(5)));
    }

    #[test]
    fn zero_or_negative_player_counts_are_dropped() {
        let raw = ExtractedGame {
            min_players: Some(0.0),
            max_players: Some(-3.0),
            ..ExtractedGame::default()
        };
        let fields = normalize("1", None, raw);
        assert_eq!(fields.min_players, None);
        assert_eq!(fields.max_players, None);
    }

    #[test]
    fn mixed_payload_keeps_its_valid_fields() {
        let raw: ExtractedGame = serde_json::from_str(
            r#"{"min_players":"2","max_players":5,"mechanics":null,"description":"x","difficulty":"3 - Medium"}"#,
        )
        .unwrap();
        let fields = normalize("13", None, raw);
        assert_eq!((fields.min_players, fields.max_players), (Some(2), Some(5)));
        assert_eq!(fields.description.as_deref(), Some("x"));
        assert_eq!(fields.difficulty, Some(Difficulty::Medium));
        assert!(fields.mechanics.is_empty());
    }

    #[test]
    fn detail_url_uses_configured_base() {
        let enricher = DetailEnricher::new(
            Arc::new(MockScraper::new()),
            Arc::new(MockExtractor::failing("unused")),
        )
        .with_base_url("http://bgg.local/");
        assert_eq!(enricher.detail_url("42"), "http://bgg.local/boardgame/42");
    }
}
