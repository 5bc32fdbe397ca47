use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::types::ImportOptions;

/// Which source adapter builds the candidate list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    Csv,
    BggCollection,
    BggLinks,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One invocation of the import pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub mode: ImportMode,
    #[serde(default)]
    pub csv_data: Option<String>,
    #[serde(default)]
    pub bgg_username: Option<String>,
    #[serde(default)]
    pub bgg_links: Option<Vec<String>>,
    #[serde(default)]
    pub enhance_with_bgg: bool,
    #[serde(default)]
    pub default_options: Option<ImportOptions>,
}

/// A validated, mode-specific payload borrowed from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource<'a> {
    Tabular(&'a str),
    Collection(&'a str),
    Links(&'a [String]),
}

impl ImportRequest {
    pub fn csv(data: impl Into<String>) -> Self {
        Self {
            mode: ImportMode::Csv,
            csv_data: Some(data.into()),
            ..Self::default()
        }
    }

    pub fn collection(username: impl Into<String>) -> Self {
        Self {
            mode: ImportMode::BggCollection,
            bgg_username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn links(links: Vec<String>) -> Self {
        Self {
            mode: ImportMode::BggLinks,
            bgg_links: Some(links),
            ..Self::default()
        }
    }

    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enhance_with_bgg = enabled;
        self
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.default_options = Some(options);
        self
    }

    /// Resolve the mode and its payload, or fail the whole batch.
    pub fn source(&self) -> Result<CandidateSource<'_>, ImportError> {
        match self.mode {
            ImportMode::Csv => self
                .csv_data
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(CandidateSource::Tabular)
                .ok_or(ImportError::MissingPayload("csv_data")),
            ImportMode::BggCollection => self
                .bgg_username
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(CandidateSource::Collection)
                .ok_or(ImportError::MissingPayload("bgg_username")),
            ImportMode::BggLinks => self
                .bgg_links
                .as_deref()
                .filter(|links| !links.is_empty())
                .map(CandidateSource::Links)
                .ok_or(ImportError::MissingPayload("bgg_links")),
            ImportMode::Unknown => Err(ImportError::InvalidMode),
        }
    }

    pub fn options(&self) -> ImportOptions {
        self.default_options.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mode_deserializes_and_is_rejected() {
        let req: ImportRequest =
            serde_json::from_str(r#"{ "mode": "spreadsheet", "csv_data": "title\nCatan" }"#).unwrap();
        assert_eq!(req.mode, ImportMode::Unknown);
        assert!(matches!(req.source(), Err(ImportError::InvalidMode)));
    }

    #[test]
    fn missing_mode_is_invalid() {
        let req: ImportRequest = serde_json::from_str("{}").unwrap();
        assert!(matches!(req.source(), Err(ImportError::InvalidMode)));
    }

    #[test]
    fn empty_payloads_are_missing() {
        assert!(matches!(
            ImportRequest::csv("   ").source(),
            Err(ImportError::MissingPayload("csv_data"))
        ));
        assert!(matches!(
            ImportRequest::collection("").source(),
            Err(ImportError::MissingPayload("bgg_username"))
        ));
        assert!(matches!(
            ImportRequest::links(vec![]).source(),
            Err(ImportError::MissingPayload("bgg_links"))
        ));
    }

    #[test]
    fn request_round_trips_wire_shape() {
        let req: ImportRequest = serde_json::from_str(
            r#"{
                "mode": "bgg_links",
                "bgg_links": ["https://boardgamegeek.com/boardgame/13/catan"],
                "enhance_with_bgg": true,
                "default_options": { "is_coming_soon": true }
            }"#,
        )
        .unwrap();
        assert!(req.enhance_with_bgg);
        assert!(req.options().is_coming_soon);
        match req.source().unwrap() {
            CandidateSource::Links(links) => assert_eq!(links.len(), 1),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn collection_handle_is_trimmed() {
        let req = ImportRequest::collection("  alice ");
        assert_eq!(req.source().unwrap(), CandidateSource::Collection("alice"));
    }
}
