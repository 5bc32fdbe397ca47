//! Closed vocabularies for catalog attributes.
//!
//! Models are asked to answer with these exact labels, but the constraint is
//! advisory. Every value coming back is run through `normalize`, and anything
//! that does not map onto a label is dropped.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $variant:ident => $label:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        pub enum $name {
            $( #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Exact label match, ignoring case and surrounding whitespace.
            pub fn from_label(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(raw))
            }

            /// All labels joined for prompt text.
            pub fn label_list() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

label_enum! {
    /// Rules weight tier.
    pub enum Difficulty {
        Light => "1 - Light",
        MediumLight => "2 - Medium Light",
        Medium => "3 - Medium",
        MediumHeavy => "4 - Medium Heavy",
        Heavy => "5 - Heavy",
    }
}

label_enum! {
    /// Typical session length.
    pub enum PlayTime {
        UpTo15 => "0-15 Minutes",
        UpTo30 => "15-30 Minutes",
        UpTo45 => "30-45 Minutes",
        UpTo60 => "45-60 Minutes",
        Over60 => "60+ Minutes",
        Over2Hours => "2+ Hours",
        Over3Hours => "3+ Hours",
    }
}

label_enum! {
    pub enum GameType {
        BoardGame => "Board Game",
        CardGame => "Card Game",
        DiceGame => "Dice Game",
        PartyGame => "Party Game",
        WarGame => "War Game",
        Miniatures => "Miniatures",
        Rpg => "RPG",
        Other => "Other",
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Default for PlayTime {
    fn default() -> Self {
        PlayTime::UpTo60
    }
}

impl Default for GameType {
    fn default() -> Self {
        GameType::BoardGame
    }
}

impl Difficulty {
    /// Bucket an average weight on the 1–5 scale.
    pub fn from_weight(weight: f64) -> Self {
        if weight < 1.5 {
            Difficulty::Light
        } else if weight < 2.5 {
            Difficulty::MediumLight
        } else if weight < 3.5 {
            Difficulty::Medium
        } else if weight < 4.5 {
            Difficulty::MediumHeavy
        } else {
            Difficulty::Heavy
        }
    }

    /// Label, or a numeric weight within 1–5.
    pub fn normalize(raw: &str) -> Option<Self> {
        if let Some(d) = Self::from_label(raw) {
            return Some(d);
        }
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|w| (1.0..=5.0).contains(w))
            .map(Self::from_weight)
    }
}

impl PlayTime {
    /// Bucket a playing time given in minutes.
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0..=15 => PlayTime::UpTo15,
            16..=30 => PlayTime::UpTo30,
            31..=45 => PlayTime::UpTo45,
            46..=60 => PlayTime::UpTo60,
            61..=120 => PlayTime::Over60,
            121..=180 => PlayTime::Over2Hours,
            _ => PlayTime::Over3Hours,
        }
    }

    /// Label, or a bare minute count ("90", "90 min", "90 minutes").
    pub fn normalize(raw: &str) -> Option<Self> {
        if let Some(p) = Self::from_label(raw) {
            return Some(p);
        }
        let lower = raw.trim().to_ascii_lowercase();
        let digits = lower
            .strip_suffix("minutes")
            .or_else(|| lower.strip_suffix("mins"))
            .or_else(|| lower.strip_suffix("min"))
            .unwrap_or(&lower)
            .trim();
        digits.parse::<u32>().ok().map(Self::from_minutes)
    }
}

impl GameType {
    pub fn normalize(raw: &str) -> Option<Self> {
        Self::from_label(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_serde() {
        for d in Difficulty::ALL {
            let json = serde_json::to_string(d).unwrap();
            assert_eq!(json, format!("\"{}\"", d.label()));
        }
        let p: PlayTime = serde_json::from_str("\"2+ Hours\"").unwrap();
        assert_eq!(p, PlayTime::Over2Hours);
    }

    #[test]
    fn from_label_ignores_case_and_padding() {
        assert_eq!(GameType::from_label("  rpg "), Some(GameType::Rpg));
        assert_eq!(Difficulty::from_label("3 - medium"), Some(Difficulty::Medium));
        assert_eq!(GameType::from_label("Abstract"), None);
    }

    #[test]
    fn minutes_bucket_at_boundaries() {
        assert_eq!(PlayTime::from_minutes(15), PlayTime::UpTo15);
        assert_eq!(PlayTime::from_minutes(16), PlayTime::UpTo30);
        assert_eq!(PlayTime::from_minutes(60), PlayTime::UpTo60);
        assert_eq!(PlayTime::from_minutes(120), PlayTime::Over60);
        assert_eq!(PlayTime::from_minutes(180), PlayTime::Over2Hours);
        assert_eq!(PlayTime::from_minutes(181), PlayTime::Over3Hours);
    }

    #[test]
    fn weight_bucket_at_boundaries() {
        assert_eq!(Difficulty::from_weight(1.49), Difficulty::Light);
        assert_eq!(Difficulty::from_weight(1.5), Difficulty::MediumLight);
        assert_eq!(Difficulty::from_weight(3.49), Difficulty::Medium);
        assert_eq!(Difficulty::from_weight(4.5), Difficulty::Heavy);
    }

    #[test]
    fn normalize_discards_out_of_vocabulary_values() {
        assert_eq!(PlayTime::normalize("about an hour"), None);
        assert_eq!(Difficulty::normalize("brain burner"), None);
        assert_eq!(Difficulty::normalize("7.5"), None);
        assert_eq!(GameType::normalize("Legacy Game"), None);
    }

    #[test]
    fn normalize_accepts_numeric_forms() {
        assert_eq!(PlayTime::normalize("90 minutes"), Some(PlayTime::Over60));
        assert_eq!(PlayTime::normalize("45"), Some(PlayTime::UpTo45));
        assert_eq!(Difficulty::normalize("2.3"), Some(Difficulty::MediumLight));
    }

    #[test]
    fn defaults_match_catalog_fallbacks() {
        assert_eq!(Difficulty::default().label(), "3 - Medium");
        assert_eq!(PlayTime::default().label(), "45-60 Minutes");
        assert_eq!(GameType::default().label(), "Board Game");
    }
}
