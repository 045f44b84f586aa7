//! Content type presets offered on the first step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A preset kind of post the user can pick instead of (or alongside) a
/// free-text description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[serde(rename = "latest-news")]
    News,
    Motivation,
    Info,
    VibeCheck,
    #[serde(rename = "surprise-me")]
    Surprise,
}

impl ContentType {
    /// Every preset, in display order.
    pub const ALL: [Self; 5] =
        [Self::News, Self::Motivation, Self::Info, Self::VibeCheck, Self::Surprise];

    /// Stable identifier used in prompts and the CLI.
    pub fn id(&self) -> &'static str {
        match self {
            Self::News => "latest-news",
            Self::Motivation => "motivation",
            Self::Info => "info",
            Self::VibeCheck => "vibe-check",
            Self::Surprise => "surprise-me",
        }
    }

    /// Label shown on the preset card.
    pub fn label(&self) -> &'static str {
        match self {
            Self::News => "News",
            Self::Motivation => "Motivation",
            Self::Info => "Information",
            Self::VibeCheck => "Vibe Check",
            Self::Surprise => "Surprise Me",
        }
    }

    /// Description filled in when the preset is picked.
    pub fn preset_description(&self) -> &'static str {
        match self {
            Self::News => "Share the latest news and updates about trending topics",
            Self::Motivation => "Inspirational message to motivate followers",
            Self::Info => "Educational content providing valuable information",
            Self::VibeCheck => "Casual check-in with followers about current mood",
            Self::Surprise => "Something unexpected and creative",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest-news" | "news" => Ok(Self::News),
            "motivation" => Ok(Self::Motivation),
            "info" | "information" => Ok(Self::Info),
            "vibe-check" | "vibecheck" => Ok(Self::VibeCheck),
            "surprise-me" | "surprise" => Ok(Self::Surprise),
            other => Err(format!("Unknown content type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip_through_from_str() {
        for ct in ContentType::ALL {
            assert_eq!(ct.id().parse::<ContentType>(), Ok(ct));
        }
        assert_eq!("News".parse::<ContentType>(), Ok(ContentType::News));
        assert!("poetry".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&ContentType::VibeCheck).unwrap();
        assert_eq!(json, "\"vibe-check\"");
        let parsed: ContentType = serde_json::from_str("\"latest-news\"").unwrap();
        assert_eq!(parsed, ContentType::News);
    }

    #[test]
    fn test_preset_descriptions_are_non_empty() {
        for ct in ContentType::ALL {
            assert!(!ct.preset_description().is_empty());
        }
    }
}
