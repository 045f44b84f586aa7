//! Publishing platforms and their character budgets.
//!
//! The constraint table is built once at startup (optionally with limits
//! overridden from the config file) and is read-only afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::PlatformLimits;

/// Budget applied to platform ids the table does not know.
pub const DEFAULT_CHAR_LIMIT: usize = 5000;

/// Percentage of the limit at which a draft is considered near the budget.
const NEAR_PERCENT: usize = 85;

/// A target publishing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    LinkedIn,
    Instagram,
    Blog,
}

impl Platform {
    /// Every platform, in display order.
    pub const ALL: [Self; 4] = [Self::Twitter, Self::LinkedIn, Self::Instagram, Self::Blog];

    /// Stable identifier used in prompts, config keys and the CLI.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
            Self::Instagram => "instagram",
            Self::Blog => "blog",
        }
    }

    /// Human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::LinkedIn => "LinkedIn",
            Self::Instagram => "Instagram",
            Self::Blog => "Blog",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Ok(Self::Twitter),
            "linkedin" => Ok(Self::LinkedIn),
            "instagram" => Ok(Self::Instagram),
            "blog" => Ok(Self::Blog),
            other => Err(format!("Unknown platform: {other}")),
        }
    }
}

/// How close a text is to its platform budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Ok,
    Near,
    Over,
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Near => write!(f, "near limit"),
            Self::Over => write!(f, "over limit"),
        }
    }
}

/// Budget and style guidance for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConstraint {
    pub platform: Platform,
    pub char_limit: usize,
    /// Tips shown next to the editor, in order.
    pub style_hints: Vec<String>,
    /// Short summary of what works on the platform, used in prompts.
    pub features: &'static str,
}

/// Static table of platform constraints.
#[derive(Debug, Clone)]
pub struct PlatformConstraints {
    constraints: Vec<PlatformConstraint>,
    default_limit: usize,
}

impl Default for PlatformConstraints {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformConstraints {
    /// The compiled-in table.
    pub fn builtin() -> Self {
        Self::from_limits(&PlatformLimits::default())
    }

    /// Build the table, taking character limits from `limits`.
    ///
    /// A zero limit is ignored so the table never contains an empty budget.
    pub fn from_limits(limits: &PlatformLimits) -> Self {
        let pick = |value: Option<usize>, fallback: usize| value.filter(|v| *v > 0).unwrap_or(fallback);

        let constraints = vec![
            PlatformConstraint {
                platform: Platform::Twitter,
                char_limit: pick(limits.twitter, 280),
                style_hints: Vec::new(),
                features: "hashtags, brevity, and engaging calls to action",
            },
            PlatformConstraint {
                platform: Platform::LinkedIn,
                char_limit: pick(limits.linkedin, 3000),
                style_hints: vec![
                    "Professional tone works best".to_string(),
                    "Include industry insights".to_string(),
                    "End with a question to drive engagement".to_string(),
                ],
                features: "professional tone, industry insights, and thought leadership",
            },
            PlatformConstraint {
                platform: Platform::Instagram,
                char_limit: pick(limits.instagram, 2200),
                style_hints: vec![
                    "Visual language drives engagement".to_string(),
                    "Use emojis strategically".to_string(),
                    "Group hashtags at the end".to_string(),
                ],
                features: "visual descriptions, emojis, and strategic hashtag groups",
            },
            PlatformConstraint {
                platform: Platform::Blog,
                char_limit: pick(limits.blog, 10_000),
                style_hints: vec![
                    "Include a compelling headline".to_string(),
                    "Structure with headers for scanability".to_string(),
                    "Aim for 1000+ words for SEO".to_string(),
                ],
                features: "comprehensive information, clear structure, and SEO optimization",
            },
        ];

        let mut table = Self { constraints, default_limit: pick(limits.default, DEFAULT_CHAR_LIMIT) };

        // The Twitter tips quote the limit, so they are filled in after overrides apply.
        if let Some(twitter) = table.constraints.iter_mut().find(|c| c.platform == Platform::Twitter) {
            twitter.style_hints = vec![
                format!("Keep it under {} characters", twitter.char_limit),
                "Use 1-2 relevant hashtags".to_string(),
                "Include a clear call to action".to_string(),
            ];
        }

        table
    }

    /// Look up the constraint for a platform.
    pub fn get(&self, platform: Platform) -> Option<&PlatformConstraint> {
        self.constraints.iter().find(|c| c.platform == platform)
    }

    /// All constraints in display order.
    pub fn all(&self) -> &[PlatformConstraint] {
        &self.constraints
    }

    /// Budget used for unknown platform ids.
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Character limit for a platform id; unknown ids get the default budget.
    pub fn limit_for(&self, platform: &str) -> usize {
        platform
            .parse::<Platform>()
            .ok()
            .and_then(|p| self.get(p))
            .map_or(self.default_limit, |c| c.char_limit)
    }

    /// Classify a character count against the platform budget.
    pub fn warning_level(&self, char_count: usize, platform: &str) -> WarningLevel {
        let limit = self.limit_for(platform);
        if char_count > limit {
            WarningLevel::Over
        } else if char_count >= near_threshold(limit) {
            WarningLevel::Near
        } else {
            WarningLevel::Ok
        }
    }

    /// Number of characters over the budget, if any.
    pub fn overage(&self, char_count: usize, platform: &str) -> Option<usize> {
        let limit = self.limit_for(platform);
        (char_count > limit).then(|| char_count - limit)
    }

    /// Tips for a platform id (empty for unknown ids).
    pub fn style_hints(&self, platform: &str) -> &[String] {
        platform
            .parse::<Platform>()
            .ok()
            .and_then(|p| self.get(p))
            .map_or(&[][..], |c| c.style_hints.as_slice())
    }
}

/// Smallest whole character count that is at least 85% of `limit`.
fn near_threshold(limit: usize) -> usize {
    (limit * NEAR_PERCENT).div_ceil(100)
}

/// Character count in Unicode scalar values.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
