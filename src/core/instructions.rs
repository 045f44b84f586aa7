//! System instruction resolution.
//!
//! Each generation kind has a compiled-in default instruction. The user can
//! persist an override, and a single call can supply its own. Resolution is
//! first-present-wins: call override, then user override, then default.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::store::{get_or_warn, ConfigStore, StoreError};

const DEFAULT_OUTLINE_INSTRUCTION: &str = r"You are an expert content planner. Your task is to generate a detailed, well-structured content outline based on a user's description and content type.

# Goal
Create a logical structure for a piece of content (a blog post, a social media update, and so on) that helps the user write the final piece.

# Steps
1. Understand the core topic and goal from the user's description and content type.
2. Identify the key sections or points that should be covered.
3. Organize the sections logically: introduction, main points, conclusion.
4. List the key sub-points of each section as bullet points.

# Output Format
Use Markdown:
- A main heading (#) for the overall title, inferred if not provided.
- Subheadings (##) for major sections.
- Bullet points (-) for the items within each section.
- Keep the outline clear, concise and easy to follow.

# Example
Input description: A blog post about the benefits of remote work for productivity.
Output:
# The Productivity Power of Remote Work

## Introduction
- Briefly introduce the rise of remote work.
- State the thesis: remote work can boost productivity.

## Key Benefit: Increased Focus
- Fewer office distractions.
- Deep work blocks become easier.

## Conclusion
- Summarize the main productivity benefits.
- End with a call to action.
";

const DEFAULT_OPTIMIZE_INSTRUCTION: &str = r#"Rewrite or optimize the provided content for posting on a specific social media platform, keeping to the platform's style and character limits.

# Goal
Adapt the user's content to be effective and engaging on the target platform while preserving the core message.

# Constraints
- Adhere strictly to the platform character limit (Twitter: 280).
- Match the typical tone of the platform: professional for LinkedIn, concise for Twitter, visual for Instagram.

# Steps
1. Understand the main message of the original content.
2. Identify the target platform and its constraints.
3. Rewrite and condense the content for clarity, brevity and impact.
4. Add hashtags, emojis or calls to action where they suit the platform.
5. Make sure the result can be posted directly.

# Output Format
Provide only the final, optimized text for the post. No explanations or meta-commentary.

# Example (Twitter)
Input: "Our company is excited to announce the launch of our new sustainable product line, featuring eco-friendly materials and ethical production methods. Learn more on our website."
Output: "Go green with our new sustainable product line! 🌿 Eco-friendly materials & ethical production. Shop now! #Sustainable #EcoFriendly"
"#;

const DEFAULT_PERSONA_INSTRUCTION: &str = "You are a professional content writer assistant.";

/// The kind of instruction being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    /// Guides outline generation.
    Outline,
    /// Guides platform optimization.
    Optimize,
    /// The user's voice, prefixed to task instructions in composition mode.
    Persona,
}

impl InstructionKind {
    pub const ALL: [Self; 3] = [Self::Outline, Self::Optimize, Self::Persona];

    /// Key of the persisted override.
    pub fn store_key(&self) -> &'static str {
        match self {
            Self::Outline => "writer_pro_outline_instruction",
            Self::Optimize => "writer_pro_optimize_instruction",
            Self::Persona => "system_instruction",
        }
    }

    /// Compiled-in default. Never empty.
    pub fn default_instruction(&self) -> &'static str {
        match self {
            Self::Outline => DEFAULT_OUTLINE_INSTRUCTION,
            Self::Optimize => DEFAULT_OPTIMIZE_INSTRUCTION,
            Self::Persona => DEFAULT_PERSONA_INSTRUCTION,
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline => write!(f, "outline"),
            Self::Optimize => write!(f, "optimize"),
            Self::Persona => write!(f, "persona"),
        }
    }
}

impl FromStr for InstructionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "outline" => Ok(Self::Outline),
            "optimize" | "optimise" => Ok(Self::Optimize),
            "persona" | "system" => Ok(Self::Persona),
            other => Err(format!("Unknown instruction kind: {other}")),
        }
    }
}

/// Resolves and persists instruction overrides.
#[derive(Clone)]
pub struct InstructionStore {
    store: Arc<dyn ConfigStore>,
}

impl InstructionStore {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Effective instruction for `kind`.
    ///
    /// A blank call override counts as absent, and so does an unreadable store.
    pub fn resolve(&self, kind: InstructionKind, call_override: Option<&str>) -> String {
        if let Some(text) = call_override.filter(|t| !t.trim().is_empty()) {
            return text.to_string();
        }
        self.user_override(kind).unwrap_or_else(|| kind.default_instruction().to_string())
    }

    /// The persisted override, if one is set.
    pub fn user_override(&self, kind: InstructionKind) -> Option<String> {
        get_or_warn(self.store.as_ref(), kind.store_key())
    }

    /// Persist an override for `kind`.
    pub fn save(&self, kind: InstructionKind, text: &str) -> Result<(), StoreError> {
        tracing::debug!(%kind, "Saving instruction override");
        self.store.set(kind.store_key(), text)
    }

    /// Drop the override so the compiled default applies again.
    pub fn reset_to_default(&self, kind: InstructionKind) -> Result<(), StoreError> {
        tracing::debug!(%kind, "Resetting instruction to default");
        self.store.remove(kind.store_key())
    }

    /// Persona + task composition: the resolved persona, a blank line, then
    /// the fixed task instruction.
    pub fn compose(&self, task_instruction: &str) -> String {
        let persona = self.resolve(InstructionKind::Persona, None);
        format!("{}\n\n{}", persona.trim_end(), task_instruction.trim())
    }
}

impl fmt::Debug for InstructionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    fn store() -> InstructionStore {
        InstructionStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_defaults_are_non_empty() {
        for kind in InstructionKind::ALL {
            assert!(!kind.default_instruction().trim().is_empty());
        }
    }

    #[test]
    fn test_resolve_precedence() {
        let instructions = store();
        let kind = InstructionKind::Outline;

        assert_eq!(instructions.resolve(kind, None), kind.default_instruction());

        instructions.save(kind, "user outline").unwrap();
        assert_eq!(instructions.resolve(kind, None), "user outline");
        assert_eq!(instructions.resolve(kind, Some("call outline")), "call outline");
        assert_eq!(instructions.resolve(kind, Some("  ")), "user outline");
    }

    #[test]
    fn test_overrides_are_per_kind() {
        let instructions = store();
        instructions.save(InstructionKind::Optimize, "optimize override").unwrap();
        assert_eq!(
            instructions.resolve(InstructionKind::Outline, None),
            InstructionKind::Outline.default_instruction()
        );
    }

    #[test]
    fn test_reset_removes_override() {
        let backing = Arc::new(MemoryStore::new());
        let instructions = InstructionStore::new(backing.clone());

        instructions.save(InstructionKind::Optimize, "custom").unwrap();
        instructions.reset_to_default(InstructionKind::Optimize).unwrap();

        assert_eq!(backing.get(InstructionKind::Optimize.store_key()).unwrap(), None);
        assert_eq!(
            instructions.resolve(InstructionKind::Optimize, None),
            InstructionKind::Optimize.default_instruction()
        );
    }

    #[test]
    fn test_empty_saved_override_falls_back_to_default() {
        let instructions = store();
        instructions.save(InstructionKind::Outline, "").unwrap();
        assert!(!instructions.resolve(InstructionKind::Outline, None).is_empty());
    }

    #[test]
    fn test_compose_persona_and_task() {
        let instructions = store();
        assert_eq!(
            instructions.compose("Write for Twitter."),
            format!("{}\n\nWrite for Twitter.", DEFAULT_PERSONA_INSTRUCTION)
        );

        instructions.save(InstructionKind::Persona, "I write like a pirate.").unwrap();
        assert_eq!(instructions.compose("Write for Twitter."), "I write like a pirate.\n\nWrite for Twitter.");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Outline".parse::<InstructionKind>(), Ok(InstructionKind::Outline));
        assert_eq!("system".parse::<InstructionKind>(), Ok(InstructionKind::Persona));
        assert!("summary".parse::<InstructionKind>().is_err());
    }
}
