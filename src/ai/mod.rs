//! Remote text generation.
//!
//! Each workflow stage hands a [`GenerationRequest`] to a
//! [`GenerationChain`], which tries its remote providers in order and falls
//! through to the deterministic local generator when none succeeds.
//!
//! ## Tiers
//!
//! - `enhanced` - premium model with persona + task instruction composition
//! - `standard` - configured model with override-wins instructions
//! - `local` - offline templates, always available

mod chain;
mod prompts;

#[cfg(feature = "ai")]
mod enhanced;
#[cfg(feature = "ai")]
mod openai;

pub use chain::{GenerationChain, GenerationOutcome};
pub use prompts::{enhanced_task_instruction, optimize_prompt, outline_prompt, platform_content_prompt};

#[cfg(feature = "ai")]
pub use enhanced::EnhancedProvider;
#[cfg(feature = "ai")]
pub use openai::{OpenAIProvider, RequestParams};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ContentType, InstructionKind, Platform};

/// Which tier produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationTier {
    Enhanced,
    Standard,
    Local,
}

impl fmt::Display for GenerationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enhanced => write!(f, "enhanced"),
            Self::Standard => write!(f, "standard"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// One generation call. Built fresh per call and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Source text: the description for outlines, the outline for drafts.
    pub prompt: String,
    /// Outline or Optimize.
    pub kind: InstructionKind,
    /// Resolved system instruction for `kind`.
    pub instruction: String,
    /// Instruction supplied for this call only. Takes precedence in every
    /// tier, including the enhanced tier's persona composition.
    pub instruction_override: Option<String>,
    pub platform: Option<Platform>,
    pub content_type: Option<ContentType>,
}

impl GenerationRequest {
    pub fn outline(
        description: impl Into<String>,
        content_type: Option<ContentType>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            prompt: description.into(),
            kind: InstructionKind::Outline,
            instruction: instruction.into(),
            instruction_override: None,
            platform: None,
            content_type,
        }
    }

    pub fn optimize(
        text: impl Into<String>,
        platform: Platform,
        content_type: Option<ContentType>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            prompt: text.into(),
            kind: InstructionKind::Optimize,
            instruction: instruction.into(),
            instruction_override: None,
            platform: Some(platform),
            content_type,
        }
    }

    /// Record a per-call instruction. Blank text is ignored.
    pub fn with_override(mut self, call_override: Option<&str>) -> Self {
        self.instruction_override =
            call_override.map(str::trim).filter(|t| !t.is_empty()).map(String::from);
        self
    }
}

/// Category of a generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// No access credential is configured.
    MissingCredential,
    /// Network failure or non-success response.
    TransportFailure,
    /// The response could not be understood or carried no text.
    MalformedResponse,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing credential"),
            Self::TransportFailure => write!(f, "transport failure"),
            Self::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

/// A failed generation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    /// HTTP status, when the endpoint answered.
    pub status: Option<u16>,
    pub message: String,
}

impl GenerationError {
    pub fn missing_credential() -> Self {
        Self {
            kind: GenerationErrorKind::MissingCredential,
            status: None,
            message: "API key not found. Please add it in the configuration settings.".to_string(),
        }
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self { kind: GenerationErrorKind::TransportFailure, status, message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self { kind: GenerationErrorKind::MalformedResponse, status: None, message: message.into() }
    }
}

/// A remote generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Produce text for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Tier reported when this provider produces the result.
    fn tier(&self) -> GenerationTier;

    /// Whether the provider takes part in requests of this kind.
    fn supports(&self, _kind: InstructionKind) -> bool {
        true
    }

    /// Provider name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_constructors() {
        let outline = GenerationRequest::outline("desc", Some(ContentType::News), "inst");
        assert_eq!(outline.kind, InstructionKind::Outline);
        assert_eq!(outline.platform, None);

        let optimize = GenerationRequest::optimize("text", Platform::Blog, None, "inst");
        assert_eq!(optimize.kind, InstructionKind::Optimize);
        assert_eq!(optimize.platform, Some(Platform::Blog));
        assert_eq!(optimize.instruction_override, None);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let request = GenerationRequest::optimize("text", Platform::Blog, None, "inst");
        assert_eq!(request.clone().with_override(Some("  ")).instruction_override, None);
        assert_eq!(
            request.with_override(Some("Be bold")).instruction_override.as_deref(),
            Some("Be bold")
        );
    }

    #[test]
    fn test_error_display() {
        let err = GenerationError::transport(Some(503), "Service Unavailable");
        assert_eq!(err.to_string(), "transport failure: Service Unavailable");
        assert_eq!(GenerationError::missing_credential().kind, GenerationErrorKind::MissingCredential);
    }
}
