//! # Writer Pro
//!
//! Guided content creation for social platforms - describe, outline, adapt, publish.
//!
//! Writer Pro walks a piece of content through a fixed sequence of steps: a
//! description (or a preset), a generated outline, a target platform, and a
//! platform-adapted draft. Each generation step calls a remote model and
//! falls back to deterministic local templates, so the workflow never gets
//! stuck when the service is down or no API key is configured.
//!
//! ## Features
//!
//! - **Two-tier generation**: premium model first, standard model second, local templates last
//! - **Platform budgets**: character limits and near-limit warnings for Twitter, LinkedIn, Instagram and blogs
//! - **Instruction overrides**: per-call, persisted, or compiled-in system instructions
//! - **Offline mode**: every step works without network access
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a post
//! writer-pro create "Our team shipped dark mode" --platform linkedin
//!
//! # Or use the short alias
//! wp count "Hello world" --platform twitter
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::redundant_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unnecessary_literal_bound)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::format_push_string)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::use_self)]

pub mod ai;
pub mod core;

pub use ai::{
    GenerationChain, GenerationError, GenerationErrorKind, GenerationOutcome, GenerationProvider,
    GenerationRequest, GenerationTier,
};

#[cfg(feature = "ai")]
pub use ai::{EnhancedProvider, OpenAIProvider};

// Re-export commonly used types
pub use core::{
    Config, ContentType, FallbackGenerator, InstructionKind, InstructionStore, Platform,
    PlatformConstraints, WarningLevel, WorkflowEngine, WorkflowError, WorkflowState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "writer-pro";

/// Short alias
pub const APP_ALIAS: &str = "wp";
