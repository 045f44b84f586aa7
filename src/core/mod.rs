//! Core types and functionality for Writer Pro.
//!
//! This module contains the workflow engine and everything it reads:
//! platform budgets, content presets, instruction resolution, the persisted
//! key/value store, configuration, and the offline fallback generator.

mod config;
mod content;
mod fallback;
mod instructions;
mod platform;
mod store;
mod workflow;

pub use config::{AiConfig, Config, EnhancedConfig, GeneralConfig, PlatformLimits};
pub use content::ContentType;
pub use fallback::FallbackGenerator;
pub use instructions::{InstructionKind, InstructionStore};
pub use platform::{
    char_count, Platform, PlatformConstraint, PlatformConstraints, WarningLevel, DEFAULT_CHAR_LIMIT,
};
pub use store::{
    get_or_warn, ConfigStore, FileStore, MemoryStore, StoreError, API_KEY_KEY,
    DEFAULT_PLATFORM_KEY, MODEL_KEY,
};
pub use workflow::{
    LastError, Operation, Step, ValidationError, WorkflowEngine, WorkflowError, WorkflowState,
};
