//! Configuration management for Writer Pro.
//!
//! Handles loading and saving configuration from TOML files. User-editable
//! runtime settings (credential, instruction overrides) live in the separate
//! key/value [`FileStore`](super::FileStore).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Generation endpoint settings
    pub ai: AiConfig,

    /// Character limit overrides
    pub platforms: PlatformLimits,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Platform preselected when none is given (twitter, linkedin, instagram, blog)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_platform: Option<String>,
}

/// Generation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Whether remote generation is attempted at all
    pub enabled: bool,

    /// Base URL of the chat completions API
    pub base_url: String,

    /// Model used by the standard tier (overridable from the settings store)
    pub model: String,

    /// Sampling temperature for the standard tier
    pub temperature: f32,

    /// Maximum output tokens for the standard tier
    pub max_tokens: u32,

    /// Whether the enhanced tier is tried before the standard one when optimizing
    pub enhanced: bool,

    /// Enhanced tier parameters
    pub enhanced_params: EnhancedConfig,
}

/// Parameters for the enhanced tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedConfig {
    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Nucleus sampling
    pub top_p: f32,
}

/// Per-platform character limit overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog: Option<usize>,
    /// Budget for platforms not in the table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<usize>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            enhanced: true,
            enhanced_params: EnhancedConfig::default(),
        }
    }
}

impl Default for EnhancedConfig {
    fn default() -> Self {
        Self { model: "gpt-4o".to_string(), temperature: 1.0, max_tokens: 2048, top_p: 1.0 }
    }
}

impl GeneralConfig {
    /// The configured default platform, if it names a known platform.
    pub fn default_platform(&self) -> Option<Platform> {
        self.default_platform.as_deref().and_then(|p| p.parse().ok())
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.writer-pro.toml` in current directory
    /// 2. `~/.config/writer-pro/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".writer-pro.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        std::fs::create_dir_all(&config_dir)?;

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_dir.join("config.toml"), content)?;

        Ok(())
    }

    /// Get the config directory path.
    ///
    /// `WRITER_PRO_CONFIG_DIR` takes precedence over the platform default.
    pub fn config_dir() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os("WRITER_PRO_CONFIG_DIR") {
            return Some(PathBuf::from(dir));
        }
        dirs::config_dir().map(|d| d.join("writer-pro"))
    }
}
