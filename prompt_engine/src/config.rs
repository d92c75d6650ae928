//! Engine configuration.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Errors raised while loading engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Limits and formats used during template resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of component expansion passes, also the bound on
    /// expand/resolve rounds in the engine.
    pub max_depth: u32,

    /// Maximum nesting of argument resolution inside `ifs`, `isEmpty` and the
    /// word functions.
    pub max_call_depth: u32,

    /// `chrono` format string for `{date.today}`.
    pub date_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_call_depth: 10,
            date_format: "%B %-d, %Y".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the limits allow at least one pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Validation("max_depth must be at least 1".to_string()));
        }
        if self.max_call_depth == 0 {
            return Err(ConfigError::Validation(
                "max_call_depth must be at least 1".to_string(),
            ));
        }
        if self.date_format.trim().is_empty() {
            return Err(ConfigError::Validation("date_format must not be empty".to_string()));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "date_format '{}' is not a valid strftime format",
                self.date_format
            )));
        }
        Ok(())
    }
}
