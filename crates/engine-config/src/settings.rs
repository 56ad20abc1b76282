use crate::{env::EnvVars, error::SettingsError};
use model::core::timezone::{DEFAULT_TIMEZONE, is_valid_timezone};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

pub const ENV_FORMULA_MAX_DEPTH: &str = "FORMULARY_FORMULA_MAX_DEPTH";
pub const ENV_DEFAULT_TIMEZONE: &str = "FORMULARY_DEFAULT_TIMEZONE";
pub const ENV_LOG_LEVEL: &str = "FORMULARY_LOG_LEVEL";

/// Largest accepted `formula_max_depth`. Parsing and typing recurse once per
/// level, so the bound keeps both within the stack of a default thread.
pub const MAX_FORMULA_DEPTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Bound on formula nesting plus formula-to-formula references.
    pub formula_max_depth: usize,
    /// Zone used to read timestamps given without an offset.
    pub default_timezone: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            formula_max_depth: 256,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults, then the optional JSON file, then environment overrides.
    pub fn load(path: Option<&Path>, env: &EnvVars) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json(&json)?
            }
            None => Self::default(),
        };

        settings.apply_env(env)?;
        settings.validate()?;
        debug!(?settings, "Loaded engine settings");
        Ok(settings)
    }

    pub fn apply_env(&mut self, env: &EnvVars) -> Result<(), SettingsError> {
        if let Some(value) = env.get(ENV_FORMULA_MAX_DEPTH) {
            self.formula_max_depth = value.trim().parse().map_err(|_| SettingsError::InvalidEnv {
                var: ENV_FORMULA_MAX_DEPTH.to_string(),
                value: value.to_string(),
            })?;
        }
        if let Some(value) = env.get(ENV_DEFAULT_TIMEZONE) {
            self.default_timezone = value.trim().to_string();
        }
        if let Some(value) = env.get(ENV_LOG_LEVEL) {
            self.log_level = value.trim().to_string();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.formula_max_depth == 0 {
            return Err(SettingsError::ZeroDepth);
        }
        if self.formula_max_depth > MAX_FORMULA_DEPTH {
            return Err(SettingsError::DepthTooLarge {
                depth: self.formula_max_depth,
                max: MAX_FORMULA_DEPTH,
            });
        }
        if !is_valid_timezone(&self.default_timezone) {
            return Err(SettingsError::UnknownTimezone(self.default_timezone.clone()));
        }
        Ok(())
    }
}
