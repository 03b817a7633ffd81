//! Guard configuration.
//!
//! Settings are read from `MODEL_GUARD_`-prefixed environment variables,
//! optionally seeded from a `.env` file:
//!
//! ```text
//! MODEL_GUARD_AUTO_VALIDATE=false
//! MODEL_GUARD_LENIENT_RULES=true
//! MODEL_GUARD_LOG_RULES=true
//! ```

use serde::Deserialize;

/// Environment variable prefix for [`GuardConfig::from_env`].
pub const ENV_PREFIX: &str = "MODEL_GUARD_";

/// Runtime switches for a [`ModelGuard`](crate::ModelGuard).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuardConfig {
    /// Run validation from the lifecycle hooks. When `false`, hooks pass
    /// every model through untouched.
    #[serde(default = "default_true")]
    pub auto_validate: bool,
    /// Skip rule tokens the bundled engine does not know instead of failing.
    #[serde(default)]
    pub lenient_rules: bool,
    /// Log each assembled rule set at debug level.
    #[serde(default)]
    pub log_rules: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            auto_validate: true,
            lenient_rules: false,
            log_rules: false,
        }
    }
}

/// Error type for configuration loading failures.
#[cfg(feature = "config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable deserialization failed.
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),
}

#[cfg(feature = "config")]
impl GuardConfig {
    /// Read the configuration from `MODEL_GUARD_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<GuardConfig>()?)
    }

    /// Load a `.env` file if there is one, then read the environment.
    ///
    /// Existing environment variables take precedence over `.env` values.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Like [`load`](Self::load), with an explicit `.env` path.
    pub fn load_from<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let _ = dotenvy::from_path(path);
        Self::from_env()
    }
}
