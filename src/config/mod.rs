//! Configuration module
//!
//! Engine settings loaded from a file, overlaid with environment variables
//! and finally with command-line flags.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::LogLevel;

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run every bundle serially, even those declared parallel
    pub force_serial: bool,

    /// Maximum concurrently running specs in parallel bundles
    pub max_concurrent: Option<usize>,

    /// Diagnostic log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            force_serial: false,
            max_concurrent: None,
            log_level: "warn".to_string(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == Some(0) {
            anyhow::bail!("max_concurrent must be at least 1");
        }
        self.log_level
            .parse::<LogLevel>()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    }

    /// Overlay environment variables on top of this configuration.
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(serial) = env.serial {
            self.force_serial = serial;
        }
        if let Some(limit) = env.max_concurrent {
            self.max_concurrent = Some(limit);
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        self
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or_default()
    }
}

/// Check if file is YAML based on extension
pub(crate) fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
