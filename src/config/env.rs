//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "CHLORINE";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Force serial execution from CHLORINE_SERIAL
    pub serial: Option<bool>,
    /// Concurrency bound from CHLORINE_MAX_CONCURRENT
    pub max_concurrent: Option<usize>,
    /// Log level from CHLORINE_LOG
    pub log_level: Option<String>,
    /// Config file from CHLORINE_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        Self {
            serial: get("SERIAL").map(|v| parse_bool(&v)),
            max_concurrent: get("MAX_CONCURRENT").and_then(|v| v.parse().ok()),
            log_level: get("LOG"),
            config_file: get("CONFIG"),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all CHLORINE environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_SERIAL          Run parallel bundles serially (true/false)");
    println!("  {ENV_PREFIX}_MAX_CONCURRENT  Maximum specs running at once");
    println!("  {ENV_PREFIX}_LOG             Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_CONFIG          Path to configuration file");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::from_lookup(lookup(&[]));
        assert!(config.serial.is_none());
        assert!(config.max_concurrent.is_none());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_env_values() {
        let config = EnvConfig::from_lookup(lookup(&[
            ("CHLORINE_SERIAL", "yes"),
            ("CHLORINE_MAX_CONCURRENT", "4"),
            ("CHLORINE_LOG", "debug"),
            ("CHLORINE_CONFIG", "/tmp/chlorine.yaml"),
        ]));
        assert_eq!(config.serial, Some(true));
        assert_eq!(config.max_concurrent, Some(4));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.config_file.as_deref(), Some("/tmp/chlorine.yaml"));
    }

    #[test]
    fn test_env_bool_parsing() {
        for (raw, expected) in [("1", true), ("ON", true), ("false", false), ("no", false)] {
            let config = EnvConfig::from_lookup(lookup(&[("CHLORINE_SERIAL", raw)]));
            assert_eq!(config.serial, Some(expected), "value {raw}");
        }
    }

    #[test]
    fn test_invalid_number_ignored() {
        let config = EnvConfig::from_lookup(lookup(&[("CHLORINE_MAX_CONCURRENT", "many")]));
        assert_eq!(config.max_concurrent, None);
    }
}
