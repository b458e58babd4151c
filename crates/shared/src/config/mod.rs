// Configuration module
// Reads INI-style configuration files with environment variable overrides

use std::path::Path;

use anyhow::Context;
use configparser::ini::Ini;

/// Environment prefix used by the stitcher binary
pub const ENV_PREFIX: &str = "STITCHER_";

/// Configuration file reader
///
/// Lookups go `<PREFIX><SECTION>_<KEY>` in the environment first, then the
/// `[section] key = value` entry of the loaded file. Section and key names
/// are case-insensitive in the file.
pub struct Config {
    ini: Ini,
    env_prefix: String,
}

impl Config {
    pub fn new(env_prefix: &str) -> Self {
        // `#` stays part of the value so hex colors like `#FF00FF` survive
        let mut defaults = Ini::new().defaults();
        defaults.comment_symbols = vec![';'];
        Config {
            ini: Ini::new_from_defaults(defaults),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Load configuration from a file
    pub fn load(path: &Path, env_prefix: &str) -> anyhow::Result<Self> {
        let mut config = Self::new(env_prefix);
        config
            .ini
            .load(path)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Could not read configuration file {}", path.display()))?;
        Ok(config)
    }

    /// Parse configuration from an in-memory string
    pub fn parse_str(content: &str, env_prefix: &str) -> anyhow::Result<Self> {
        let mut config = Self::new(env_prefix);
        config
            .ini
            .read(content.to_string())
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    /// Check if a key is set
    pub fn is_set(&self, section: &str, key: &str) -> bool {
        self.get_env_or_config(section, key).is_some()
    }

    /// Get a string value with a default
    pub fn get_string_default(&self, section: &str, key: &str, default: &str) -> String {
        self.get_env_or_config(section, key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get a boolean value with a default
    pub fn get_bool_default(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get_env_or_config(section, key) {
            Some(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"),
            None => default,
        }
    }

    /// Get an integer value with a default; unparsable values are an error
    pub fn get_int_default(&self, section: &str, key: &str, default: i32) -> anyhow::Result<i32> {
        match self.get_env_or_config(section, key) {
            Some(val) => val
                .parse()
                .with_context(|| format!("[{}] {} is not an integer: {:?}", section, key, val)),
            None => Ok(default),
        }
    }

    /// Get a float value with a default; unparsable values are an error
    pub fn get_float_default(&self, section: &str, key: &str, default: f32) -> anyhow::Result<f32> {
        match self.get_env_or_config(section, key) {
            Some(val) => val
                .parse()
                .with_context(|| format!("[{}] {} is not a number: {:?}", section, key, val)),
            None => Ok(default),
        }
    }

    /// Try environment variable first, then config file
    fn get_env_or_config(&self, section: &str, key: &str) -> Option<String> {
        if !self.env_prefix.is_empty() {
            let env_key = format!("{}{}_{}", self.env_prefix, section, key).to_uppercase();
            if let Ok(val) = std::env::var(&env_key) {
                return Some(val);
            }
        }

        self.ini
            .get(section, key)
            .map(|v| v.trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("");
        assert_eq!(config.get_int_default("render", "nonexistent", 42).unwrap(), 42);
        assert_eq!(config.get_string_default("render", "nonexistent", "hello"), "hello");
        assert!(config.get_bool_default("render", "nonexistent", true));
        assert!(!config.is_set("render", "nonexistent"));
    }

    #[test]
    fn test_sections_and_quotes() {
        let config = Config::parse_str(
            "[render]\nColorKey = \"FF00FF\"\nMinZoom = -2\nBackdropBlur = 2.5\n\n[logging]\nDir = logs\n",
            "",
        )
        .unwrap();
        assert_eq!(config.get_string_default("render", "ColorKey", ""), "FF00FF");
        assert_eq!(config.get_int_default("render", "MinZoom", 0).unwrap(), -2);
        assert_eq!(config.get_float_default("render", "BackdropBlur", 0.0).unwrap(), 2.5);
        assert_eq!(config.get_string_default("logging", "Dir", ""), "logs");
        assert!(!config.is_set("logging", "ColorKey"));
    }

    #[test]
    fn test_hash_is_not_a_comment() {
        let config = Config::parse_str("; render options\n[render]\nColorKey = #00FF00\n", "").unwrap();
        assert_eq!(config.get_string_default("render", "ColorKey", ""), "#00FF00");
        assert!(config.is_set("render", "ColorKey"));
    }

    #[test]
    fn test_bad_integer_is_an_error() {
        let config = Config::parse_str("[render]\nMaxZoom = three\n", "").unwrap();
        assert!(config.get_int_default("render", "MaxZoom", 3).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stitcher.conf");
        std::fs::write(&path, "[basemap]\nSurfaceCenterX = 100\n").unwrap();

        let config = Config::load(&path, "").unwrap();
        assert_eq!(config.get_int_default("basemap", "SurfaceCenterX", 0).unwrap(), 100);
        assert!(Config::load(&dir.path().join("missing.conf"), "").is_err());
    }
}
