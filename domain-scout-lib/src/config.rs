//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and merging
//! configurations with proper precedence rules.

use crate::error::DomainScoutError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// This represents the structure of configuration files that users can create
/// to set default values, pin WHOIS servers, and point at the listings store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// WHOIS server overrides, keyed by suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<HashMap<String, String>>,

    /// Listings store configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listings: Option<ListingsConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Candidate suffix set for probes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffixes: Option<Vec<String>>,

    /// Suffix applied to dotless input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_suffix: Option<String>,

    /// Default per-lookup timeout (as string, e.g., "5s", "500ms", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Retry failed lookups once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,
}

/// Listings store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListingsConfig {
    /// Path to the SQLite database file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Emit JSON instead of styled text by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Pretty-print JSON output by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to emit warnings for config issues
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if parsing fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainScoutError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainScoutError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainScoutError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig =
            toml::from_str(&content).map_err(|e| DomainScoutError::ConfigError {
                message: format!("Failed to parse TOML configuration: {}", e),
            })?;

        // Validate the loaded configuration
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Looks for configuration files in standard locations and merges them
    /// according to precedence rules.
    ///
    /// # Returns
    ///
    /// Merged configuration from all discovered files.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainScoutError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        // 1. Load XDG config (lowest precedence)
        if let Some(xdg_path) = self.get_xdg_config_path() {
            if let Ok(config) = self.load_file(&xdg_path) {
                merged_config = self.merge_configs(merged_config, config);
                loaded_files.push(xdg_path);
            }
        }

        // 2. Load home config
        if let Some(home_path) = self.get_home_config_path() {
            if let Ok(config) = self.load_file(&home_path) {
                merged_config = self.merge_configs(merged_config, config);
                loaded_files.push(home_path);
            }
        }

        // 3. Load local config (highest precedence)
        if let Some(local_path) = self.get_local_config_path() {
            if let Ok(config) = self.load_file(&local_path) {
                merged_config = self.merge_configs(merged_config, config);
                loaded_files.push(local_path);
            }
        }

        for path in &loaded_files {
            tracing::debug!(path = %path.display(), "loaded configuration file");
        }

        // Warn about multiple config files if verbose
        if self.verbose && loaded_files.len() > 1 {
            eprintln!("⚠️  Multiple config files found. Merged in precedence order:");
            for path in &loaded_files {
                eprintln!("   {}", path.display());
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    ///
    /// Looks for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-scout.toml", "./.domain-scout.toml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }

        None
    }

    /// Get the home-directory configuration file path.
    fn get_home_config_path(&self) -> Option<PathBuf> {
        if let Some(home) = env::var_os("HOME") {
            let candidates = [".domain-scout.toml", "domain-scout.toml"];

            for candidate in &candidates {
                let path = Path::new(&home).join(candidate);
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Get the XDG configuration file path.
    ///
    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-scout").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    // Merge defaults with higher precedence winning
                    if higher_defaults.suffixes.is_some() {
                        lower_defaults.suffixes = higher_defaults.suffixes;
                    }
                    if higher_defaults.default_suffix.is_some() {
                        lower_defaults.default_suffix = higher_defaults.default_suffix;
                    }
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.retry.is_some() {
                        lower_defaults.retry = higher_defaults.retry;
                    }
                    Some(lower_defaults)
                }
                (None, Some(higher_defaults)) => Some(higher_defaults),
                (Some(lower_defaults), None) => Some(lower_defaults),
                (None, None) => None,
            },
            servers: match (lower.servers, higher.servers) {
                (Some(mut lower_servers), Some(higher_servers)) => {
                    // Merge server overrides, higher precedence wins for conflicts
                    lower_servers.extend(higher_servers);
                    Some(lower_servers)
                }
                (None, Some(higher_servers)) => Some(higher_servers),
                (Some(lower_servers), None) => Some(lower_servers),
                (None, None) => None,
            },
            listings: higher.listings.or(lower.listings),
            output: match (lower.output, higher.output) {
                (Some(mut lower_output), Some(higher_output)) => {
                    if higher_output.json.is_some() {
                        lower_output.json = higher_output.json;
                    }
                    if higher_output.pretty.is_some() {
                        lower_output.pretty = higher_output.pretty;
                    }
                    Some(lower_output)
                }
                (None, Some(higher_output)) => Some(higher_output),
                (Some(lower_output), None) => Some(lower_output),
                (None, None) => None,
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainScoutError> {
        if let Some(defaults) = &config.defaults {
            // Validate timeout format
            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(DomainScoutError::ConfigError {
                        message: format!(
                            "Invalid timeout format '{}'. Use format like '5s', '500ms', '2m'",
                            timeout_str
                        ),
                    });
                }
            }

            // Basic suffix format validation
            if let Some(suffixes) = &defaults.suffixes {
                if suffixes.is_empty() {
                    return Err(DomainScoutError::ConfigError {
                        message: "Suffix list cannot be empty".to_string(),
                    });
                }

                for suffix in suffixes {
                    if suffix.trim().is_empty() || suffix.contains(char::is_whitespace) {
                        return Err(DomainScoutError::ConfigError {
                            message: format!("Invalid suffix '{}' in defaults", suffix),
                        });
                    }
                }
            }

            if let Some(default_suffix) = &defaults.default_suffix {
                if default_suffix.trim().is_empty()
                    || default_suffix.contains(char::is_whitespace)
                {
                    return Err(DomainScoutError::ConfigError {
                        message: format!("Invalid default suffix '{}'", default_suffix),
                    });
                }
            }
        }

        // Validate server overrides
        if let Some(servers) = &config.servers {
            for (suffix, server) in servers {
                if suffix.trim().is_empty() {
                    return Err(DomainScoutError::ConfigError {
                        message: "Server override suffixes cannot be empty".to_string(),
                    });
                }

                if server.trim().is_empty() {
                    return Err(DomainScoutError::ConfigError {
                        message: format!("Server override for '{}' cannot be empty", suffix),
                    });
                }
            }
        }

        if let Some(listings) = &config.listings {
            if let Some(database) = &listings.database {
                if database.trim().is_empty() {
                    return Err(DomainScoutError::ConfigError {
                        message: "Listings database path cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DS_* environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub suffixes: Option<Vec<String>>,
    pub default_suffix: Option<String>,
    pub timeout: Option<String>,
    pub retry: Option<bool>,
    pub database: Option<String>,
    pub config: Option<String>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
}

/// Load configuration from environment variables.
///
/// Parses all DS_* environment variables and returns a structured configuration.
/// Invalid values are logged as warnings and ignored.
///
/// # Arguments
///
/// * `verbose` - Whether to log environment variable usage
///
/// # Returns
///
/// Parsed environment configuration with validated values.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    let mut env_config = EnvConfig::default();

    // DS_SUFFIX - comma-separated candidate suffix list
    if let Ok(suffix_str) = env::var("DS_SUFFIX") {
        let suffixes: Vec<String> = suffix_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !suffixes.is_empty() {
            env_config.suffixes = Some(suffixes);
            if verbose {
                println!("🔧 Using DS_SUFFIX={}", suffix_str);
            }
        }
    }

    // DS_DEFAULT_SUFFIX - suffix applied to dotless input
    if let Ok(suffix) = env::var("DS_DEFAULT_SUFFIX") {
        if !suffix.trim().is_empty() {
            env_config.default_suffix = Some(suffix.clone());
            if verbose {
                println!("🔧 Using DS_DEFAULT_SUFFIX={}", suffix);
            }
        }
    }

    // DS_TIMEOUT - per-lookup timeout
    if let Ok(timeout_str) = env::var("DS_TIMEOUT") {
        // Validate timeout format
        if parse_timeout_string(&timeout_str).is_some() {
            env_config.timeout = Some(timeout_str.clone());
            if verbose {
                println!("🔧 Using DS_TIMEOUT={}", timeout_str);
            }
        } else if verbose {
            eprintln!(
                "⚠️ Invalid DS_TIMEOUT='{}', use format like '5s', '500ms', '2m'",
                timeout_str
            );
        }
    }

    // DS_RETRY - retry failed lookups once
    if let Ok(val) = env::var("DS_RETRY") {
        match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => {
                env_config.retry = Some(true);
                if verbose {
                    println!("🔧 Using DS_RETRY=true");
                }
            }
            "false" | "0" | "no" | "off" => {
                env_config.retry = Some(false);
                if verbose {
                    println!("🔧 Using DS_RETRY=false");
                }
            }
            _ => {
                if verbose {
                    eprintln!("⚠️ Invalid DS_RETRY='{}', use true/false", val);
                }
            }
        }
    }

    // DS_DATABASE - listings database path
    if let Ok(database) = env::var("DS_DATABASE") {
        if !database.trim().is_empty() {
            env_config.database = Some(database.clone());
            if verbose {
                println!("🔧 Using DS_DATABASE={}", database);
            }
        }
    }

    // DS_CONFIG - explicit config file
    if let Ok(config_path) = env::var("DS_CONFIG") {
        if !config_path.trim().is_empty() {
            env_config.config = Some(config_path.clone());
            if verbose {
                println!("🔧 Using DS_CONFIG={}", config_path);
            }
        }
    }

    // DS_JSON - enable JSON output
    if let Ok(val) = env::var("DS_JSON") {
        match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => {
                env_config.json = Some(true);
                if verbose {
                    println!("🔧 Using DS_JSON=true");
                }
            }
            "false" | "0" | "no" | "off" => {
                env_config.json = Some(false);
                if verbose {
                    println!("🔧 Using DS_JSON=false");
                }
            }
            _ => {
                if verbose {
                    eprintln!("⚠️ Invalid DS_JSON='{}', use true/false", val);
                }
            }
        }
    }

    // DS_PRETTY - pretty-print JSON output
    if let Ok(val) = env::var("DS_PRETTY") {
        match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => {
                env_config.pretty = Some(true);
                if verbose {
                    println!("🔧 Using DS_PRETTY=true");
                }
            }
            "false" | "0" | "no" | "off" => {
                env_config.pretty = Some(false);
                if verbose {
                    println!("🔧 Using DS_PRETTY=false");
                }
            }
            _ => {
                if verbose {
                    eprintln!("⚠️ Invalid DS_PRETTY='{}', use true/false", val);
                }
            }
        }
    }

    env_config
}

/// Parse a timeout string like "5s", "500ms", "2m" into a duration.
///
/// Bare numbers are treated as seconds.
///
/// # Arguments
///
/// * `timeout_str` - String representation of timeout
///
/// # Returns
///
/// The parsed duration, or None if parsing fails.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    // "ms" must be checked before "s"
    if let Some(value) = timeout_str.strip_suffix("ms") {
        value.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(value) = timeout_str.strip_suffix('s') {
        value.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(value) = timeout_str.strip_suffix('m') {
        value
            .parse::<u64>()
            .ok()
            .map(|minutes| Duration::from_secs(minutes * 60))
    } else {
        // Assume seconds if no unit
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(
            parse_timeout_string("500ms"),
            Some(Duration::from_millis(500))
        );
        assert_eq!(parse_timeout_string("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string("ms"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[defaults]
suffixes = ["com", "io", "dev"]
default_suffix = "io"
timeout = "10s"
retry = true

[servers]
dev = "whois.nic.google"

[listings]
database = "scout.db"

[output]
json = true
pretty = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        assert!(config.defaults.is_some());
        let defaults = config.defaults.unwrap();
        assert_eq!(
            defaults.suffixes,
            Some(vec![
                "com".to_string(),
                "io".to_string(),
                "dev".to_string()
            ])
        );
        assert_eq!(defaults.default_suffix, Some("io".to_string()));
        assert_eq!(defaults.timeout, Some("10s".to_string()));
        assert_eq!(defaults.retry, Some(true));

        let servers = config.servers.unwrap();
        assert_eq!(servers.get("dev"), Some(&"whois.nic.google".to_string()));

        assert_eq!(config.listings.unwrap().database, Some("scout.db".to_string()));

        let output = config.output.unwrap();
        assert_eq!(output.json, Some(true));
        assert_eq!(output.pretty, Some(false));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let manager = ConfigManager::new(false);
        let result = manager.load_file("/nonexistent/domain-scout.toml");
        assert!(matches!(result, Err(DomainScoutError::FileError { .. })));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let config_content = r#"
[defaults]
timeout = "fast"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let manager = ConfigManager::new(false);
        let result = manager.load_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_suffix_with_whitespace_rejected() {
        let config_content = r#"
[defaults]
suffixes = ["com", "co m"]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let manager = ConfigManager::new(false);
        let result = manager.load_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                suffixes: Some(vec!["com".to_string(), "net".to_string()]),
                timeout: Some("5s".to_string()),
                retry: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("10s".to_string()),
                retry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.timeout, Some("10s".to_string())); // Higher wins
        assert_eq!(defaults.retry, Some(true)); // Higher wins
        assert_eq!(
            defaults.suffixes,
            Some(vec!["com".to_string(), "net".to_string()])
        ); // Lower preserved
    }

    #[test]
    fn test_merge_server_overrides() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            servers: Some(HashMap::from([
                ("com".to_string(), "whois.lower.example".to_string()),
                ("net".to_string(), "whois.lower.example".to_string()),
            ])),
            ..Default::default()
        };

        let higher = FileConfig {
            servers: Some(HashMap::from([(
                "com".to_string(),
                "whois.higher.example".to_string(),
            )])),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let servers = merged.servers.unwrap();

        // Higher wins conflicts, lower-only keys preserved
        assert_eq!(
            servers.get("com"),
            Some(&"whois.higher.example".to_string())
        );
        assert_eq!(servers.get("net"), Some(&"whois.lower.example".to_string()));
    }
}
