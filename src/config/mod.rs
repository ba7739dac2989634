mod schema;

pub use schema::{Config, ThemeChoice};

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::PathBuf;

use crate::scoring::validate_scoring;

/// Get the config directory path (~/.config/sales-rank/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("sales-rank"))
}

/// Get the default config file path (~/.config/sales-rank/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/sales-rank/config.yaml)
///
/// A missing default config file is not an error: every setting has a
/// default. An explicitly given path must exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let Some(config_path) = path.or_else(get_config_path) else {
        debug!("No home directory; using default config");
        return Ok(Config::default());
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!("No config at {}; using defaults", config_path.display());
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_saphyr::from_str(content)?;
    Ok(config)
}

/// Validate the whole configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref interval) = config.auto_reload {
        if let Err(e) = humantime::parse_duration(interval.trim()) {
            errors.push(format!("auto_reload: invalid duration '{}' - {}", interval, e));
        }
    }

    if let Some(ref scoring) = config.scoring {
        if let Err(scoring_errors) = validate_scoring(scoring) {
            errors.extend(scoring_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::time::Duration;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
input: "exports/*.xlsx"
worksheet: Summary
min_appointments: 20
auto_reload: 10m
theme: light
scoring:
  capture_cap: 120
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.input.as_deref(), Some("exports/*.xlsx"));
        assert_eq!(config.worksheet.as_deref(), Some("Summary"));
        assert_eq!(config.min_appointments, Some(20));
        assert_eq!(config.theme, Some(ThemeChoice::Light));
        assert_eq!(config.auto_reload_interval(), Some(Duration::from_secs(600)));
        assert_eq!(config.effective_scoring().capture_cap(), 120.0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.auto_reload_interval(), None);
        assert_eq!(config.effective_scoring(), crate::scoring::ScoringConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse_config("queries: []").is_err());
    }

    #[test]
    fn test_validate_collects_errors() {
        let yaml = r#"
auto_reload: soon
scoring:
  capture_cap: -5
"#;
        let config = parse_config(yaml).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("auto_reload"));
        assert!(errors[1].contains("capture_cap"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let path = env::temp_dir().join("sales_rank_no_such_config.yaml");
        let _ = fs::remove_file(&path);
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let path = env::temp_dir().join("sales_rank_test_config.yaml");
        fs::write(&path, "min_appointments: 0\n").unwrap();
        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.min_appointments, Some(0));
        let _ = fs::remove_file(&path);
    }
}
