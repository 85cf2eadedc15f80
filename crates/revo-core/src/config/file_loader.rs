//! File-based configuration loading

use crate::config::model::RevoConfig;
use crate::error::{RevoError, RevoResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// Supports JSON and TOML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> RevoResult<RevoConfig> {
    if !path.exists() {
        return Ok(RevoConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        RevoError::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let config: RevoConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            RevoError::config(format!(
                "Failed to parse TOML config '{}': {}",
                path.display(),
                e
            ))
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            RevoError::config(format!(
                "Failed to parse JSON config '{}': {}",
                path.display(),
                e
            ))
        })?,
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from_file(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config.sampling.sample_limit, 15);
    }

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("revo.json");
        fs::write(
            &config_path,
            r#"{
                "sampling": { "sample_limit": 8, "inline_pause": "50ms" },
                "github": { "token": "ghp_test" }
            }"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.sampling.sample_limit, 8);
        assert_eq!(config.sampling.max_snippet_length, 1000);
        assert_eq!(config.sampling.inline_pause, Duration::from_millis(50));
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
    }

    #[test]
    fn test_load_from_toml_file_with_scoring() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("revo.toml");
        fs::write(
            &config_path,
            r#"
[sampling]
concurrency = 2

[handoff]
api_base = "http://localhost:3000"

[scoring]
fallback_extensions = ["rs"]

[[scoring.patterns]]
pattern = "cargo.toml"
weight = 12
"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.sampling.concurrency, 2);
        assert_eq!(config.handoff.api_base, "http://localhost:3000");
        let table = config.scoring_table();
        assert_eq!(table.score("Cargo.toml"), 12);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        fs::write(&config_path, "{ not json").unwrap();
        assert!(matches!(
            load_from_file(&config_path),
            Err(RevoError::Config(_))
        ));
    }
}
