//! Environment variable-based configuration overrides

use crate::config::model::RevoConfig;
use crate::error::{RevoError, RevoResult};
use std::env;

/// Apply overrides from the process environment
pub fn apply_process_env(config: &mut RevoConfig) -> RevoResult<()> {
    apply_env_with(config, |key| env::var(key).ok())
}

/// Apply overrides using a custom variable lookup
///
/// Recognized variables: `REVO_GITHUB_TOKEN` (falling back to `GITHUB_TOKEN`),
/// `REVO_GITHUB_API`, `REVO_RAW_BASE`, `REVO_API_BASE`, `REVO_SAMPLE_LIMIT`,
/// `REVO_MAX_SNIPPET` and `REVO_CONCURRENCY`.
pub fn apply_env_with<F>(config: &mut RevoConfig, lookup: F) -> RevoResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = lookup("REVO_GITHUB_TOKEN").or_else(|| lookup("GITHUB_TOKEN")) {
        config.github.token = Some(token);
    }
    if let Some(api) = lookup("REVO_GITHUB_API") {
        config.github.api_base = api;
    }
    if let Some(raw) = lookup("REVO_RAW_BASE") {
        config.github.raw_base = raw;
    }
    if let Some(base) = lookup("REVO_API_BASE") {
        config.handoff.api_base = base;
    }

    if let Some(value) = lookup("REVO_SAMPLE_LIMIT") {
        config.sampling.sample_limit = parse_count("REVO_SAMPLE_LIMIT", &value)?;
    }
    if let Some(value) = lookup("REVO_MAX_SNIPPET") {
        config.sampling.max_snippet_length = parse_count("REVO_MAX_SNIPPET", &value)?;
    }
    if let Some(value) = lookup("REVO_CONCURRENCY") {
        config.sampling.concurrency = parse_count("REVO_CONCURRENCY", &value)?;
    }

    Ok(())
}

fn parse_count(key: &str, value: &str) -> RevoResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| RevoError::config(format!("Invalid {} value: '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = RevoConfig::default();
        apply_env_with(
            &mut config,
            lookup_from(&[
                ("REVO_GITHUB_TOKEN", "ghp_env"),
                ("REVO_API_BASE", "http://localhost:3000"),
                ("REVO_SAMPLE_LIMIT", "5"),
                ("REVO_CONCURRENCY", "2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.github.token.as_deref(), Some("ghp_env"));
        assert_eq!(config.handoff.api_base, "http://localhost:3000");
        assert_eq!(config.sampling.sample_limit, 5);
        assert_eq!(config.sampling.concurrency, 2);
        assert_eq!(config.sampling.max_snippet_length, 1000);
    }

    #[test]
    fn test_github_token_fallback() {
        let mut config = RevoConfig::default();
        apply_env_with(&mut config, lookup_from(&[("GITHUB_TOKEN", "ghp_plain")])).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("ghp_plain"));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut config = RevoConfig::default();
        let result = apply_env_with(&mut config, lookup_from(&[("REVO_MAX_SNIPPET", "lots")]));
        assert!(matches!(result, Err(RevoError::Config(_))));
    }
}
