//! Environment-driven configuration.

use crate::error::{EditError, Result};

/// Primary environment variable holding the API key.
pub const API_KEY_VAR: &str = "API_KEY";
/// Fallback environment variable for the API key.
pub const FALLBACK_API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Overrides the model identifier.
pub const MODEL_VAR: &str = "NANO_EDIT_MODEL";
/// Overrides the API base URL.
pub const BASE_URL_VAR: &str = "NANO_EDIT_BASE_URL";

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Resolved runtime configuration.
#[derive(Clone)]
pub struct Config {
    /// API credential. Required.
    pub api_key: String,
    /// Model identifier override.
    pub model: Option<String>,
    /// API base URL.
    pub base_url: String,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// A missing API key is a hard failure.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR)
            .or_else(|| non_empty(FALLBACK_API_KEY_VAR))
            .ok_or_else(|| {
                EditError::Config(format!(
                    "{API_KEY_VAR} environment variable not set (or {FALLBACK_API_KEY_VAR})"
                ))
            })?;

        Ok(Self {
            api_key,
            model: non_empty(MODEL_VAR),
            base_url: non_empty(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, EditError::Config(_)));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_blank_key_is_treated_as_missing() {
        let err = Config::from_lookup(lookup(&[("API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, EditError::Config(_)));
    }

    #[test]
    fn test_primary_key_wins_over_fallback() {
        let config =
            Config::from_lookup(lookup(&[("API_KEY", "primary"), ("GOOGLE_API_KEY", "other")]))
                .unwrap();
        assert_eq!(config.api_key, "primary");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.model.is_none());
    }

    #[test]
    fn test_fallback_and_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "fallback"),
            ("NANO_EDIT_MODEL", "gemini-2.5-flash-image"),
            ("NANO_EDIT_BASE_URL", "http://localhost:8080"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "fallback");
        assert_eq!(config.model.as_deref(), Some("gemini-2.5-flash-image"));
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&[("API_KEY", "secret-value")])).unwrap();
        assert!(!format!("{config:?}").contains("secret-value"));
    }
}
