use std::time::Duration;

use thiserror::Error;

use crate::llm_client::{DEFAULT_ENDPOINT_URL, DEFAULT_MODEL};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Environment variable '{key}' is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Application configuration loaded from environment variables.
/// Startup fails if the completion credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub completion_endpoint_url: String,
    pub completion_api_key: String,
    pub completion_model: String,
    pub completion_timeout: Duration,
    /// Ask the model for a short evaluation of every recorded answer.
    pub answer_feedback: bool,
    /// Sessions untouched for this long are dropped from memory.
    pub session_idle_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let completion_api_key = lookup("COMPLETION_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("COMPLETION_API_KEY"))?;

        let timeout_secs = match lookup("COMPLETION_TIMEOUT_SECS") {
            Some(raw) => parse_var::<u64>("COMPLETION_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "COMPLETION_TIMEOUT_SECS",
                reason: "must be at least 1 second".to_string(),
            });
        }

        let idle_secs = match lookup("SESSION_IDLE_TIMEOUT_SECS") {
            Some(raw) => parse_var::<u64>("SESSION_IDLE_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_IDLE_TIMEOUT_SECS,
        };
        if idle_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_IDLE_TIMEOUT_SECS",
                reason: "must be at least 1 second".to_string(),
            });
        }

        let answer_feedback = match lookup("ANSWER_FEEDBACK") {
            Some(raw) => parse_flag("ANSWER_FEEDBACK", &raw)?,
            None => false,
        };

        let port = match lookup("PORT") {
            Some(raw) => parse_var::<u16>("PORT", &raw)?,
            None => 8080,
        };

        Ok(Config {
            completion_endpoint_url: lookup("COMPLETION_ENDPOINT_URL")
                .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string()),
            completion_api_key,
            completion_model: lookup("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            completion_timeout: Duration::from_secs(timeout_secs),
            answer_feedback,
            session_idle_timeout: Duration::from_secs(idle_secs),
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_var<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("COMPLETION_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[("COMPLETION_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("COMPLETION_API_KEY"));
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[("COMPLETION_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.completion_api_key, "sk-test");
        assert_eq!(config.completion_endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.completion_model, DEFAULT_MODEL);
        assert_eq!(config.completion_timeout, Duration::from_secs(30));
        assert!(!config.answer_feedback);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_overrides_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("COMPLETION_API_KEY", "sk-test"),
            ("COMPLETION_ENDPOINT_URL", "http://localhost:9000/v1/chat/completions"),
            ("COMPLETION_TIMEOUT_SECS", "5"),
            ("ANSWER_FEEDBACK", "yes"),
            ("SESSION_IDLE_TIMEOUT_SECS", "120"),
            ("PORT", "3000"),
        ]))
        .unwrap();
        assert_eq!(
            config.completion_endpoint_url,
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(config.completion_timeout, Duration::from_secs(5));
        assert!(config.answer_feedback);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("COMPLETION_API_KEY", "sk-test"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("COMPLETION_API_KEY", "sk-test"),
            ("COMPLETION_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "COMPLETION_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_idle_timeout_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("COMPLETION_API_KEY", "sk-test"),
            ("SESSION_IDLE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SESSION_IDLE_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_feedback_flag_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("COMPLETION_API_KEY", "sk-test"),
            ("ANSWER_FEEDBACK", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ANSWER_FEEDBACK", .. }));
    }
}
