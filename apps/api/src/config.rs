use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Application configuration loaded from environment variables.
///
/// The upstream credential is optional at startup: without it the service still serves
/// extraction, detection and storage, and every generation request fails with a
/// configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_stream: bool,
    pub llm_timeout_secs: u64,
    /// `None` selects the in-memory key-value store.
    pub data_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            llm_stream: parse_bool(
                "LLM_STREAM",
                std::env::var("LLM_STREAM").ok().as_deref(),
                true,
            )?,
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            data_dir: match std::env::var("DATA_DIR") {
                Ok(dir) if dir.trim().is_empty() => None,
                Ok(dir) => Some(PathBuf::from(dir)),
                Err(_) => Some(PathBuf::from("./data")),
            },
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(key: &str, raw: Option<&str>, default: bool) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_defaults_when_unset_or_blank() {
        assert!(parse_bool("X", None, true).unwrap());
        assert!(!parse_bool("X", Some("  "), false).unwrap());
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("X", Some("Yes"), false).unwrap());
        assert!(parse_bool("X", Some("1"), false).unwrap());
        assert!(!parse_bool("X", Some("off"), true).unwrap());
        assert!(!parse_bool("X", Some("FALSE"), true).unwrap());
    }

    #[test]
    fn test_parse_bool_rejects_garbage_with_key_in_message() {
        let err = parse_bool("LLM_STREAM", Some("maybe"), true).unwrap_err();
        assert!(err.to_string().contains("LLM_STREAM"));
    }
}
