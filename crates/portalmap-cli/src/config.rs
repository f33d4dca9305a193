//! Runtime configuration from the environment (and an optional dotenv file).
//!
//! | variable                     | default    |
//! |------------------------------|------------|
//! | `PORTALMAP_API_BASE_URL`     | required   |
//! | `PORTALMAP_API_KEY`          | required   |
//! | `PORTALMAP_API_KEY_HEADER`   | `apiKey`   |
//! | `PORTALMAP_SPACE_ID`         | none       |
//! | `PORTALMAP_OUTPUT_DIR`       | `output`   |
//! | `PORTALMAP_TIMEOUT_SECS`     | `30`       |
//! | `PORTALMAP_MAX_RETRIES`      | `3`        |
//! | `PORTALMAP_RETRY_BACKOFF_MS` | `500`      |
//!
//! Empty values count as unset.

use portalmap_model::SpaceId;
use reqwest::header::HeaderName;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const API_BASE_URL: &str = "PORTALMAP_API_BASE_URL";
pub const API_KEY: &str = "PORTALMAP_API_KEY";
pub const API_KEY_HEADER: &str = "PORTALMAP_API_KEY_HEADER";
pub const SPACE_ID: &str = "PORTALMAP_SPACE_ID";
pub const OUTPUT_DIR: &str = "PORTALMAP_OUTPUT_DIR";
pub const TIMEOUT_SECS: &str = "PORTALMAP_TIMEOUT_SECS";
pub const MAX_RETRIES: &str = "PORTALMAP_MAX_RETRIES";
pub const RETRY_BACKOFF_MS: &str = "PORTALMAP_RETRY_BACKOFF_MS";

const DEFAULT_API_KEY_HEADER: &str = "apiKey";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got `{value}`")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("no space id given (use --space or set {SPACE_ID})")]
    NoSpace,

    #[error("failed to load env file {}: {message}", path.display())]
    EnvFile { path: PathBuf, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub api_key: String,
    pub api_key_header: String,
    pub space_id: Option<SpaceId>,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_url = get(API_BASE_URL).ok_or(ConfigError::Missing(API_BASE_URL))?;
        let api_base_url = Url::parse(raw_url.trim())
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| ConfigError::Invalid {
                name: API_BASE_URL,
                expected: "an http(s) URL",
                value: raw_url.clone(),
            })?;

        let api_key = get(API_KEY).ok_or(ConfigError::Missing(API_KEY))?;
        let api_key_header =
            get(API_KEY_HEADER).unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string());
        if HeaderName::from_bytes(api_key_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid {
                name: API_KEY_HEADER,
                expected: "a valid HTTP header name",
                value: api_key_header,
            });
        }

        Ok(Config {
            api_base_url,
            api_key,
            api_key_header,
            space_id: get(SPACE_ID).map(SpaceId::new),
            output_dir: get(OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            timeout: Duration::from_secs(parse_or(
                get(TIMEOUT_SECS),
                TIMEOUT_SECS,
                "a whole number of seconds",
                DEFAULT_TIMEOUT_SECS,
            )?),
            max_retries: parse_or(
                get(MAX_RETRIES),
                MAX_RETRIES,
                "a non-negative integer",
                DEFAULT_MAX_RETRIES,
            )?,
            retry_backoff: Duration::from_millis(parse_or(
                get(RETRY_BACKOFF_MS),
                RETRY_BACKOFF_MS,
                "a whole number of milliseconds",
                DEFAULT_RETRY_BACKOFF_MS,
            )?),
        })
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, space: Option<String>, output_dir: Option<PathBuf>) -> Self {
        if let Some(space) = space {
            self.space_id = Some(SpaceId::new(space));
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        self
    }

    pub fn require_space(&self) -> Result<&SpaceId, ConfigError> {
        self.space_id.as_ref().ok_or(ConfigError::NoSpace)
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

/// Load dotenv variables into the process environment.
///
/// An explicit `path` must exist and parse. Without one, `./.env` is loaded
/// if present. Variables already set in the environment win.
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) => dotenv::from_path(path).map_err(|e| ConfigError::EnvFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        None => {
            dotenv::dotenv().ok();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[
            (API_BASE_URL, "https://maps.example.com"),
            (API_KEY, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.api_key_header, "apiKey");
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff, Duration::from_millis(500));
        assert!(config.space_id.is_none());
        assert!(matches!(config.require_space(), Err(ConfigError::NoSpace)));
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let err = Config::from_lookup(lookup(&[(API_BASE_URL, "https://maps.example.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(API_KEY)));

        let err = Config::from_lookup(lookup(&[(API_BASE_URL, " "), (API_KEY, "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(API_BASE_URL)));
    }

    #[test]
    fn rejects_malformed_values() {
        let err = Config::from_lookup(lookup(&[
            (API_BASE_URL, "ftp://maps.example.com"),
            (API_KEY, "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: API_BASE_URL, .. }));

        let err = Config::from_lookup(lookup(&[
            (API_BASE_URL, "https://maps.example.com"),
            (API_KEY, "k"),
            (MAX_RETRIES, "-1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(MAX_RETRIES));

        let err = Config::from_lookup(lookup(&[
            (API_BASE_URL, "https://maps.example.com"),
            (API_KEY, "k"),
            (API_KEY_HEADER, "bad header"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: API_KEY_HEADER, .. }));
    }

    #[test]
    fn flags_override_environment() {
        let config = Config::from_lookup(lookup(&[
            (API_BASE_URL, "https://maps.example.com"),
            (API_KEY, "k"),
            (SPACE_ID, "env-space"),
            (OUTPUT_DIR, "env-out"),
        ]))
        .unwrap()
        .with_overrides(Some("abc\\Flag Space".to_string()), Some(PathBuf::from("flag-out")));

        assert_eq!(config.require_space().unwrap().as_str(), "abc\\Flag Space");
        assert_eq!(config.output_dir, PathBuf::from("flag-out"));
    }

    #[test]
    fn explicit_env_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_env_file(Some(&dir.path().join("missing.env"))).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }
}
