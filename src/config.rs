// Client configuration
// Reads the API base URL, session backend and timeout from the environment

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::store::StoreConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";
pub const DEFAULT_REDIS_NAMESPACE: &str = "belyv";

pub const ENV_API_URL: &str = "BELYV_API_URL";
pub const ENV_SESSION_STORE: &str = "BELYV_SESSION_STORE";
pub const ENV_SESSION_FILE: &str = "BELYV_SESSION_FILE";
pub const ENV_REDIS_URL: &str = "BELYV_REDIS_URL";
pub const ENV_REDIS_NAMESPACE: &str = "BELYV_REDIS_NAMESPACE";
pub const ENV_REQUEST_TIMEOUT: &str = "BELYV_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Everything needed to build a `BelyvClient`
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto; always ends in `/`
    pub api_url: Url,
    /// Where the session record and flags are persisted
    pub store: StoreConfig,
    /// Overall per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_url: &str, store: StoreConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            store,
            request_timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys use defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = parse_api_url(&get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()))?;

        let store_kind = get(ENV_SESSION_STORE).unwrap_or_else(|| "file".to_string());
        let store = match store_kind.trim().to_lowercase().as_str() {
            "memory" => StoreConfig::Memory,
            "file" => StoreConfig::File(
                get(ENV_SESSION_FILE)
                    .map(PathBuf::from)
                    .unwrap_or_else(default_session_file),
            ),
            "redis" => StoreConfig::Redis {
                url: get(ENV_REDIS_URL).unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
                namespace: get(ENV_REDIS_NAMESPACE)
                    .unwrap_or_else(|| DEFAULT_REDIS_NAMESPACE.to_string()),
            },
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_SESSION_STORE,
                    value: store_kind,
                })
            }
        };

        let request_timeout = match get(ENV_REQUEST_TIMEOUT) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_REQUEST_TIMEOUT,
                        value: raw,
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            api_url,
            store,
            request_timeout,
        })
    }
}

/// `<data dir>/belyv/session.json`, or `./belyv/session.json` without one
pub fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("belyv")
        .join("session.json")
}

/// Parse the base URL and make sure relative paths join beneath it
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url = Url::parse(&raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_API_URL,
            value: raw,
        }),
    }
}
