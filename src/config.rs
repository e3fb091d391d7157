use crate::error::{Result, ScribeError};
use std::env;
use tracing::warn;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Proxy provider configuration
    pub provider: ProviderConfig,
    /// Proxy rotation policy
    pub rotation: RotationConfig,
    /// Transcript service configuration
    pub transcript: TranscriptConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (default: 10000)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Allowed CORS origins (comma-separated, empty = localhost only)
    pub cors_origins: Vec<String>,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Webshare API token; listing is skipped when absent
    pub api_token: Option<String>,
    /// Webshare API base URL
    pub api_base_url: String,
    /// Timeout for provider API calls in seconds
    pub timeout_secs: u64,
    /// Single static proxy, used when no API token is configured
    pub static_proxy: Option<StaticProxyConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticProxyConfig {
    pub username: String,
    pub password: String,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Candidates requested from the provider per transcript request
    pub max_candidates: usize,
    /// Maximum proxied attempts per transcript request
    pub max_attempts: usize,
    /// Delay after a failed proxied attempt in milliseconds
    pub retry_delay_ms: u64,
    /// Probability of reusing the best proven proxy
    pub exploit_probability: f64,
    /// Rotation strategy (weighted, random)
    pub strategy: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// Language codes in priority order
    pub languages: Vec<String>,
    /// Timeout for transcript service calls in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let exploit_probability: f64 = parse_env("PROXY_EXPLOIT_PROBABILITY", "0.9")?;
        if !(0.0..=1.0).contains(&exploit_probability) {
            return Err(ScribeError::InvalidConfig(
                "PROXY_EXPLOIT_PROBABILITY must be between 0 and 1".into(),
            ));
        }

        let languages = split_list(&get_env_or("TRANSCRIPT_LANGUAGES", "pl,en"));
        if languages.is_empty() {
            return Err(ScribeError::InvalidConfig(
                "TRANSCRIPT_LANGUAGES must list at least one language".into(),
            ));
        }

        Ok(Config {
            server: ServerConfig {
                port: parse_env("PORT", "10000")?,
                host: get_env_or("HOST", "0.0.0.0"),
                cors_origins: split_list(&get_env_or("CORS_ORIGINS", "")),
                request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "120")?,
            },
            provider: ProviderConfig {
                api_token: non_empty_env("WEBSHARE_API_TOKEN"),
                api_base_url: parse_base_url()?,
                timeout_secs: parse_env("PROVIDER_TIMEOUT_SECS", "10")?,
                static_proxy: parse_static_proxy(),
            },
            rotation: RotationConfig {
                max_candidates: parse_env("PROXY_MAX_CANDIDATES", "5")?,
                max_attempts: parse_env("PROXY_MAX_ATTEMPTS", "3")?,
                retry_delay_ms: parse_env("PROXY_RETRY_DELAY_MS", "1000")?,
                exploit_probability,
                strategy: get_env_or("PROXY_ROTATION_STRATEGY", "weighted"),
            },
            transcript: TranscriptConfig {
                languages,
                timeout_secs: parse_env("TRANSCRIPT_TIMEOUT_SECS", "30")?,
            },
            log: LogConfig::from_env(),
        })
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl LogConfig {
    /// Logging settings alone, readable before the full config is loaded
    pub fn from_env() -> Self {
        Self {
            level: get_env_or("LOG_LEVEL", "info"),
            format: get_env_or("LOG_FORMAT", "json"),
        }
    }
}

fn parse_base_url() -> Result<String> {
    let raw = get_env_or("WEBSHARE_API_BASE_URL", "https://proxy.webshare.io/api/v2");
    let url = Url::parse(raw.trim()).map_err(|e| {
        ScribeError::InvalidConfig(format!("WEBSHARE_API_BASE_URL must be a valid URL: {}", e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScribeError::InvalidConfig(format!(
            "WEBSHARE_API_BASE_URL has unsupported scheme: {}",
            url.scheme()
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// The static proxy is all-or-nothing; an incomplete set is ignored with a warning
fn parse_static_proxy() -> Option<StaticProxyConfig> {
    let username = non_empty_env("PROXY_USERNAME");
    let password = non_empty_env("PROXY_PASSWORD");
    let address = non_empty_env("PROXY_ADDRESS");
    let port = non_empty_env("PROXY_PORT");

    match (username, password, address, port) {
        (None, None, None, None) => None,
        (Some(username), Some(password), Some(address), Some(port)) => match port.parse() {
            Ok(port) => Some(StaticProxyConfig {
                username,
                password,
                address,
                port,
            }),
            Err(_) => {
                warn!("PROXY_PORT is not a valid port number, static proxy disabled");
                None
            }
        },
        _ => {
            warn!("One or more static proxy values missing in environment variables");
            None
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: &str) -> Result<T> {
    get_env_or(key, default)
        .trim()
        .parse()
        .map_err(|_| ScribeError::InvalidConfig(format!("{} has an invalid value", key)))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
