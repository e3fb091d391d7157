//! Proxy list providers
//!
//! A provider only lists raw entries. Validation, stats decoration and
//! ranking happen in [`ProxyDirectory`](super::directory::ProxyDirectory).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::{ProviderConfig, StaticProxyConfig};
use crate::error::{Result, ScribeError};
use crate::models::ProxyEndpoint;

/// Raw proxy entry as listed by a provider
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderEntry {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "address")]
    pub proxy_address: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub valid: bool,
}

impl ProviderEntry {
    /// Validate the entry into a connection descriptor
    pub fn into_endpoint(self) -> Result<ProxyEndpoint> {
        if !self.valid {
            return Err(ScribeError::InvalidProxyEntry(
                "flagged invalid by provider".into(),
            ));
        }

        let username = self
            .username
            .ok_or_else(|| ScribeError::InvalidProxyEntry("missing username".into()))?;
        let password = self
            .password
            .ok_or_else(|| ScribeError::InvalidProxyEntry("missing password".into()))?;
        let address = self
            .proxy_address
            .ok_or_else(|| ScribeError::InvalidProxyEntry("missing address".into()))?;
        let port = self
            .port
            .ok_or_else(|| ScribeError::InvalidProxyEntry("missing port".into()))?;

        ProxyEndpoint::new(address, port, username, password)
    }
}

impl From<&ProxyEndpoint> for ProviderEntry {
    fn from(endpoint: &ProxyEndpoint) -> Self {
        Self {
            username: Some(endpoint.username.clone()),
            password: Some(endpoint.password.clone()),
            proxy_address: Some(endpoint.host.clone()),
            port: Some(endpoint.port),
            valid: true,
        }
    }
}

/// Source of candidate proxies
#[async_trait]
pub trait ProxyProvider: Send + Sync {
    /// List up to `limit` proxies
    async fn list_proxies(&self, limit: usize) -> Result<Vec<ProviderEntry>>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}

/// One page of the Webshare proxy list API
#[derive(Debug, Deserialize)]
struct ProxyListPage {
    #[serde(default)]
    results: Vec<Value>,
}

/// Webshare proxy list API client
pub struct WebshareProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl WebshareProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.as_deref().and_then(normalize_token),
        })
    }

    fn list_url(&self) -> String {
        format!("{}/proxy/list/", self.base_url)
    }
}

#[async_trait]
impl ProxyProvider for WebshareProvider {
    #[instrument(skip(self))]
    async fn list_proxies(&self, limit: usize) -> Result<Vec<ProviderEntry>> {
        let token = self.token.as_ref().ok_or(ScribeError::MissingProviderToken)?;
        let page_size = limit.to_string();

        let response = self
            .client
            .get(self.list_url())
            .query(&[("mode", "direct"), ("page", "1"), ("page_size", &page_size)])
            .header(AUTHORIZATION, format!("Token {}", token))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(ScribeError::ProviderRateLimited),
            StatusCode::UNAUTHORIZED => return Err(ScribeError::ProviderUnauthorized),
            status => return Err(ScribeError::ProviderStatus(status.as_u16())),
        }

        let page: ProxyListPage = response.json().await?;
        Ok(decode_entries(page.results))
    }

    fn provider_name(&self) -> &'static str {
        "webshare"
    }
}

/// A single statically configured proxy
pub struct StaticProvider {
    endpoint: ProxyEndpoint,
}

impl StaticProvider {
    pub fn new(endpoint: ProxyEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn from_config(config: &StaticProxyConfig) -> Result<Self> {
        let endpoint = ProxyEndpoint::new(
            config.address.clone(),
            config.port,
            config.username.clone(),
            config.password.clone(),
        )?;
        Ok(Self::new(endpoint))
    }
}

#[async_trait]
impl ProxyProvider for StaticProvider {
    async fn list_proxies(&self, limit: usize) -> Result<Vec<ProviderEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![ProviderEntry::from(&self.endpoint)])
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}

/// Decode entries one by one so a single malformed entry doesn't drop the page
fn decode_entries(raw: Vec<Value>) -> Vec<ProviderEntry> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<ProviderEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping undecodable proxy entry: {}", e);
                None
            }
        })
        .collect()
}

/// Strip whitespace and an optional `Token` scheme prefix
fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim();
    let token = match token.strip_prefix("Token") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => token,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("abc"), Some("abc".to_string()));
        assert_eq!(normalize_token("  Token abc \n"), Some("abc".to_string()));
        assert_eq!(normalize_token("   "), None);
        assert_eq!(normalize_token("Token "), None);
        assert_eq!(normalize_token("Token"), None);
        assert_eq!(normalize_token(" Token \t "), None);
        assert_eq!(normalize_token("Tokenabc"), Some("Tokenabc".to_string()));
    }

    #[test]
    fn test_decode_entries_skips_malformed() {
        let raw = vec![
            json!({
                "username": "u1",
                "password": "p1",
                "proxy_address": "10.0.0.1",
                "port": 8080,
                "valid": true
            }),
            json!({ "username": "u2", "port": "not-a-port" }),
            json!({ "username": "u3", "password": "p3" }),
        ];

        let entries = decode_entries(raw);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].proxy_address.as_deref(), Some("10.0.0.1"));
        assert!(!entries[1].valid);
    }

    #[test]
    fn test_entry_into_endpoint() {
        let entry = ProviderEntry {
            username: Some("u".into()),
            password: Some("p".into()),
            proxy_address: Some("10.0.0.1".into()),
            port: Some(8080),
            valid: true,
        };
        let endpoint = entry.clone().into_endpoint().unwrap();
        assert_eq!(endpoint.address(), "10.0.0.1:8080");

        let invalid = ProviderEntry {
            valid: false,
            ..entry.clone()
        };
        assert!(invalid.into_endpoint().is_err());

        let missing_password = ProviderEntry {
            password: None,
            ..entry
        };
        assert!(matches!(
            missing_password.into_endpoint(),
            Err(ScribeError::InvalidProxyEntry(_))
        ));
    }

    fn webshare_with_token(api_token: Option<&str>) -> WebshareProvider {
        WebshareProvider::new(&ProviderConfig {
            api_token: api_token.map(str::to_string),
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            static_proxy: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_webshare_without_token_fails_fast() {
        let result = webshare_with_token(None).list_proxies(5).await;
        assert!(matches!(result, Err(ScribeError::MissingProviderToken)));
    }

    #[tokio::test]
    async fn test_webshare_prefix_only_token_is_missing() {
        for raw in ["Token ", "Token", "  Token  "] {
            let result = webshare_with_token(Some(raw)).list_proxies(5).await;
            assert!(matches!(result, Err(ScribeError::MissingProviderToken)));
        }
    }

    #[tokio::test]
    async fn test_static_provider_lists_single_entry() {
        let endpoint = ProxyEndpoint::new("10.0.0.9", 3128, "user", "pass").unwrap();
        let provider = StaticProvider::new(endpoint.clone());

        let entries = provider.list_proxies(5).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].clone().into_endpoint().unwrap(), endpoint);
        assert!(provider.list_proxies(0).await.unwrap().is_empty());
    }
}
