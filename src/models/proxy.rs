use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ScribeError};
use crate::proxy::stats::ProxyStats;

/// Connection descriptor for an authenticated upstream HTTP proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ProxyEndpoint {
    /// Build an endpoint, rejecting empty fields
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = Self {
            host: host.into().trim().to_string(),
            port,
            username: username.into(),
            password: password.into(),
        };

        if endpoint.host.is_empty() {
            return Err(ScribeError::InvalidProxyEntry("missing address".into()));
        }
        if endpoint.port == 0 {
            return Err(ScribeError::InvalidProxyEntry("missing port".into()));
        }
        if endpoint.username.is_empty() {
            return Err(ScribeError::InvalidProxyEntry("missing username".into()));
        }
        if endpoint.password.is_empty() {
            return Err(ScribeError::InvalidProxyEntry("missing password".into()));
        }

        Ok(endpoint)
    }

    /// Identity key used by the stats registry (`host:port`)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Proxy URL with embedded credentials.
    ///
    /// The same URL is used for both plain and TLS upstream traffic.
    pub fn proxy_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("http://{}", self.address()))?;
        url.set_username(&self.username)
            .map_err(|_| ScribeError::InvalidProxyEntry("username not representable".into()))?;
        url.set_password(Some(&self.password))
            .map_err(|_| ScribeError::InvalidProxyEntry("password not representable".into()))?;
        Ok(url)
    }
}

/// A provider-supplied proxy decorated with a snapshot of its statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyCandidate {
    pub address: String,
    pub endpoint: ProxyEndpoint,
    pub success_rate: f64,
    pub success_count: u64,
    pub last_success_at: Option<DateTime<Utc>>,
}

impl ProxyCandidate {
    pub fn new(endpoint: ProxyEndpoint, stats: &ProxyStats) -> Self {
        Self {
            address: endpoint.address(),
            endpoint,
            success_rate: stats.success_rate(),
            success_count: stats.success_count,
            last_success_at: stats.last_success_at,
        }
    }

    /// Has this proxy delivered at least one transcript before?
    pub fn is_proven(&self) -> bool {
        self.success_rate > 0.0 && self.success_count >= 1
    }
}

/// Serialized view of a registry entry for the diagnostics endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyStatsView {
    pub address: String,
    pub success_count: u64,
    pub fail_count: u64,
    pub success_rate: f64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ProxyStatsView {
    pub fn new(address: String, stats: &ProxyStats) -> Self {
        Self {
            address,
            success_count: stats.success_count,
            fail_count: stats.fail_count,
            success_rate: stats.success_rate(),
            last_success_at: stats.last_success_at,
            last_used_at: stats.last_used_at,
        }
    }
}
