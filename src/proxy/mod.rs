//! Proxy pool management
//!
//! This module provides:
//! - Proxy list providers (Webshare API, single static proxy)
//! - Per-proxy success statistics
//! - Candidate ranking
//! - Selection strategies over the ranked pool

pub mod directory;
pub mod provider;
pub mod rotation;
pub mod stats;

pub use directory::{rank_candidates, ProxyDirectory};
pub use provider::{ProviderEntry, ProxyProvider, StaticProvider, WebshareProvider};
pub use rotation::{create_selector, ProxySelector, RotationStrategy};
pub use stats::{ProxyStats, ProxyStatsRegistry};
