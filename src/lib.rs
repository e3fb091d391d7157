//! Rotascribe - YouTube transcript service with proxy rotation
//!
//! Fetches video transcripts through a pool of authenticated HTTP proxies,
//! learning which proxies work and falling back to a direct request when
//! none of them do.
//!
//! ## Features
//!
//! - Proxy lists from the Webshare API or a single static proxy
//! - Per-proxy success statistics with exploit/explore selection
//! - Bounded failover with direct fallback
//! - HTTP API with transcript, health and proxy statistics endpoints

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod transcript;

pub use config::Config;
pub use error::{Result, ScribeError};
