//! HTTP API
//!
//! JSON endpoint for transcripts plus health and proxy statistics.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{ApiServer, AppState};
