//! API request handlers

pub mod health;
pub mod stats;
pub mod transcript;
