//! Showroom - inventory browsing backend
//!
//! Merges a vehicle listing feed with a status store by VIN and serves the
//! result over HTTP, memoized in TTL caches.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
