//! Cache Module
//!
//! In-memory TTL caching with lazy, read-time expiry.

mod entry;
mod lru;
mod stats;
mod store;


use std::sync::Arc;
use tokio::sync::RwLock;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::TtlCache;

/// A cache instance shared between request handlers.
///
/// Reads take the write guard because an expired read mutates the map.
pub type SharedCache<V> = Arc<RwLock<TtlCache<V>>>;

/// Wraps a cache for sharing across tasks.
pub fn shared<V>(cache: TtlCache<V>) -> SharedCache<V> {
    Arc::new(RwLock::new(cache))
}
