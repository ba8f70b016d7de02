//! Response DTOs for the inventory API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::inventory::query::Pagination;
use crate::inventory::InventoryItem;

/// Response body for `GET /api/inventory`
#[derive(Debug, Clone, Serialize)]
pub struct InventoryResponse {
    pub total: usize,
    pub data: Vec<InventoryItem>,
}

impl InventoryResponse {
    pub fn new(data: Vec<InventoryItem>) -> Self {
        Self {
            total: data.len(),
            data,
        }
    }
}

/// Response body for `GET /api/inventory/table`
#[derive(Debug, Clone, Serialize)]
pub struct TablePageResponse {
    pub data: Vec<InventoryItem>,
    pub pagination: Pagination,
    pub search: String,
}

/// Acknowledgement for operations without a payload
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Counters of one cache instance
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub ttl_seconds: u64,
}

impl CacheStatsResponse {
    pub fn new(stats: &CacheStats, ttl_seconds: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            ttl_seconds,
        }
    }
}

/// Response body for `GET /api/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub inventory: CacheStatsResponse,
    pub status: CacheStatsResponse,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
