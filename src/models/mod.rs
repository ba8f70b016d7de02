//! Request and Response models for the inventory API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{FacetQuery, InventoryQuery, SmsRequest, TableQuery};
pub use responses::{
    CacheStatsResponse, ErrorResponse, HealthResponse, InventoryResponse, StatsResponse,
    SuccessResponse, TablePageResponse,
};
