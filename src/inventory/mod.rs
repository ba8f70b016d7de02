//! Inventory Module
//!
//! Records, filter-set keys, the feed/status merge, the caching aggregator and
//! the pure post-processing applied to its output.

mod aggregator;
mod filters;
mod merge;
mod model;
pub mod query;

pub use aggregator::{Inventory, InventoryAggregator, STATUS_CACHE_KEY};
pub use filters::FilterSet;
pub use merge::merge;
pub use model::{
    numeric_value, parse_leading_float, value_text, FeedPage, InventoryItem, Listing,
    StatusRecord, StatusTable, UNKNOWN_STATUS,
};
