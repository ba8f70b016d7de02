//! Inventory Aggregator
//!
//! Memoizes merged inventory per filter set. On a miss the listing feed and the
//! status table are requested together, joined by VIN and stored under the
//! filter set's key.
//!
//! Overlapping misses for one key are not de-duplicated: each fetches, merges
//! and writes, and the last write wins.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{shared, CacheStats, SharedCache, TtlCache};
use crate::error::{AppError, Result};
use crate::inventory::{merge, FilterSet, InventoryItem, StatusTable};
use crate::upstream::{InventoryFeed, SmsLink, StatusStore};

/// Single key under which the status table snapshot is cached.
pub const STATUS_CACHE_KEY: &str = "vinStatuses";

/// Merged inventory as stored in, and served from, the cache.
pub type Inventory = Arc<Vec<InventoryItem>>;

// == Aggregator ==
#[derive(Clone)]
pub struct InventoryAggregator {
    feed: Arc<dyn InventoryFeed>,
    statuses: Arc<dyn StatusStore>,
    inventory_cache: SharedCache<Inventory>,
    status_cache: SharedCache<Arc<StatusTable>>,
}

impl InventoryAggregator {
    pub fn new(
        feed: Arc<dyn InventoryFeed>,
        statuses: Arc<dyn StatusStore>,
        inventory_cache: TtlCache<Inventory>,
        status_cache: TtlCache<Arc<StatusTable>>,
    ) -> Self {
        Self {
            feed,
            statuses,
            inventory_cache: shared(inventory_cache),
            status_cache: shared(status_cache),
        }
    }

    // == Fetch Inventory ==
    /// Returns the merged inventory for `filters`, from cache when fresh.
    ///
    /// Fails only when the listing feed fails. An unavailable status store
    /// is treated as an empty table, which merges to an empty result.
    pub async fn fetch_inventory(&self, filters: &FilterSet) -> Result<Inventory> {
        let key = filters.cache_key();

        let cached = self.inventory_cache.write().await.get(&key);
        if let Some(items) = cached {
            debug!(key = %key, items = items.len(), "inventory served from cache");
            return Ok(items);
        }

        debug!(key = %key, "inventory cache miss, fetching upstream");
        let (page, table) = tokio::join!(self.feed.fetch_listings(filters), self.status_table());
        let page = page?;

        let merged: Inventory = Arc::new(merge(page.data, &table));
        debug!(key = %key, items = merged.len(), "inventory merged");

        self.inventory_cache.write().await.set(key, merged.clone());
        Ok(merged)
    }

    /// Status table from its own cache, refreshed from the store on a miss.
    /// A failed refresh yields an empty table and is not cached.
    async fn status_table(&self) -> Arc<StatusTable> {
        let cached = self.status_cache.write().await.get(STATUS_CACHE_KEY);
        if let Some(table) = cached {
            return table;
        }

        match self.statuses.fetch_statuses().await {
            Ok(table) => {
                let table = Arc::new(table);
                self.status_cache
                    .write()
                    .await
                    .set(STATUS_CACHE_KEY, table.clone());
                table
            }
            Err(e) => {
                warn!(error = %e, "status store unavailable, treating as empty");
                Arc::new(StatusTable::new())
            }
        }
    }

    // == Find By VIN ==
    /// Looks a vehicle up in the unfiltered inventory.
    pub async fn find_by_vin(&self, vin: &str) -> Result<InventoryItem> {
        let items = self.fetch_inventory(&FilterSet::default()).await?;
        items
            .iter()
            .find(|item| item.vin() == vin)
            .cloned()
            .ok_or_else(|| AppError::NotFound(vin.to_string()))
    }

    // == Clear Cache ==
    /// Empties both caches. Idempotent.
    pub async fn clear_cache(&self) {
        self.inventory_cache.write().await.clear();
        self.status_cache.write().await.clear();
        info!("inventory and status caches cleared");
    }

    /// Counters for the inventory cache and the status cache, in that order.
    pub async fn cache_stats(&self) -> (CacheStats, CacheStats) {
        let inventory = self.inventory_cache.read().await.stats();
        let status = self.status_cache.read().await.stats();
        (inventory, status)
    }

    /// Configured TTLs of the inventory and status caches.
    pub async fn cache_ttls(&self) -> (Duration, Duration) {
        let inventory = self.inventory_cache.read().await.ttl();
        let status = self.status_cache.read().await.ttl();
        (inventory, status)
    }

    // == SMS Links ==
    /// Writes a sent tour link to the status store's log.
    pub async fn record_sms_link(&self, link: &SmsLink) -> Result<()> {
        self.statuses.record_sms_link(link).await
    }
}
