//! API Handlers
//!
//! HTTP request handlers for each inventory endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::inventory::{query, FilterSet, InventoryAggregator, InventoryItem};
use crate::models::{
    CacheStatsResponse, FacetQuery, HealthResponse, InventoryQuery, InventoryResponse,
    SmsRequest, StatsResponse, SuccessResponse, TablePageResponse, TableQuery,
};
use crate::upstream::{http_client, AirtableStore, Glo3dFeed, InventoryFeed, SmsLink, StatusStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: InventoryAggregator,
}

impl AppState {
    pub fn new(aggregator: InventoryAggregator) -> Self {
        Self { aggregator }
    }

    /// Builds the aggregator over arbitrary adapters with caches sized from
    /// `config`.
    pub fn with_sources(
        config: &Config,
        feed: Arc<dyn InventoryFeed>,
        statuses: Arc<dyn StatusStore>,
    ) -> Self {
        let inventory_cache =
            TtlCache::bounded(config.inventory_ttl(), config.inventory_cache_max_entries);
        let status_cache = TtlCache::new(config.status_ttl());
        Self::new(InventoryAggregator::new(
            feed,
            statuses,
            inventory_cache,
            status_cache,
        ))
    }

    /// Creates the production state: HTTP adapters for the listing feed and
    /// the status store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http_client(config.upstream_deadline())?;

        let feed = Glo3dFeed::new(
            client.clone(),
            &config.glo3d_api_url,
            &config.glo3d_username,
            &config.glo3d_password,
        );
        let statuses = AirtableStore::new(
            client,
            &config.airtable_api_url,
            &config.airtable_api_key,
            &config.airtable_base_id,
            &config.airtable_inventory_table,
            &config.airtable_sms_table,
        );

        Ok(Self::with_sources(config, Arc::new(feed), Arc::new(statuses)))
    }
}

/// Handler for GET /api/inventory
///
/// Filters are passed to the listing feed and form the cache key.
pub async fn inventory_handler(
    State(state): State<AppState>,
    Query(params): Query<InventoryQuery>,
) -> Result<Json<InventoryResponse>> {
    let items = state.aggregator.fetch_inventory(&params.filters()).await?;
    Ok(Json(InventoryResponse::new(items.to_vec())))
}

/// Handler for GET /api/inventory/search
///
/// Fetches the unfiltered inventory and filters/sorts it locally.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(filters): Query<FilterSet>,
) -> Result<Json<Vec<InventoryItem>>> {
    debug!(?filters, "inventory search");
    let items = state.aggregator.fetch_inventory(&FilterSet::default()).await?;
    Ok(Json(query::apply(&items, &filters)))
}

/// Handler for GET /api/inventory/table
///
/// `search` matches the listing's display fields, stock number included.
pub async fn table_handler(
    State(state): State<AppState>,
    Query(params): Query<TableQuery>,
) -> Result<Json<TablePageResponse>> {
    let items = state
        .aggregator
        .fetch_inventory(&params.inventory.filters())
        .await?;

    let search = params.search_term().to_string();
    let matched: Vec<InventoryItem> = if search.is_empty() {
        items.to_vec()
    } else {
        items
            .iter()
            .filter(|item| query::matches_listing_search(item, &search))
            .cloned()
            .collect()
    };

    let (data, pagination) = query::paginate(&matched, params.page(), params.limit());
    Ok(Json(TablePageResponse {
        data,
        pagination,
        search,
    }))
}

/// Handler for GET /api/inventory/car/:vin
pub async fn car_handler(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<InventoryItem>> {
    let car = state.aggregator.find_by_vin(&vin).await?;
    Ok(Json(car))
}

/// Handler for GET /api/filters
///
/// Facet lists over the status-ordered inventory, narrowed to one location
/// when given.
pub async fn filters_handler(
    State(state): State<AppState>,
    Query(params): Query<FacetQuery>,
) -> Result<Json<query::Facets>> {
    let items = state.aggregator.fetch_inventory(&FilterSet::default()).await?;

    let mut selected: Vec<InventoryItem> = match params.location.as_deref() {
        Some(location) if !location.is_empty() && location != "undefined" => items
            .iter()
            .filter(|item| query::matches_location(item, location))
            .cloned()
            .collect(),
        _ => items.to_vec(),
    };
    query::sort_by_status(&mut selected);

    Ok(Json(query::facets(&selected)))
}

/// Handler for ANY /api/clear-cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<SuccessResponse> {
    info!("Clearing cache...");
    state.aggregator.clear_cache().await;
    Json(SuccessResponse::new("Cache cleared successfully"))
}

/// Handler for POST /api/send-sms
pub async fn send_sms_handler(
    State(state): State<AppState>,
    Json(req): Json<SmsRequest>,
) -> Result<Json<SuccessResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let link = SmsLink::now(req.phone_number, req.tour_url);
    state.aggregator.record_sms_link(&link).await?;

    Ok(Json(SuccessResponse::new("SMS record created successfully")))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let (inventory, status) = state.aggregator.cache_stats().await;
    let (inventory_ttl, status_ttl) = state.aggregator.cache_ttls().await;

    Json(StatsResponse {
        inventory: CacheStatsResponse::new(&inventory, inventory_ttl.as_secs()),
        status: CacheStatsResponse::new(&status, status_ttl.as_secs()),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
