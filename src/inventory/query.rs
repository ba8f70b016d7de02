//! Filtering, sorting, searching and paging over merged inventory.
//!
//! Everything here is pure and runs after the aggregator returns. Location
//! matching is case-insensitive against any of the record's locations, and
//! price filters and sorts read the status store's cost.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::inventory::{value_text, FilterSet, InventoryItem};

/// Lifecycle statuses in display order.
pub const STATUS_ORDER: &[&str] = &[
    "AVAILABLE",
    "DEAL PENDING",
    "SIGNED DEAL",
    "PENDING DELIVERY",
    "ON DELIVERY",
    "DELIVERED",
    "IN FUNDING",
    "BOOKED | NOT DELIVERED",
    "BOOKED | DELIVERED",
    "CHASE",
    "DO NOT SELL",
    "VOID | IN STOCK",
    "VOID | OUTSOURCED",
    "WHOLESALE",
    "Unknown",
];

// == Price Buckets ==
/// Price bands accepted by `price_range`.
///
/// Both label sets in use are recognized: the listing set (`0-15000`,
/// `15000-30000`) and the cost set (`0-20000`, `20000-30000`). Upper bounds
/// are inclusive; `50000+` is strictly above 50000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    UpTo15k,
    From15kTo30k,
    UpTo20k,
    From20kTo30k,
    From30kTo50k,
    Over50k,
}

impl PriceBucket {
    /// `None` for labels outside both sets.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "0-15000" => Some(Self::UpTo15k),
            "15000-30000" => Some(Self::From15kTo30k),
            "0-20000" => Some(Self::UpTo20k),
            "20000-30000" => Some(Self::From20kTo30k),
            "30000-50000" => Some(Self::From30kTo50k),
            "50000+" => Some(Self::Over50k),
            _ => None,
        }
    }

    pub fn contains(self, price: f64) -> bool {
        match self {
            Self::UpTo15k => price <= 15_000.0,
            Self::From15kTo30k => price > 15_000.0 && price <= 30_000.0,
            Self::UpTo20k => price <= 20_000.0,
            Self::From20kTo30k => price > 20_000.0 && price <= 30_000.0,
            Self::From30kTo50k => price > 30_000.0 && price <= 50_000.0,
            Self::Over50k => price > 50_000.0,
        }
    }
}

/// Bucket predicate on a raw label; a missing or unknown label passes all.
pub fn in_price_range(price: f64, label: Option<&str>) -> bool {
    label
        .and_then(PriceBucket::parse)
        .map_or(true, |bucket| bucket.contains(price))
}

// == Sorting ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `"asc"` sorts ascending; any other non-empty value sorts descending.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" => None,
            "asc" => Some(Self::Ascending),
            _ => Some(Self::Descending),
        }
    }
}

/// Stable sort by cost; non-numeric cost counts as 0.
pub fn sort_by_price(items: &mut [InventoryItem], direction: SortDirection) {
    items.sort_by(|a, b| {
        let ord = a.cost().partial_cmp(&b.cost()).unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn status_rank(status: &str) -> usize {
    STATUS_ORDER
        .iter()
        .position(|known| *known == status)
        .unwrap_or(STATUS_ORDER.len())
}

/// Stable sort by [`STATUS_ORDER`]; unlisted statuses go last.
pub fn sort_by_status(items: &mut [InventoryItem]) {
    items.sort_by_key(|item| status_rank(item.status()));
}

// == Predicates ==
/// Case-insensitive substring test over make, model, VIN, year, trim and
/// locations.
pub fn matches_search(item: &InventoryItem, term: &str) -> bool {
    let haystack = [
        item.make(),
        item.model(),
        Some(item.vin().to_string()),
        item.year(),
        item.trim(),
        Some(item.locations().join(",")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();

    haystack.contains(&term.to_lowercase())
}

/// Listing display fields searched by the table view.
pub const LISTING_SEARCH_FIELDS: &[&str] =
    &["make", "model", "vin", "year", "trim", "location", "stockNumber"];

/// Case-insensitive substring test over the listing's own display fields,
/// stock number included.
pub fn matches_listing_search(item: &InventoryItem, term: &str) -> bool {
    let fields = &item.listing.fields;
    let haystack = LISTING_SEARCH_FIELDS
        .iter()
        .filter_map(|name| fields.get(*name).and_then(value_text))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    haystack.contains(&term.to_lowercase())
}

pub fn matches_location(item: &InventoryItem, location: &str) -> bool {
    let wanted = location.to_uppercase();
    item.locations()
        .iter()
        .any(|loc| !loc.is_empty() && loc.to_uppercase() == wanted)
}

fn field_equals(actual: Option<String>, wanted: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => actual.as_deref() == Some(wanted),
        None => true,
    }
}

/// True when the item passes every filter present in `filters`.
pub fn matches(item: &InventoryItem, filters: &FilterSet) -> bool {
    let f = filters.normalized();

    if let Some(location) = f.location.as_deref() {
        if !matches_location(item, location) {
            return false;
        }
    }

    let status_ok = f.status.as_deref().map_or(true, |s| item.status() == s);

    field_equals(item.make(), f.make.as_deref())
        && field_equals(item.model(), f.model.as_deref())
        && field_equals(item.year(), f.year.as_deref())
        && field_equals(item.vehicle_type(), f.vehicle_type.as_deref())
        && status_ok
        && in_price_range(item.cost(), f.price_range.as_deref())
        && f.search.as_deref().map_or(true, |term| matches_search(item, term))
}

/// Filters, then sorts by price when `price_sort` is set.
pub fn apply(items: &[InventoryItem], filters: &FilterSet) -> Vec<InventoryItem> {
    let mut selected: Vec<InventoryItem> = items
        .iter()
        .filter(|item| matches(item, filters))
        .cloned()
        .collect();

    if let Some(direction) = filters.price_sort.as_deref().and_then(SortDirection::parse) {
        sort_by_price(&mut selected, direction);
    }

    selected
}

// == Facets ==
/// Distinct values offered as filter choices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub makes: Vec<String>,
    pub models: Vec<String>,
    /// Newest first
    pub years: Vec<String>,
    /// Primary (first) location of each record
    pub locations: Vec<String>,
    pub vehicle_types: Vec<String>,
    pub statuses: Vec<String>,
}

pub fn facets(items: &[InventoryItem]) -> Facets {
    let mut makes = BTreeSet::new();
    let mut models = BTreeSet::new();
    let mut years = BTreeSet::new();
    let mut locations = BTreeSet::new();
    let mut vehicle_types = BTreeSet::new();
    let mut statuses = BTreeSet::new();

    for item in items {
        makes.extend(item.make().filter(|v| !v.is_empty()));
        models.extend(item.model().filter(|v| !v.is_empty()));
        years.extend(item.year().filter(|v| !v.is_empty()));
        locations.extend(item.locations().first().filter(|v| !v.is_empty()).cloned());
        vehicle_types.extend(item.vehicle_type().filter(|v| !v.is_empty()));
        if !item.status().is_empty() {
            statuses.insert(item.status().to_string());
        }
    }

    Facets {
        makes: makes.into_iter().collect(),
        models: models.into_iter().collect(),
        years: years.into_iter().rev().collect(),
        locations: locations.into_iter().collect(),
        vehicle_types: vehicle_types.into_iter().collect(),
        statuses: statuses.into_iter().collect(),
    }
}

// == Pagination ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total: usize,
    pub limit: usize,
}

/// Returns the requested page (1-based) and the page metadata. Page and
/// limit of 0 are treated as 1.
pub fn paginate(
    items: &[InventoryItem],
    page: usize,
    limit: usize,
) -> (Vec<InventoryItem>, Pagination) {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len().div_ceil(limit).max(1);

    let slice = items
        .iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .cloned()
        .collect();

    (
        slice,
        Pagination {
            current: page,
            total,
            limit,
        },
    )
}
