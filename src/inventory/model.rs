//! Inventory records: raw listings from the feed, status rows from the
//! status store, and the merged record served to clients.

use std::collections::HashMap;

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Status used when a row carries no STATUS value.
pub const UNKNOWN_STATUS: &str = "Unknown";

// == Listing ==
/// One vehicle from the listing feed.
///
/// Only `vin`, `src` and `fields` are interpreted; every other key the feed
/// sends is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub vin: String,
    /// Media source (virtual tour URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Display attributes (make, model, year, price, features, ...)
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response envelope of the listing feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<u64>,
    #[serde(default)]
    pub remaining: Option<u64>,
    #[serde(default)]
    pub data: Vec<Listing>,
}

// == Status Record ==
/// One row of the status store, keyed elsewhere by VIN.
///
/// Values other than status and location are kept as the store returned them
/// (numbers, strings, lookup arrays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: String,
    #[serde(rename = "atYear", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Value>,
    #[serde(rename = "atMake", default, skip_serializing_if = "Option::is_none")]
    pub make: Option<Value>,
    #[serde(rename = "atModel", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(rename = "atTrimline", default, skip_serializing_if = "Option::is_none")]
    pub trimline: Option<Value>,
    #[serde(rename = "atCarfax", default, skip_serializing_if = "Option::is_none")]
    pub carfax: Option<Value>,
    #[serde(rename = "atKM", default, skip_serializing_if = "Option::is_none")]
    pub km: Option<Value>,
    #[serde(rename = "atColor", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(rename = "atCost", default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Value>,
    #[serde(rename = "atLocation", default)]
    pub location: Vec<String>,
    #[serde(rename = "atDrive", default, skip_serializing_if = "Option::is_none")]
    pub drive: Option<Value>,
    #[serde(rename = "atSeats", default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<Value>,
    #[serde(rename = "atType", default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<Value>,
    #[serde(rename = "atDeclaration", default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Value>,
    #[serde(rename = "atOnSite", default, skip_serializing_if = "Option::is_none")]
    pub on_site: Option<Value>,
    #[serde(rename = "atInspection", default, skip_serializing_if = "Option::is_none")]
    pub inspection: Option<Value>,
    #[serde(rename = "atDetailed", default, skip_serializing_if = "Option::is_none")]
    pub detailed: Option<Value>,
    #[serde(rename = "atNewPics", default, skip_serializing_if = "Option::is_none")]
    pub new_pics: Option<Value>,
    #[serde(rename = "atAFC", default, skip_serializing_if = "Option::is_none")]
    pub afc: Option<Value>,
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self {
            status: UNKNOWN_STATUS.to_string(),
            year: None,
            make: None,
            model: None,
            trimline: None,
            carfax: None,
            km: None,
            color: None,
            cost: None,
            location: Vec::new(),
            drive: None,
            seats: None,
            vehicle_type: None,
            declaration: None,
            on_site: None,
            inspection: None,
            detailed: None,
            new_pics: None,
            afc: None,
        }
    }
}

/// Full snapshot of the status store, VIN -> row.
pub type StatusTable = HashMap<String, StatusRecord>;

// == Inventory Item ==
/// A listing joined with its status row.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub listing: Listing,
    pub status: StatusRecord,
}

impl InventoryItem {
    pub fn new(listing: Listing, status: StatusRecord) -> Self {
        Self { listing, status }
    }

    pub fn vin(&self) -> &str {
        &self.listing.vin
    }

    pub fn status(&self) -> &str {
        &self.status.status
    }

    pub fn make(&self) -> Option<String> {
        self.status.make.as_ref().and_then(value_text)
    }

    pub fn model(&self) -> Option<String> {
        self.status.model.as_ref().and_then(value_text)
    }

    pub fn year(&self) -> Option<String> {
        self.status.year.as_ref().and_then(value_text)
    }

    pub fn trim(&self) -> Option<String> {
        self.status.trimline.as_ref().and_then(value_text)
    }

    pub fn vehicle_type(&self) -> Option<String> {
        self.status.vehicle_type.as_ref().and_then(value_text)
    }

    pub fn locations(&self) -> &[String] {
        &self.status.location
    }

    /// Cost from the status store; missing or non-numeric reads as 0.
    pub fn cost(&self) -> f64 {
        self.status.cost.as_ref().map(numeric_value).unwrap_or(0.0)
    }
}

impl Serialize for InventoryItem {
    /// Listing keys first, then `customerUrl`, then the status overlay, which
    /// replaces any listing key of the same name.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut merged = match serde_json::to_value(&self.listing) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(serde::ser::Error::custom(e)),
        };

        if let Some(src) = &self.listing.src {
            merged.insert("customerUrl".to_string(), Value::String(src.clone()));
        }

        match serde_json::to_value(&self.status) {
            Ok(Value::Object(overlay)) => merged.extend(overlay),
            Ok(_) => {}
            Err(e) => return Err(serde::ser::Error::custom(e)),
        }

        let mut map = serializer.serialize_map(Some(merged.len()))?;
        for (key, value) in &merged {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// == Value Helpers ==
/// Text form of a loosely typed store value. Lookup arrays use their first
/// element.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.first().and_then(value_text),
        Value::Null | Value::Object(_) => None,
    }
}

/// Numeric form of a loosely typed value; anything unparseable is 0.
pub fn numeric_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_leading_float(s),
        Value::Array(items) => items.first().map(numeric_value).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Parses the longest numeric prefix of `text` ("25000 CAD" -> 25000).
pub fn parse_leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '-' | '+' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing() -> Listing {
        serde_json::from_value(json!({
            "vin": "VIN1",
            "src": "https://tour.example/VIN1",
            "fields": { "make": "Honda", "price": "18000" },
            "status": "listed",
            "views": 12
        }))
        .unwrap()
    }

    #[test]
    fn test_listing_keeps_unknown_keys() {
        let listing = listing();
        assert_eq!(listing.vin, "VIN1");
        assert_eq!(listing.extra.get("views"), Some(&json!(12)));
        assert_eq!(listing.fields.get("make"), Some(&json!("Honda")));
    }

    #[test]
    fn test_feed_page_envelope() {
        let page: FeedPage = serde_json::from_value(json!({
            "total": 2, "pageSize": 1000, "remaining": 0,
            "data": [{ "vin": "A" }, { "vin": "B", "fields": { "year": "2020" } }]
        }))
        .unwrap();

        assert_eq!(page.total, Some(2));
        assert_eq!(page.page_size, Some(1000));
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[1].fields.get("year"), Some(&json!("2020")));
    }

    #[test]
    fn test_merged_serialization_overlay_wins() {
        let status = StatusRecord {
            status: "AVAILABLE".to_string(),
            make: Some(json!("Honda")),
            cost: Some(json!(21000)),
            location: vec!["CALGARY".to_string()],
            ..StatusRecord::default()
        };
        let item = InventoryItem::new(listing(), status);

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["vin"], "VIN1");
        assert_eq!(value["customerUrl"], "https://tour.example/VIN1");
        assert_eq!(value["status"], "AVAILABLE");
        assert_eq!(value["atMake"], "Honda");
        assert_eq!(value["atCost"], 21000);
        assert_eq!(value["atLocation"], json!(["CALGARY"]));
        assert_eq!(value["fields"]["price"], "18000");
        assert_eq!(value["views"], 12);
        assert!(value.get("atDrive").is_none());
    }

    #[test]
    fn test_value_text_forms() {
        assert_eq!(value_text(&json!("Civic")), Some("Civic".to_string()));
        assert_eq!(value_text(&json!(2021)), Some("2021".to_string()));
        assert_eq!(value_text(&json!(["SUV", "Truck"])), Some("SUV".to_string()));
        assert_eq!(value_text(&json!(null)), None);
    }

    #[test]
    fn test_numeric_value_forms() {
        assert_eq!(numeric_value(&json!(15000.5)), 15000.5);
        assert_eq!(numeric_value(&json!("25000")), 25000.0);
        assert_eq!(numeric_value(&json!("25000 CAD")), 25000.0);
        assert_eq!(numeric_value(&json!("$25,000")), 0.0);
        assert_eq!(numeric_value(&json!("")), 0.0);
        assert_eq!(numeric_value(&json!([30000])), 30000.0);
        assert_eq!(numeric_value(&json!(true)), 0.0);
    }

    #[test]
    fn test_cost_defaults_to_zero() {
        let item = InventoryItem::new(listing(), StatusRecord::default());
        assert_eq!(item.cost(), 0.0);
        assert_eq!(item.status(), UNKNOWN_STATUS);
    }
}
