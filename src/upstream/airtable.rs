//! Status store adapter (Airtable REST API).

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{describe, SmsLink, StatusStore};
use crate::error::{AppError, Result};
use crate::inventory::{value_text, StatusRecord, StatusTable, UNKNOWN_STATUS};

/// Columns read from the inventory table.
pub const STATUS_FIELDS: &[&str] = &[
    "VIN.",
    "STATUS",
    "YEAR",
    "MAKE",
    "MODEL",
    "TRIMLINE",
    "STOCK LOCATION.",
    "CARFAX LINK",
    "KM",
    "COLOUR",
    "COST.",
    "PURCHASE PROVINCE",
    "DRIVE",
    "SEATS",
    "TYPE",
    "DECS $",
    "ON SITE",
    "INSPECTED",
    "DETAILED",
    "NEW PICS",
    "AFC",
];

/// Upper bound on pages read for one snapshot.
pub const MAX_STATUS_PAGES: usize = 500;

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<Record>,
    /// Cursor for the next page; absent on the last one
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Maps one inventory-table row to `(vin, record)`. Rows without a VIN are
/// skipped.
pub fn status_from_fields(fields: &Map<String, Value>) -> Option<(String, StatusRecord)> {
    let vin = fields
        .get("VIN.")
        .and_then(value_text)
        .filter(|vin| !vin.is_empty())?;

    let status = match fields.get("STATUS") {
        Some(Value::Array(values)) => values.first().and_then(value_text),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

    let location = match fields.get("STOCK LOCATION.") {
        Some(Value::Array(values)) => values.iter().filter_map(value_text).collect(),
        Some(value) => value_text(value).into_iter().collect(),
        None => Vec::new(),
    };

    let raw = |name: &str| fields.get(name).filter(|v| !v.is_null()).cloned();

    let record = StatusRecord {
        status,
        year: raw("YEAR"),
        make: raw("MAKE"),
        model: raw("MODEL"),
        trimline: raw("TRIMLINE"),
        carfax: raw("CARFAX LINK"),
        km: raw("KM"),
        color: raw("COLOUR"),
        cost: raw("COST."),
        location,
        drive: raw("DRIVE"),
        seats: raw("SEATS"),
        vehicle_type: raw("TYPE"),
        declaration: raw("DECS $"),
        on_site: raw("ON SITE"),
        inspection: raw("INSPECTED"),
        detailed: raw("DETAILED"),
        new_pics: raw("NEW PICS"),
        afc: raw("AFC"),
    };

    Some((vin, record))
}

/// HTTP client for the status base, authenticated with a bearer token.
pub struct AirtableStore {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    base_id: String,
    inventory_table: String,
    sms_table: String,
}

impl AirtableStore {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        base_id: impl Into<String>,
        inventory_table: impl Into<String>,
        sms_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            base_id: base_id.into(),
            inventory_table: inventory_table.into(),
            sms_table: sms_table.into(),
        }
    }

    /// `{api_url}/{base_id}/{table}` with the table name percent-encoded.
    fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::SecondaryUnavailable(format!("invalid status store URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::SecondaryUnavailable("status store URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .push(&self.base_id)
            .push(table);
        Ok(url)
    }

    async fn fetch_page(&self, url: &Url, offset: Option<&str>) -> Result<RecordPage> {
        let mut query: Vec<(&str, &str)> = STATUS_FIELDS.iter().map(|f| ("fields[]", *f)).collect();
        if let Some(offset) = offset {
            query.push(("offset", offset));
        }

        let resp = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::SecondaryUnavailable(describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::SecondaryUnavailable(format!(
                "status store returned {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| AppError::SecondaryUnavailable(format!("malformed status page: {e}")))
    }
}

/// Decides whether to follow `next` after `pages` pages. A cursor that was
/// already followed, or a page count at [`MAX_STATUS_PAGES`], ends the read
/// with an error instead of looping.
fn next_cursor(
    seen: &mut HashSet<String>,
    pages: usize,
    next: Option<String>,
) -> Result<Option<String>> {
    let Some(next) = next else {
        return Ok(None);
    };
    if !seen.insert(next.clone()) {
        warn!(offset = %next, pages, "status store repeated a page cursor");
        return Err(AppError::SecondaryUnavailable(format!(
            "status store repeated offset {next}"
        )));
    }
    if pages >= MAX_STATUS_PAGES {
        warn!(pages, "status store page limit reached");
        return Err(AppError::SecondaryUnavailable(format!(
            "status store exceeded {MAX_STATUS_PAGES} pages"
        )));
    }
    Ok(Some(next))
}

#[async_trait]
impl StatusStore for AirtableStore {
    async fn fetch_statuses(&self) -> Result<StatusTable> {
        let url = self.table_url(&self.inventory_table)?;
        let mut table = StatusTable::new();
        let mut offset: Option<String> = None;
        let mut seen = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(&url, offset.as_deref()).await?;
            pages += 1;
            table.extend(page.records.iter().filter_map(|r| status_from_fields(&r.fields)));

            match next_cursor(&mut seen, pages, page.offset)? {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(rows = table.len(), pages, "status store snapshot loaded");
        Ok(table)
    }

    async fn record_sms_link(&self, link: &SmsLink) -> Result<()> {
        let url = self.table_url(&self.sms_table)?;
        let body = json!({
            "records": [{
                "fields": {
                    "Phone Number": link.phone_number,
                    "Tour URL": link.tour_url,
                    "Date Sent": link.sent_at.to_rfc3339(),
                }
            }]
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::SecondaryUnavailable(describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::SecondaryUnavailable(format!(
                "SMS log returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn store(api_url: &str) -> AirtableStore {
        AirtableStore::new(
            reqwest::Client::new(),
            api_url,
            "key",
            "appBASE",
            "SINGLE INVENTORY",
            "SMSLinks",
        )
    }

    #[test]
    fn test_row_mapping() {
        let row = fields(json!({
            "VIN.": "VIN1",
            "STATUS": ["AVAILABLE"],
            "YEAR": 2021,
            "MAKE": "Honda",
            "COST.": 18500,
            "STOCK LOCATION.": ["CALGARY", "EDMONTON"],
            "DECS $": "None",
            "INSPECTED": true
        }));

        let (vin, record) = status_from_fields(&row).unwrap();
        assert_eq!(vin, "VIN1");
        assert_eq!(record.status, "AVAILABLE");
        assert_eq!(record.year, Some(json!(2021)));
        assert_eq!(record.cost, Some(json!(18500)));
        assert_eq!(record.location, vec!["CALGARY", "EDMONTON"]);
        assert_eq!(record.declaration, Some(json!("None")));
        assert_eq!(record.inspection, Some(json!(true)));
        assert_eq!(record.drive, None);
    }

    #[test]
    fn test_row_without_vin_skipped() {
        let row = fields(json!({ "STATUS": ["AVAILABLE"], "MAKE": "Honda" }));
        assert!(status_from_fields(&row).is_none());

        let blank = fields(json!({ "VIN.": "" }));
        assert!(status_from_fields(&blank).is_none());
    }

    #[test]
    fn test_missing_status_is_unknown() {
        let (_, record) = status_from_fields(&fields(json!({ "VIN.": "V" }))).unwrap();
        assert_eq!(record.status, UNKNOWN_STATUS);
        assert!(record.location.is_empty());

        let (_, record) =
            status_from_fields(&fields(json!({ "VIN.": "V", "STATUS": [] }))).unwrap();
        assert_eq!(record.status, UNKNOWN_STATUS);
    }

    #[test]
    fn test_scalar_location_becomes_list() {
        let row = fields(json!({ "VIN.": "V", "STOCK LOCATION.": "RED DEER" }));
        let (_, record) = status_from_fields(&row).unwrap();
        assert_eq!(record.location, vec!["RED DEER"]);
    }

    #[test]
    fn test_table_url_encodes_table_name() {
        let url = store("https://api.airtable.com/v0").table_url("SINGLE INVENTORY").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.airtable.com/v0/appBASE/SINGLE%20INVENTORY"
        );

        let url = store("https://api.airtable.com/v0/").table_url("SMSLinks").unwrap();
        assert_eq!(url.as_str(), "https://api.airtable.com/v0/appBASE/SMSLinks");
    }

    #[test]
    fn test_next_cursor_follows_fresh_offsets() {
        let mut seen = HashSet::new();
        assert_eq!(next_cursor(&mut seen, 1, Some("itr1".into())).unwrap(), Some("itr1".into()));
        assert_eq!(next_cursor(&mut seen, 2, Some("itr2".into())).unwrap(), Some("itr2".into()));
        assert_eq!(next_cursor(&mut seen, 3, None).unwrap(), None);
    }

    #[test]
    fn test_next_cursor_rejects_repeated_offset() {
        let mut seen = HashSet::new();
        next_cursor(&mut seen, 1, Some("itr1".into())).unwrap();
        let result = next_cursor(&mut seen, 2, Some("itr1".into()));
        assert!(matches!(result, Err(AppError::SecondaryUnavailable(_))));
    }

    #[test]
    fn test_next_cursor_stops_at_page_limit() {
        let mut seen = HashSet::new();
        let result = next_cursor(&mut seen, MAX_STATUS_PAGES, Some("fresh".into()));
        assert!(matches!(result, Err(AppError::SecondaryUnavailable(_))));

        // the last page is still accepted without a cursor
        assert_eq!(next_cursor(&mut seen, MAX_STATUS_PAGES, None).unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_stuck_on_one_offset_fails() {
        let app = axum::Router::new().fallback(|| async {
            axum::Json(json!({
                "records": [{ "fields": { "VIN.": "VIN1", "STATUS": "AVAILABLE" } }],
                "offset": "itrSTUCK"
            }))
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let result = store(&format!("http://{addr}/v0")).fetch_statuses().await;
        assert!(matches!(result, Err(AppError::SecondaryUnavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_secondary_unavailable() {
        let result = store("not a url").fetch_statuses().await;
        assert!(matches!(result, Err(AppError::SecondaryUnavailable(_))));

        let link = SmsLink::now("+15555550100".to_string(), "https://tour.example/A".to_string());
        let result = store("mailto:ops@example.com").record_sms_link(&link).await;
        assert!(matches!(result, Err(AppError::SecondaryUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_secondary_unavailable() {
        let result = store("http://127.0.0.1:9/v0").fetch_statuses().await;
        assert!(matches!(result, Err(AppError::SecondaryUnavailable(_))));
    }
}
