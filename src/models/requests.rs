//! Request DTOs for the inventory API
//!
//! Query strings and JSON bodies accepted by the handlers.

use serde::Deserialize;

use crate::inventory::FilterSet;

pub const DEFAULT_PAGE_LIMIT: usize = 25;

/// Query for `GET /api/inventory`; these filters are passed to the feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
}

impl InventoryQuery {
    pub fn filters(&self) -> FilterSet {
        FilterSet {
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year.clone(),
            ..FilterSet::default()
        }
    }
}

/// Query for `GET /api/inventory/table`.
///
/// `page` and `limit` are taken as text so that junk falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    #[serde(flatten)]
    pub inventory: InventoryQuery,
}

impl TableQuery {
    pub fn page(&self) -> usize {
        parse_positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn limit(&self) -> usize {
        parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    value?.trim().parse().ok().filter(|n| *n > 0)
}

/// Query for `GET /api/filters`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacetQuery {
    pub location: Option<String>,
}

/// Body of `POST /api/send-sms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub tour_url: String,
}

impl SmsRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.phone_number.trim().is_empty() {
            return Some("Phone number cannot be empty".to_string());
        }
        if self.tour_url.trim().is_empty() {
            return Some("Tour URL cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_query_to_filters() {
        let query = InventoryQuery {
            make: Some("Honda".into()),
            model: None,
            year: Some("2020".into()),
        };
        let filters = query.filters();
        assert_eq!(filters.make.as_deref(), Some("Honda"));
        assert_eq!(filters.year.as_deref(), Some("2020"));
        assert!(filters.location.is_none());
    }

    #[test]
    fn test_table_query_defaults() {
        let query = TableQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(query.search_term(), "");
    }

    #[test]
    fn test_table_query_junk_falls_back() {
        let query = TableQuery {
            page: Some("abc".into()),
            limit: Some("0".into()),
            ..TableQuery::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_LIMIT);

        let query = TableQuery {
            page: Some("3".into()),
            limit: Some("10".into()),
            ..TableQuery::default()
        };
        assert_eq!(query.page(), 3);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn test_sms_request_deserialize() {
        let json = r#"{"phoneNumber": "+15555550100", "tourUrl": "https://tour.example/A"}"#;
        let req: SmsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.phone_number, "+15555550100");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_sms_request_validation() {
        let req: SmsRequest = serde_json::from_str(r#"{"tourUrl": "https://x"}"#).unwrap();
        assert!(req.validate().is_some());

        let req: SmsRequest = serde_json::from_str(r#"{"phoneNumber": "1", "tourUrl": " "}"#).unwrap();
        assert!(req.validate().is_some());
    }
}
