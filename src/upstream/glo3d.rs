//! Listing feed adapter (GLO3D inventory API).

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{describe, InventoryFeed};
use crate::error::{AppError, Result};
use crate::inventory::{FeedPage, FilterSet};

/// Page size requested from the feed; the whole lot fits in one page.
pub const FEED_PAGE_LIMIT: u32 = 1000;

/// Body posted to the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub offset: u32,
    pub limit: u32,
    pub capture_type: &'static str,
    pub response_type: &'static str,
    pub privacy: &'static str,
    #[serde(flatten)]
    pub filters: FilterSet,
}

impl FeedRequest {
    pub fn new(filters: &FilterSet) -> Self {
        Self {
            offset: 0,
            limit: FEED_PAGE_LIMIT,
            capture_type: "all",
            response_type: "all",
            privacy: "public",
            filters: filters.normalized(),
        }
    }
}

/// HTTP client for the listing feed, authenticated with basic auth.
pub struct Glo3dFeed {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl Glo3dFeed {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl InventoryFeed for Glo3dFeed {
    async fn fetch_listings(&self, filters: &FilterSet) -> Result<FeedPage> {
        let resp = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&FeedRequest::new(filters))
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "listing feed returned {status}: {body}"
            )));
        }

        let page: FeedPage = resp
            .json()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("malformed feed response: {e}")))?;

        debug!(
            total = ?page.total,
            page_size = ?page.page_size,
            remaining = ?page.remaining,
            listings = page.data.len(),
            "listing feed responded"
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_defaults() {
        let body = serde_json::to_value(FeedRequest::new(&FilterSet::default())).unwrap();
        assert_eq!(
            body,
            json!({
                "offset": 0,
                "limit": 1000,
                "captureType": "all",
                "responseType": "all",
                "privacy": "public"
            })
        );
    }

    #[test]
    fn test_request_body_passes_filters_through() {
        let filters = FilterSet {
            make: Some("Honda".into()),
            year: Some("2020".into()),
            model: Some(String::new()),
            ..FilterSet::default()
        };
        let body = serde_json::to_value(FeedRequest::new(&filters)).unwrap();

        assert_eq!(body["make"], "Honda");
        assert_eq!(body["year"], "2020");
        assert!(body.get("model").is_none());
        assert_eq!(body["limit"], 1000);
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_upstream_unavailable() {
        // Nothing listens on port 9 on a test host
        let client = crate::upstream::http_client(Some(std::time::Duration::from_secs(2))).unwrap();
        let feed = Glo3dFeed::new(client, "http://127.0.0.1:9/", "user", "pass");

        let result = feed.fetch_listings(&FilterSet::default()).await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }
}
