//! Upstream Module
//!
//! Seams to the two external data sources: the listing feed (mandatory) and
//! the status store (best-effort overlay, plus the SMS-link log).

mod airtable;
mod glo3d;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::inventory::{FeedPage, FilterSet, StatusTable};

pub use airtable::{status_from_fields, AirtableStore, STATUS_FIELDS};
pub use glo3d::{FeedRequest, Glo3dFeed};

/// Source of raw vehicle listings.
#[async_trait]
pub trait InventoryFeed: Send + Sync {
    /// Fetches one page of listings, passing `filters` through upstream.
    ///
    /// Any failure is an [`AppError::UpstreamUnavailable`].
    async fn fetch_listings(&self, filters: &FilterSet) -> Result<FeedPage>;
}

/// Source of per-vehicle status rows.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Reads the whole table. Any failure is an
    /// [`AppError::SecondaryUnavailable`].
    async fn fetch_statuses(&self) -> Result<StatusTable>;

    /// Appends one row to the SMS-link log. Not retried.
    async fn record_sms_link(&self, link: &SmsLink) -> Result<()>;
}

/// A tour link sent to a phone number.
#[derive(Debug, Clone, PartialEq)]
pub struct SmsLink {
    pub phone_number: String,
    pub tour_url: String,
    pub sent_at: DateTime<Utc>,
}

impl SmsLink {
    pub fn now(phone_number: impl Into<String>, tour_url: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            tour_url: tour_url.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Builds the HTTP client shared by both adapters. `deadline` bounds every
/// request end to end.
pub fn http_client(deadline: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(deadline) = deadline {
        builder = builder.timeout(deadline);
    }
    builder
        .build()
        .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))
}

/// Short description of a transport error, calling out deadline expiry.
fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    }
}
