//! Configuration Module
//!
//! Loads server, cache and upstream settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GLO3D_API_URL: &str =
    "https://us-central1-glo3d-c338b.cloudfunctions.net/outbound/api/v1/inventory";
pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for merged inventory results
    pub inventory_cache_ttl: u64,
    /// TTL in seconds for the status table snapshot
    pub status_cache_ttl: u64,
    /// Size bound for the inventory cache, 0 = unbounded
    pub inventory_cache_max_entries: usize,
    /// Per-request deadline for upstream calls in seconds, 0 = none
    pub upstream_timeout: u64,
    pub glo3d_api_url: String,
    pub glo3d_username: String,
    pub glo3d_password: String,
    pub airtable_api_url: String,
    pub airtable_api_key: String,
    pub airtable_base_id: String,
    pub airtable_inventory_table: String,
    pub airtable_sms_table: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` (default: 3000)
    /// - `INVENTORY_CACHE_TTL` / `STATUS_CACHE_TTL` seconds (default: 3600)
    /// - `INVENTORY_CACHE_MAX_ENTRIES` (default: 0, unbounded)
    /// - `UPSTREAM_TIMEOUT_SECS` (default: 30, 0 disables)
    /// - `GLO3D_API_URL`, `GLO3D_USERNAME`, `GLO3D_PASSWORD`
    /// - `AIRTABLE_API_URL`, `AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID`
    /// - `AIRTABLE_INVENTORY_TABLE` (default: "SINGLE INVENTORY")
    /// - `AIRTABLE_SMS_TABLE` (default: "SMSLinks")
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            server_port: parsed("SERVER_PORT", defaults.server_port),
            inventory_cache_ttl: parsed("INVENTORY_CACHE_TTL", defaults.inventory_cache_ttl),
            status_cache_ttl: parsed("STATUS_CACHE_TTL", defaults.status_cache_ttl),
            inventory_cache_max_entries: parsed(
                "INVENTORY_CACHE_MAX_ENTRIES",
                defaults.inventory_cache_max_entries,
            ),
            upstream_timeout: parsed("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout),
            glo3d_api_url: text("GLO3D_API_URL", defaults.glo3d_api_url),
            glo3d_username: text("GLO3D_USERNAME", defaults.glo3d_username),
            glo3d_password: text("GLO3D_PASSWORD", defaults.glo3d_password),
            airtable_api_url: text("AIRTABLE_API_URL", defaults.airtable_api_url),
            airtable_api_key: text("AIRTABLE_API_KEY", defaults.airtable_api_key),
            airtable_base_id: text("AIRTABLE_BASE_ID", defaults.airtable_base_id),
            airtable_inventory_table: text(
                "AIRTABLE_INVENTORY_TABLE",
                defaults.airtable_inventory_table,
            ),
            airtable_sms_table: text("AIRTABLE_SMS_TABLE", defaults.airtable_sms_table),
        }
    }

    pub fn inventory_ttl(&self) -> Duration {
        Duration::from_secs(self.inventory_cache_ttl)
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_cache_ttl)
    }

    /// Upstream deadline, `None` when disabled.
    pub fn upstream_deadline(&self) -> Option<Duration> {
        (self.upstream_timeout > 0).then(|| Duration::from_secs(self.upstream_timeout))
    }
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn text(name: &str, default: String) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            inventory_cache_ttl: 3600,
            status_cache_ttl: 3600,
            inventory_cache_max_entries: 0,
            upstream_timeout: 30,
            glo3d_api_url: DEFAULT_GLO3D_API_URL.to_string(),
            glo3d_username: String::new(),
            glo3d_password: String::new(),
            airtable_api_url: DEFAULT_AIRTABLE_API_URL.to_string(),
            airtable_api_key: String::new(),
            airtable_base_id: String::new(),
            airtable_inventory_table: "SINGLE INVENTORY".to_string(),
            airtable_sms_table: "SMSLinks".to_string(),
        }
    }
}
