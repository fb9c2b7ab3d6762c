//! Test fixtures and utilities

use uuid::Uuid;

const API_URL_ENV: &str = "TABLESCAN_API_URL";
const TEST_TABLE_ENV: &str = "TABLESCAN_TEST_TABLE";

/// Load `.env` once and return the API URL, if configured
pub fn api_url() -> Option<String> {
    dotenvy::dotenv().ok();
    std::env::var(API_URL_ENV).ok().filter(|u| !u.is_empty())
}

/// Table the tests write into
pub fn test_table() -> String {
    dotenvy::dotenv().ok();
    std::env::var(TEST_TABLE_ENV).unwrap_or_else(|_| "tablescan".to_string())
}

/// Generate a unique item ID for testing
pub fn unique_id() -> String {
    format!("test-item-{}", &Uuid::new_v4().to_string()[..8])
}

/// Generate a unique run tag so a test can find its own items in a scan
pub fn unique_tag() -> String {
    format!("run-{}", &Uuid::new_v4().to_string()[..8])
}

/// Check if API URL is configured
pub fn api_url_configured() -> bool {
    api_url().is_some()
}

/// Skip test if API URL is not configured
#[macro_export]
macro_rules! skip_if_no_api {
    () => {
        if !$crate::fixtures::api_url_configured() {
            eprintln!("Skipping test: TABLESCAN_API_URL not set");
            return;
        }
    };
}
