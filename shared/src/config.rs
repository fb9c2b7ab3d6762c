//! Environment-driven configuration

use crate::errors::{Error, Result};

const TABLE_NAME_ENV: &str = "TABLESCAN_TABLE";
const REGION_ENV: &str = "TABLESCAN_REGION";
const ENDPOINT_URL_ENV: &str = "TABLESCAN_ENDPOINT_URL";
const SEGMENTS_ENV: &str = "TABLESCAN_SEGMENTS";
const PAGE_SIZE_ENV: &str = "TABLESCAN_PAGE_SIZE";
const KEY_ATTRIBUTE_ENV: &str = "TABLESCAN_KEY_ATTRIBUTE";

const DEFAULT_TABLE_NAME: &str = "tablescan";
const DEFAULT_SEGMENTS: i32 = 4;
const DEFAULT_PAGE_SIZE: i32 = 100;
const DEFAULT_KEY_ATTRIBUTE: &str = "id";

/// Store connection settings and scan defaults
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Table used when a request names none
    pub table_name: String,
    /// Region override; the AWS default provider chain is used when unset
    pub region: Option<String>,
    /// Custom endpoint (DynamoDB Local, LocalStack)
    pub endpoint_url: Option<String>,
    pub default_segments: i32,
    pub default_page_size: i32,
    /// Partition key attribute addressed by single-item operations
    pub key_attribute: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            region: None,
            endpoint_url: None,
            default_segments: DEFAULT_SEGMENTS,
            default_page_size: DEFAULT_PAGE_SIZE,
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, test map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            table_name: lookup(TABLE_NAME_ENV).unwrap_or(defaults.table_name),
            region: lookup(REGION_ENV).filter(|r| !r.is_empty()),
            endpoint_url: lookup(ENDPOINT_URL_ENV).filter(|u| !u.is_empty()),
            default_segments: parse_positive(&lookup, SEGMENTS_ENV, defaults.default_segments)?,
            default_page_size: parse_positive(&lookup, PAGE_SIZE_ENV, defaults.default_page_size)?,
            key_attribute: lookup(KEY_ATTRIBUTE_ENV)
                .filter(|k| !k.is_empty())
                .unwrap_or(defaults.key_attribute),
        })
    }
}

fn parse_positive<F>(lookup: &F, key: &str, default: i32) -> Result<i32>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(Error::Config(format!("{} must be a positive integer, got {:?}", key, raw))),
        },
    }
}
