//! DynamoDB operations for TableScan
//!
//! Thin pass-through calls (list/get/put/delete/query) plus the single-segment
//! scan the [`ScanCoordinator`](crate::coordinator::ScanCoordinator) fans out.
//! Every store failure is returned as [`Error::Database`]; nothing is swallowed.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::Client;
use tracing::debug;

use crate::config::StoreConfig;
use crate::errors::{Error, Result};
use crate::models::*;
use crate::store::ScanStore;

/// DynamoDB client for TableScan operations
#[derive(Clone)]
pub struct DynamoClient {
    client: Client,
    table_name: String,
}

impl DynamoClient {
    /// Create with an explicit default table name
    pub fn with_table_name(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// Load AWS configuration once and build the client from it
    pub async fn from_config(config: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        Self::with_table_name(Client::new(&sdk_config), config.table_name.clone())
    }

    /// Default table for requests that name none
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn table<'a>(&'a self, requested: &'a str) -> &'a str {
        if requested.is_empty() {
            &self.table_name
        } else {
            requested
        }
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// List all table names visible to the credentials
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        let mut start: Option<String> = None;

        loop {
            let result = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(start)
                .send()
                .await
                .map_err(database_error)?;

            tables.extend(result.table_names.unwrap_or_default());

            match result.last_evaluated_table_name {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        Ok(tables)
    }

    // =========================================================================
    // Item Operations
    // =========================================================================

    /// Get one item by its full primary key
    pub async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(self.table(table_name))
            .set_key(Some(key))
            .send()
            .await
            .map_err(database_error)?;

        Ok(result.item)
    }

    /// Create or replace an item
    pub async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(self.table(table_name))
            .set_item(Some(item))
            .send()
            .await
            .map_err(database_error)?;

        Ok(())
    }

    /// Delete an item by its full primary key
    pub async fn delete_item(&self, table_name: &str, key: Item) -> Result<()> {
        self.client
            .delete_item()
            .table_name(self.table(table_name))
            .set_key(Some(key))
            .send()
            .await
            .map_err(database_error)?;

        Ok(())
    }

    /// Run one key-condition query call
    pub async fn query(&self, req: &QueryRequest) -> Result<QueryPage> {
        if req.key_condition_expression.is_empty() {
            return Err(Error::Validation("key_condition_expression is required".to_string()));
        }

        let result = self
            .client
            .query()
            .table_name(self.table(&req.table_name))
            .set_index_name(req.index_name.clone())
            .key_condition_expression(&req.key_condition_expression)
            .set_filter_expression(req.filter_expression.clone())
            .set_projection_expression(req.projection_expression.clone())
            .set_expression_attribute_names(req.expression_attribute_names.clone())
            .set_expression_attribute_values(req.expression_attribute_values.clone())
            .set_limit(req.limit)
            .set_scan_index_forward(req.scan_index_forward)
            .set_exclusive_start_key(req.exclusive_start_key.clone())
            .send()
            .await
            .map_err(database_error)?;

        Ok(QueryPage::from(result))
    }
}

#[async_trait]
impl ScanStore for DynamoClient {
    async fn scan(&self, request: ScanRequest) -> Result<PartialScanResult> {
        let table_name = self.table(&request.table_name).to_string();
        debug!(table = %table_name, segment = ?request.segment, "Scanning");

        let result = self
            .client
            .scan()
            .table_name(table_name)
            .set_index_name(request.index_name)
            .set_filter_expression(request.filter_expression)
            .set_projection_expression(request.projection_expression)
            .set_expression_attribute_names(request.expression_attribute_names)
            .set_expression_attribute_values(request.expression_attribute_values)
            .set_limit(request.limit)
            .set_consistent_read(request.consistent_read)
            .set_exclusive_start_key(request.exclusive_start_key)
            .set_segment(request.segment)
            .set_total_segments(request.total_segments)
            .send()
            .await
            .map_err(database_error)?;

        Ok(PartialScanResult::from(result))
    }
}

fn database_error<E>(e: E) -> Error
where
    E: std::error::Error + 'static,
{
    Error::Database(DisplayErrorContext(e).to_string())
}
