//! TableScan Lambda
//!
//! Handles table access over HTTP:
//! - GET /tables - List tables
//! - GET /tables/{table}/items - Parallel scan (paginated when `page` or `page_size` is given)
//! - GET /tables/{table}/query - Query by key attribute
//! - GET /tables/{table}/items/{id} - Get item
//! - PUT /tables/{table}/items/{id} - Put item
//! - DELETE /tables/{table}/items/{id} - Delete item

use aws_sdk_dynamodb::types::AttributeValue;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, RequestExt, Response};
use serde::Serialize;
use std::sync::Arc;
use tablescan_core::{
    cursor, DynamoClient, Error, ErrorResponse, Item, MergedScanResult, Page, QueryPage,
    QueryRequest, ScanCoordinator, ScanRequest, StoreConfig,
};
use tracing::{error, info};

/// Shared state, built once per cold start
struct App {
    config: StoreConfig,
    client: Arc<DynamoClient>,
    coordinator: ScanCoordinator<DynamoClient>,
}

#[derive(Serialize)]
struct ListTablesResponse {
    tables: Vec<String>,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
struct ScanResponse {
    items: Vec<serde_json::Value>,
    count: u64,
    scanned_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_pages: Option<u64>,
}

impl ScanResponse {
    fn from_merged(merged: MergedScanResult) -> Result<Self, Error> {
        Ok(Self {
            items: to_json_items(merged.items)?,
            count: merged.count,
            scanned_count: merged.scanned_count,
            cursor: merged.last_evaluated_key.as_ref().map(cursor::encode).transpose()?,
            page: None,
            page_size: None,
            total_pages: None,
        })
    }

    fn from_page(page: Page) -> Result<Self, Error> {
        let total_pages = page.total_pages();
        Ok(Self {
            items: to_json_items(page.items)?,
            count: page.count,
            scanned_count: page.scanned_count,
            cursor: page.last_evaluated_key.as_ref().map(cursor::encode).transpose()?,
            page: Some(page.page_number),
            page_size: Some(page.page_size),
            total_pages: Some(total_pages),
        })
    }
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    items: Vec<serde_json::Value>,
    count: u64,
    scanned_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<String>,
}

impl QueryResponse {
    fn from_page(page: QueryPage) -> Result<Self, Error> {
        Ok(Self {
            items: to_json_items(page.items)?,
            count: page.count,
            scanned_count: page.scanned_count,
            cursor: page.last_evaluated_key.as_ref().map(cursor::encode).transpose()?,
        })
    }
}

/// Scan options taken from the query string
#[derive(Debug, PartialEq)]
struct ScanParams {
    segments: i32,
    /// (page_size, page_number)
    page: Option<(i32, i32)>,
    cursor: Option<String>,
    limit: Option<i32>,
}

impl ScanParams {
    fn parse<F>(lookup: F, config: &StoreConfig) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let segments = parse_int(&lookup, "segments")?.unwrap_or(config.default_segments);
        let page_number = parse_int(&lookup, "page")?;
        let page_size = parse_int(&lookup, "page_size")?;

        let page = match (page_size, page_number) {
            (None, None) => None,
            (size, number) => Some((size.unwrap_or(config.default_page_size), number.unwrap_or(1))),
        };

        // A resume key is only valid for the segment that produced it, and a
        // merged round keeps a single segment's key.
        let cursor = lookup("cursor").filter(|c| !c.is_empty());
        if cursor.is_some() && segments != 1 {
            return Err(Error::Validation(
                "cursor can only be resumed with segments=1".to_string(),
            ));
        }

        Ok(Self {
            segments,
            page,
            cursor,
            limit: parse_int(&lookup, "limit")?,
        })
    }
}

/// Build an equality query on the key attribute from the query string
fn query_request<F>(table: &str, key_attribute: &str, lookup: F) -> Result<QueryRequest, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let key = lookup("key")
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::Validation("key is required".to_string()))?;

    let scan_index_forward = lookup("forward")
        .map(|raw| {
            raw.parse::<bool>()
                .map_err(|_| Error::Validation("forward must be true or false".to_string()))
        })
        .transpose()?;

    let exclusive_start_key = lookup("cursor")
        .filter(|c| !c.is_empty())
        .map(|token| cursor::decode(&token))
        .transpose()?;

    Ok(QueryRequest {
        table_name: table.to_string(),
        key_condition_expression: "#k = :k".to_string(),
        expression_attribute_names: Some([("#k".to_string(), key_attribute.to_string())].into()),
        expression_attribute_values: Some([(":k".to_string(), AttributeValue::S(key))].into()),
        limit: parse_int(&lookup, "limit")?,
        scan_index_forward,
        exclusive_start_key,
        ..Default::default()
    })
}

fn parse_int<F>(lookup: &F, key: &str) -> Result<Option<i32>, Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| Error::Validation(format!("{} must be an integer", key)))
        })
        .transpose()
}

fn to_json(item: Item) -> Result<serde_json::Value, Error> {
    serde_dynamo::from_item(item).map_err(|e| Error::DynamoSerialization(e.to_string()))
}

fn to_json_items(items: Vec<Item>) -> Result<Vec<serde_json::Value>, Error> {
    items.into_iter().map(to_json).collect()
}

fn item_key(key_attribute: &str, id: &str) -> Item {
    let mut key = Item::new();
    key.insert(key_attribute.to_string(), AttributeValue::S(id.to_string()));
    key
}

/// Parse a JSON object body into an item whose key attribute is `id`
fn parse_item_body(body: &[u8], key_attribute: &str, id: &str) -> Result<Item, Error> {
    let mut value: serde_json::Value = serde_json::from_slice(body)?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| Error::Validation("Item body must be a JSON object".to_string()))?;
    object.insert(key_attribute.to_string(), serde_json::Value::String(id.to_string()));

    serde_dynamo::to_item(value).map_err(|e| Error::DynamoSerialization(e.to_string()))
}

async fn scan_table(app: &App, table: &str, event: &Request) -> Result<ScanResponse, Error> {
    let query = event.query_string_parameters();
    let params = ScanParams::parse(|key| query.first(key).map(|v| v.to_string()), &app.config)?;

    let mut base = ScanRequest::new(table);
    if let Some(limit) = params.limit {
        base = base.with_limit(limit);
    }
    if let Some(token) = &params.cursor {
        base = base.with_start_key(cursor::decode(token)?);
    }

    match params.page {
        Some((page_size, page_number)) => {
            let page = app
                .coordinator
                .execute_with_pagination(&base, params.segments, page_size, page_number)
                .await?;
            ScanResponse::from_page(page)
        }
        None => {
            let merged = app
                .coordinator
                .execute_without_pagination(&base, params.segments)
                .await?;
            ScanResponse::from_merged(merged)
        }
    }
}

async fn query_table(app: &App, table: &str, event: &Request) -> Result<QueryResponse, Error> {
    let query = event.query_string_parameters();
    let req = query_request(table, &app.config.key_attribute, |key| {
        query.first(key).map(|v| v.to_string())
    })?;
    QueryResponse::from_page(app.client.query(&req).await?)
}

async fn get_item(app: &App, table: &str, id: &str) -> Result<serde_json::Value, Error> {
    let key = item_key(&app.config.key_attribute, id);
    match app.client.get_item(table, key).await? {
        Some(item) => to_json(item),
        None => Err(Error::NotFound(id.to_string())),
    }
}

async fn put_item(app: &App, table: &str, id: &str, body: &[u8]) -> Result<serde_json::Value, Error> {
    let item = parse_item_body(body, &app.config.key_attribute, id)?;
    app.client.put_item(table, item.clone()).await?;
    to_json(item)
}

async fn handler(app: &App, event: Request) -> Result<Response<Body>, LambdaError> {
    let method = event.method().as_str();
    let path = event.uri().path().to_string();

    info!(method = %method, path = %path, "Processing request");

    // Extract path parameters if present
    let path_params = event.path_parameters();
    let table = path_params.first("table").map(|s| s.to_string());
    let id = path_params.first("id").map(|s| s.to_string());

    match (method, table, id) {
        // GET /tables - List tables
        ("GET", None, None) if path == "/tables" => match app.client.list_tables().await {
            Ok(tables) => json_response(200, &ListTablesResponse { tables }),
            Err(e) => error_response(e),
        },

        // GET /tables/{table}/query - Query by key attribute
        ("GET", Some(table), None) if path.ends_with("/query") => {
            match query_table(app, &table, &event).await {
                Ok(response) => json_response(200, &response),
                Err(e) => error_response(e),
            }
        }

        // GET /tables/{table}/items - Parallel scan
        ("GET", Some(table), None) => match scan_table(app, &table, &event).await {
            Ok(response) => json_response(200, &response),
            Err(e) => error_response(e),
        },

        // GET /tables/{table}/items/{id} - Get item
        ("GET", Some(table), Some(id)) => match get_item(app, &table, &id).await {
            Ok(item) => json_response(200, &item),
            Err(e) => error_response(e),
        },

        // PUT /tables/{table}/items/{id} - Put item
        ("PUT", Some(table), Some(id)) => match put_item(app, &table, &id, event.body()).await {
            Ok(item) => json_response(200, &item),
            Err(e) => error_response(e),
        },

        // DELETE /tables/{table}/items/{id} - Delete item
        ("DELETE", Some(table), Some(id)) => {
            let key = item_key(&app.config.key_attribute, &id);
            match app.client.delete_item(&table, key).await {
                Ok(_) => json_response(200, &DeleteResponse { success: true }),
                Err(e) => error_response(e),
            }
        }

        // Not found
        _ => json_response(404, &ErrorResponse::new("not_found", "Endpoint not found")),
    }
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body)?))?)
}

fn error_response(e: Error) -> Result<Response<Body>, LambdaError> {
    error!(error = %e, "Request failed");
    json_response(e.status_code(), &ErrorResponse::from(&e))
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = StoreConfig::from_env()?;
    let client = Arc::new(DynamoClient::from_config(&config).await);
    let app = App {
        coordinator: ScanCoordinator::new(Arc::clone(&client)),
        client,
        config,
    };

    run(service_fn(|event: Request| handler(&app, event))).await
}
