//! Integration tests for TableScan API
//!
//! Run with: TABLESCAN_API_URL=https://your-api.execute-api.us-west-2.amazonaws.com cargo test
//!
//! These tests require a deployed TableScan instance and a table keyed on `id`.

use tablescan_integration_tests::{
    client::{ApiError, QueryOptions, ScanOptions, TableScanClient},
    fixtures::{api_url, test_table, unique_id, unique_tag},
    skip_if_no_api,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Helper to get client or skip test
fn get_client() -> Option<TableScanClient> {
    match api_url() {
        Some(url) => Some(TableScanClient::new(&url)),
        None => {
            eprintln!("Skipping: TABLESCAN_API_URL not set");
            None
        }
    }
}

fn expect_error_code(result: Result<impl std::fmt::Debug, ApiError>, status: u16, code: &str) {
    match result {
        Err(e @ ApiError::Http { .. }) => {
            if let ApiError::Http { status: got, .. } = &e {
                assert_eq!(got.as_u16(), status);
            }
            let body = e.error_response().expect("error body should be JSON");
            assert_eq!(body.error, code);
        }
        other => panic!("expected HTTP {} {}, got {:?}", status, code, other),
    }
}

// ============================================================================
// Table Tests
// ============================================================================

#[tokio::test]
async fn test_list_tables() {
    let Some(client) = get_client() else { return };

    let response = client.list_tables().await.expect("Failed to list tables");
    assert!(
        response.tables.contains(&test_table()),
        "test table should be listed"
    );
}

// ============================================================================
// Item Tests
// ============================================================================

#[tokio::test]
async fn test_put_get_delete_item() {
    let Some(client) = get_client() else { return };

    let table = test_table();
    let id = unique_id();

    let stored = client
        .put_item(&table, &id, &json!({ "name": "widget", "qty": 3 }))
        .await
        .expect("Failed to put item");
    assert_eq!(stored["id"], json!(id));

    let fetched = client.get_item(&table, &id).await.expect("Failed to get item");
    assert_eq!(fetched["name"], json!("widget"));
    assert_eq!(fetched["qty"], json!(3));

    let deleted = client.delete_item(&table, &id).await.expect("Failed to delete item");
    assert!(deleted.success);

    expect_error_code(client.get_item(&table, &id).await, 404, "not_found");
}

#[tokio::test]
async fn test_put_non_object_fails() {
    let Some(client) = get_client() else { return };

    let result = client
        .put_item(&test_table(), &unique_id(), &json!([1, 2, 3]))
        .await;
    expect_error_code(result, 400, "validation_error");
}

// ============================================================================
// Scan Tests
// ============================================================================

#[tokio::test]
async fn test_parallel_scan_finds_all_items() {
    skip_if_no_api!();
    let client = TableScanClient::from_env();

    let table = test_table();
    let tag = unique_tag();
    let ids: Vec<String> = (0..6).map(|_| unique_id()).collect();

    for id in &ids {
        client
            .put_item(&table, id, &json!({ "tag": tag }))
            .await
            .expect("Failed to put item");
    }

    let response = client
        .scan(
            &table,
            &ScanOptions {
                segments: Some(4),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to scan");

    assert_eq!(response.count as usize, response.items.len());
    assert!(response.scanned_count >= response.count);

    let mut found: Vec<String> = response
        .items
        .iter()
        .filter(|item| item["tag"] == json!(tag))
        .filter_map(|item| item["id"].as_str().map(|s| s.to_string()))
        .collect();
    found.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(found, expected);

    // Cleanup
    for id in &ids {
        let _ = client.delete_item(&table, id).await;
    }
}

#[tokio::test]
async fn test_paginated_scan_keeps_totals() {
    skip_if_no_api!();
    let client = TableScanClient::from_env();

    let table = test_table();
    let ids: Vec<String> = (0..3).map(|_| unique_id()).collect();
    for id in &ids {
        client
            .put_item(&table, id, &json!({ "kind": "page-test" }))
            .await
            .expect("Failed to put item");
    }

    let whole = client
        .scan(&table, &ScanOptions { segments: Some(2), ..Default::default() })
        .await
        .expect("Failed to scan");

    let page = client
        .scan(
            &table,
            &ScanOptions {
                segments: Some(2),
                page: Some(1),
                page_size: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to scan page");

    assert!(page.items.len() <= 2);
    assert_eq!(page.page, Some(1));
    assert_eq!(page.page_size, Some(2));
    assert!(page.count >= 3);
    assert_eq!(page.total_pages, Some(page.count.div_ceil(2)));
    assert!(whole.count >= 3);

    let beyond = client
        .scan(
            &table,
            &ScanOptions {
                segments: Some(2),
                page: Some(100_000),
                page_size: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("Out-of-range page should not fail");
    assert!(beyond.items.is_empty());
    assert!(beyond.count >= 3);

    // Cleanup
    for id in &ids {
        let _ = client.delete_item(&table, id).await;
    }
}

#[tokio::test]
async fn test_scan_with_limit_returns_cursor() {
    skip_if_no_api!();
    let client = TableScanClient::from_env();

    let table = test_table();
    let ids: Vec<String> = (0..4).map(|_| unique_id()).collect();
    for id in &ids {
        client
            .put_item(&table, id, &json!({ "kind": "cursor-test" }))
            .await
            .expect("Failed to put item");
    }

    let first = client
        .scan(
            &table,
            &ScanOptions {
                segments: Some(1),
                limit: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to scan");
    assert_eq!(first.items.len(), 1);
    let cursor = first.cursor.expect("limited scan should return a cursor");

    let next = client
        .scan(
            &table,
            &ScanOptions {
                segments: Some(1),
                limit: Some(1),
                cursor: Some(cursor),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to resume scan");
    assert_eq!(next.items.len(), 1);
    assert!(next.items[0]["id"] != first.items[0]["id"]);

    // Cleanup
    for id in &ids {
        let _ = client.delete_item(&table, id).await;
    }
}

#[tokio::test]
async fn test_scan_cursor_with_many_segments_fails() {
    let Some(client) = get_client() else { return };

    let result = client
        .scan(
            &test_table(),
            &ScanOptions {
                segments: Some(3),
                cursor: Some("eyJpZCI6ImEifQ".to_string()),
                ..Default::default()
            },
        )
        .await;
    expect_error_code(result, 400, "validation_error");
}

#[tokio::test]
async fn test_scan_invalid_segment_count_fails() {
    let Some(client) = get_client() else { return };

    let result = client
        .scan(&test_table(), &ScanOptions { segments: Some(0), ..Default::default() })
        .await;
    expect_error_code(result, 400, "invalid_segment_count");
}

#[tokio::test]
async fn test_scan_invalid_page_fails() {
    let Some(client) = get_client() else { return };

    let result = client
        .scan(
            &test_table(),
            &ScanOptions {
                page: Some(0),
                page_size: Some(10),
                ..Default::default()
            },
        )
        .await;
    expect_error_code(result, 400, "invalid_page_spec");
}

#[tokio::test]
async fn test_scan_invalid_cursor_fails() {
    let Some(client) = get_client() else { return };

    let result = client
        .scan(
            &test_table(),
            &ScanOptions {
                segments: Some(1),
                cursor: Some("***".to_string()),
                ..Default::default()
            },
        )
        .await;
    expect_error_code(result, 400, "invalid_cursor");
}

#[tokio::test]
async fn test_scan_missing_table_fails() {
    let Some(client) = get_client() else { return };

    let result = client
        .scan(&format!("missing-{}", unique_id()), &ScanOptions::default())
        .await;
    expect_error_code(result, 502, "scan_segment_failure");
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_query_by_key() {
    let Some(client) = get_client() else { return };

    let table = test_table();
    let id = unique_id();
    client
        .put_item(&table, &id, &json!({ "name": "gadget" }))
        .await
        .expect("Failed to put item");

    let response = client
        .query(
            &table,
            &QueryOptions {
                key: id.clone(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to query");

    assert_eq!(response.count, 1);
    assert_eq!(response.items[0]["id"], json!(id));
    assert_eq!(response.items[0]["name"], json!("gadget"));
    assert!(response.cursor.is_none());

    let missing = client
        .query(
            &table,
            &QueryOptions {
                key: unique_id(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to query missing key");
    assert_eq!(missing.count, 0);
    assert!(missing.items.is_empty());

    // Cleanup
    let _ = client.delete_item(&table, &id).await;
}

#[tokio::test]
async fn test_query_without_key_fails() {
    let Some(client) = get_client() else { return };

    let result = client.query(&test_table(), &QueryOptions::default()).await;
    expect_error_code(result, 400, "validation_error");
}
