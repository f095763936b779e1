//! Unit tests for the Catalog Client, driven through MockTransport.

use std::sync::Arc;

use mangahub::services::catalog_client::CatalogClient;
use mangahub::services::mock_transport::{MockReply, MockTransport};
use mangahub::types::errors::ConnectionError;
use serde_json::json;

fn client(transport: MockTransport) -> (CatalogClient, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    (CatalogClient::new(transport.clone()), transport)
}

#[tokio::test]
async fn test_list_series_sends_query() {
    let (client, transport) = client(MockTransport::new().with_reply(
        "/api/series",
        MockReply::ok(json!([
            {"id": "s1", "title": "One Piece", "cover_url": "/covers/op.jpg"},
        ])),
    ));

    let series = client.list_series("one").await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].title, "One Piece");
    assert_eq!(series[0].cover_url, "/covers/op.jpg");

    let requests = transport.requests_for("/api/series");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("q"), Some("one"));
}

#[tokio::test]
async fn test_list_series_blank_query_lists_everything() {
    let (client, transport) = client(
        MockTransport::new().with_reply("/api/series", MockReply::ok(json!([]))),
    );
    let series = client.list_series("   ").await.unwrap();
    assert!(series.is_empty());
    assert_eq!(transport.requests()[0].query_value("q"), Some(""));
}

#[tokio::test]
async fn test_missing_cover_decodes_as_empty() {
    let (client, _) = client(MockTransport::new().with_reply(
        "/api/series",
        MockReply::ok(json!([{"id": "s1", "title": "Untitled"}])),
    ));
    let series = client.list_series("").await.unwrap();
    assert_eq!(series[0].cover_url, "");
}

#[tokio::test]
async fn test_network_failure_is_connection_error() {
    let (client, _) = client(MockTransport::new().with_reply(
        "/api/series",
        MockReply::NetworkError("connection refused".to_string()),
    ));
    let err = client.list_series("").await.unwrap_err();
    assert_eq!(err, ConnectionError::Network("connection refused".to_string()));
    assert_eq!(err.to_string(), "Connection error: connection refused");
}

#[tokio::test]
async fn test_server_error_is_distinct_from_empty_result() {
    let (client, _) = client(MockTransport::new().with_reply("/api/series", MockReply::status(500)));
    assert_eq!(
        client.list_series("").await.unwrap_err(),
        ConnectionError::Status(500)
    );
}

#[tokio::test]
async fn test_list_chapters_fills_series_id() {
    let (client, transport) = client(MockTransport::new().with_reply(
        "/api/chapters/s1",
        MockReply::ok(json!([
            {"id": "c1", "chapter_number": 1, "title": "Romance Dawn"},
            {"id": "c2", "chapter_number": 2},
            {"id": "c3", "chapter_number": 2.5, "series_id": "s1"},
        ])),
    ));

    let chapters = client.list_chapters("s1").await.unwrap();
    assert_eq!(chapters.len(), 3);
    assert!(chapters.iter().all(|c| c.series_id == "s1"));
    assert_eq!(chapters[0].display_label(), "Romance Dawn");
    assert_eq!(chapters[1].display_label(), "Chapter 2");
    assert_eq!(chapters[2].chapter_number, 2.5);
    assert_eq!(transport.requests_for("/api/chapters/s1").len(), 1);
}

#[tokio::test]
async fn test_list_chapters_bad_body_is_decode_error() {
    let (client, _) = client(MockTransport::new().with_reply(
        "/api/chapters/s1",
        MockReply::ok(json!({"error": "oops"})),
    ));
    assert!(matches!(
        client.list_chapters("s1").await,
        Err(ConnectionError::Decode(_))
    ));
}
