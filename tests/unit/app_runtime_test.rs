//! Runtime tests for App: debounce, staleness and progress, on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use mangahub::app::{App, AppUpdate};
use mangahub::managers::navigation::{NavEvent, ViewName};
use mangahub::managers::progress_store::HISTORY_KEY;
use mangahub::managers::reader_view::VisibilityReport;
use mangahub::services::mock_transport::{MockReply, MockTransport};
use mangahub::services::storage::{KeyValueStorage, MemoryStorage};
use mangahub::types::settings::ReadingMode;
use mangahub::types::view::{ReaderStatus, ViewModel};
use serde_json::json;

const DEBOUNCE: Duration = Duration::from_millis(500);

fn pages_body(count: usize, prev: Option<&str>, next: Option<&str>) -> serde_json::Value {
    json!({
        "pages": (0..count).map(|i| format!("/img/{}.jpg", i)).collect::<Vec<_>>(),
        "prev_chapter": prev,
        "next_chapter": next,
    })
}

fn base_transport() -> MockTransport {
    MockTransport::new()
        .with_reply("/api/series", MockReply::ok(json!([{"id": "s1", "title": "One Piece"}])))
        .with_reply(
            "/api/chapters/s1",
            MockReply::ok(json!([
                {"id": "c1", "chapter_number": 1},
                {"id": "c2", "chapter_number": 2},
            ])),
        )
}

fn app_with(transport: MockTransport, storage: Arc<MemoryStorage>) -> (App, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    (App::with_parts(transport.clone(), storage, DEBOUNCE), transport)
}

async fn next(app: &mut App) -> AppUpdate {
    tokio::time::timeout(Duration::from_secs(30), app.next_update())
        .await
        .expect("no update arrived")
        .expect("completion channel closed")
}

async fn until_reader_ready(app: &mut App) -> Option<usize> {
    loop {
        if let AppUpdate::ReaderReady { scroll_to } = next(app).await {
            return scroll_to;
        }
    }
}

async fn open_chapter(app: &mut App, chapter_id: &str) -> Option<usize> {
    app.dispatch(NavEvent::SelectSeries { series_id: "s1".to_string() });
    assert_eq!(next(app).await, AppUpdate::ViewChanged);
    app.dispatch(NavEvent::SelectChapter { chapter_id: chapter_id.to_string() });
    until_reader_ready(app).await
}

#[tokio::test(start_paused = true)]
async fn test_startup_loads_full_catalog() {
    let (mut app, transport) = app_with(base_transport(), Arc::new(MemoryStorage::new()));
    app.startup();
    assert_eq!(next(&mut app).await, AppUpdate::ViewChanged);

    let requests = transport.requests_for("/api/series");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("q"), Some(""));
    assert!(matches!(app.view_model(), ViewModel::Catalog(_)));
}

#[tokio::test(start_paused = true)]
async fn test_typing_fires_one_search_for_last_query() {
    let (mut app, transport) = app_with(base_transport(), Arc::new(MemoryStorage::new()));

    app.search_input("naruto");
    tokio::time::sleep(Duration::from_millis(300)).await;
    app.search_input("one");
    assert!(transport.requests().is_empty());

    let started = tokio::time::Instant::now();
    assert_eq!(next(&mut app).await, AppUpdate::ViewChanged);
    assert!(started.elapsed() >= DEBOUNCE);
    assert_eq!(next(&mut app).await, AppUpdate::ViewChanged);

    let requests = transport.requests_for("/api/series");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("q"), Some("one"));
    assert_eq!(app.controller().catalog().query, "one");
}

#[tokio::test(start_paused = true)]
async fn test_late_chapter_response_is_dropped() {
    let transport = base_transport()
        .with_reply("/api/pages/a", MockReply::ok(pages_body(9, None, None)))
        .with_delay("/api/pages/a", Duration::from_millis(200))
        .with_reply("/api/pages/b", MockReply::ok(pages_body(2, None, None)));
    let (mut app, _) = app_with(transport, Arc::new(MemoryStorage::new()));

    app.dispatch(NavEvent::SelectSeries { series_id: "s1".to_string() });
    app.dispatch(NavEvent::SelectChapter { chapter_id: "a".to_string() });
    app.dispatch(NavEvent::ExitReader);
    app.dispatch(NavEvent::SelectChapter { chapter_id: "b".to_string() });
    until_reader_ready(&mut app).await;

    // The delayed response for "a" lands and is absorbed without an update.
    let late = tokio::time::timeout(Duration::from_secs(1), app.next_update()).await;
    assert!(late.is_err());
    let reader = app.controller().reader().unwrap();
    assert_eq!(reader.chapter_id(), "b");
    assert_eq!(reader.page_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_visibility_writes_last_observed_page() {
    let transport = base_transport().with_reply("/api/pages/c1", MockReply::ok(pages_body(10, None, Some("c2"))));
    let storage = Arc::new(MemoryStorage::new());
    let (mut app, _) = app_with(transport, storage.clone());
    open_chapter(&mut app, "c1").await;

    for index in [3, 4, 5] {
        let change = app.on_visibility(&[VisibilityReport { index, ratio: 0.5 }]);
        assert_eq!(change.map(|c| c.index), Some(index));
    }
    assert!(app.on_visibility(&[VisibilityReport { index: 5, ratio: 1.0 }]).is_none());

    let record = app.progress("s1").unwrap();
    assert_eq!(record.last_chapter, "c1");
    assert_eq!(record.last_page, 5);

    let raw = storage.get_item(HISTORY_KEY).unwrap().unwrap();
    let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(blob["s1"]["lastPage"], 5);
}

#[tokio::test(start_paused = true)]
async fn test_reopening_chapter_resumes_and_notice_expires() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set_item(HISTORY_KEY, r#"{"s1":{"lastChapter":"c1","lastPage":4,"timestamp":1}}"#)
        .unwrap();
    let transport = base_transport().with_reply("/api/pages/c1", MockReply::ok(pages_body(10, None, None)));
    let (mut app, _) = app_with(transport, storage);

    assert_eq!(open_chapter(&mut app, "c1").await, Some(4));
    match app.view_model() {
        ViewModel::Reader(vm) => match vm.status {
            ReaderStatus::Ready(set) => {
                assert_eq!(set.indicator, "5 / 10");
                assert_eq!(set.notice.as_deref(), Some("Resumed from page 5"));
            }
            other => panic!("expected ready reader, got {:?}", other),
        },
        other => panic!("expected reader, got {:?}", other),
    }

    let shown = tokio::time::Instant::now();
    assert_eq!(next(&mut app).await, AppUpdate::NoticeExpired);
    assert!(shown.elapsed() >= Duration::from_secs(2));
    match app.view_model() {
        ViewModel::Reader(vm) => match vm.status {
            ReaderStatus::Ready(set) => assert_eq!(set.notice, None),
            other => panic!("expected ready reader, got {:?}", other),
        },
        other => panic!("expected reader, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_chapter_retries_on_request() {
    let transport = base_transport().with_sequence(
        "/api/pages/c1",
        vec![
            MockReply::NetworkError("connection reset".to_string()),
            MockReply::ok(pages_body(3, None, None)),
        ],
    );
    let (mut app, transport) = app_with(transport, Arc::new(MemoryStorage::new()));

    app.dispatch(NavEvent::SelectSeries { series_id: "s1".to_string() });
    app.dispatch(NavEvent::SelectChapter { chapter_id: "c1".to_string() });
    assert_eq!(next(&mut app).await, AppUpdate::ViewChanged);
    assert_eq!(next(&mut app).await, AppUpdate::ViewChanged);
    match app.view_model() {
        ViewModel::Reader(vm) => assert_eq!(
            vm.status,
            ReaderStatus::Error { message: "Chapter load failed: connection reset".to_string() }
        ),
        other => panic!("expected reader, got {:?}", other),
    }

    app.dispatch(NavEvent::Retry);
    until_reader_ready(&mut app).await;
    assert_eq!(app.controller().reader().unwrap().page_count(), 3);
    assert_eq!(transport.requests_for("/api/pages/c1").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_next_chapter_without_target_fetches_nothing() {
    let transport = base_transport().with_reply("/api/pages/c1", MockReply::ok(pages_body(3, None, Some("c2"))));
    let (mut app, transport) = app_with(transport, Arc::new(MemoryStorage::new()));
    open_chapter(&mut app, "c1").await;

    let before = transport.requests().len();
    app.dispatch(NavEvent::PreviousChapter);
    tokio::task::yield_now().await;
    assert_eq!(transport.requests().len(), before);
    assert_eq!(app.controller().view_name(), ViewName::Reader);
    assert_eq!(app.controller().reader().unwrap().chapter_id(), "c1");
}

#[tokio::test(start_paused = true)]
async fn test_mode_change_persists_and_relayouts() {
    let storage = Arc::new(MemoryStorage::new());
    let transport = base_transport().with_reply("/api/pages/c1", MockReply::ok(pages_body(3, None, None)));
    let (mut app, _) = app_with(transport, storage.clone());
    open_chapter(&mut app, "c1").await;

    app.set_mode(ReadingMode::Horizontal).unwrap();
    assert_eq!(app.controller().reader().unwrap().mode(), ReadingMode::Horizontal);
    assert_eq!(app.next_page().map(|c| c.index), Some(1));
    assert_eq!(app.progress("s1").unwrap().last_page, 1);

    assert_eq!(
        storage.get_item("reader_settings").unwrap().as_deref(),
        Some(r#"{"mode":"horizontal"}"#)
    );
}

#[tokio::test(start_paused = true)]
async fn test_resume_survives_report_before_scroll_lands() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set_item(HISTORY_KEY, r#"{"s1":{"lastChapter":"c1","lastPage":7,"timestamp":1}}"#)
        .unwrap();
    let transport = base_transport().with_reply("/api/pages/c1", MockReply::ok(pages_body(12, None, None)));
    let (mut app, _) = app_with(transport, storage);

    assert_eq!(open_chapter(&mut app, "c1").await, Some(7));
    assert!(app.on_visibility(&[VisibilityReport { index: 0, ratio: 1.0 }]).is_none());
    assert_eq!(app.progress("s1").unwrap().last_page, 7);

    match app.view_model() {
        ViewModel::Reader(vm) => match vm.status {
            ReaderStatus::Ready(set) => assert!(set.pages[7].load),
            other => panic!("expected ready reader, got {:?}", other),
        },
        other => panic!("expected reader, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_explicit_catalog_load_cancels_pending_search() {
    let (mut app, transport) = app_with(base_transport(), Arc::new(MemoryStorage::new()));

    app.search_input("naruto");
    app.dispatch(NavEvent::LoadCatalog { query: "bleach".to_string() });
    assert_eq!(next(&mut app).await, AppUpdate::ViewChanged);

    let quiet = tokio::time::timeout(Duration::from_secs(2), app.next_update()).await;
    assert!(quiet.is_err());
    let requests = transport.requests_for("/api/series");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("q"), Some("bleach"));
}
