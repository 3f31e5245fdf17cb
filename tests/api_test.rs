mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{entry_count, processor, processor_with, FakeDoc, MemoryStore, ScriptedOcr, DIGITAL_TEXT, FAIL_MARKER};
use pdf_ocr_server::config::{Config, ProcessingConfig};
use pdf_ocr_server::pdf::{Bookmark, BookmarkTable};
use pdf_ocr_server::routes;
use pdf_ocr_server::state::AppState;

struct TestApp {
    app: Router,
    store: Arc<MemoryStore>,
    ocr: Arc<ScriptedOcr>,
    work_root: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let ocr = Arc::new(ScriptedOcr::new());
    let work_root = tempfile::tempdir().unwrap();
    let processor = processor(store.clone(), ocr.clone(), work_root.path());
    let app = routes::router(AppState::new(Config::default(), processor));
    TestApp {
        app,
        store,
        ocr,
        work_root,
    }
}

fn process_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/pdf/process")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn scanned_pages_are_ocrd_and_uploaded() {
    let t = test_app();
    let outline = BookmarkTable::new(vec![
        Bookmark::new(1, "Introduction", Some(0)),
        Bookmark::new(2, "Scanned appendix", Some(1)),
        Bookmark::new(1, "Conclusion", Some(2)),
    ]);
    let source = FakeDoc::with_pages(&[DIGITAL_TEXT, "", DIGITAL_TEXT]).bookmarked(outline.clone());
    t.store.put("bucket", "folder/doc.pdf", source.to_bytes());

    let (status, body) = send(
        &t.app,
        process_request(r#"{"file_path": "s3://bucket/folder/doc.pdf"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"ocr_needed": 1, "output_file": "s3://bucket/folder/doc_OCR.pdf"})
    );
    assert_eq!(t.ocr.calls(), 1);

    let uploaded = t.store.get("bucket", "folder/doc_OCR.pdf").unwrap();
    let result: FakeDoc = serde_json::from_slice(&uploaded).unwrap();
    assert_eq!(result.origins(), vec!["source:0", "ocr:source:1", "source:2"]);
    assert_eq!(result.bookmarks, outline);

    // The original is untouched and the working directory is gone
    assert_eq!(t.store.get("bucket", "folder/doc.pdf").unwrap(), source.to_bytes());
    assert_eq!(entry_count(t.work_root.path()), 0);
}

#[tokio::test]
async fn digital_document_is_echoed_back() {
    let t = test_app();
    t.store.put(
        "bucket",
        "folder/doc.pdf",
        FakeDoc::with_pages(&[DIGITAL_TEXT, DIGITAL_TEXT]).to_bytes(),
    );

    let (status, body) = send(
        &t.app,
        process_request(r#"{"file_path": "s3://bucket/folder/doc.pdf"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ocr_needed": 0, "output_file": "s3://bucket/folder/doc.pdf"}));
    assert!(t.store.uploads().is_empty());
    assert_eq!(t.ocr.calls(), 0);
}

#[tokio::test]
async fn bare_path_uses_default_bucket() {
    let t = test_app();
    t.store
        .put("default-bucket", "scans/page.pdf", FakeDoc::with_pages(&[""]).to_bytes());

    let (status, body) = send(&t.app, process_request(r#"{"file_path": "/scans/page.pdf"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"ocr_needed": 1, "output_file": "s3://default-bucket/scans/page_OCR.pdf"})
    );
}

#[tokio::test]
async fn missing_file_path_is_rejected() {
    let t = test_app();

    for payload in [r#"{}"#, r#"{"file_path": null}"#, r#"{"file_path": "   "}"#] {
        let (status, body) = send(&t.app, process_request(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body, json!({"detail": "Missing file_path"}));
    }
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let t = test_app();

    let (status, body) = send(&t.app, process_request("not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn directory_path_is_rejected() {
    let t = test_app();

    let (status, _) = send(&t.app, process_request(r#"{"file_path": "s3://bucket/folder/"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_object_is_a_server_error() {
    let t = test_app();

    let (status, body) = send(&t.app, process_request(r#"{"file_path": "s3://bucket/nope.pdf"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to download file from S3"), "{detail}");
    assert!(detail.contains("s3://bucket/nope.pdf"), "{detail}");
    assert_eq!(entry_count(t.work_root.path()), 0);
}

#[tokio::test]
async fn ocr_failure_is_a_server_error() {
    let t = test_app();
    t.store.put(
        "bucket",
        "doc.pdf",
        FakeDoc::with_pages(&[DIGITAL_TEXT, FAIL_MARKER]).to_bytes(),
    );

    let (status, body) = send(&t.app, process_request(r#"{"file_path": "s3://bucket/doc.pdf"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to process PDF"), "{detail}");
    assert!(detail.contains("page 2"), "{detail}");
    assert!(t.store.uploads().is_empty());
    assert_eq!(entry_count(t.work_root.path()), 0);
}

#[tokio::test]
async fn upload_failure_keeps_working_directory() {
    let t = test_app();
    t.store
        .put("bucket", "doc.pdf", FakeDoc::with_pages(&[""]).to_bytes());
    t.store.fail_stores();

    let (status, body) = send(&t.app, process_request(r#"{"file_path": "s3://bucket/doc.pdf"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to upload processed file to S3"), "{detail}");
    assert_eq!(entry_count(t.work_root.path()), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_ocr_times_out() {
    let store = Arc::new(MemoryStore::new());
    let ocr = Arc::new(ScriptedOcr::new().with_delay("", Duration::from_secs(5)));
    let work_root = tempfile::tempdir().unwrap();
    let config = ProcessingConfig {
        work_dir: Some(work_root.path().to_path_buf()),
        request_timeout_secs: 1,
    };
    let app = routes::router(AppState::new(
        Config::default(),
        processor_with(store.clone(), ocr.clone(), config),
    ));
    store.put("bucket", "doc.pdf", FakeDoc::with_pages(&[DIGITAL_TEXT, ""]).to_bytes());

    let (status, body) = send(&app, process_request(r#"{"file_path": "s3://bucket/doc.pdf"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to process PDF"), "{detail}");
    assert!(detail.contains("timed out after 1 seconds"), "{detail}");
    assert!(store.uploads().is_empty());
    assert_eq!(entry_count(work_root.path()), 0);
}

#[tokio::test]
async fn fetch_failure_is_reported() {
    let t = test_app();
    t.store.put("bucket", "doc.pdf", FakeDoc::with_pages(&[""]).to_bytes());
    t.store.fail_fetches();

    let (status, body) = send(&t.app, process_request(r#"{"file_path": "s3://bucket/doc.pdf"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("Access denied"));
    assert_eq!(t.ocr.calls(), 0);
}

#[tokio::test]
async fn index_points_to_process_endpoint() {
    let t = test_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Use /pdf/process endpoint"}));
}

#[tokio::test]
async fn health_reports_healthy() {
    let t = test_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ocr_language"], "eng");
}
