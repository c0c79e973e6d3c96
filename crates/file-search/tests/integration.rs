//! Integration tests for name resolution, operations, transfers,
//! completion and the MCP tool functions, against an in-memory backend.


use file_search::FileSearchError;
use file_search::completion::Completer;
use file_search::constants::ResourceKind;
use file_search::gemini::{Gateway, OperationKind, StoreUpload};
use file_search::mcp::tools;
use file_search::operation::{Poller, get_operation_status};
use file_search::resolve::{resolve, resolve_document, resolve_file, resolve_store, resolve_store_flags};
use file_search::transfer::{self, UploadOutcome};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{Calls, FakeGateway, done, failed, pending};

const OP: &str = "fileSearchStores/s1/operations/op-1";

fn fast_poller() -> Poller {
    Poller::new("Testing")
        .quiet(true)
        .with_interval(Duration::from_millis(1))
}

fn library() -> FakeGateway {
    FakeGateway::new()
        .with_page_size(2)
        .with_store("fileSearchStores/s1", "Alpha")
        .with_store("fileSearchStores/s2", "Beta")
        .with_store("fileSearchStores/s3", "Gamma")
        .with_store("fileSearchStores/s4", "Beta")
        .with_store("fileSearchStores/s5", "Delta")
        .with_file("files/f1", "report.pdf")
        .with_file("files/f2", "notes.txt")
        .with_document("fileSearchStores/s1", "fileSearchStores/s1/documents/d1", "Intro")
        .with_document("fileSearchStores/s1", "fileSearchStores/s1/documents/d2", "Appendix")
}

// ═══════════════════════════════════════
// NAME RESOLUTION
// ═══════════════════════════════════════

#[tokio::test]
async fn test_canonical_names_make_no_remote_calls() {
    let gw = library();
    assert_eq!(
        resolve_store(&gw, "fileSearchStores/zzz").await.unwrap(),
        "fileSearchStores/zzz"
    );
    assert_eq!(resolve_file(&gw, "files/zzz").await.unwrap(), "files/zzz");
    assert_eq!(
        resolve_document(&gw, "Alpha", "fileSearchStores/s1/documents/zzz")
            .await
            .unwrap(),
        "fileSearchStores/s1/documents/zzz"
    );
    assert_eq!(gw.calls.list_pages(), 0);
}

#[tokio::test]
async fn test_display_name_across_pages() {
    let gw = library();
    assert_eq!(
        resolve_store(&gw, "Delta").await.unwrap(),
        "fileSearchStores/s5"
    );
    // five stores, two per page
    assert_eq!(Calls::get(&gw.calls.store_pages), 3);
}

#[tokio::test]
async fn test_first_match_wins() {
    let gw = library();
    assert_eq!(
        resolve_store(&gw, "Beta").await.unwrap(),
        "fileSearchStores/s2"
    );
}

#[tokio::test]
async fn test_not_found_consumes_every_page() {
    let gw = library();
    let err = resolve_store(&gw, "Nope").await.unwrap_err();
    assert!(matches!(
        err,
        FileSearchError::NotFound {
            kind: ResourceKind::Store,
            ..
        }
    ));
    assert_eq!(err.to_string(), "store not found: Nope");
    assert_eq!(Calls::get(&gw.calls.store_pages), 3);
}

#[tokio::test]
async fn test_document_resolves_store_first() {
    let gw = library();
    assert_eq!(
        resolve_document(&gw, "Alpha", "Appendix").await.unwrap(),
        "fileSearchStores/s1/documents/d2"
    );

    let err = resolve_document(&gw, "Alpha", "Missing").await.unwrap_err();
    match err {
        FileSearchError::DocumentNotFound { store, reference } => {
            assert_eq!(store, "fileSearchStores/s1");
            assert_eq!(reference, "Missing");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = resolve_document(&gw, "Nope", "Intro").await.unwrap_err();
    assert!(matches!(err, FileSearchError::NotFound { .. }));
}

#[tokio::test]
async fn test_document_display_name_needs_a_store() {
    let gw = library();
    let err = resolve(&gw, ResourceKind::Document, "Intro", None)
        .await
        .unwrap_err();
    assert!(matches!(err, FileSearchError::MissingReference(_)));

    let name = resolve(&gw, ResourceKind::Document, "Intro", Some("fileSearchStores/s1"))
        .await
        .unwrap();
    assert_eq!(name, "fileSearchStores/s1/documents/d1");
}

#[tokio::test]
async fn test_store_flags() {
    let gw = library();
    assert_eq!(
        resolve_store_flags(&gw, Some("Alpha"), Some("fileSearchStores/raw"))
            .await
            .unwrap(),
        "fileSearchStores/s1"
    );
    assert_eq!(
        resolve_store_flags(&gw, Some(""), Some("fileSearchStores/raw"))
            .await
            .unwrap(),
        "fileSearchStores/raw"
    );
    assert_eq!(
        resolve_store_flags(&gw, None, Some("fileSearchStores/raw"))
            .await
            .unwrap(),
        "fileSearchStores/raw"
    );
    assert_eq!(
        resolve_store_flags(&gw, Some("Gamma"), None).await.unwrap(),
        "fileSearchStores/s3"
    );
    let err = resolve_store_flags(&gw, None, None).await.unwrap_err();
    assert_eq!(err.to_string(), "either --store or --store-id is required");
}

// ═══════════════════════════════════════
// OPERATIONS
// ═══════════════════════════════════════

#[tokio::test]
async fn test_poller_waits_for_done() {
    let gw = FakeGateway::new().with_operation(
        OP,
        OperationKind::Import,
        vec![pending(OP), pending(OP), done(OP, OperationKind::Import)],
    );
    let op = fast_poller()
        .wait(&gw, pending(OP), OperationKind::Import)
        .await
        .unwrap();
    assert!(op.done);
    assert_eq!(Calls::get(&gw.calls.get_operation), 3);
}

#[tokio::test]
async fn test_poller_returns_done_initial_without_polling() {
    let gw = FakeGateway::new();
    let op = fast_poller()
        .wait(&gw, done(OP, OperationKind::Upload), OperationKind::Upload)
        .await
        .unwrap();
    assert!(op.done);
    assert_eq!(Calls::get(&gw.calls.get_operation), 0);
}

#[tokio::test]
async fn test_poller_surfaces_operation_error() {
    let gw = FakeGateway::new().with_operation(
        OP,
        OperationKind::Upload,
        vec![pending(OP), failed(OP, "unsupported file type")],
    );
    let err = fast_poller()
        .wait(&gw, pending(OP), OperationKind::Upload)
        .await
        .unwrap_err();
    match err {
        FileSearchError::OperationFailed { name, message } => {
            assert_eq!(name, OP);
            assert_eq!(message, "unsupported file type");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_poller_aborts_on_poll_error() {
    let gw = FakeGateway::new().unreachable(OP);
    let err = fast_poller()
        .wait(&gw, pending(OP), OperationKind::Import)
        .await
        .unwrap_err();
    assert!(matches!(err, FileSearchError::Io(_)));
    assert_eq!(Calls::get(&gw.calls.get_operation), 1);
}

#[tokio::test]
async fn test_poller_stops_on_cancel() {
    let gw = FakeGateway::new().with_operation(OP, OperationKind::Import, vec![pending(OP)]);
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();
    let err = Poller::new("Testing")
        .quiet(true)
        .with_interval(Duration::from_secs(60))
        .with_cancel(cancel)
        .wait(&gw, pending(OP), OperationKind::Import)
        .await
        .unwrap_err();
    assert!(matches!(err, FileSearchError::Cancelled));
}

#[tokio::test]
async fn test_status_with_declared_kind() {
    let gw = FakeGateway::new().with_operation(
        OP,
        OperationKind::Upload,
        vec![done(OP, OperationKind::Upload)],
    );
    let status = get_operation_status(&gw, OP, Some(OperationKind::Upload))
        .await
        .unwrap();
    assert_eq!(status.kind, OperationKind::Upload);
    assert!(status.done);
    assert!(!status.failed);
    assert_eq!(status.parent.as_deref(), Some("fileSearchStores/s1"));
}

#[tokio::test]
async fn test_status_autodetect_falls_back_to_upload() {
    let gw = FakeGateway::new().with_operation(
        OP,
        OperationKind::Upload,
        vec![done(OP, OperationKind::Upload)],
    );
    let status = get_operation_status(&gw, OP, None).await.unwrap();
    assert_eq!(status.kind, OperationKind::Upload);
    assert_eq!(Calls::get(&gw.calls.get_operation), 2);
}

#[tokio::test]
async fn test_status_autodetect_prefers_import() {
    let gw = FakeGateway::new().with_operation(OP, OperationKind::Import, vec![pending(OP)]);
    let status = get_operation_status(&gw, OP, None).await.unwrap();
    assert_eq!(status.kind, OperationKind::Import);
    assert!(!status.done);
    assert_eq!(Calls::get(&gw.calls.get_operation), 1);
}

#[tokio::test]
async fn test_status_autodetect_does_not_mask_transport_errors() {
    let gw = FakeGateway::new().unreachable(OP);
    let err = get_operation_status(&gw, OP, None).await.unwrap_err();
    assert!(matches!(err, FileSearchError::Io(_)));
    assert_eq!(Calls::get(&gw.calls.get_operation), 1);
}

#[tokio::test]
async fn test_status_rejects_malformed_names_locally() {
    let gw = FakeGateway::new();
    for name in ["operations/abc", "fileSearchStores/s1/documents/d1"] {
        let err = get_operation_status(&gw, name, None).await.unwrap_err();
        assert!(matches!(err, FileSearchError::InvalidOperationName(_)));
    }
    assert_eq!(Calls::get(&gw.calls.get_operation), 0);
}

// ═══════════════════════════════════════
// TRANSFERS
// ═══════════════════════════════════════

fn temp_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_upload_without_store_goes_to_files_api() {
    let gw = FakeGateway::new();
    let file = temp_file("hello");
    let opts = StoreUpload {
        display_name: Some("hello.txt".to_string()),
        ..Default::default()
    };
    let outcome = transfer::upload(&gw, file.path(), None, &opts, &fast_poller())
        .await
        .unwrap();
    match outcome {
        UploadOutcome::File(f) => assert_eq!(f.display_name, "hello.txt"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(gw.list_files().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_to_store_reports_document() {
    let gw = FakeGateway::new();
    let file = temp_file("hello");
    let outcome = transfer::upload(
        &gw,
        file.path(),
        Some("fileSearchStores/s1"),
        &StoreUpload::default(),
        &fast_poller(),
    )
    .await
    .unwrap();
    let document = outcome.resource_name().unwrap();
    assert!(document.starts_with("fileSearchStores/s1/documents/"));
}

#[tokio::test]
async fn test_import_failure_is_propagated() {
    let gw = FakeGateway::new().reject("files/bad");
    let err = transfer::import(&gw, "files/bad", "fileSearchStores/s1", &fast_poller())
        .await
        .unwrap_err();
    assert!(err.is_rejection());
}

// ═══════════════════════════════════════
// COMPLETION
// ═══════════════════════════════════════

#[tokio::test]
async fn test_completion_is_cached() {
    let gw = Arc::new(library());
    let completer = Completer::new(
        Some(gw.clone() as Arc<dyn Gateway>),
        true,
        Duration::from_secs(60),
    );
    let first = completer.store_names().await;
    let second = completer.store_names().await;
    assert_eq!(first, vec!["Alpha", "Beta", "Gamma", "Beta", "Delta"]);
    assert_eq!(first, second);
    assert_eq!(Calls::get(&gw.calls.store_pages), 3);
}

#[tokio::test]
async fn test_document_completion_keys_on_raw_reference() {
    let gw = Arc::new(library());
    let completer = Completer::new(
        Some(gw.clone() as Arc<dyn Gateway>),
        true,
        Duration::from_secs(60),
    );
    let names = completer.document_names("Alpha").await;
    assert_eq!(names, vec!["Intro", "Appendix"]);
    assert!(completer.cache().get("docs:Alpha").is_some());
    assert!(completer.cache().get("docs:fileSearchStores/s1").is_none());
}

#[tokio::test]
async fn test_completion_failures_yield_nothing() {
    let gw = Arc::new(library());
    let completer = Completer::new(
        Some(gw.clone() as Arc<dyn Gateway>),
        true,
        Duration::from_secs(60),
    );
    assert!(completer.document_names("Nope").await.is_empty());
    assert!(completer.cache().get("docs:Nope").is_none());
}

#[tokio::test]
async fn test_completion_disabled_or_keyless() {
    let gw = Arc::new(library());
    let disabled = Completer::new(
        Some(gw.clone() as Arc<dyn Gateway>),
        false,
        Duration::from_secs(60),
    );
    assert!(disabled.store_names().await.is_empty());
    assert_eq!(gw.calls.list_pages(), 0);

    let keyless = Completer::new(None, true, Duration::from_secs(60));
    assert!(keyless.file_names().await.is_empty());
    assert!(!keyless.model_names().await.is_empty());
}

#[tokio::test]
async fn test_model_completion_strips_prefix() {
    let gw = Arc::new(
        FakeGateway::new()
            .with_model("models/gemini-2.5-pro")
            .with_model("models/gemini-2.5-flash"),
    );
    let completer = Completer::new(Some(gw as Arc<dyn Gateway>), true, Duration::from_secs(60));
    assert_eq!(
        completer.model_names().await,
        vec!["gemini-2.5-pro", "gemini-2.5-flash"]
    );
}

#[tokio::test]
async fn test_slow_completion_times_out() {
    let gw = Arc::new(library().with_delay(Duration::from_secs(5)));
    let completer = Completer::new(Some(gw as Arc<dyn Gateway>), true, Duration::from_secs(60))
        .with_timeout(Duration::from_millis(20));
    assert!(completer.file_names().await.is_empty());
    assert!(completer.cache().get("files").is_none());
}

// ═══════════════════════════════════════
// MCP TOOLS
// ═══════════════════════════════════════

#[tokio::test]
async fn test_tool_list_documents_by_display_name() {
    let gw = library();
    let json = tools::list_documents(&gw, "Alpha").await.unwrap();
    let docs: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(docs.as_array().unwrap().len(), 2);
    assert_eq!(docs[0]["displayName"], "Intro");
}

#[tokio::test]
async fn test_tool_resolution_failure_message() {
    let gw = library();
    let err = tools::list_documents(&gw, "Nope").await.unwrap_err();
    assert!(err.starts_with("Failed to resolve store name:"));
    assert!(err.contains("Nope"));
}

#[tokio::test]
async fn test_tool_delete_store() {
    let gw = library();
    let text = tools::delete_store(&gw, "Gamma", false).await.unwrap();
    assert_eq!(text, "Deleted store: fileSearchStores/s3");
    assert_eq!(gw.deleted.lock().unwrap().as_slice(), ["fileSearchStores/s3"]);

    // non-empty store needs force
    assert!(tools::delete_store(&gw, "Alpha", false).await.is_err());
    assert!(tools::delete_store(&gw, "Alpha", true).await.is_ok());
}

#[tokio::test]
async fn test_tool_query_resolves_store_and_defaults_model() {
    let gw = library();
    let json = tools::query_knowledge_base(&gw, "what?", Some("Beta"), None, Some(""))
        .await
        .unwrap();
    let response: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(response["answer"], "answer to: what?");

    let request = gw.last_query.lock().unwrap().clone().unwrap();
    assert_eq!(request.store.as_deref(), Some("fileSearchStores/s2"));
    assert_eq!(request.model, file_search::constants::DEFAULT_MODEL);
    assert!(request.metadata_filter.is_none());
}

#[tokio::test]
async fn test_tool_import_file() {
    let gw = library();
    let text = tools::import_file_to_store(&gw, "report.pdf", "Alpha")
        .await
        .unwrap();
    assert_eq!(text, "Imported file files/f1 into store fileSearchStores/s1");
}

#[tokio::test]
async fn test_tool_upload_rejects_bad_metadata() {
    let gw = FakeGateway::new();
    let err = tools::upload_file(&gw, "/tmp/x.txt", None, None, Some("[1, 2]"))
        .await
        .unwrap_err();
    assert!(err.starts_with("Failed to parse metadata JSON"));
    assert_eq!(Calls::get(&gw.calls.uploads), 0);
}

#[tokio::test]
async fn test_tool_upload_to_store() {
    let gw = library();
    let file = temp_file("content");
    let path = file.path().display().to_string();
    let text = tools::upload_file(&gw, &path, Some("Alpha"), None, Some(r#"{"team": "docs"}"#))
        .await
        .unwrap();
    assert!(text.starts_with(&format!("Uploaded {} to store fileSearchStores/s1 as ", path)));
}

#[tokio::test]
async fn test_tool_delete_document() {
    let gw = library();
    let text = tools::delete_document(&gw, "Alpha", "Intro", false)
        .await
        .unwrap();
    assert_eq!(text, "Deleted document: fileSearchStores/s1/documents/d1");
}
