// crates/file-search/src/mcp/tools.rs
// Tool implementations over the gateway; every tool returns a JSON or text payload

use crate::constants::DEFAULT_MODEL;
use crate::error::FileSearchError;
use crate::gemini::{Gateway, QueryRequest, StoreUpload};
use crate::operation::Poller;
use crate::resolve::{resolve_document, resolve_file, resolve_store};
use crate::transfer::{self, UploadOutcome, parse_metadata_json};
use serde::Serialize;
use std::path::Path;

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn resolve_failed(what: &str, e: FileSearchError) -> String {
    format!("Failed to resolve {} name: {}", what, e)
}

/// Tool calls never print progress
fn quiet_poller(label: &str) -> Poller {
    Poller::new(label).quiet(true)
}

pub async fn list_stores(gateway: &dyn Gateway) -> Result<String, String> {
    let stores = gateway.list_stores().await?;
    to_json(&stores)
}

pub async fn list_files(gateway: &dyn Gateway) -> Result<String, String> {
    let files = gateway.list_files().await?;
    to_json(&files)
}

pub async fn list_documents(gateway: &dyn Gateway, store_name: &str) -> Result<String, String> {
    let store = resolve_store(gateway, store_name)
        .await
        .map_err(|e| resolve_failed("store", e))?;
    let documents = gateway.list_documents(&store).await?;
    to_json(&documents)
}

pub async fn create_store(gateway: &dyn Gateway, display_name: &str) -> Result<String, String> {
    if display_name.trim().is_empty() {
        return Err("display_name must not be empty".to_string());
    }
    let store = gateway.create_store(display_name).await?;
    to_json(&store)
}

pub async fn delete_store(
    gateway: &dyn Gateway,
    store_name: &str,
    force: bool,
) -> Result<String, String> {
    let store = resolve_store(gateway, store_name)
        .await
        .map_err(|e| resolve_failed("store", e))?;
    gateway.delete_store(&store, force).await?;
    Ok(format!("Deleted store: {}", store))
}

pub async fn import_file_to_store(
    gateway: &dyn Gateway,
    file_name: &str,
    store_name: &str,
) -> Result<String, String> {
    let file = resolve_file(gateway, file_name)
        .await
        .map_err(|e| resolve_failed("file", e))?;
    let store = resolve_store(gateway, store_name)
        .await
        .map_err(|e| resolve_failed("store", e))?;
    transfer::import(gateway, &file, &store, &quiet_poller("Importing")).await?;
    Ok(format!("Imported file {} into store {}", file, store))
}

pub async fn query_knowledge_base(
    gateway: &dyn Gateway,
    query: &str,
    store_name: Option<&str>,
    model: Option<&str>,
    metadata_filter: Option<&str>,
) -> Result<String, String> {
    let store = match store_name.filter(|s| !s.is_empty()) {
        Some(name) => Some(
            resolve_store(gateway, name)
                .await
                .map_err(|e| resolve_failed("store", e))?,
        ),
        None => None,
    };
    let request = QueryRequest {
        text: query.to_string(),
        store,
        model: model
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string(),
        metadata_filter: metadata_filter
            .filter(|f| !f.is_empty())
            .map(str::to_string),
    };
    let response = gateway.query(&request).await?;
    to_json(&response)
}

pub async fn upload_file(
    gateway: &dyn Gateway,
    path: &str,
    store_name: Option<&str>,
    mime_type: Option<&str>,
    metadata: Option<&str>,
) -> Result<String, String> {
    let metadata = match metadata {
        Some(raw) => parse_metadata_json(raw)
            .map_err(|e| format!("Failed to parse metadata JSON: {}", e))?,
        None => Default::default(),
    };
    let store = match store_name.filter(|s| !s.is_empty()) {
        Some(name) => Some(
            resolve_store(gateway, name)
                .await
                .map_err(|e| resolve_failed("store", e))?,
        ),
        None => None,
    };
    let opts = StoreUpload {
        display_name: None,
        mime_type: mime_type.filter(|m| !m.is_empty()).map(str::to_string),
        metadata,
        ..Default::default()
    };

    let outcome = transfer::upload(
        gateway,
        Path::new(path),
        store.as_deref(),
        &opts,
        &quiet_poller("Indexing"),
    )
    .await?;

    match outcome {
        UploadOutcome::File(file) => to_json(&file),
        UploadOutcome::Indexed(op) => {
            let store = store.unwrap_or_default();
            match op.response.and_then(|r| r.document_name) {
                Some(doc) => Ok(format!("Uploaded {} to store {} as {}", path, store, doc)),
                None => Ok(format!("Uploaded {} to store {}", path, store)),
            }
        }
    }
}

pub async fn delete_file(gateway: &dyn Gateway, file_name: &str) -> Result<String, String> {
    let file = resolve_file(gateway, file_name)
        .await
        .map_err(|e| resolve_failed("file", e))?;
    gateway.delete_file(&file).await?;
    Ok(format!("Deleted file: {}", file))
}

pub async fn delete_document(
    gateway: &dyn Gateway,
    store_name: &str,
    document_name: &str,
    force: bool,
) -> Result<String, String> {
    let document = resolve_document(gateway, store_name, document_name)
        .await
        .map_err(|e| resolve_failed("document", e))?;
    gateway.delete_document(&document, force).await?;
    Ok(format!("Deleted document: {}", document))
}
