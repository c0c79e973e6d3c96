// crates/file-search/src/gemini/upload.rs
// Resumable upload protocol (start + "upload, finalize") and upload body builders

use super::client::{GeminiClient, check_status};
use super::types::{ChunkingOptions, FileUpload, StoreUpload};
use crate::error::{FileSearchError, Result};
use serde_json::{Map, Value, json};
use std::path::Path;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// MIME type from the file extension, `application/octet-stream` if unknown
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Display name defaults to the file's base name
pub fn default_display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn file_upload_body(path: &Path, opts: &FileUpload) -> (Value, String) {
    let mime = opts
        .mime_type
        .clone()
        .unwrap_or_else(|| guess_mime(path));
    let display_name = opts
        .display_name
        .clone()
        .unwrap_or_else(|| default_display_name(path));
    let body = json!({
        "file": {
            "displayName": display_name,
            "mimeType": mime,
        }
    });
    (body, mime)
}

pub(crate) fn store_upload_body(path: &Path, opts: &StoreUpload) -> (Value, String) {
    let mime = opts
        .mime_type
        .clone()
        .unwrap_or_else(|| guess_mime(path));
    let display_name = opts
        .display_name
        .clone()
        .unwrap_or_else(|| default_display_name(path));

    let mut body = Map::new();
    body.insert("displayName".into(), json!(display_name));
    body.insert("mimeType".into(), json!(mime));

    if !opts.metadata.is_empty() {
        let entries: Vec<Value> = opts
            .metadata
            .iter()
            .map(|(k, v)| json!({"key": k, "stringValue": v}))
            .collect();
        body.insert("customMetadata".into(), Value::Array(entries));
    }

    if let Some(config) = chunking_config(&opts.chunking) {
        body.insert("chunkingConfig".into(), config);
    }

    (Value::Object(body), mime)
}

fn chunking_config(chunking: &ChunkingOptions) -> Option<Value> {
    if chunking.is_empty() {
        return None;
    }
    let mut ws = Map::new();
    if let Some(n) = chunking.max_tokens_per_chunk {
        ws.insert("maxTokensPerChunk".into(), json!(n));
    }
    if let Some(n) = chunking.max_overlap_tokens {
        ws.insert("maxOverlapTokens".into(), json!(n));
    }
    Some(json!({ "whiteSpaceConfig": ws }))
}

impl GeminiClient {
    /// Run both legs of a resumable upload and return the final JSON body
    pub(crate) async fn resumable_upload(
        &self,
        url: String,
        path: &Path,
        metadata: &Value,
        mime: &str,
    ) -> Result<Value> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        let bytes = tokio::fs::read(path).await?;

        debug!(
            request_id = %request_id,
            path = %path.display(),
            size = bytes.len(),
            mime = mime,
            "Starting resumable upload"
        );

        let start = self
            .http()
            .post(&url)
            .header("x-goog-api-key", self.api_key())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime)
            .json(metadata)
            .send()
            .await?;
        let start = check_status(start).await?;
        let status = start.status().as_u16();

        let session_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FileSearchError::Api {
                status,
                message: "upload session URL missing from response".to_string(),
            })?;

        let finish = self
            .http()
            .post(&session_url)
            .header("Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let finish = check_status(finish).await?;
        let value: Value = finish.json().await?;

        debug!(
            request_id = %request_id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Resumable upload finished"
        );
        Ok(value)
    }
}
