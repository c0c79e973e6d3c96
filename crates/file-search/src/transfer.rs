// crates/file-search/src/transfer.rs
// Upload and import flows: one gateway call plus, for store targets, polling to completion

use crate::error::{FileSearchError, Result};
use crate::gemini::{File, FileUpload, Gateway, Operation, OperationKind, StoreUpload};
use crate::operation::Poller;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// What an upload produced
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// Plain Files API upload
    File(File),
    /// Upload-and-index into a store, finished successfully
    Indexed(Operation),
}

impl UploadOutcome {
    /// Resource name to report: the file, or the created document
    pub fn resource_name(&self) -> Option<&str> {
        match self {
            UploadOutcome::File(file) => Some(&file.name),
            UploadOutcome::Indexed(op) => op
                .response
                .as_ref()
                .and_then(|r| r.document_name.as_deref()),
        }
    }
}

/// Upload `path`. With a (resolved) store the file is indexed and the
/// operation is polled to completion; otherwise it only goes to the Files API.
pub async fn upload(
    gateway: &dyn Gateway,
    path: &Path,
    store: Option<&str>,
    opts: &StoreUpload,
    poller: &Poller,
) -> Result<UploadOutcome> {
    match store {
        Some(store) => {
            info!(path = %path.display(), store = %store, "Uploading to store");
            let op = gateway.upload_to_store(path, store, opts).await?;
            let op = poller.wait(gateway, op, OperationKind::Upload).await?;
            Ok(UploadOutcome::Indexed(op))
        }
        None => {
            info!(path = %path.display(), "Uploading file");
            let file_opts = FileUpload {
                display_name: opts.display_name.clone(),
                mime_type: opts.mime_type.clone(),
            };
            let file = gateway.upload_file(path, &file_opts).await?;
            Ok(UploadOutcome::File(file))
        }
    }
}

/// Import an existing raw file into a store and wait for it to finish.
/// Both names must already be resolved.
pub async fn import(
    gateway: &dyn Gateway,
    file: &str,
    store: &str,
    poller: &Poller,
) -> Result<Operation> {
    info!(file = %file, store = %store, "Importing file");
    let op = gateway.import_file(file, store).await?;
    poller.wait(gateway, op, OperationKind::Import).await
}

/// `key=value` pairs from the command line. Entries without `=` are ignored;
/// a later key overwrites an earlier one.
pub fn parse_metadata_pairs(pairs: &[String]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Metadata given as a JSON object string. Non-string values are kept in
/// their JSON text form.
pub fn parse_metadata_json(raw: &str) -> Result<BTreeMap<String, String>> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| FileSearchError::InvalidInput(format!("metadata is not valid JSON: {}", e)))?;
    let object = value.as_object().ok_or_else(|| {
        FileSearchError::InvalidInput("metadata must be a JSON object".to_string())
    })?;
    Ok(object
        .iter()
        .map(|(k, v)| {
            let v = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), v)
        })
        .collect())
}
