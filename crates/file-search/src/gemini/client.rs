// crates/file-search/src/gemini/client.rs
// Gemini File Search REST client (v1beta)

use super::Gateway;
use super::types::{
    Document, File, FileSearchStore, FileUpload, GenerateContentResponse, Model, Operation,
    OperationKind, Page, QueryRequest, QueryResponse, StoreUpload,
};
use super::upload::{file_upload_body, store_upload_body};
use crate::error::{FileSearchError, Result};
use crate::http::create_shared_client;
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, trace};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

const STORE_PAGE_SIZE: u32 = 20;
const DOCUMENT_PAGE_SIZE: u32 = 20;
const FILE_PAGE_SIZE: u32 = 100;
const MODEL_PAGE_SIZE: u32 = 1000;

/// Gemini API client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(api_key, create_shared_client())
    }

    /// Create a client with a shared HTTP client
    pub fn with_http_client(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: client,
        }
    }

    /// Point the client at another host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_VERSION, path)
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}/upload/{}/{}", self.base_url, API_VERSION, path)
    }

    fn paged_url(&self, path: &str, page_size: u32, page_token: Option<&str>) -> String {
        let mut url = format!("{}?pageSize={}", self.api_url(path), page_size);
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    /// Send one request, logging it under a fresh request id
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<reqwest::Response> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();

        let mut request = self
            .http
            .request(method.clone(), url)
            .header("x-goog-api-key", &self.api_key);
        if let Some(body) = body {
            trace!(request_id = %request_id, "Request body: {}", body);
            request = request.json(body);
        }

        let response = request.send().await;
        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        match &response {
            Ok(r) => debug!(
                request_id = %request_id,
                method = %method,
                url = %url,
                status = r.status().as_u16(),
                elapsed_ms,
                "Gemini request"
            ),
            Err(e) => debug!(
                request_id = %request_id,
                method = %method,
                url = %url,
                elapsed_ms,
                error = %e,
                "Gemini request failed"
            ),
        }

        check_status(response?).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        Ok(self.send(Method::GET, url, None).await?.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T> {
        Ok(self.send(Method::POST, url, Some(body)).await?.json().await?)
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Turn a non-2xx response into `FileSearchError::Api`, taking the message
/// from the `{"error":{"message"}}` body when there is one.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(FileSearchError::Api {
        status: status.as_u16(),
        message: api_error_message(&text, status.canonical_reason()),
    })
}

fn api_error_message(body: &str, reason: Option<&str>) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => reason.unwrap_or("request failed").to_string(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListStoresResponse {
    #[serde(default)]
    file_search_stores: Vec<FileSearchStore>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFilesResponse {
    #[serde(default)]
    files: Vec<File>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<Model>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct UploadFileResponse {
    file: File,
}

/// Reject a finished snapshot whose response type names the other kind.
/// Pending snapshots carry no response and are accepted as-is.
pub(crate) fn check_operation_kind(op: &Operation, kind: OperationKind) -> Result<()> {
    match op.response_type() {
        Some(t) if !t.ends_with(kind.response_type_suffix()) => {
            Err(FileSearchError::OperationKindMismatch {
                name: op.name.clone(),
                expected: kind.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Body of a generateContent call. The fileSearch tool is attached only
/// when a store is given.
pub(crate) fn query_body(request: &QueryRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": request.text}]
        }]
    });

    if let Some(store) = &request.store {
        let mut file_search = json!({ "fileSearchStoreNames": [store] });
        if let Some(filter) = request.metadata_filter.as_deref().filter(|f| !f.is_empty()) {
            file_search["metadataFilter"] = json!(filter);
        }
        body["tools"] = json!([{ "fileSearch": file_search }]);
    }

    body
}

#[async_trait]
impl Gateway for GeminiClient {
    async fn list_stores_page(&self, page_token: Option<&str>) -> Result<Page<FileSearchStore>> {
        let url = self.paged_url("fileSearchStores", STORE_PAGE_SIZE, page_token);
        let resp: ListStoresResponse = self.get_json(&url).await?;
        Ok(Page::new(resp.file_search_stores, resp.next_page_token))
    }

    async fn get_store(&self, name: &str) -> Result<FileSearchStore> {
        self.get_json(&self.api_url(name)).await
    }

    async fn create_store(&self, display_name: &str) -> Result<FileSearchStore> {
        let body = json!({ "displayName": display_name });
        let store: FileSearchStore = self.post_json(&self.api_url("fileSearchStores"), &body).await?;
        debug!(store = %store.name, "Created store");
        Ok(store)
    }

    async fn delete_store(&self, name: &str, force: bool) -> Result<()> {
        let mut url = self.api_url(name);
        if force {
            url.push_str("?force=true");
        }
        self.delete(&url).await
    }

    async fn list_files_page(&self, page_token: Option<&str>) -> Result<Page<File>> {
        let url = self.paged_url("files", FILE_PAGE_SIZE, page_token);
        let resp: ListFilesResponse = self.get_json(&url).await?;
        Ok(Page::new(resp.files, resp.next_page_token))
    }

    async fn get_file(&self, name: &str) -> Result<File> {
        self.get_json(&self.api_url(name)).await
    }

    async fn upload_file(&self, path: &Path, opts: &FileUpload) -> Result<File> {
        let (metadata, mime) = file_upload_body(path, opts);
        let value = self
            .resumable_upload(self.upload_url("files"), path, &metadata, &mime)
            .await?;
        let resp: UploadFileResponse = serde_json::from_value(value)?;
        Ok(resp.file)
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        self.delete(&self.api_url(name)).await
    }

    async fn list_documents_page(
        &self,
        store: &str,
        page_token: Option<&str>,
    ) -> Result<Page<Document>> {
        let url = self.paged_url(&format!("{}/documents", store), DOCUMENT_PAGE_SIZE, page_token);
        let resp: ListDocumentsResponse = self.get_json(&url).await?;
        Ok(Page::new(resp.documents, resp.next_page_token))
    }

    async fn get_document(&self, name: &str) -> Result<Document> {
        self.get_json(&self.api_url(name)).await
    }

    async fn delete_document(&self, name: &str, force: bool) -> Result<()> {
        let mut url = self.api_url(name);
        if force {
            url.push_str("?force=true");
        }
        self.delete(&url).await
    }

    async fn upload_to_store(
        &self,
        path: &Path,
        store: &str,
        opts: &StoreUpload,
    ) -> Result<Operation> {
        let (metadata, mime) = store_upload_body(path, opts);
        let url = self.upload_url(&format!("{}:uploadToFileSearchStore", store));
        let value = self.resumable_upload(url, path, &metadata, &mime).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn import_file(&self, file: &str, store: &str) -> Result<Operation> {
        let body = json!({ "fileName": file });
        self.post_json(&self.api_url(&format!("{}:importFile", store)), &body)
            .await
    }

    async fn get_operation(&self, name: &str, kind: OperationKind) -> Result<Operation> {
        let op: Operation = self.get_json(&self.api_url(name)).await?;
        check_operation_kind(&op, kind)?;
        Ok(op)
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let url = self.api_url(&format!("{}:generateContent", model_path(&request.model)));
        let raw: GenerateContentResponse = self.post_json(&url, &query_body(request)).await?;
        Ok(raw.into_query_response())
    }

    async fn list_models_page(&self, page_token: Option<&str>) -> Result<Page<Model>> {
        let url = self.paged_url("models", MODEL_PAGE_SIZE, page_token);
        let resp: ListModelsResponse = self.get_json(&url).await?;
        Ok(Page::new(resp.models, resp.next_page_token))
    }
}
