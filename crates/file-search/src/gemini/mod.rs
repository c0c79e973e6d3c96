// crates/file-search/src/gemini/mod.rs
// Remote Service Gateway: the one seam between this crate and the Gemini API

pub mod client;
pub mod types;
mod upload;

pub use client::GeminiClient;
pub use types::{
    ChunkSource, ChunkingOptions, CustomMetadata, Document, File, FileSearchStore, FileUpload,
    GroundingChunk, Model, Operation, OperationKind, OperationStatus, Page, PageSpan,
    QueryRequest, QueryResponse, StoreUpload,
};
pub use upload::{default_display_name, guess_mime};

use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;

/// Typed access to the File Search backend.
///
/// Implementors supply the page-level list calls; the full listings are
/// provided and always follow continuation tokens to the end, so callers
/// never see a partial listing. No method retries.
#[async_trait]
pub trait Gateway: Send + Sync {
    // ═══════════════════════════════════════
    // STORES
    // ═══════════════════════════════════════

    async fn list_stores_page(&self, page_token: Option<&str>) -> Result<Page<FileSearchStore>>;

    async fn get_store(&self, name: &str) -> Result<FileSearchStore>;

    async fn create_store(&self, display_name: &str) -> Result<FileSearchStore>;

    /// Without `force` the backend rejects deletion of a non-empty store.
    async fn delete_store(&self, name: &str, force: bool) -> Result<()>;

    // ═══════════════════════════════════════
    // FILES
    // ═══════════════════════════════════════

    async fn list_files_page(&self, page_token: Option<&str>) -> Result<Page<File>>;

    async fn get_file(&self, name: &str) -> Result<File>;

    async fn upload_file(&self, path: &Path, opts: &FileUpload) -> Result<File>;

    async fn delete_file(&self, name: &str) -> Result<()>;

    // ═══════════════════════════════════════
    // DOCUMENTS
    // ═══════════════════════════════════════

    async fn list_documents_page(
        &self,
        store: &str,
        page_token: Option<&str>,
    ) -> Result<Page<Document>>;

    async fn get_document(&self, name: &str) -> Result<Document>;

    async fn delete_document(&self, name: &str, force: bool) -> Result<()>;

    // ═══════════════════════════════════════
    // LONG-RUNNING OPERATIONS
    // ═══════════════════════════════════════

    /// Upload a local file and index it into `store`
    async fn upload_to_store(&self, path: &Path, store: &str, opts: &StoreUpload)
    -> Result<Operation>;

    /// Import an existing raw file into `store`
    async fn import_file(&self, file: &str, store: &str) -> Result<Operation>;

    /// Fetch one snapshot, checking that it belongs to `kind`
    async fn get_operation(&self, name: &str, kind: OperationKind) -> Result<Operation>;

    // ═══════════════════════════════════════
    // QUERY / MODELS
    // ═══════════════════════════════════════

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;

    async fn list_models_page(&self, page_token: Option<&str>) -> Result<Page<Model>>;

    // ═══════════════════════════════════════
    // FULL LISTINGS (provided)
    // ═══════════════════════════════════════

    async fn list_stores(&self) -> Result<Vec<FileSearchStore>> {
        collect_pages(|token| async move { self.list_stores_page(token.as_deref()).await }).await
    }

    async fn list_files(&self) -> Result<Vec<File>> {
        collect_pages(|token| async move { self.list_files_page(token.as_deref()).await }).await
    }

    async fn list_documents(&self, store: &str) -> Result<Vec<Document>> {
        collect_pages(|token| async move { self.list_documents_page(store, token.as_deref()).await })
            .await
    }

    async fn list_models(&self) -> Result<Vec<Model>> {
        collect_pages(|token| async move { self.list_models_page(token.as_deref()).await }).await
    }
}

/// Follow continuation tokens until the backend stops returning one
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);
        match page.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(items),
        }
    }
}
