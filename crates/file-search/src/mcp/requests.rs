// crates/file-search/src/mcp/requests.rs
// MCP tool request types

use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDocumentsRequest {
    #[schemars(description = "The resource name or display name of the store to list documents from.")]
    pub store_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateStoreRequest {
    #[schemars(description = "The human-readable name for the new store.")]
    pub display_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteStoreRequest {
    #[schemars(description = "The resource name or display name of the store to delete.")]
    pub store_name: String,
    #[schemars(description = "Force delete even if the store contains documents.")]
    #[serde(default)]
    pub force: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportFileRequest {
    #[schemars(description = "The resource name or display name of the file to import.")]
    pub file_name: String,
    #[schemars(description = "The resource name or display name of the store to import into.")]
    pub store_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryRequest {
    #[schemars(description = "The question or query to ask.")]
    pub query: String,
    #[schemars(description = "The resource name or display name of the store to search. Without it the model answers without file search grounding.")]
    pub store_name: Option<String>,
    #[schemars(description = "The model to use (default: gemini-2.5-flash).")]
    pub model: Option<String>,
    #[schemars(description = "Optional metadata filter expression to narrow search results, e.g. 'category = \"research\"' or 'status = \"reviewed\" AND priority = \"high\"'.")]
    pub metadata_filter: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UploadFileRequest {
    #[schemars(description = "Absolute path to the local file.")]
    pub path: String,
    #[schemars(description = "The resource name or display name of the store to add the file to.")]
    pub store_name: Option<String>,
    #[schemars(description = "The MIME type of the file (optional).")]
    pub mime_type: Option<String>,
    #[schemars(description = "Optional metadata as a JSON object string, e.g. '{\"category\": \"research\", \"author\": \"Smith\"}'. Numbers and booleans are stored as their text form. Only used if store_name is provided.")]
    pub metadata: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFileRequest {
    #[schemars(description = "The resource name or display name of the file to delete.")]
    pub file_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDocumentRequest {
    #[schemars(description = "The resource name or display name of the store.")]
    pub store_name: String,
    #[schemars(description = "The resource name or display name of the document.")]
    pub document_name: String,
    #[schemars(description = "Force delete the document and its chunks.")]
    #[serde(default)]
    pub force: Option<bool>,
}
