// crates/file-search/src/gemini/types.rs
// Wire and domain types for the Gemini File Search REST API

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The API encodes int64 counters as JSON strings; accept either form.
fn de_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("integer out of range: {}", n))),
        Some(serde_json::Value::String(s)) => s.parse().map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!(
            "expected integer or string, got {}",
            other
        ))),
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.filter(|t| !t.is_empty()),
        }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// A File Search Store (a "collection" of indexed documents)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchStore {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, deserialize_with = "de_i64")]
    pub active_documents_count: i64,
    #[serde(default, deserialize_with = "de_i64")]
    pub pending_documents_count: i64,
    #[serde(default, deserialize_with = "de_i64")]
    pub failed_documents_count: i64,
    #[serde(default, deserialize_with = "de_i64")]
    pub size_bytes: i64,
}

/// A raw file in the Files API, not yet attached to any store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub size_bytes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetadata {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
}

impl CustomMetadata {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            string_value: Some(value.into()),
            numeric_value: None,
        }
    }

    /// Value rendered for display, whichever form the API returned
    pub fn display_value(&self) -> String {
        match (&self.string_value, self.numeric_value) {
            (Some(s), _) => s.clone(),
            (None, Some(n)) => n.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// The indexed form of a file inside a store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_metadata: Vec<CustomMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub size_bytes: i64,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_generation_methods: Vec<String>,
}

// ============================================================================
// Long-running operations
// ============================================================================

/// Which long-running operation family a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Import,
    Upload,
}

impl OperationKind {
    /// Suffix of the `@type` URL carried by a finished operation's response
    pub fn response_type_suffix(self) -> &'static str {
        match self {
            OperationKind::Import => "ImportFileResponse",
            OperationKind::Upload => "UploadToFileSearchStoreResponse",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Import => "import",
            OperationKind::Upload => "upload",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "import" => Ok(OperationKind::Import),
            "upload" => Ok(OperationKind::Upload),
            other => Err(format!(
                "invalid operation type: {} (must be 'import' or 'upload')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub type_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
}

/// Snapshot of a long-running operation as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<OperationResponse>,
}

impl Operation {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| {
            if e.message.is_empty() {
                format!("error code {}", e.code)
            } else {
                e.message.clone()
            }
        })
    }

    /// The `@type` of the response, when the operation has finished
    pub fn response_type(&self) -> Option<&str> {
        self.response.as_ref().and_then(|r| r.type_url.as_deref())
    }

    /// Project the snapshot into the status record shown to users
    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        OperationStatus {
            name: self.name.clone(),
            kind,
            done: self.done,
            failed: self.failed(),
            error_message: self.error_message(),
            metadata: self.metadata.clone().unwrap_or_default(),
            parent: self.response.as_ref().and_then(|r| r.parent.clone()),
            document_name: self.response.as_ref().and_then(|r| r.document_name.clone()),
        }
    }
}

/// Read-only projection of an operation for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub done: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
}

// ============================================================================
// Uploads
// ============================================================================

/// Whitespace chunking knobs for store uploads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkingOptions {
    pub max_tokens_per_chunk: Option<u32>,
    pub max_overlap_tokens: Option<u32>,
}

impl ChunkingOptions {
    pub fn is_empty(&self) -> bool {
        self.max_tokens_per_chunk.is_none() && self.max_overlap_tokens.is_none()
    }
}

/// Options for a plain Files API upload
#[derive(Debug, Clone, Default)]
pub struct FileUpload {
    pub display_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Options for an upload-and-index into a store
#[derive(Debug, Clone, Default)]
pub struct StoreUpload {
    pub display_name: Option<String>,
    pub mime_type: Option<String>,
    pub chunking: ChunkingOptions,
    pub metadata: BTreeMap<String, String>,
}

// ============================================================================
// Query
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub text: String,
    pub store: Option<String>,
    pub model: String,
    pub metadata_filter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpan {
    #[serde(default)]
    pub first_page: i32,
    #[serde(default)]
    pub last_page: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSource {
    Document,
    Web,
}

/// A source passage the answer was grounded on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    pub source: ChunkSource,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_span: Option<PageSpan>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub answer: String,
    pub grounding_chunks: Vec<GroundingChunk>,
    /// Untouched grounding metadata, kept for --debug output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<serde_json::Value>,
}

// Raw generateContent response shapes. Only the fields we render are typed.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<RawGroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
    #[serde(default)]
    retrieved_context: Option<RetrievedContext>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievedContext {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    rag_chunk: Option<RagChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RagChunk {
    #[serde(default)]
    page_span: Option<PageSpan>,
}

impl GenerateContentResponse {
    /// Reduce the raw response to answer text and grounding chunks.
    /// Only the first candidate is considered.
    pub(crate) fn into_query_response(self) -> QueryResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return QueryResponse::default();
        };

        let answer = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        let grounding_chunks = candidate
            .grounding_metadata
            .as_ref()
            .and_then(|v| serde_json::from_value::<GroundingMetadata>(v.clone()).ok())
            .map(|m| {
                m.grounding_chunks
                    .into_iter()
                    .filter_map(RawGroundingChunk::into_chunk)
                    .collect()
            })
            .unwrap_or_default();

        QueryResponse {
            answer,
            grounding_chunks,
            grounding_metadata: candidate.grounding_metadata,
        }
    }
}

impl RawGroundingChunk {
    fn into_chunk(self) -> Option<GroundingChunk> {
        if let Some(web) = self.web {
            return Some(GroundingChunk {
                source: ChunkSource::Web,
                title: web.title,
                uri: Some(web.uri).filter(|u| !u.is_empty()),
                page_span: None,
                text: String::new(),
            });
        }
        let ctx = self.retrieved_context?;
        Some(GroundingChunk {
            source: ChunkSource::Document,
            title: ctx
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown Document".to_string()),
            uri: ctx.uri.filter(|u| !u.is_empty()),
            page_span: ctx.rag_chunk.and_then(|r| r.page_span),
            text: ctx.text.unwrap_or_default(),
        })
    }
}
