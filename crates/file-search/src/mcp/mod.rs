// crates/file-search/src/mcp/mod.rs
// MCP Server implementation

mod handler;
pub mod requests;
pub mod tools;

use crate::error::FileSearchError;
use crate::gemini::Gateway;
use requests::{
    CreateStoreRequest, DeleteDocumentRequest, DeleteFileRequest, DeleteStoreRequest,
    ImportFileRequest, ListDocumentsRequest, QueryRequest, UploadFileRequest,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    tool, tool_router,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Every tool the server knows, in registration order
pub const TOOL_NAMES: &[&str] = &[
    "list_stores",
    "list_files",
    "list_documents",
    "create_store",
    "delete_store",
    "import_file_to_store",
    "query_knowledge_base",
    "upload_file",
    "delete_file",
    "delete_document",
];

/// Tools selected by a comma-separated allow-list.
///
/// Besides tool names it accepts the aliases `all`, `query`
/// (query_knowledge_base), `upload` (upload_file) and `delete`
/// (delete_file and delete_document).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllowList {
    pub tools: BTreeSet<&'static str>,
    /// Entries that matched neither a tool nor an alias
    pub unknown: Vec<String>,
}

impl AllowList {
    pub fn parse(list: &str) -> Self {
        let mut allow = Self::default();
        for entry in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match entry {
                "all" => allow.tools.extend(TOOL_NAMES.iter().copied()),
                "query" => {
                    allow.tools.insert("query_knowledge_base");
                }
                "upload" => {
                    allow.tools.insert("upload_file");
                }
                "delete" => {
                    allow.tools.insert("delete_file");
                    allow.tools.insert("delete_document");
                }
                name => match TOOL_NAMES.iter().find(|t| **t == name) {
                    Some(tool) => {
                        allow.tools.insert(tool);
                    }
                    None => allow.unknown.push(name.to_string()),
                },
            }
        }
        allow
    }

    pub fn allows(&self, tool: &str) -> bool {
        self.tools.contains(tool)
    }
}

/// MCP Server state
#[derive(Clone)]
pub struct FileSearchServer {
    /// `None` when no API key is configured; every tool then reports it
    gateway: Option<Arc<dyn Gateway>>,
    tool_router: ToolRouter<Self>,
}

impl FileSearchServer {
    /// Build a server exposing only the tools in `allow`
    pub fn new(gateway: Option<Arc<dyn Gateway>>, allow: &AllowList) -> Self {
        let mut tool_router = Self::tool_router();
        for name in TOOL_NAMES {
            if !allow.allows(name) {
                tool_router.remove_route(name);
                debug!(tool = name, "Tool not in allow-list");
            }
        }
        info!(tools = ?allow.tools, "MCP tools registered");
        Self {
            gateway,
            tool_router,
        }
    }

    /// Names of the registered tools
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }

    fn gateway(&self) -> Result<&dyn Gateway, String> {
        self.gateway
            .as_deref()
            .ok_or_else(|| FileSearchError::MissingApiKey.to_user_string())
    }
}

#[tool_router]
impl FileSearchServer {
    #[tool(
        description = "List all File Search Stores. Returns a JSON array of store objects containing name, displayName, and other metadata."
    )]
    async fn list_stores(&self) -> Result<String, String> {
        tools::list_stores(self.gateway()?).await
    }

    #[tool(description = "List all files in the Gemini Files API. Returns a JSON array of file objects.")]
    async fn list_files(&self) -> Result<String, String> {
        tools::list_files(self.gateway()?).await
    }

    #[tool(
        description = "List all documents within a specified File Search Store. Returns a JSON array of document objects."
    )]
    async fn list_documents(
        &self,
        Parameters(req): Parameters<ListDocumentsRequest>,
    ) -> Result<String, String> {
        tools::list_documents(self.gateway()?, &req.store_name).await
    }

    #[tool(description = "Create a new File Search Store.")]
    async fn create_store(
        &self,
        Parameters(req): Parameters<CreateStoreRequest>,
    ) -> Result<String, String> {
        tools::create_store(self.gateway()?, &req.display_name).await
    }

    #[tool(description = "Delete a File Search Store.")]
    async fn delete_store(
        &self,
        Parameters(req): Parameters<DeleteStoreRequest>,
    ) -> Result<String, String> {
        tools::delete_store(self.gateway()?, &req.store_name, req.force.unwrap_or(false)).await
    }

    #[tool(description = "Import a file from the Files API into a File Search Store.")]
    async fn import_file_to_store(
        &self,
        Parameters(req): Parameters<ImportFileRequest>,
    ) -> Result<String, String> {
        tools::import_file_to_store(self.gateway()?, &req.file_name, &req.store_name).await
    }

    #[tool(
        description = "Query the knowledge base using Gemini File Search. Use this to answer questions based on uploaded documents."
    )]
    async fn query_knowledge_base(
        &self,
        Parameters(req): Parameters<QueryRequest>,
    ) -> Result<String, String> {
        tools::query_knowledge_base(
            self.gateway()?,
            &req.query,
            req.store_name.as_deref(),
            req.model.as_deref(),
            req.metadata_filter.as_deref(),
        )
        .await
    }

    #[tool(description = "Upload a local file to Gemini Files API and optionally add it to a store.")]
    async fn upload_file(
        &self,
        Parameters(req): Parameters<UploadFileRequest>,
    ) -> Result<String, String> {
        tools::upload_file(
            self.gateway()?,
            &req.path,
            req.store_name.as_deref(),
            req.mime_type.as_deref(),
            req.metadata.as_deref(),
        )
        .await
    }

    #[tool(description = "Delete a file from the Gemini Files API.")]
    async fn delete_file(
        &self,
        Parameters(req): Parameters<DeleteFileRequest>,
    ) -> Result<String, String> {
        tools::delete_file(self.gateway()?, &req.file_name).await
    }

    #[tool(description = "Delete a document from a File Search Store.")]
    async fn delete_document(
        &self,
        Parameters(req): Parameters<DeleteDocumentRequest>,
    ) -> Result<String, String> {
        tools::delete_document(
            self.gateway()?,
            &req.store_name,
            &req.document_name,
            req.force.unwrap_or(false),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let allow = AllowList::parse("all");
        assert_eq!(allow.tools.len(), TOOL_NAMES.len());
        assert!(allow.unknown.is_empty());
    }

    #[test]
    fn test_aliases() {
        let allow = AllowList::parse("query, upload,delete");
        let tools: Vec<_> = allow.tools.iter().copied().collect();
        assert_eq!(
            tools,
            vec![
                "delete_document",
                "delete_file",
                "query_knowledge_base",
                "upload_file"
            ]
        );
    }

    #[test]
    fn test_names_and_unknowns() {
        let allow = AllowList::parse("list_stores,,frobnicate");
        assert!(allow.allows("list_stores"));
        assert!(!allow.allows("list_files"));
        assert_eq!(allow.unknown, vec!["frobnicate".to_string()]);
    }

    #[test]
    fn test_empty_list_allows_nothing() {
        assert!(AllowList::parse("").tools.is_empty());
    }

    #[test]
    fn test_unlisted_tools_are_absent() {
        let server = FileSearchServer::new(None, &AllowList::parse("query"));
        assert_eq!(server.tool_names(), vec!["query_knowledge_base".to_string()]);

        let server = FileSearchServer::new(None, &AllowList::parse("all"));
        let mut names = server.tool_names();
        names.sort();
        let mut expected: Vec<String> = TOOL_NAMES.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_tools_without_key_report_missing_key() {
        let server = FileSearchServer::new(None, &AllowList::parse("all"));
        let err = server.list_stores().await.unwrap_err();
        assert!(err.contains("API key not set"));
    }
}
