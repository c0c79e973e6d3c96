// crates/file-search/src/constants.rs
// Resource name shapes and model defaults shared by the CLI and the MCP server

use std::fmt;

/// Default Gemini model used for queries
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const STORE_RESOURCE_PREFIX: &str = "fileSearchStores/";
pub const FILE_RESOURCE_PREFIX: &str = "files/";
pub const DOCUMENT_RESOURCE_INFIX: &str = "/documents/";
pub const OPERATION_RESOURCE_INFIX: &str = "/operations/";

/// Static model list offered by completion when the models API is unreachable
pub const MODEL_LIST: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.5-pro",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
];

/// The three kinds of named resource a user can refer to by display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Store,
    File,
    Document,
}

impl ResourceKind {
    /// Purely syntactic check: does `reference` already look like a
    /// canonical resource name of this kind? No remote call is implied.
    pub fn is_canonical(self, reference: &str) -> bool {
        match self {
            ResourceKind::Store => reference.starts_with(STORE_RESOURCE_PREFIX),
            ResourceKind::File => reference.starts_with(FILE_RESOURCE_PREFIX),
            ResourceKind::Document => reference.contains(DOCUMENT_RESOURCE_INFIX),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Store => "store",
            ResourceKind::File => "file",
            ResourceKind::Document => "document",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
