// crates/file-search/src/resolve.rs
// Name Resolver: friendly display names to canonical resource names

use crate::constants::ResourceKind;
use crate::error::{FileSearchError, Result};
use crate::gemini::Gateway;
use tracing::debug;

/// First entry whose display name equals `reference` exactly, in listing order
fn first_match<T>(
    items: Vec<T>,
    reference: &str,
    display: impl Fn(&T) -> &str,
    name: impl Fn(T) -> String,
) -> Option<String> {
    items
        .into_iter()
        .find(|item| display(item) == reference)
        .map(name)
}

/// Resolve a store reference. Canonical names are returned untouched
/// without any remote call.
pub async fn resolve_store(gateway: &dyn Gateway, reference: &str) -> Result<String> {
    if ResourceKind::Store.is_canonical(reference) {
        return Ok(reference.to_string());
    }
    let stores = gateway.list_stores().await?;
    let found = first_match(stores, reference, |s| s.display_name.as_str(), |s| s.name);
    match found {
        Some(name) => {
            debug!(reference, store = %name, "Resolved store");
            Ok(name)
        }
        None => Err(FileSearchError::NotFound {
            kind: ResourceKind::Store,
            reference: reference.to_string(),
        }),
    }
}

pub async fn resolve_file(gateway: &dyn Gateway, reference: &str) -> Result<String> {
    if ResourceKind::File.is_canonical(reference) {
        return Ok(reference.to_string());
    }
    let files = gateway.list_files().await?;
    let found = first_match(files, reference, |f| f.display_name.as_str(), |f| f.name);
    match found {
        Some(name) => {
            debug!(reference, file = %name, "Resolved file");
            Ok(name)
        }
        None => Err(FileSearchError::NotFound {
            kind: ResourceKind::File,
            reference: reference.to_string(),
        }),
    }
}

/// Resolve a document within a store. The store reference is resolved
/// first, then that store's documents are scanned.
pub async fn resolve_document(
    gateway: &dyn Gateway,
    store_reference: &str,
    reference: &str,
) -> Result<String> {
    if ResourceKind::Document.is_canonical(reference) {
        return Ok(reference.to_string());
    }
    let store = resolve_store(gateway, store_reference).await?;
    let documents = gateway.list_documents(&store).await?;
    let found = first_match(documents, reference, |d| d.display_name.as_str(), |d| d.name);
    match found {
        Some(name) => {
            debug!(reference, store = %store, document = %name, "Resolved document");
            Ok(name)
        }
        None => Err(FileSearchError::DocumentNotFound {
            store,
            reference: reference.to_string(),
        }),
    }
}

/// Kind-dispatching entry point. `scope` is the store reference and is
/// only consulted for documents.
pub async fn resolve(
    gateway: &dyn Gateway,
    kind: ResourceKind,
    reference: &str,
    scope: Option<&str>,
) -> Result<String> {
    match kind {
        ResourceKind::Store => resolve_store(gateway, reference).await,
        ResourceKind::File => resolve_file(gateway, reference).await,
        ResourceKind::Document => {
            if kind.is_canonical(reference) {
                return Ok(reference.to_string());
            }
            let store = scope.ok_or_else(|| {
                FileSearchError::MissingReference(
                    "a store is required to resolve a document by display name".to_string(),
                )
            })?;
            resolve_document(gateway, store, reference).await
        }
    }
}

/// Pick the store from a `--store NAME` / `--store-id ID` pair.
/// A name wins over an id; the id is used verbatim.
pub async fn resolve_store_flags(
    gateway: &dyn Gateway,
    name: Option<&str>,
    id: Option<&str>,
) -> Result<String> {
    match (name.filter(|s| !s.is_empty()), id.filter(|s| !s.is_empty())) {
        (Some(name), _) => resolve_store(gateway, name).await,
        (None, Some(id)) => Ok(id.to_string()),
        (None, None) => Err(FileSearchError::MissingReference(
            "either --store or --store-id is required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let items = vec![("a", "1"), ("dup", "2"), ("dup", "3")];
        let found = first_match(items, "dup", |i| i.0, |i| i.1.to_string());
        assert_eq!(found.as_deref(), Some("2"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let items = vec![("Docs", "1")];
        assert!(first_match(items.clone(), "docs", |i| i.0, |i| i.1.to_string()).is_none());
        assert!(first_match(items, "Docs ", |i| i.0, |i| i.1.to_string()).is_none());
    }
}
