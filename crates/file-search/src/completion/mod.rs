// crates/file-search/src/completion/mod.rs
// Shell completion suggestions backed by a TTL cache

pub mod cache;

pub use cache::TtlCache;

use crate::constants::MODEL_LIST;
use crate::error::Result;
use crate::gemini::Gateway;
use crate::http::COMPLETION_TIMEOUT;
use crate::resolve::resolve_store;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Supplies display names for interactive completion.
///
/// Lookups never fail: a disabled completer, a missing API key, a slow
/// backend or any remote error all produce an empty list (models fall back
/// to the built-in list instead).
pub struct Completer {
    gateway: Option<Arc<dyn Gateway>>,
    enabled: bool,
    cache: TtlCache,
    timeout: Duration,
}

impl Completer {
    /// `gateway` is `None` when no API key is configured
    pub fn new(gateway: Option<Arc<dyn Gateway>>, enabled: bool, cache_ttl: Duration) -> Self {
        Self {
            gateway,
            enabled,
            cache: TtlCache::new(cache_ttl),
            timeout: COMPLETION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    pub async fn store_names(&self) -> Vec<String> {
        self.lookup("stores".to_string(), |gw| async move {
            Ok(gw.list_stores().await?.into_iter().map(|s| s.display_name).collect())
        })
        .await
        .unwrap_or_default()
    }

    pub async fn file_names(&self) -> Vec<String> {
        self.lookup("files".to_string(), |gw| async move {
            Ok(gw.list_files().await?.into_iter().map(|f| f.display_name).collect())
        })
        .await
        .unwrap_or_default()
    }

    /// Document names within a store. The cache slot is keyed by the store
    /// reference exactly as given, before resolution.
    pub async fn document_names(&self, store_ref: &str) -> Vec<String> {
        if store_ref.is_empty() {
            return Vec::new();
        }
        let store_ref = store_ref.to_string();
        self.lookup(format!("docs:{}", store_ref), |gw| async move {
            let store = resolve_store(gw.as_ref(), &store_ref).await?;
            Ok(gw
                .list_documents(&store)
                .await?
                .into_iter()
                .map(|d| d.display_name)
                .collect())
        })
        .await
        .unwrap_or_default()
    }

    /// Model ids without the `models/` prefix, or the built-in list
    pub async fn model_names(&self) -> Vec<String> {
        let fetched = self
            .lookup("models".to_string(), |gw| async move {
                let names: Vec<String> = gw
                    .list_models()
                    .await?
                    .into_iter()
                    .map(|m| m.name.trim_start_matches("models/").to_string())
                    .collect();
                Ok(names)
            })
            .await;
        match fetched {
            Some(names) if !names.is_empty() => names,
            _ => MODEL_LIST.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Cache-first lookup bounded by the completion timeout.
    /// Empty results are not cached.
    async fn lookup<F, Fut>(&self, key: String, fetch: F) -> Option<Vec<String>>
    where
        F: FnOnce(Arc<dyn Gateway>) -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        if !self.enabled {
            return None;
        }
        if let Some(values) = self.cache.get(&key) {
            return Some(values);
        }
        let gateway = self.gateway.clone()?;

        match tokio::time::timeout(self.timeout, fetch(gateway)).await {
            Ok(Ok(values)) => {
                if !values.is_empty() {
                    self.cache.set(key, values.clone());
                }
                Some(values)
            }
            Ok(Err(e)) => {
                debug!(key = %key, error = %e, "Completion lookup failed");
                None
            }
            Err(_) => {
                debug!(key = %key, "Completion lookup timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_returns_empty() {
        let completer = Completer::new(None, false, Duration::from_secs(60));
        assert!(completer.store_names().await.is_empty());
        assert!(completer.file_names().await.is_empty());
        assert!(completer.document_names("Docs").await.is_empty());
    }

    #[tokio::test]
    async fn test_models_fall_back_to_builtin_list() {
        let completer = Completer::new(None, true, Duration::from_secs(60));
        let models = completer.model_names().await;
        assert_eq!(models.len(), MODEL_LIST.len());
        assert!(models.contains(&"gemini-2.5-flash".to_string()));
    }

    #[tokio::test]
    async fn test_cached_values_served_without_gateway() {
        let completer = Completer::new(None, true, Duration::from_secs(60));
        completer.cache().set("stores", vec!["Docs".into()]);
        assert_eq!(completer.store_names().await, vec!["Docs".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_store_ref() {
        let completer = Completer::new(None, true, Duration::from_secs(60));
        completer.cache().set("docs:", vec!["x".into()]);
        assert!(completer.document_names("").await.is_empty());
    }
}
