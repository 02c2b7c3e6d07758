//! Catalog option cache
//!
//! Select editors load their options the first time they open. Each catalog
//! is fetched at most once per cache; failed fetches are not cached and
//! degrade to an empty option list.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::store::CatalogSource;

type Options = Arc<Vec<String>>;

/// Lazily populated, shared catalog option lists.
///
/// # Example
///
/// ```ignore
/// use shipdeck_lib::CatalogCache;
///
/// let cache = CatalogCache::new(store.clone());
/// let plants = cache.options("plantas").await;
/// ```
#[derive(Clone)]
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    entries: Arc<DashMap<String, Arc<OnceCell<Options>>>>,
}

impl CatalogCache {
    /// Creates an empty cache over the given source.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Returns the options of a catalog, fetching them on first use.
    ///
    /// Concurrent callers share one fetch. On failure the error is logged,
    /// an empty list is returned and the next call fetches again.
    pub async fn options(&self, name: &str) -> Options {
        let cell = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_try_init(|| async {
                self.source.fetch_catalog(name).await.map(Arc::new)
            })
            .await;

        match result {
            Ok(options) => options.clone(),
            Err(e) => {
                log::warn!("catalog '{name}' unavailable, editing as free text: {e}");
                Arc::new(Vec::new())
            }
        }
    }

    /// Returns the options if the catalog was already fetched.
    pub fn cached(&self, name: &str) -> Option<Options> {
        self.entries
            .get(name)
            .and_then(|cell| cell.get().cloned())
    }

    /// Drops a cached catalog so the next use refetches it.
    pub fn invalidate(&self, name: &str) {
        self.entries.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_fetches_once() {
        let store = Arc::new(
            MemoryStore::new().with_catalog("plantas", vec!["Rancagua".into(), "Curicó".into()]),
        );
        let cache = CatalogCache::new(store.clone());

        let first = cache.options("plantas").await;
        let second = cache.options("plantas").await;

        assert_eq!(first.as_slice(), ["Rancagua", "Curicó"]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.catalog_fetches(), 1);
    }

    #[tokio::test]
    async fn test_failure_yields_empty_and_retries() {
        let store = Arc::new(MemoryStore::new());
        store.fail_catalog("depositos");
        let cache = CatalogCache::new(store.clone());

        assert!(cache.options("depositos").await.is_empty());
        assert!(cache.cached("depositos").is_none());
        assert!(cache.options("depositos").await.is_empty());
        assert_eq!(store.catalog_fetches(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_refetches() {
        let store = Arc::new(MemoryStore::new().with_catalog("plantas", vec!["A".into()]));
        let cache = CatalogCache::new(store.clone());

        cache.options("plantas").await;
        cache.invalidate("plantas");
        cache.options("plantas").await;
        assert_eq!(store.catalog_fetches(), 2);
    }
}
