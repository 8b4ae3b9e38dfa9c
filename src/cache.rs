use crate::results::PageRecord;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Run-scoped store of page records keyed by URL.
///
/// Each key owns a cell that is filled at most once. The map lock is held
/// only to find or create a key's cell; concurrent callers for the same key
/// then wait on that cell while the first one computes, so different pages
/// never wait on each other. Entries are never evicted.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<PageRecord>>>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record cached for `url`, computing it with `compute` if absent.
    pub async fn get_or_compute<F, Fut>(&self, url: &str, compute: F) -> Arc<PageRecord>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PageRecord>,
    {
        match self
            .get_or_try_compute(url, move || async move {
                Ok::<_, std::convert::Infallible>(compute().await)
            })
            .await
        {
            Ok(record) => record,
            Err(never) => match never {},
        }
    }

    /// Like [`ResultCache::get_or_compute`] for a fallible computation.
    ///
    /// A failed computation stores nothing; the error goes to the caller that
    /// ran it and a later call for the same URL computes again.
    pub async fn get_or_try_compute<F, Fut, E>(
        &self,
        url: &str,
        compute: F,
    ) -> Result<Arc<PageRecord>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PageRecord, E>>,
    {
        let cell = self.cell(url).await;
        if let Some(record) = cell.get() {
            ::log::debug!("Serving from cache: {}", url);
            return Ok(Arc::clone(record));
        }

        let record = cell
            .get_or_try_init(move || async move { compute().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(record))
    }

    /// Record cached for `url`, if any
    pub async fn get(&self, url: &str) -> Option<Arc<PageRecord>> {
        let entries = self.entries.lock().await;
        entries.get(url).and_then(|cell| cell.get().cloned())
    }

    /// Number of URLs with a stored record
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn cell(&self, url: &str) -> Arc<OnceCell<Arc<PageRecord>>> {
        let mut entries = self.entries.lock().await;
        Arc::clone(entries.entry(url.to_string()).or_default())
    }
}
