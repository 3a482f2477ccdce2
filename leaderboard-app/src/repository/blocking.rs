use std::sync::Arc;

use crate::ports::store::{Mutation, Record, Store, StoreError, StoreResult};

/// Async front for a blocking [`Store`].
///
/// Every store call runs on tokio's blocking thread pool; awaiting it is the
/// only point where a repository operation suspends the calling task.
pub struct BlockingStore<S> {
    store: Arc<S>,
}

impl<S> Clone for BlockingStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store + Send + Sync + 'static> BlockingStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn dispatch<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&S) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| StoreError::Backend(format!("store task failed: {}", e)))?
    }

    pub async fn scan_all(&self) -> StoreResult<Vec<Record>> {
        self.dispatch(|store| store.scan_all()).await
    }

    pub async fn conditional_put(&self, key: String, record: Record) -> StoreResult<()> {
        self.dispatch(move |store| store.conditional_put(&key, record))
            .await
    }

    pub async fn conditional_update(&self, key: String, mutation: Mutation) -> StoreResult<()> {
        self.dispatch(move |store| store.conditional_update(&key, &mutation))
            .await
    }

    pub async fn delete(&self, key: String) -> StoreResult<()> {
        self.dispatch(move |store| store.delete(&key)).await
    }
}
