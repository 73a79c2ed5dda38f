use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,

    #[error("document already exists")]
    AlreadyExists,
}

struct Versioned<T> {
    version: u64,
    doc: T,
}

/// An in-process document collection with per-document atomic
/// read-modify-write. Every committed mutation bumps the document version,
/// and mutations run to completion under the collection's write lock, so a
/// concurrent updater can never observe or overwrite a half-applied change.
pub struct Collection<T> {
    name: &'static str,
    inner: RwLock<HashMap<Uuid, Versioned<T>>>,
}

impl<T: Clone> Collection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, id: Uuid, doc: T) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(&id) {
            return Err(StoreError::AlreadyExists);
        }
        inner.insert(id, Versioned { version: 1, doc });
        debug!("{}: inserted document {}", self.name, id);
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<T, StoreError> {
        self.try_get(id).await.ok_or(StoreError::NotFound)
    }

    pub async fn try_get(&self, id: Uuid) -> Option<T> {
        self.inner.read().await.get(&id).map(|v| v.doc.clone())
    }

    pub async fn version(&self, id: Uuid) -> Option<u64> {
        self.inner.read().await.get(&id).map(|v| v.version)
    }

    pub async fn list(&self) -> Vec<T> {
        self.inner.read().await.values().map(|v| v.doc.clone()).collect()
    }

    pub async fn find<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .await
            .values()
            .filter(|v| predicate(&v.doc))
            .map(|v| v.doc.clone())
            .collect()
    }

    /// Atomic read-modify-write. The closure sees the current document and
    /// may mutate it; if it returns `Ok` the mutation commits and the
    /// version bumps, if it returns `Err` the document is left untouched.
    pub async fn try_update<R, E, F>(&self, id: Uuid, f: F) -> Result<R, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(&id).ok_or(StoreError::NotFound)?;

        let mut draft = entry.doc.clone();
        let out = f(&mut draft)?;

        entry.doc = draft;
        entry.version += 1;
        debug!("{}: updated document {} to version {}", self.name, id, entry.version);
        Ok(out)
    }

    pub async fn remove(&self, id: Uuid) -> Result<T, StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .remove(&id)
            .map(|v| v.doc)
            .ok_or(StoreError::NotFound)
    }

    /// Remove every document matching the predicate, returning the removed
    /// documents.
    pub async fn remove_where<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        let mut inner = self.inner.write().await;
        let ids: Vec<Uuid> = inner
            .iter()
            .filter(|(_, v)| predicate(&v.doc))
            .map(|(id, _)| *id)
            .collect();

        ids.into_iter()
            .filter_map(|id| inner.remove(&id).map(|v| v.doc))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let coll: Collection<String> = Collection::new("docs");
        let id = Uuid::new_v4();

        coll.insert(id, "hello".to_string()).await.unwrap();
        assert_eq!(coll.get(id).await.unwrap(), "hello");
        assert_eq!(coll.version(id).await, Some(1));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let coll: Collection<u32> = Collection::new("docs");
        let id = Uuid::new_v4();

        coll.insert(id, 1).await.unwrap();
        assert_eq!(coll.insert(id, 2).await, Err(StoreError::AlreadyExists));
        assert_eq!(coll.get(id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_update_leaves_document_untouched() {
        let coll: Collection<u32> = Collection::new("docs");
        let id = Uuid::new_v4();
        coll.insert(id, 10).await.unwrap();

        let result: Result<(), StoreError> = coll
            .try_update(id, |doc| {
                *doc = 99;
                Err(StoreError::AlreadyExists)
            })
            .await;

        assert!(result.is_err());
        assert_eq!(coll.get(id).await.unwrap(), 10);
        assert_eq!(coll.version(id).await, Some(1));
    }

    #[tokio::test]
    async fn committed_update_bumps_version() {
        let coll: Collection<u32> = Collection::new("docs");
        let id = Uuid::new_v4();
        coll.insert(id, 1).await.unwrap();

        let doubled: Result<u32, StoreError> = coll
            .try_update(id, |doc| {
                *doc *= 2;
                Ok(*doc)
            })
            .await;

        assert_eq!(doubled.unwrap(), 2);
        assert_eq!(coll.version(id).await, Some(2));
    }

    #[tokio::test]
    async fn remove_where_filters() {
        let coll: Collection<u32> = Collection::new("docs");
        for n in 0..6u32 {
            coll.insert(Uuid::new_v4(), n).await.unwrap();
        }

        let removed = coll.remove_where(|n| n % 2 == 0).await;
        assert_eq!(removed.len(), 3);
        assert_eq!(coll.list().await.len(), 3);
    }
}
