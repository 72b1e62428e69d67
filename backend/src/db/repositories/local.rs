//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the repository traits
//! suitable for unit testing and local development. Documents live in
//! per-collection `Vec`s, which keeps listing in insertion order.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::document::{with_id, Document, DocumentId, Filter, ResourceKind};
use crate::db::repository::{
    DocumentRepository, ErrorContext, RepositoryError, RepositoryResult, SingletonRepository,
};

/// In-memory local repository.
///
/// Cloning is cheap and every clone shares the same data.
///
/// # Example
/// ```
/// use property_api::db::repositories::LocalRepository;
/// use property_api::db::ResourceKind;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.document_count(ResourceKind::Property), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    collections: HashMap<ResourceKind, Vec<(DocumentId, Document)>>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        self.data.write().collections.clear();
    }

    /// Get the number of documents stored under `kind`.
    pub fn document_count(&self, kind: ResourceKind) -> usize {
        self.data
            .read()
            .collections
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRepository for LocalRepository {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_document(
        &self,
        kind: ResourceKind,
        document: Document,
    ) -> RepositoryResult<DocumentId> {
        self.check_health("insert_document")?;

        let id = DocumentId::generate();
        let mut document = document;
        document.remove(crate::db::document::ID_FIELD);

        self.data
            .write()
            .collections
            .entry(kind)
            .or_default()
            .push((id, document));

        debug!("Inserted {} document {}", kind, id);
        Ok(id)
    }

    async fn find_documents(
        &self,
        kind: ResourceKind,
        filter: &Filter,
    ) -> RepositoryResult<Vec<Document>> {
        self.check_health("find_documents")?;

        let data = self.data.read();
        let documents = data
            .collections
            .get(&kind)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .map(|(id, doc)| with_id(*id, doc.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(documents)
    }

    async fn find_document_by_id(
        &self,
        kind: ResourceKind,
        id: DocumentId,
    ) -> RepositoryResult<Option<Document>> {
        self.check_health("find_document_by_id")?;

        let data = self.data.read();
        Ok(data.collections.get(&kind).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| *doc_id == id)
                .map(|(doc_id, doc)| with_id(*doc_id, doc.clone()))
        }))
    }

    async fn count_documents(&self, kind: ResourceKind) -> RepositoryResult<u64> {
        self.check_health("count_documents")?;
        Ok(self.document_count(kind) as u64)
    }

    async fn list_collections(&self) -> RepositoryResult<Vec<String>> {
        self.check_health("list_collections")?;

        let data = self.data.read();
        Ok(ResourceKind::ALL
            .into_iter()
            .filter(|kind| data.collections.get(kind).is_some_and(|docs| !docs.is_empty()))
            .map(|kind| kind.collection_name().to_string())
            .collect())
    }
}

#[async_trait]
impl SingletonRepository for LocalRepository {
    async fn find_singleton(&self, kind: ResourceKind) -> RepositoryResult<Option<Document>> {
        self.check_health("find_singleton")?;

        let data = self.data.read();
        Ok(data
            .collections
            .get(&kind)
            .and_then(|docs| docs.first())
            .map(|(id, doc)| with_id(*id, doc.clone())))
    }

    async fn upsert_singleton(
        &self,
        kind: ResourceKind,
        fields: Document,
    ) -> RepositoryResult<()> {
        self.check_health("upsert_singleton")?;

        let mut data = self.data.write();
        let docs = data.collections.entry(kind).or_default();

        match docs.first_mut() {
            Some((_, existing)) => {
                for (field, value) in fields {
                    if field != crate::db::document::ID_FIELD {
                        existing.insert(field, value);
                    }
                }
            }
            None => {
                let mut document = fields;
                document.remove(crate::db::document::ID_FIELD);
                docs.push((DocumentId::generate(), document));
            }
        }

        debug!("Upserted {} singleton", kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let repo = LocalRepository::new();
        let id = repo
            .insert_document(ResourceKind::Property, doc(json!({"title": "A"})))
            .await
            .unwrap();

        let found = repo
            .find_document_by_id(ResourceKind::Property, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get("_id"), Some(&json!(id.to_string())));
        assert_eq!(found.get("title"), Some(&json!("A")));

        // Same id, different collection
        let missing = repo
            .find_document_by_id(ResourceKind::Offer, id)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_insert_ignores_caller_id() {
        let repo = LocalRepository::new();
        let id = repo
            .insert_document(ResourceKind::Offer, doc(json!({"_id": "mine", "amount": 1})))
            .await
            .unwrap();

        let docs = repo
            .find_documents(ResourceKind::Offer, &Filter::new())
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get("_id"), Some(&json!(id.to_string())));
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let repo = LocalRepository::new();
        for title in ["first", "second", "third"] {
            repo.insert_document(ResourceKind::Property, doc(json!({"title": title})))
                .await
                .unwrap();
        }

        let titles: Vec<_> = repo
            .find_documents(ResourceKind::Property, &Filter::new())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_upsert_singleton_creates_then_merges() {
        let repo = LocalRepository::new();
        repo.upsert_singleton(ResourceKind::AdminSettings, doc(json!({"a": 1, "b": 2})))
            .await
            .unwrap();
        repo.upsert_singleton(ResourceKind::AdminSettings, doc(json!({"b": 3})))
            .await
            .unwrap();

        assert_eq!(repo.document_count(ResourceKind::AdminSettings), 1);
        let settings = repo
            .find_singleton(ResourceKind::AdminSettings)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settings.get("a"), Some(&json!(1)));
        assert_eq!(settings.get("b"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails_operations() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        assert!(!repo.health_check().await.unwrap());
        let err = repo
            .find_documents(ResourceKind::Property, &Filter::new())
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_list_collections_only_non_empty() {
        let repo = LocalRepository::new();
        assert!(repo.list_collections().await.unwrap().is_empty());

        repo.insert_document(ResourceKind::Offer, doc(json!({})))
            .await
            .unwrap();
        assert_eq!(repo.list_collections().await.unwrap(), vec!["offer"]);

        repo.clear();
        assert!(repo.list_collections().await.unwrap().is_empty());
    }
}
