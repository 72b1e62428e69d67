//! Repository traits for abstracting document storage.
//!
//! These traits define the interface for all store operations, allowing
//! different implementations (PostgreSQL, in-memory) to be swapped via
//! dependency injection.
//!
//! # Thread Safety
//! Implementations must be `Send + Sync` so a single instance can be shared
//! by every request handler.
//!
//! # Identifiers
//! Every document returned by a repository carries its identifier under
//! `_id` as a string.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::document::{Document, DocumentId, Filter, ResourceKind};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Core document operations, parameterized by collection.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Short name of the backend, for logs and diagnostics.
    fn backend_name(&self) -> &'static str;

    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store answered
    /// - `Ok(false)` if the store is known to be unhealthy
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a document and return its newly assigned identifier.
    ///
    /// Any `_id` already present in `document` is ignored.
    async fn insert_document(
        &self,
        kind: ResourceKind,
        document: Document,
    ) -> RepositoryResult<DocumentId>;

    /// All documents of `kind` matching `filter`, in insertion order.
    async fn find_documents(
        &self,
        kind: ResourceKind,
        filter: &Filter,
    ) -> RepositoryResult<Vec<Document>>;

    /// The document of `kind` with the given identifier, if any.
    async fn find_document_by_id(
        &self,
        kind: ResourceKind,
        id: DocumentId,
    ) -> RepositoryResult<Option<Document>>;

    /// Number of documents stored under `kind`.
    async fn count_documents(&self, kind: ResourceKind) -> RepositoryResult<u64>;

    /// Names of the collections that currently hold at least one document.
    async fn list_collections(&self) -> RepositoryResult<Vec<String>>;
}

/// Operations on collections that hold at most one logical document.
#[async_trait]
pub trait SingletonRepository: Send + Sync {
    /// The first document of `kind`, if one exists.
    async fn find_singleton(&self, kind: ResourceKind) -> RepositoryResult<Option<Document>>;

    /// Merge `fields` into the document of `kind`, creating it if absent.
    ///
    /// Fields not present in `fields` keep their stored values.
    async fn upsert_singleton(&self, kind: ResourceKind, fields: Document)
        -> RepositoryResult<()>;
}

/// Everything the application needs from a store.
pub trait FullRepository: DocumentRepository + SingletonRepository {}

impl<T> FullRepository for T where T: DocumentRepository + SingletonRepository {}

/// Run `operation` to completion or fail with a retryable `TimeoutError`
/// once `deadline` has passed.
///
/// Dropping a future built on `spawn_blocking` does not stop the blocking
/// work; backends pair this with a server-side timeout.
pub async fn with_deadline<T, F>(deadline: Duration, operation: &str, fut: F) -> RepositoryResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::timeout_with_context(
            format!("Store did not answer within {} ms", deadline.as_millis()),
            ErrorContext::new(operation),
        )),
    }
}
