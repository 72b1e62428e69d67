//! Typed persistence gateway.
//!
//! These functions work with any implementation of the repository traits and
//! translate between typed models and stored documents. They are where input
//! validation happens before a write, and where identifier strings coming
//! from callers are parsed.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers / resource services            │
//! └──────────────────────┬───────────────────────┘
//!                        │  typed models
//! ┌──────────────────────▼───────────────────────┐
//! │  db::services (this module)                   │
//! │  - validate before insert                     │
//! │  - parse identifiers                          │
//! │  - document <-> model conversion              │
//! └──────────────────────┬───────────────────────┘
//!                        │  JSON documents
//! ┌──────────────────────▼───────────────────────┐
//! │  DocumentRepository + SingletonRepository     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use property_api::db::{services, LocalRepository};
//! use property_api::models::Property;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let repo = LocalRepository::new();
//! let listings = services::list::<Property, _>(&repo, &Default::default()).await.unwrap();
//! assert!(listings.is_empty());
//! # });
//! ```

use log::debug;
use serde::Serialize;
use validator::Validate;

use super::document::{from_document, to_document, Document, DocumentId, Filter, Resource, Stored};
use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};

// ==================== Health & Connection ====================

/// Check if the store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Documents ====================

/// Validate `record` and store it as a new document.
///
/// Nothing is written when validation fails.
///
/// # Returns
/// The new identifier as a string.
pub async fn create<M, R>(repo: &R, record: &M) -> RepositoryResult<String>
where
    M: Resource + Validate,
    R: FullRepository + ?Sized,
{
    record.validate()?;

    let document = to_document(record)?;
    let id = repo.insert_document(M::KIND, document).await?;

    debug!("Created {} {}", M::KIND, id);
    Ok(id.to_string())
}

/// All records of type `M` matching `filter`, in insertion order.
pub async fn list<M, R>(repo: &R, filter: &Filter) -> RepositoryResult<Vec<Stored<M>>>
where
    M: Resource,
    R: FullRepository + ?Sized,
{
    repo.find_documents(M::KIND, filter)
        .await?
        .into_iter()
        .map(from_document::<M>)
        .collect()
}

/// The record of type `M` stored under `id`.
///
/// # Errors
/// - [`RepositoryError::InvalidIdentifier`] if `id` is malformed
/// - [`RepositoryError::NotFound`] if nothing is stored under `id`
pub async fn get_by_id<M, R>(repo: &R, id: &str) -> RepositoryResult<Stored<M>>
where
    M: Resource,
    R: FullRepository + ?Sized,
{
    let document_id = DocumentId::parse(id)?;

    match repo.find_document_by_id(M::KIND, document_id).await? {
        Some(document) => from_document(document),
        None => Err(RepositoryError::not_found_with_context(
            format!("{} not found", display_name(M::KIND.collection_name())),
            ErrorContext::new("get_by_id")
                .with_entity(M::KIND.collection_name())
                .with_entity_id(document_id),
        )),
    }
}

/// Whether a record of type `M` exists under an already parsed identifier.
pub async fn exists<M, R>(repo: &R, id: DocumentId) -> RepositoryResult<bool>
where
    M: Resource,
    R: FullRepository + ?Sized,
{
    Ok(repo.find_document_by_id(M::KIND, id).await?.is_some())
}

/// Number of stored records of type `M`.
pub async fn count<M, R>(repo: &R) -> RepositoryResult<u64>
where
    M: Resource,
    R: FullRepository + ?Sized,
{
    repo.count_documents(M::KIND).await
}

/// Names of the collections that currently hold documents.
pub async fn list_collections<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<String>> {
    repo.list_collections().await
}

// ==================== Singletons ====================

/// The single record of type `M`, if one has been stored.
pub async fn find_singleton<M, R>(repo: &R) -> RepositoryResult<Option<Stored<M>>>
where
    M: Resource,
    R: FullRepository + ?Sized,
{
    repo.find_singleton(M::KIND)
        .await?
        .map(from_document::<M>)
        .transpose()
}

/// Merge the fields of `patch` into the single record of type `M`.
///
/// `patch` can be any serializable value; its fields are merged as-is into
/// the stored document, which is created when absent.
pub async fn upsert_singleton<M, P, R>(repo: &R, patch: &P) -> RepositoryResult<()>
where
    M: Resource,
    P: Serialize + ?Sized,
    R: FullRepository + ?Sized,
{
    let fields: Document = to_document(patch)?;
    repo.upsert_singleton(M::KIND, fields).await
}

fn display_name(collection: &str) -> String {
    match collection {
        "adminsettings" => "Settings".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
