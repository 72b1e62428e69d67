//! Document storage for properties, offers and site settings.
//!
//! This module provides abstractions for store operations via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP handlers, resource services)   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Gateway (services.rs) - typed create/list/get/upsert   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼──────────────────┐   ┌─────────▼───────────────┐
//! │ Postgres Repository  │   │ Local Repository        │
//! │ (JSONB documents)    │   │ (in-memory)             │
//! └──────────────────────┘   └─────────────────────────┘
//! ```
//!
//! There is no process-wide store. Build one with [`RepositoryFactory`] and
//! pass it where it is needed.
//!
//! ```
//! use property_api::db::{services, RepositoryFactory};
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let repo = RepositoryFactory::create_local();
//! assert!(services::health_check(repo.as_ref()).await.unwrap());
//! # });
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod document;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

pub use config::PostgresConfig;
pub use document::{Document, DocumentId, Filter, Resource, ResourceKind, Stored, ID_FIELD};
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PoolStats, PostgresRepository};
pub use repository::{
    DocumentRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    SingletonRepository,
};
