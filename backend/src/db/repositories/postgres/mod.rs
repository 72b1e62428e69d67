//! Postgres repository implementation using Diesel.
//!
//! Every resource is stored as a JSONB document in a single `documents`
//! table keyed by UUID. The `kind` column holds the collection name and a
//! `seq` column preserves insertion order for listings.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Server-side `statement_timeout` on every connection and a deadline on
//!   every call; both surface as a retryable `TimeoutError`
//! - Automatic migration execution
//!
//! Configuration comes from [`PostgresConfig`](crate::db::PostgresConfig).

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_query;
use diesel::sql_types::{Jsonb, Text, Uuid as SqlUuid};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::debug;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::config::PostgresConfig;
use crate::db::document::{with_id, Document, DocumentId, Filter, ResourceKind, ID_FIELD};
use crate::db::repository::{
    with_deadline, DocumentRepository, ErrorContext, RepositoryError, RepositoryResult,
    SingletonRepository,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Applies `statement_timeout` to each connection the pool opens.
#[derive(Debug, Clone, Copy)]
struct StatementTimeout {
    millis: u64,
}

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        sql_query(format!("SET statement_timeout = {}", self.millis))
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed document repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// This blocks while the pool is filled; call it from
    /// `spawn_blocking` inside an async context.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(config.connection_url());

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .connection_customizer(Box::new(StatementTimeout {
                millis: config.statement_timeout_ms,
            }))
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Retries up to `max_retries` times with exponential backoff when the
    /// error is retryable (pool timeouts, dropped connections, serialization
    /// failures). The whole call, retries included, is bounded by
    /// `operation_timeout_ms`.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();
        let deadline = Duration::from_millis(self.config.operation_timeout_ms);

        let handle = task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "Retrying database operation (attempt {}/{})",
                        attempt + 1,
                        max_retries + 1
                    );
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        });

        let result = with_deadline(deadline, "with_conn", async move {
            handle.await.map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Task join error: {}", e),
                    ErrorContext::new("spawn_blocking"),
                )
            })?
        })
        .await;

        if matches!(result, Err(RepositoryError::TimeoutError { .. })) {
            log::warn!("Database operation exceeded {:?}", deadline);
        }
        result
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Turn a stored row back into a document carrying its `_id`.
fn row_to_document(kind: ResourceKind, row: DocumentRow) -> RepositoryResult<Document> {
    match row.body {
        Value::Object(body) => Ok(with_id(DocumentId::from(row.id), body)),
        other => Err(RepositoryError::internal_with_context(
            format!("Stored body is not an object: {}", other),
            ErrorContext::new("row_to_document")
                .with_entity(kind.collection_name())
                .with_entity_id(row.id),
        )),
    }
}

fn strip_id(mut document: Document) -> Value {
    document.remove(ID_FIELD);
    Value::Object(document)
}

#[async_trait]
impl DocumentRepository for PostgresRepository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn insert_document(
        &self,
        kind: ResourceKind,
        document: Document,
    ) -> RepositoryResult<DocumentId> {
        let id = DocumentId::generate();
        let row = NewDocumentRow {
            id: *id.as_uuid(),
            kind: kind.collection_name().to_string(),
            body: strip_id(document),
        };

        self.with_conn(move |conn| {
            diesel::insert_into(documents::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_operation("insert_document"))
        })
        .await?;

        debug!("Inserted {} document {}", kind, id);
        Ok(id)
    }

    async fn find_documents(
        &self,
        kind: ResourceKind,
        filter: &Filter,
    ) -> RepositoryResult<Vec<Document>> {
        let condition = filter.to_json();

        let rows = self
            .with_conn(move |conn| {
                // `@>` is JSONB containment, which `Filter::matches` mirrors in memory
                sql_query(
                    "SELECT id, body FROM documents \
                     WHERE kind = $1 AND body @> $2 \
                     ORDER BY seq",
                )
                .bind::<Text, _>(kind.collection_name())
                .bind::<Jsonb, _>(condition)
                .load::<DocumentRow>(conn)
                .map_err(|e| map_diesel_error(e).with_operation("find_documents"))
            })
            .await?;

        rows.into_iter()
            .map(|row| row_to_document(kind, row))
            .collect()
    }

    async fn find_document_by_id(
        &self,
        kind: ResourceKind,
        id: DocumentId,
    ) -> RepositoryResult<Option<Document>> {
        let uuid = *id.as_uuid();

        let row = self
            .with_conn(move |conn| {
                documents::table
                    .filter(documents::kind.eq(kind.collection_name()))
                    .filter(documents::id.eq(uuid))
                    .select(DocumentRow::as_select())
                    .first::<DocumentRow>(conn)
                    .optional()
                    .map_err(|e| map_diesel_error(e).with_operation("find_document_by_id"))
            })
            .await?;

        row.map(|row| row_to_document(kind, row)).transpose()
    }

    async fn count_documents(&self, kind: ResourceKind) -> RepositoryResult<u64> {
        let count = self
            .with_conn(move |conn| {
                documents::table
                    .filter(documents::kind.eq(kind.collection_name()))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(|e| map_diesel_error(e).with_operation("count_documents"))
            })
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn list_collections(&self) -> RepositoryResult<Vec<String>> {
        let kinds = self
            .with_conn(|conn| {
                documents::table
                    .select(documents::kind)
                    .distinct()
                    .load::<String>(conn)
                    .map_err(|e| map_diesel_error(e).with_operation("list_collections"))
            })
            .await?;

        Ok(ResourceKind::ALL
            .into_iter()
            .map(|kind| kind.collection_name())
            .filter(|name| kinds.iter().any(|k| k == name))
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl SingletonRepository for PostgresRepository {
    async fn find_singleton(&self, kind: ResourceKind) -> RepositoryResult<Option<Document>> {
        let row = self
            .with_conn(move |conn| {
                documents::table
                    .filter(documents::kind.eq(kind.collection_name()))
                    .order(documents::seq.asc())
                    .select(DocumentRow::as_select())
                    .first::<DocumentRow>(conn)
                    .optional()
                    .map_err(|e| map_diesel_error(e).with_operation("find_singleton"))
            })
            .await?;

        row.map(|row| row_to_document(kind, row)).transpose()
    }

    async fn upsert_singleton(
        &self,
        kind: ResourceKind,
        fields: Document,
    ) -> RepositoryResult<()> {
        let patch = strip_id(fields);

        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                // Serialize concurrent first writers so only one document is created
                sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
                    .bind::<Text, _>(kind.collection_name())
                    .execute(tx)?;

                let existing = documents::table
                    .filter(documents::kind.eq(kind.collection_name()))
                    .order(documents::seq.asc())
                    .select(documents::id)
                    .first::<uuid::Uuid>(tx)
                    .optional()?;

                match existing {
                    Some(id) => {
                        sql_query("UPDATE documents SET body = body || $1 WHERE id = $2")
                            .bind::<Jsonb, _>(patch.clone())
                            .bind::<SqlUuid, _>(id)
                            .execute(tx)?;
                    }
                    None => {
                        diesel::insert_into(documents::table)
                            .values(&NewDocumentRow {
                                id: *DocumentId::generate().as_uuid(),
                                kind: kind.collection_name().to_string(),
                                body: patch.clone(),
                            })
                            .execute(tx)?;
                    }
                }

                Ok(())
            })
            .map_err(|e| e.with_operation("upsert_singleton"))
        })
        .await?;

        debug!("Upserted {} singleton", kind);
        Ok(())
    }
}
