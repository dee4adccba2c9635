//! Storage Layer - one trait, two backends
//!
//! System of record is a single `wandersteine` table, held either in an
//! embedded SQLite file (demo) or a PostgreSQL server (production).
//! `initialize` applies the backend selection policy, opens the backend and
//! ensures the schema; everything after that goes through the returned
//! `StoreHandle`.

pub mod postgres;
pub mod schema;
pub mod sqlite;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendKind, StoreConfig};
use crate::stone::{NewStone, StoneRecord};
use crate::{Error, Result};

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Result type for backend operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Driver-level failures, wrapped by the crate-level `Error` taxonomy
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("postgres: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("a stone with unique id '{0}' already exists")]
    DuplicateUniqueId(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("blocking store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// True when the failure is a `unique_id` constraint violation
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateUniqueId(_))
    }
}

/// Capability interface over a stones backend.
///
/// Implementations must be safe to share between request handlers; any
/// pooling or locking is their business.
#[async_trait]
pub trait StoneStore: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> BackendKind;

    /// Create the table if absent, add missing columns, create indexes.
    /// A no-op once the schema matches.
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Number of stored stones
    async fn count(&self) -> StoreResult<u64>;

    /// Insert one stone, assigning id and timestamps
    async fn create(&self, stone: &NewStone) -> StoreResult<StoneRecord>;

    /// Insert all stones in one transaction; nothing is kept on failure
    async fn create_all(&self, stones: &[NewStone]) -> StoreResult<Vec<StoneRecord>>;

    /// Stones ordered most recent first (`created_at DESC, id DESC`),
    /// optionally capped at `limit`
    async fn ordered_find(&self, limit: Option<usize>) -> StoreResult<Vec<StoneRecord>>;

    /// Look up a stone by its external code
    async fn find_by_unique_id(&self, unique_id: &str) -> StoreResult<Option<StoneRecord>>;

    /// Release connections on shutdown
    async fn close(&self) {}
}

/// Shared handle to the store opened at startup.
///
/// Cheap to clone; every clone reads through the same connection or pool.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn StoneStore>,
}

impl StoreHandle {
    pub fn new(store: impl StoneStore + 'static) -> Self {
        Self { store: Arc::new(store) }
    }

    pub fn kind(&self) -> BackendKind {
        self.store.kind()
    }

    pub fn store(&self) -> &dyn StoneStore {
        self.store.as_ref()
    }

    /// Release the backend's connections. Call once, at shutdown.
    pub async fn close(&self) {
        self.store.close().await;
        tracing::debug!(backend = %self.kind(), "Store closed");
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("backend", &self.kind())
            .finish_non_exhaustive()
    }
}

/// Select, open and migrate the backend described by `config`.
///
/// Call once at startup. A `Connection` or `Migration` error means the
/// process must not go on to seed or serve.
pub async fn initialize(config: &StoreConfig) -> Result<StoreHandle> {
    let backend = config.backend();
    tracing::info!(%backend, target = %config.describe_target(), "Opening store");

    let handle = match backend {
        BackendKind::Sqlite => {
            let store = SqliteStore::open(&config.sqlite_path)
                .map_err(|source| Error::Connection { backend, source })?;
            StoreHandle::new(store)
        }
        BackendKind::Postgres => {
            let options = config.pg_connect_options()?;
            let store = PostgresStore::connect(options)
                .await
                .map_err(|source| Error::Connection { backend, source })?;
            StoreHandle::new(store)
        }
    };

    handle
        .store()
        .ensure_schema()
        .await
        .map_err(|source| Error::Migration { backend, source })?;

    tracing::info!(%backend, "Schema ready");
    Ok(handle)
}
