//! # Trailmarks - trail stone catalog
//!
//! Read-oriented catalog of Wandersteine (physical trail markers).
//!
//! Trailmarks provides:
//! - A stone record model with list and detail projections
//! - Dual storage: embedded SQLite for demos, PostgreSQL for production
//! - Schema auto-creation and idempotent sample-data seeding
//! - Read queries (recent, all, by unique id) and a small HTTP API over them

pub mod config;
pub mod query;
pub mod seed;
pub mod server;
pub mod stone;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use config::{BackendKind, StoreConfig};
pub use query::QueryService;
pub use seed::{SeedMode, SeedOutcome, seed};
pub use stone::{NewStone, StoneDetail, StoneRecord, StoneSummary};
pub use storage::{StoneStore, StoreError, StoreHandle, initialize};

/// Result type alias for Trailmarks operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Trailmarks operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend could not be reached or opened. Fatal at startup.
    #[error("Failed to connect to {backend} database: {source}")]
    Connection {
        backend: BackendKind,
        #[source]
        source: StoreError,
    },

    /// Schema creation failed. Fatal at startup.
    #[error("Failed to migrate {backend} database: {source}")]
    Migration {
        backend: BackendKind,
        #[source]
        source: StoreError,
    },

    /// Sample data could not be inserted. Log and keep serving.
    #[error("Failed to seed database: {0}")]
    Seed(#[source] StoreError),

    /// A read failed
    #[error("Query failed: {0}")]
    Query(#[source] StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether startup must abort on this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Connection { .. } | Error::Migration { .. } | Error::Config(_))
    }
}
