//! SQLite storage implementation (embedded demo backend)

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::schema;
use super::{StoneStore, StoreError, StoreResult};
use crate::config::BackendKind;
use crate::stone::{NewStone, StoneRecord};

/// Timestamp layout in the `created_at`/`updated_at` text columns.
/// Fixed width, so `ORDER BY` on the text is chronological.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// SQLite-backed stone storage.
///
/// A `rusqlite::Connection` is `Send` but not `Sync`, so the connection sits
/// behind a mutex and each operation holds it for one statement or one
/// transaction. Clones share the connection.
///
/// The inherent methods block. The `StoneStore` impl moves each call onto
/// tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a database file (creates it and its directory if missing)
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        // Fail here rather than on first query if the file is not a database
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self { conn: Arc::new(Mutex::new(conn)) }
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Run a blocking operation on a clone of this store off the async workers
    async fn run_blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteStore) -> StoreResult<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store)).await?
    }

    /// Create the table, add columns an older table lacks, create indexes
    pub fn migrate(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(schema::SQLITE_CREATE_STONES_TABLE, [])?;

        let existing = existing_columns(&conn)?;
        for column in schema::STONE_COLUMNS {
            if !existing.contains(column.name) {
                tracing::info!(column = column.name, "Adding missing column");
                conn.execute(&schema::sqlite_add_column(column), [])?;
            }
        }

        // A column added to a populated table is NULL; give it a unique value
        // before the unique index goes on
        let backfilled = conn.execute(schema::BACKFILL_UNIQUE_ID, [])?;
        if backfilled > 0 {
            tracing::warn!(rows = backfilled, "Backfilled missing unique ids");
        }

        for stmt in schema::CREATE_INDEXES {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Count all stones
    pub fn count_stones(&self) -> StoreResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM wandersteine", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Insert a stone and return the stored row
    pub fn insert_stone(&self, stone: &NewStone) -> StoreResult<StoneRecord> {
        let conn = self.conn()?;
        insert_with(&conn, stone)
    }

    /// Insert several stones inside one transaction
    pub fn insert_stones(&self, stones: &[NewStone]) -> StoreResult<Vec<StoneRecord>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut records = Vec::with_capacity(stones.len());
        for stone in stones {
            // Dropping `tx` on the error path rolls back
            records.push(insert_with(&tx, stone)?);
        }
        tx.commit()?;
        Ok(records)
    }

    /// Stones, most recent first
    pub fn find_stones(&self, limit: Option<usize>) -> StoreResult<Vec<StoneRecord>> {
        let conn = self.conn()?;

        let stones = match limit {
            Some(limit) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM wandersteine ORDER BY created_at DESC, id DESC LIMIT ?1",
                    schema::STONE_FIELDS
                ))?;
                let limit = i64::try_from(limit).unwrap_or(i64::MAX);
                let rows = stmt
                    .query_map([limit], row_to_stone)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM wandersteine ORDER BY created_at DESC, id DESC",
                    schema::STONE_FIELDS
                ))?;
                let rows = stmt
                    .query_map([], row_to_stone)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };

        Ok(stones)
    }

    /// Get a stone by its unique id
    pub fn get_stone(&self, unique_id: &str) -> StoreResult<Option<StoneRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM wandersteine WHERE unique_id = ?1", schema::STONE_FIELDS),
            [unique_id],
            row_to_stone,
        )
        .optional()
        .map_err(Into::into)
    }
}

#[async_trait]
impl StoneStore for SqliteStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        self.run_blocking(|store| store.migrate()).await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.run_blocking(|store| store.count_stones()).await
    }

    async fn create(&self, stone: &NewStone) -> StoreResult<StoneRecord> {
        let stone = stone.clone();
        self.run_blocking(move |store| store.insert_stone(&stone)).await
    }

    async fn create_all(&self, stones: &[NewStone]) -> StoreResult<Vec<StoneRecord>> {
        let stones = stones.to_vec();
        self.run_blocking(move |store| store.insert_stones(&stones)).await
    }

    async fn ordered_find(&self, limit: Option<usize>) -> StoreResult<Vec<StoneRecord>> {
        self.run_blocking(move |store| store.find_stones(limit)).await
    }

    async fn find_by_unique_id(&self, unique_id: &str) -> StoreResult<Option<StoneRecord>> {
        let unique_id = unique_id.to_string();
        self.run_blocking(move |store| store.get_stone(&unique_id)).await
    }
}

/// Insert through any connection-like handle (plain or transaction)
fn insert_with(conn: &Connection, stone: &NewStone) -> StoreResult<StoneRecord> {
    let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
    conn.query_row(
        &format!(
            r#"
            INSERT INTO wandersteine (name, unique_id, preview_url, description, location, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {}
            "#,
            schema::STONE_FIELDS
        ),
        params![
            stone.name,
            stone.unique_id,
            stone.preview_url,
            stone.description,
            stone.location,
            now,
        ],
        row_to_stone,
    )
    .map_err(|e| map_insert_error(e, &stone.unique_id))
}

fn map_insert_error(err: rusqlite::Error, unique_id: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::DuplicateUniqueId(unique_id.to_string())
        }
        _ => err.into(),
    }
}

fn existing_columns(conn: &Connection) -> StoreResult<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('wandersteine')")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;
    Ok(names)
}

/// Helper to convert a row to a StoneRecord
fn row_to_stone(row: &rusqlite::Row) -> rusqlite::Result<StoneRecord> {
    Ok(StoneRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        unique_id: row.get(2)?,
        preview_url: row.get(3)?,
        description: row.get(4)?,
        location: row.get(5)?,
        created_at: parse_timestamp(row, 6)?,
        updated_at: parse_timestamp(row, 7)?,
    })
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrated_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.migrate().unwrap();
        store
    }

    fn stone(n: u32) -> NewStone {
        NewStone::new(format!("Stein {n}"), format!("WS-TEST-{n:03}"))
    }

    #[test]
    fn test_insert_assigns_id_and_timestamps() {
        let store = migrated_store();

        let record = store
            .insert_stone(&stone(1).with_description("Am Waldrand"))
            .unwrap();

        assert!(record.id > 0);
        assert_eq!(record.unique_id, "WS-TEST-001");
        assert_eq!(record.description.as_deref(), Some("Am Waldrand"));
        assert!(record.preview_url.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_duplicate_unique_id_rejected() {
        let store = migrated_store();
        store.insert_stone(&stone(1)).unwrap();

        let err = store.insert_stone(&stone(1)).unwrap_err();
        assert!(err.is_duplicate(), "unexpected error: {err}");
        assert_eq!(store.count_stones().unwrap(), 1);
    }

    #[test]
    fn test_batch_insert_rolls_back_on_duplicate() {
        let store = migrated_store();
        store.insert_stone(&stone(3)).unwrap();

        let err = store
            .insert_stones(&[stone(1), stone(2), stone(3), stone(4)])
            .unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(store.count_stones().unwrap(), 1);
    }

    #[test]
    fn test_find_orders_most_recent_first() {
        let store = migrated_store();
        for n in 1..=4 {
            store.insert_stone(&stone(n)).unwrap();
        }

        let all = store.find_stones(None).unwrap();
        let ids: Vec<_> = all.iter().map(|s| s.unique_id.as_str()).collect();
        assert_eq!(ids, ["WS-TEST-004", "WS-TEST-003", "WS-TEST-002", "WS-TEST-001"]);

        let top = store.find_stones(Some(2)).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].unique_id, "WS-TEST-004");
    }

    #[test]
    fn test_equal_timestamps_fall_back_to_id() {
        let store = migrated_store();
        for n in 1..=3 {
            store.insert_stone(&stone(n)).unwrap();
        }
        store
            .conn()
            .unwrap()
            .execute("UPDATE wandersteine SET created_at = '2024-01-15T10:30:00.000000Z'", [])
            .unwrap();

        let all = store.find_stones(None).unwrap();
        let ids: Vec<_> = all.iter().map(|s| s.id).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]), "ids not descending: {ids:?}");
    }

    #[test]
    fn test_get_stone_by_unique_id() {
        let store = migrated_store();
        store.insert_stone(&stone(5).with_location("Eifel")).unwrap();

        let found = store.get_stone("WS-TEST-005").unwrap().unwrap();
        assert_eq!(found.location.as_deref(), Some("Eifel"));
        assert!(store.get_stone("WS-TEST-404").unwrap().is_none());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let store = migrated_store();
        store.insert_stone(&stone(1)).unwrap();

        store.migrate().unwrap();
        store.migrate().unwrap();

        assert_eq!(store.count_stones().unwrap(), 1);
    }

    #[test]
    fn test_migrate_adds_missing_columns() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "CREATE TABLE wandersteine (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, unique_id TEXT NOT NULL)",
                [],
            )
            .unwrap();
        store
            .conn()
            .unwrap()
            .execute("INSERT INTO wandersteine (name, unique_id) VALUES ('Alt', 'WS-OLD-001')", [])
            .unwrap();

        store.migrate().unwrap();

        let columns = existing_columns(&store.conn().unwrap()).unwrap();
        for column in schema::STONE_COLUMNS {
            assert!(columns.contains(column.name), "missing {}", column.name);
        }
        let old = store.get_stone("WS-OLD-001").unwrap().unwrap();
        assert_eq!(old.created_at.timestamp(), 0);
    }

    #[test]
    fn test_migrate_backfills_unique_id_on_populated_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let conn = store.conn().unwrap();
            conn.execute(
                "CREATE TABLE wandersteine (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)",
                [],
            )
            .unwrap();
            conn.execute("INSERT INTO wandersteine (name) VALUES ('Erster')", []).unwrap();
            conn.execute("INSERT INTO wandersteine (name) VALUES ('Zweiter')", []).unwrap();
        }

        store.migrate().unwrap();

        let all = store.find_stones(None).unwrap();
        let mut ids: Vec<_> = all.iter().map(|s| s.unique_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, ["legacy-1", "legacy-2"]);

        // New rows still go through the unique index
        store.insert_stone(&stone(1)).unwrap();
        assert!(store.insert_stone(&stone(1)).unwrap_err().is_duplicate());
        assert_eq!(store.count_stones().unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_reads_through_trait() {
        let store = migrated_store();
        for n in 1..=3 {
            store.insert_stone(&stone(n)).unwrap();
        }

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { StoneStore::ordered_find(&store, Some(2)).await })
            })
            .collect();

        for task in tasks {
            let found = task.await.unwrap().unwrap();
            assert_eq!(found.len(), 2);
            assert_eq!(found[0].unique_id, "WS-TEST-003");
        }
        assert_eq!(StoneStore::count(&store).await.unwrap(), 3);
    }

    #[test]
    fn test_open_rejects_non_database_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![b'x'; 8192]).unwrap();

        assert!(SqliteStore::open(&path).is_err());
    }
}
