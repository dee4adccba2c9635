//! Database schema definitions
//!
//! Both backends share one logical table. Column types differ: SQLite keeps
//! timestamps as fixed-width RFC3339 text (so lexical order is chronological),
//! PostgreSQL uses `TIMESTAMPTZ`.

pub const STONES_TABLE: &str = "wandersteine";

/// SQL to create the stones table (SQLite)
pub const SQLITE_CREATE_STONES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wandersteine (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    unique_id TEXT NOT NULL,
    preview_url TEXT,
    description TEXT,
    location TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the stones table (PostgreSQL)
pub const POSTGRES_CREATE_STONES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wandersteine (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    unique_id TEXT NOT NULL,
    preview_url TEXT,
    description TEXT,
    location TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Gives rows that predate the `unique_id` column a distinct value.
/// Valid for both backends; touches nothing once every row has one.
pub const BACKFILL_UNIQUE_ID: &str =
    "UPDATE wandersteine SET unique_id = 'legacy-' || id WHERE unique_id IS NULL";

/// Indexes, valid for both backends
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_wandersteine_unique_id ON wandersteine(unique_id)",
    "CREATE INDEX IF NOT EXISTS idx_wandersteine_created_at ON wandersteine(created_at)",
];

/// A column that may be missing from a table created by an older build.
///
/// The definitions are what `ALTER TABLE ... ADD COLUMN` uses, so required
/// columns carry a default that existing rows can take.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sqlite: &'static str,
    pub postgres: &'static str,
}

pub const STONE_COLUMNS: &[ColumnDef] = &[
    ColumnDef { name: "name", sqlite: "TEXT NOT NULL DEFAULT ''", postgres: "TEXT NOT NULL DEFAULT ''" },
    ColumnDef { name: "unique_id", sqlite: "TEXT", postgres: "TEXT" },
    ColumnDef { name: "preview_url", sqlite: "TEXT", postgres: "TEXT" },
    ColumnDef { name: "description", sqlite: "TEXT", postgres: "TEXT" },
    ColumnDef { name: "location", sqlite: "TEXT", postgres: "TEXT" },
    ColumnDef {
        name: "created_at",
        sqlite: "TEXT NOT NULL DEFAULT '1970-01-01T00:00:00.000000Z'",
        postgres: "TIMESTAMPTZ NOT NULL DEFAULT now()",
    },
    ColumnDef {
        name: "updated_at",
        sqlite: "TEXT NOT NULL DEFAULT '1970-01-01T00:00:00.000000Z'",
        postgres: "TIMESTAMPTZ NOT NULL DEFAULT now()",
    },
];

/// Column list shared by every SELECT and RETURNING clause
pub const STONE_FIELDS: &str =
    "id, name, unique_id, preview_url, description, location, created_at, updated_at";

pub fn sqlite_add_column(column: &ColumnDef) -> String {
    format!("ALTER TABLE {STONES_TABLE} ADD COLUMN {} {}", column.name, column.sqlite)
}

pub fn postgres_add_column(column: &ColumnDef) -> String {
    format!(
        "ALTER TABLE {STONES_TABLE} ADD COLUMN IF NOT EXISTS {} {}",
        column.name, column.postgres
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_column_statements() {
        let created = STONE_COLUMNS.iter().find(|c| c.name == "created_at").unwrap();
        assert_eq!(
            postgres_add_column(created),
            "ALTER TABLE wandersteine ADD COLUMN IF NOT EXISTS created_at TIMESTAMPTZ NOT NULL DEFAULT now()"
        );
        assert!(sqlite_add_column(created).starts_with("ALTER TABLE wandersteine ADD COLUMN created_at TEXT"));
    }

    #[test]
    fn test_every_selected_field_is_migratable() {
        for field in STONE_FIELDS.split(", ").filter(|f| *f != "id") {
            assert!(STONE_COLUMNS.iter().any(|c| c.name == field), "missing column def for {field}");
        }
    }
}
