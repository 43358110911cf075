//! Schema setup and introspection for the todo database.

use super::Database;
use crate::error::StoreResult;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Name of the single table owned by the store.
pub const TODO_TABLE: &str = "todos";

/// DDL for the todo table. Safe to run against a database that already has it.
pub const CREATE_TODOS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    isCompleted INTEGER NOT NULL DEFAULT 0,
    createdAt INTEGER NOT NULL,
    updatedAt INTEGER NOT NULL
);
";

/// Switch the connection to write-ahead logging and return the resulting mode.
///
/// In-memory databases cannot use WAL and report `memory` instead.
pub fn enable_wal(conn: &Connection) -> rusqlite::Result<String> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
}

/// Create the todo table if it does not exist yet.
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TODOS_TABLE)
}

/// Information about a table column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Snapshot of the on-disk layout, as reported by SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub journal_mode: String,
    pub sqlite_version: String,
}

impl Database {
    /// Describe the todo table and connection settings.
    pub fn schema_info(&self) -> StoreResult<SchemaInfo> {
        self.with_conn(|conn| {
            let sqlite_version: String =
                conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
            let journal_mode: String =
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
            let columns = table_columns(conn, TODO_TABLE)?;

            Ok(SchemaInfo {
                table: TODO_TABLE.to_string(),
                columns,
                journal_mode,
                sqlite_version,
            })
        })
    }

    /// List user tables, skipping SQLite internals such as `sqlite_sequence`.
    pub fn table_names(&self) -> StoreResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table'
                 AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )?;

            let names: Vec<String> = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(names)
        })
    }
}

/// Get column information for a table.
fn table_columns(conn: &Connection, table_name: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table_name))?;

    let columns: Vec<ColumnInfo> = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                data_type: row.get::<_, String>(2)?.to_uppercase(),
                nullable: row.get::<_, i32>(3)? == 0,
                default_value: row.get(4)?,
                primary_key: row.get::<_, i32>(5)? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns)
}
