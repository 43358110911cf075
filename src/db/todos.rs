//! Todo CRUD operations.

use super::{Database, now_ms};
use crate::error::{StoreError, StoreResult};
use crate::types::{Todo, TodoRow, ValidPatch, encode_bool, normalize_text};
use rusqlite::{Row, params};
use tracing::debug;

const SELECT_ALL: &str = "SELECT id, text, isCompleted, createdAt, updatedAt FROM todos
     ORDER BY createdAt DESC, id DESC";

const SELECT_BY_ID: &str =
    "SELECT id, text, isCompleted, createdAt, updatedAt FROM todos WHERE id = ?1";

const INSERT: &str =
    "INSERT INTO todos (text, isCompleted, createdAt, updatedAt) VALUES (?1, 0, ?2, ?2)";

// updatedAt never moves backwards or stays put, even when two writes share a millisecond.
const UPDATE: &str = "UPDATE todos SET
     text = COALESCE(?1, text),
     isCompleted = COALESCE(?2, isCompleted),
     updatedAt = MAX(?3, updatedAt + 1)
     WHERE id = ?4";

pub fn parse_todo_row(row: &Row) -> rusqlite::Result<TodoRow> {
    Ok(TodoRow {
        id: row.get("id")?,
        text: row.get("text")?,
        is_completed: row.get("isCompleted")?,
        created_at: row.get("createdAt")?,
        updated_at: row.get("updatedAt")?,
    })
}

impl Database {
    /// All todos, newest first. Ties on `createdAt` fall back to the higher id first.
    pub fn list_todos(&self) -> StoreResult<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(SELECT_ALL)?;
            let todos = stmt
                .query_map([], parse_todo_row)?
                .map(|row| row.map(Todo::from))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(todos)
        })
    }

    /// Get a single todo by id.
    pub fn get_todo(&self, id: i64) -> StoreResult<Option<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(SELECT_BY_ID)?;
            match stmt.query_row(params![id], parse_todo_row) {
                Ok(row) => Ok(Some(row.into())),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Insert a new, not yet completed todo and return it.
    pub fn add_todo(&self, text: &str) -> StoreResult<Todo> {
        let text = normalize_text(text)?;
        let timestamp = now_ms();

        self.with_conn(|conn| {
            let inserted = conn.execute(INSERT, params![text, timestamp])?;
            let id = conn.last_insert_rowid();
            if inserted == 0 || id <= 0 {
                return Err(StoreError::storage("failed to insert todo"));
            }

            debug!(id, "Inserted todo");
            Ok(Todo {
                id,
                text,
                is_completed: false,
                created_at: timestamp,
                updated_at: timestamp,
            })
        })
    }

    /// Apply a validated patch. Returns the number of rows changed (0 or 1).
    ///
    /// An empty patch touches nothing, including `updatedAt`.
    pub fn update_todo(&self, id: i64, patch: &ValidPatch) -> StoreResult<usize> {
        if patch.is_empty() {
            return Ok(0);
        }

        let is_completed = patch.is_completed.map(encode_bool);
        let timestamp = now_ms();

        self.with_conn(|conn| {
            let changed = conn.execute(UPDATE, params![patch.text, is_completed, timestamp, id])?;
            debug!(id, changed, "Updated todo");
            Ok(changed)
        })
    }

    /// Delete a todo. Unknown ids are not an error.
    pub fn delete_todo(&self, id: i64) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
            debug!(id, changed, "Deleted todo");
            Ok(changed)
        })
    }

    /// Delete every todo. Returns how many were removed.
    pub fn clear_todos(&self) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM todos", [])?;
            Ok(changed)
        })
    }
}
