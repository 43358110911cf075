//! Core types for the todo store.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// A todo record as seen by consumers of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub is_completed: bool,
    /// Epoch milliseconds, fixed at creation.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed on every mutation.
    pub updated_at: i64,
}

/// A todo record exactly as persisted in the `todos` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: i64,
    pub text: String,
    pub is_completed: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            is_completed: decode_bool(row.is_completed),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Todo> for TodoRow {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            text: todo.text.clone(),
            is_completed: encode_bool(todo.is_completed),
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// Partial update for a todo. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.is_completed.is_none()
    }

    /// Check the patch and normalize its text, before anything touches the database.
    pub fn validate(self) -> StoreResult<ValidPatch> {
        let text = self.text.as_deref().map(normalize_text).transpose()?;
        Ok(ValidPatch {
            text,
            is_completed: self.is_completed,
        })
    }
}

/// A patch whose text (if any) is already trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPatch {
    pub text: Option<String>,
    pub is_completed: Option<bool>,
}

impl ValidPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.is_completed.is_none()
    }
}

/// Trim surrounding whitespace and reject text that ends up empty.
pub fn normalize_text(text: &str) -> StoreResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StoreError::invalid_input("text", "todo text cannot be empty"));
    }
    Ok(trimmed.to_string())
}

pub fn encode_bool(value: bool) -> i64 {
    if value { 1 } else { 0 }
}

/// Only 1 is true. Any other stored integer reads as false.
pub fn decode_bool(value: i64) -> bool {
    value == 1
}
