//! Output formatting utilities for markdown and JSON.

use crate::db::schema::SchemaInfo;
use crate::types::Todo;
use chrono::{DateTime, Utc};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

/// Render epoch milliseconds as a UTC timestamp.
pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Format a single todo as a markdown checklist line.
pub fn format_todo_markdown(todo: &Todo) -> String {
    let mark = if todo.is_completed { "x" } else { " " };
    format!(
        "- [{}] {} (`#{}`, updated {})\n",
        mark,
        todo.text,
        todo.id,
        format_timestamp(todo.updated_at)
    )
}

/// Format a list of todos as markdown, open items first then completed ones.
pub fn format_todos_markdown(todos: &[Todo]) -> String {
    let mut md = format!("# Todos ({})\n", todos.len());

    if todos.is_empty() {
        md.push_str("\nNothing to do.\n");
        return md;
    }

    let (done, open): (Vec<&Todo>, Vec<&Todo>) = todos.iter().partition(|t| t.is_completed);

    for (title, group) in [("Open", open), ("Completed", done)] {
        if group.is_empty() {
            continue;
        }
        md.push_str(&format!("\n## {} ({})\n", title, group.len()));
        for todo in group {
            md.push_str(&format_todo_markdown(todo));
        }
    }

    md
}

/// Format the schema report as markdown.
pub fn format_schema_markdown(schema: &SchemaInfo) -> String {
    let mut md = format!("# Table `{}`\n\n", schema.table);
    md.push_str(&format!("- **journal_mode**: {}\n", schema.journal_mode));
    md.push_str(&format!("- **sqlite_version**: {}\n\n", schema.sqlite_version));
    md.push_str("| column | type | nullable | default | pk |\n|---|---|---|---|---|\n");
    for col in &schema.columns {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            col.name,
            col.data_type,
            col.nullable,
            col.default_value.as_deref().unwrap_or(""),
            col.primary_key
        ));
    }
    md
}
