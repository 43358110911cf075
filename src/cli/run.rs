//! Command execution against a [`LocalStore`].

use super::Command;
use crate::error::{ErrorReport, StoreError, StoreResult};
use crate::format::{
    OutputFormat, format_schema_markdown, format_todo_markdown, format_todos_markdown,
};
use crate::store::LocalStore;
use crate::types::TodoPatch;
use serde::Serialize;
use serde_json::json;

/// Run one command and render its output.
pub async fn execute(
    store: &LocalStore,
    command: &Command,
    format: OutputFormat,
) -> StoreResult<String> {
    match command {
        Command::Init => {
            store.initialize().await?;
            Ok(match format {
                OutputFormat::Json => {
                    to_json(&json!({ "initialized": store.location().to_string() }))
                }
                OutputFormat::Markdown => format!("Initialized {}\n", store.location()),
            })
        }
        Command::List => {
            let todos = store.list_all().await?;
            Ok(match format {
                OutputFormat::Json => to_json(&todos),
                OutputFormat::Markdown => format_todos_markdown(&todos),
            })
        }
        Command::Add { text } => {
            let todo = store.add(&text.join(" ")).await?;
            Ok(match format {
                OutputFormat::Json => to_json(&todo),
                OutputFormat::Markdown => format_todo_markdown(&todo),
            })
        }
        Command::Update(args) => apply_patch(store, args.id, args.to_patch(), format).await,
        Command::Complete { id } => {
            apply_patch(store, *id, TodoPatch::new().with_completed(true), format).await
        }
        Command::Reopen { id } => {
            apply_patch(store, *id, TodoPatch::new().with_completed(false), format).await
        }
        Command::Delete { id } => {
            store.delete(*id).await?;
            Ok(match format {
                OutputFormat::Json => to_json(&json!({ "deleted": id })),
                OutputFormat::Markdown => format!("Deleted `#{}`\n", id),
            })
        }
        Command::Clear { yes } => {
            if !yes {
                return Err(StoreError::invalid_input(
                    "yes",
                    "clear removes every todo; pass --yes to confirm",
                ));
            }
            store.clear_all().await?;
            Ok(match format {
                OutputFormat::Json => to_json(&json!({ "cleared": true })),
                OutputFormat::Markdown => "Cleared all todos\n".to_string(),
            })
        }
        Command::Schema => {
            let db = store.database().await?;
            let schema = tokio::task::spawn_blocking(move || db.schema_info()).await??;
            Ok(match format {
                OutputFormat::Json => to_json(&schema),
                OutputFormat::Markdown => format_schema_markdown(&schema),
            })
        }
    }
}

async fn apply_patch(
    store: &LocalStore,
    id: i64,
    patch: TodoPatch,
    format: OutputFormat,
) -> StoreResult<String> {
    store.update(id, patch).await?;
    let current = store.get(id).await?;

    Ok(match (format, current) {
        (OutputFormat::Json, current) => to_json(&json!({ "id": id, "todo": current })),
        (OutputFormat::Markdown, Some(todo)) => format_todo_markdown(&todo),
        (OutputFormat::Markdown, None) => format!("No todo `#{}`; nothing changed\n", id),
    })
}

/// Render a failure the way the chosen format expects.
pub fn render_error(err: &StoreError, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&ErrorReport::from(err)),
        OutputFormat::Markdown => format!("error: {}\n", err),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        json!({ "code": "STORAGE_FAILURE", "message": e.to_string() }).to_string()
    });
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::update::UpdateArgs;
    use serde_json::Value;

    async fn run_json(store: &LocalStore, command: Command) -> Value {
        let out = execute(store, &command, OutputFormat::Json).await.unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[tokio::test]
    async fn add_then_list_as_json() {
        let store = LocalStore::in_memory();
        let added = run_json(
            &store,
            Command::Add {
                text: vec!["  buy".to_string(), "milk  ".to_string()],
            },
        )
        .await;
        assert_eq!(added["text"], "buy milk");
        assert_eq!(added["isCompleted"], false);

        let listed = run_json(&store, Command::List).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn complete_reports_updated_todo() {
        let store = LocalStore::in_memory();
        let todo = store.add("ship it").await.unwrap();

        let out = run_json(&store, Command::Complete { id: todo.id }).await;
        assert_eq!(out["todo"]["isCompleted"], true);
    }

    #[tokio::test]
    async fn update_unknown_id_succeeds() {
        let store = LocalStore::in_memory();
        let args = UpdateArgs {
            id: 99,
            text: Some("ghost".to_string()),
            completed: None,
        };
        let out = execute(&store, &Command::Update(args), OutputFormat::Markdown)
            .await
            .unwrap();
        assert!(out.contains("nothing changed"));
    }

    #[tokio::test]
    async fn clear_requires_confirmation() {
        let store = LocalStore::in_memory();
        store.add("keep me").await.unwrap();

        let err = execute(&store, &Command::Clear { yes: false }, OutputFormat::Json)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.list_all().await.unwrap().len(), 1);

        execute(&store, &Command::Clear { yes: true }, OutputFormat::Json)
            .await
            .unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn schema_lists_columns() {
        let store = LocalStore::in_memory();
        let out = run_json(&store, Command::Schema).await;
        assert_eq!(out["table"], "todos");
        assert_eq!(out["columns"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn json_error_report() {
        let err = StoreError::invalid_input("text", "todo text cannot be empty");
        let value: Value = serde_json::from_str(&render_error(&err, OutputFormat::Json)).unwrap();
        assert_eq!(value["code"], "INVALID_INPUT");
        assert_eq!(value["field"], "text");
    }
}
