//! Async local store with lazy, shared connection setup.
//!
//! A [`LocalStore`] owns at most one [`Database`]. The first operation to run
//! (via [`LocalStore::initialize`] or any CRUD call) opens the connection and
//! applies the schema. Callers that arrive while that setup is still running
//! wait on the same in-flight attempt instead of starting their own.

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::types::{Todo, TodoPatch, normalize_text};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Default database file name.
pub const DATABASE_NAME: &str = "doitnow.db";

/// Default time SQLite waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    InMemory,
}

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreLocation::File(path) => write!(f, "{}", path.display()),
            StoreLocation::InMemory => write!(f, ":memory:"),
        }
    }
}

/// Connection lifecycle as observed from outside.
///
/// `Ready` and `Failed` are final: the outcome of the one setup attempt is
/// kept for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Outcome of the setup task; `None` while it is still running.
type SetupStatus = Option<StoreResult<Database>>;

/// Local todo store. Construct once and share (e.g. behind an `Arc`).
///
/// Must be used from within a Tokio runtime: setup runs as a spawned task.
pub struct LocalStore {
    location: StoreLocation,
    busy_timeout: Duration,
    setup: OnceLock<watch::Receiver<SetupStatus>>,
    setups_started: AtomicUsize,
}

impl LocalStore {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            setup: OnceLock::new(),
            setups_started: AtomicUsize::new(0),
        }
    }

    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::InMemory)
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn state(&self) -> StoreState {
        let Some(status) = self.setup.get() else {
            return StoreState::Uninitialized;
        };
        match &*status.borrow() {
            None => StoreState::Initializing,
            Some(Ok(_)) => StoreState::Ready,
            Some(Err(_)) => StoreState::Failed,
        }
    }

    /// Number of times connection setup has been started on this store (0 or 1).
    pub fn setup_count(&self) -> usize {
        self.setups_started.load(Ordering::SeqCst)
    }

    /// Receiver for the setup task, spawning the task on first call.
    ///
    /// The task is detached from any caller, so a caller that gives up
    /// waiting does not abort or restart setup.
    fn setup_status(&self) -> watch::Receiver<SetupStatus> {
        self.setup
            .get_or_init(|| {
                self.setups_started.fetch_add(1, Ordering::SeqCst);
                let (tx, rx) = watch::channel(None);
                let location = self.location.clone();
                let busy_timeout = self.busy_timeout;

                tokio::spawn(async move {
                    let target = location.clone();
                    let opened = tokio::task::spawn_blocking(move || match target {
                        StoreLocation::File(path) => Database::open(path, busy_timeout),
                        StoreLocation::InMemory => Database::open_in_memory(),
                    })
                    .await
                    .map_err(StoreError::from)
                    .and_then(|result| result);

                    match &opened {
                        Ok(_) => info!(location = %location, "Todo database ready"),
                        Err(e) => {
                            warn!(location = %location, error = %e, "Todo database setup failed")
                        }
                    }
                    tx.send_replace(Some(opened));
                });

                rx
            })
            .clone()
    }

    /// Shared database handle, opening it on first use.
    ///
    /// Every caller awaits the same setup task. A failed setup is remembered
    /// and returned to every later caller.
    pub async fn database(&self) -> StoreResult<Database> {
        let mut rx = self.setup_status();
        let status = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| StoreError::storage("database setup task ended without a result"))?;

        match &*status {
            Some(result) => result.clone(),
            None => Err(StoreError::storage("database setup has not finished")),
        }
    }

    /// Run blocking database work on the blocking pool.
    async fn run<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.database().await?;
        tokio::task::spawn_blocking(move || f(&db)).await?
    }

    /// Open the connection and apply the schema if that has not happened yet.
    pub async fn initialize(&self) -> StoreResult<()> {
        self.database().await.map(|_| ())
    }

    /// All todos, newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<Todo>> {
        self.run(|db| db.list_todos()).await
    }

    /// Look up a single todo.
    pub async fn get(&self, id: i64) -> StoreResult<Option<Todo>> {
        self.run(move |db| db.get_todo(id)).await
    }

    /// Create a todo from trimmed, non-empty text.
    pub async fn add(&self, text: &str) -> StoreResult<Todo> {
        let text = normalize_text(text)?;
        let todo = self.run(move |db| db.add_todo(&text)).await?;
        debug!(id = todo.id, "Added todo");
        Ok(todo)
    }

    /// Apply a partial update. Unknown ids and empty patches complete without error.
    pub async fn update(&self, id: i64, patch: TodoPatch) -> StoreResult<()> {
        let patch = patch.validate()?;
        if patch.is_empty() {
            debug!(id, "Empty patch, nothing to update");
            return self.initialize().await;
        }

        let changed = self.run(move |db| db.update_todo(id, &patch)).await?;
        if changed == 0 {
            debug!(id, "Update matched no todo");
        }
        Ok(())
    }

    /// Remove a todo. Unknown ids complete without error.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let changed = self.run(move |db| db.delete_todo(id)).await?;
        if changed == 0 {
            debug!(id, "Delete matched no todo");
        }
        Ok(())
    }

    /// Remove every todo.
    pub async fn clear_all(&self) -> StoreResult<()> {
        let removed = self.run(|db| db.clear_todos()).await?;
        info!(removed, "Cleared all todos");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_uninitialized() {
        let store = LocalStore::in_memory();
        assert_eq!(store.state(), StoreState::Uninitialized);
        assert_eq!(store.setup_count(), 0);
    }

    #[tokio::test]
    async fn first_operation_opens_database() {
        let store = LocalStore::in_memory();
        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.setup_count(), 1);
    }

    #[tokio::test]
    async fn abandoned_first_caller_leaves_setup_running() {
        let store = LocalStore::in_memory();

        tokio::select! {
            biased;
            _ = store.initialize() => panic!("setup finished before the task could run"),
            _ = std::future::ready(()) => {}
        }
        assert_eq!(store.state(), StoreState::Initializing);
        assert_eq!(store.setup_count(), 1);

        store.initialize().await.unwrap();
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.setup_count(), 1);
    }

    #[tokio::test]
    async fn invalid_text_does_not_open_database() {
        let store = LocalStore::in_memory();
        let err = store.add("  ").await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.state(), StoreState::Uninitialized);
    }

    #[test]
    fn location_display() {
        assert_eq!(StoreLocation::InMemory.to_string(), ":memory:");
        assert_eq!(
            StoreLocation::File(PathBuf::from("data/doitnow.db")).to_string(),
            "data/doitnow.db"
        );
    }
}
