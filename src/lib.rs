//! Todo Store Library
//!
//! Local, embedded persistence for todo records backed by SQLite.
//! [`store::LocalStore`] is the entry point.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;
pub mod types;

pub use error::{ErrorCode, StoreError, StoreResult};
pub use store::{LocalStore, StoreLocation, StoreState};
pub use types::{Todo, TodoPatch};
