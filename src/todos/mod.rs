//! Todo record store.
//!
//! This module provides:
//! - The [`Todo`] record and the payload types used to create and update it
//! - The [`TodoStore`] trait every backend implements
//! - A flat JSON file backend, an in-memory backend and a `SQLite` backend
//!
//! # Example
//!
//! ```no_run
//! use todo_store::todos::{JsonFileStore, NewTodo, TodoPatch, TodoStore};
//!
//! # async fn demo() -> todo_store::Result<()> {
//! let store = JsonFileStore::open("/tmp/todos.json", true).await?;
//!
//! let todo = store.create(NewTodo::new("Buy milk".to_string())).await?;
//! store.update(todo.id, TodoPatch::completed(true)).await?;
//! assert_eq!(store.list().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod json_store;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod store;

pub use json_store::JsonFileStore;
pub use memory::MemoryTodoStore;
pub use models::{DeleteMany, NewTodo, Todo, TodoPatch};
pub use sqlite::SqliteTodoStore;
pub use store::TodoStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use std::sync::Arc;

/// Open the store described by `config`.
///
/// # Errors
///
/// Returns an error if the backing file or database cannot be initialized.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn TodoStore>> {
    let path = config.resolved_path();
    tracing::info!(backend = %config.backend, path = %path.display(), "opening todo store");
    let store: Arc<dyn TodoStore> = match config.backend {
        StoreBackend::Json => Arc::new(JsonFileStore::open(path, config.create_if_missing).await?),
        StoreBackend::Sqlite => {
            Arc::new(tokio::task::spawn_blocking(move || SqliteTodoStore::new(path)).await??)
        }
        StoreBackend::Memory => Arc::new(MemoryTodoStore::new()),
    };
    Ok(store)
}
