//! Flat JSON file record store.
//!
//! The file holds one JSON array of todos. Every operation reads the whole
//! file, works on the array in memory and writes the whole array back.
//!
//! Read failures are surfaced as [`Error::StoreRead`]; a missing file is an
//! error, not an empty store. Write failures are logged and otherwise
//! ignored, so a caller can observe success even though nothing was
//! persisted.
//!
//! Read-modify-write cycles are serialised by an in-process lock. Two
//! processes sharing one file can still lose each other's updates.

use crate::error::{Error, Result, StoreReadError};
use crate::schema::validate_todos;
use crate::todos::models::{DeleteMany, NewTodo, Todo, TodoPatch};
use crate::todos::store::{self, TodoStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// JSON file-backed todo store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cycle: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store over `path` without touching the file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), cycle: Mutex::new(()) }
    }

    /// Create a store over `path`, writing an empty array first if the file
    /// does not exist and `create_if_missing` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be created.
    pub async fn open(path: impl AsRef<Path>, create_if_missing: bool) -> Result<Self> {
        let store = Self::new(path);
        if create_if_missing && !tokio::fs::try_exists(&store.path).await? {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&store.path, b"[]").await?;
            tracing::info!(path = %store.path.display(), "created empty todo store");
        }
        Ok(store)
    }

    /// Get the store file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> std::result::Result<Vec<Todo>, StoreReadError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreReadError::Missing(self.path.clone()));
            }
            Err(source) => return Err(StoreReadError::Io { path: self.path.clone(), source }),
        };
        let value: serde_json::Value = serde_json::from_slice(&data)
            .map_err(|source| StoreReadError::MalformedJson { path: self.path.clone(), source })?;
        let todos: Vec<Todo> = serde_json::from_value(value).map_err(|e| {
            StoreReadError::InvalidData { path: self.path.clone(), reason: e.to_string() }
        })?;
        validate_todos(&todos).map_err(|e| StoreReadError::InvalidData {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(todos)
    }

    async fn load(&self, operation: &'static str) -> Result<Vec<Todo>> {
        self.read().await.map_err(|source| {
            tracing::error!(operation, error = %source, "failed to read todo store");
            Error::StoreRead { operation, source }
        })
    }

    async fn persist(&self, todos: &[Todo]) {
        let bytes = match serde_json::to_vec(todos) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize todo store");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&self.path, bytes).await {
            tracing::error!(path = %self.path.display(), error = %e, "failed to write todo store");
        }
    }
}

#[async_trait]
impl TodoStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Todo>> {
        let _cycle = self.cycle.lock().await;
        self.load("list").await
    }

    async fn create(&self, new: NewTodo) -> Result<Todo> {
        let _cycle = self.cycle.lock().await;
        let mut todos = self.load("create").await?;
        let todo = store::insert(&mut todos, new)?;
        self.persist(&todos).await;
        Ok(todo)
    }

    async fn find_unique(&self, id: Uuid) -> Result<Option<Todo>> {
        let _cycle = self.cycle.lock().await;
        let todos = self.load("findUnique").await?;
        Ok(todos.into_iter().find(|todo| todo.id == id))
    }

    async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>> {
        let _cycle = self.cycle.lock().await;
        let mut todos = self.load("update").await?;
        let updated = store::merge(&mut todos, id, patch)?;
        if updated.is_some() {
            self.persist(&todos).await;
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let _cycle = self.cycle.lock().await;
        let mut todos = self.load("delete").await?;
        let removed = store::remove(&mut todos, id);
        if removed {
            self.persist(&todos).await;
        }
        Ok(removed)
    }

    async fn delete_many(&self, target: DeleteMany) -> Result<usize> {
        let _cycle = self.cycle.lock().await;
        let mut todos = self.load("deleteMany").await?;
        let removed = target.apply(&mut todos);
        if removed > 0 || target == DeleteMany::ClearAll {
            self.persist(&todos).await;
        }
        Ok(removed)
    }
}
