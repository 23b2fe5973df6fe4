//! In-memory todo store, used in tests and for throwaway servers.

use crate::error::Result;
use crate::todos::models::{DeleteMany, NewTodo, Todo, TodoPatch};
use crate::todos::store::{self, TodoStore};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Todo store holding its records in a vector.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Vec<Todo>>,
}

impl MemoryTodoStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `todos`.
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self { todos: Mutex::new(todos) }
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list(&self) -> Result<Vec<Todo>> {
        Ok(self.todos.lock().await.clone())
    }

    async fn create(&self, new: NewTodo) -> Result<Todo> {
        store::insert(&mut *self.todos.lock().await, new)
    }

    async fn find_unique(&self, id: Uuid) -> Result<Option<Todo>> {
        Ok(self.todos.lock().await.iter().find(|todo| todo.id == id).cloned())
    }

    async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>> {
        store::merge(&mut self.todos.lock().await, id, patch)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(store::remove(&mut *self.todos.lock().await, id))
    }

    async fn delete_many(&self, target: DeleteMany) -> Result<usize> {
        Ok(target.apply(&mut *self.todos.lock().await))
    }
}
