//! Todo model types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A todo record as stored and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, assigned on creation and never changed.
    pub id: Uuid,
    /// Trimmed title.
    pub title: String,
    /// Whether the todo is done.
    pub completed: bool,
}

impl Todo {
    /// Build a record from a creation payload with a fresh random id.
    #[must_use]
    pub fn from_new(new: NewTodo) -> Self {
        Self { id: Uuid::new_v4(), title: new.title, completed: new.completed }
    }

    /// Merge a patch onto this record. The id is left untouched.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// A todo record minus its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    /// Title of the new todo.
    pub title: String,
    /// Initial completion flag.
    pub completed: bool,
}

impl NewTodo {
    /// A todo that is not yet completed.
    #[must_use]
    pub const fn new(title: String) -> Self {
        Self { title, completed: false }
    }
}

/// Fields that can be updated on a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// New title (if Some).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New completion flag (if Some).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that only sets the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self { title: None, completed: Some(completed) }
    }

    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Which records a delete-many call removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteMany {
    /// Every record whose id is in the set.
    Ids(HashSet<Uuid>),
    /// Every record.
    ClearAll,
}

impl DeleteMany {
    /// Remove the selected records in place, keeping the order of the rest.
    ///
    /// Returns the number of records removed.
    pub fn apply(&self, todos: &mut Vec<Todo>) -> usize {
        let before = todos.len();
        match self {
            Self::Ids(ids) => todos.retain(|todo| !ids.contains(&todo.id)),
            Self::ClearAll => todos.clear(),
        }
        before - todos.len()
    }
}
