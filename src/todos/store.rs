//! Record store trait and the helpers shared by array-backed stores.

use crate::error::Result;
use crate::schema::normalize_todo;
use crate::todos::models::{DeleteMany, NewTodo, Todo, TodoPatch};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for todo storage operations.
///
/// Every backend offers the same semantics so the HTTP layer can run on any
/// of them. All methods may fail if the backing storage cannot be read.
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// List every todo in insertion order.
    async fn list(&self) -> Result<Vec<Todo>>;

    /// Create a todo with a fresh id and return it.
    async fn create(&self, new: NewTodo) -> Result<Todo>;

    /// Get a todo by id. A missing id is `Ok(None)`.
    async fn find_unique(&self, id: Uuid) -> Result<Option<Todo>>;

    /// Merge `patch` onto the todo with this id and return the result.
    async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>>;

    /// Delete the todo with this id. Returns whether one was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Delete the selected todos. Returns how many were removed.
    async fn delete_many(&self, target: DeleteMany) -> Result<usize>;
}

/// Build a new record with its title trimmed, check it, then append it.
pub(crate) fn insert(todos: &mut Vec<Todo>, new: NewTodo) -> Result<Todo> {
    let mut todo = Todo::from_new(new);
    normalize_todo(&mut todo)?;
    todos.push(todo.clone());
    Ok(todo)
}

/// Apply a patch to the record with `id`.
///
/// The array is left untouched if the merged record fails validation.
pub(crate) fn merge(todos: &mut [Todo], id: Uuid, patch: TodoPatch) -> Result<Option<Todo>> {
    let Some(slot) = todos.iter_mut().find(|todo| todo.id == id) else {
        return Ok(None);
    };
    let mut merged = slot.clone();
    merged.apply(patch);
    normalize_todo(&mut merged)?;
    *slot = merged.clone();
    Ok(Some(merged))
}

/// Remove the first record with `id`.
pub(crate) fn remove(todos: &mut Vec<Todo>, id: Uuid) -> bool {
    todos.iter().position(|todo| todo.id == id).map(|index| todos.remove(index)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn seeded() -> Vec<Todo> {
        vec![
            Todo::from_new(NewTodo::new("First".to_string())),
            Todo::from_new(NewTodo::new("Second".to_string())),
        ]
    }

    #[test]
    fn test_insert_appends() {
        let mut todos = seeded();
        let todo = insert(&mut todos, NewTodo::new("Third".to_string())).unwrap();
        assert_eq!(todos.last(), Some(&todo));
    }

    #[test]
    fn test_insert_rejects_invalid_title() {
        let mut todos = seeded();
        let err = insert(&mut todos, NewTodo::new("x".to_string())).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(todos.len(), 2);
    }

    #[test]
    fn test_insert_and_merge_store_trimmed_titles() {
        let mut todos = seeded();
        let todo = insert(&mut todos, NewTodo::new("   Buy milk   ".to_string())).unwrap();
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todos[2].title, "Buy milk");

        let patch = TodoPatch { title: Some(" Buy eggs\t".to_string()), completed: None };
        let merged = merge(&mut todos, todo.id, patch).unwrap().unwrap();
        assert_eq!(merged.title, "Buy eggs");
        assert_eq!(todos[2].title, "Buy eggs");
    }

    #[test]
    fn test_merge_missing_id() {
        let mut todos = seeded();
        assert!(merge(&mut todos, Uuid::new_v4(), TodoPatch::completed(true)).unwrap().is_none());
    }

    #[test]
    fn test_merge_invalid_leaves_record() {
        let mut todos = seeded();
        let id = todos[0].id;
        let patch = TodoPatch { title: Some(String::new()), completed: Some(true) };
        assert!(merge(&mut todos, id, patch).is_err());
        assert_eq!(todos[0].title, "First");
        assert!(!todos[0].completed);
    }

    #[test]
    fn test_remove_first_match_only() {
        let mut todos = seeded();
        let id = todos[1].id;
        assert!(remove(&mut todos, id));
        assert!(!remove(&mut todos, id));
        assert_eq!(todos.len(), 1);
    }
}
