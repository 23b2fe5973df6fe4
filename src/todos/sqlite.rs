//! `SQLite`-backed todo store.
//!
//! Each operation opens a new connection on a blocking thread. Unlike the
//! JSON store, write errors are returned to the caller.

use crate::error::Result;
use crate::schema::normalize_todo;
use crate::todos::models::{DeleteMany, NewTodo, Todo, TodoPatch};
use crate::todos::store::TodoStore;
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// SQLite-based todo store.
#[derive(Debug, Clone)]
pub struct SqliteTodoStore {
    db_path: PathBuf,
}

impl SqliteTodoStore {
    /// Create a new `SQLite` todo store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute_batch(
            r"
            -- rowid keeps insertion order
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1))
            );
            ",
        )?;
        Ok(())
    }

    fn parse_todo(row: &rusqlite::Row) -> rusqlite::Result<Todo> {
        let raw_id: String = row.get(0)?;
        let id = Uuid::parse_str(&raw_id)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
        Ok(Todo { id, title: row.get(1)?, completed: row.get(2)? })
    }

    fn get(conn: &Connection, id: Uuid) -> Result<Option<Todo>> {
        Ok(conn
            .query_row(
                "SELECT id, title, completed FROM todos WHERE id = ?1",
                params![id.to_string()],
                Self::parse_todo,
            )
            .optional()?)
    }

    /// Run `op` against a fresh connection on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = store.open()?;
            op(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn list(&self) -> Result<Vec<Todo>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, completed FROM todos ORDER BY rowid")?;
            let todos = stmt.query_map([], Self::parse_todo)?.collect::<rusqlite::Result<_>>()?;
            Ok(todos)
        })
        .await
    }

    async fn create(&self, new: NewTodo) -> Result<Todo> {
        let mut todo = Todo::from_new(new);
        normalize_todo(&mut todo)?;
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO todos (id, title, completed) VALUES (?1, ?2, ?3)",
                params![todo.id.to_string(), todo.title, todo.completed],
            )?;
            Ok(todo)
        })
        .await
    }

    async fn find_unique(&self, id: Uuid) -> Result<Option<Todo>> {
        self.run(move |conn| Self::get(conn, id)).await
    }

    async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let Some(mut todo) = Self::get(&tx, id)? else {
                return Ok(None);
            };
            todo.apply(patch);
            normalize_todo(&mut todo)?;
            tx.execute(
                "UPDATE todos SET title = ?1, completed = ?2 WHERE id = ?3",
                params![todo.title, todo.completed, id.to_string()],
            )?;
            tx.commit()?;
            Ok(Some(todo))
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        self.run(move |conn| {
            let rows = conn.execute("DELETE FROM todos WHERE id = ?1", params![id.to_string()])?;
            Ok(rows > 0)
        })
        .await
    }

    async fn delete_many(&self, target: DeleteMany) -> Result<usize> {
        self.run(move |conn| match target {
            DeleteMany::ClearAll => Ok(conn.execute("DELETE FROM todos", [])?),
            DeleteMany::Ids(ids) => {
                let tx = conn.transaction()?;
                let mut removed = 0;
                {
                    let mut stmt = tx.prepare("DELETE FROM todos WHERE id = ?1")?;
                    for id in ids {
                        removed += stmt.execute(params![id.to_string()])?;
                    }
                }
                tx.commit()?;
                Ok(removed)
            }
        })
        .await
    }
}
