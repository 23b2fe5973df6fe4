//! HTTP API for the todo store.
//!
//! Routes, mounted under `/todos`:
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/todos` | |
//! | POST | `/todos` | `{ "title": "..." }` |
//! | GET | `/todos/{id}` | |
//! | PATCH | `/todos/{id}` | `{ "completed"?: bool, "title"?: "..." }` |
//! | DELETE | `/todos/{id}` | |
//! | DELETE | `/todos/many` | `{ "ids": [...] }` or `{ "clearAll": true }` |
//!
//! Handlers validate their input before touching the store and hand every
//! failure to [`ApiError`].

pub mod error;

pub use error::ApiError;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::schema::{parse_delete_many, parse_todo_id, CreateTodoInput, UpdateTodoInput};
use crate::todos::{open_store, Todo, TodoStore};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The record store.
    pub store: Arc<dyn TodoStore>,
}

impl AppState {
    /// Wrap a store.
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

/// Build the `/todos` routes without any middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/many", delete(delete_many_todos).fallback(many_as_todo_id))
        .route("/todos/{id}", get(get_todo).patch(update_todo).delete(delete_todo))
        .with_state(state)
}

/// Build the full application: routes, CORS for `allowed_origin`, and
/// request tracing.
///
/// # Errors
///
/// Returns an error if `allowed_origin` is not a valid header value.
pub fn app(state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .map_err(|e| Error::Config(format!("allowed origin '{allowed_origin}': {e}")))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);
    Ok(router(state).layer(cors).layer(TraceLayer::new_for_http()))
}

/// Open the configured store and serve the API until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the address cannot be
/// bound.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let store = open_store(&config.store).await?;
    let app = app(AppState::new(store), &config.allowed_origin)?;
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        origin = %config.allowed_origin,
        "todo server listening"
    );
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("todo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.store.list().await?))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    let id = parse_todo_id(&id)?;
    state.store.find_unique(id).await?.map(Json).ok_or_else(ApiError::todo_not_found)
}

async fn create_todo(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let Json(body) = body?;
    let input = CreateTodoInput::parse(&body)?;
    let todo = state.store.create(input.into_new_todo()).await?;
    tracing::debug!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let id = parse_todo_id(&id)?;
    let Json(body) = body?;
    let patch = UpdateTodoInput::parse(&body)?.into_patch();
    state.store.update(id, patch).await?.map(Json).ok_or_else(ApiError::todo_not_found)
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_todo_id(&id)?;
    let deleted = state.store.delete(id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

/// Other methods on `/todos/many` address a todo whose id is `many`.
async fn many_as_todo_id() -> ApiError {
    parse_todo_id("many").map_or_else(ApiError::from, |_| ApiError::todo_not_found())
}

async fn delete_many_todos(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let target = parse_delete_many(&body)?;
    let deleted = state.store.delete_many(target).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
