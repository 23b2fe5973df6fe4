//! Thin async client for the todo HTTP API.

use crate::error::{Error, Result};
use crate::schema::ValidationErrors;
use crate::todos::{Todo, TodoPatch};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Deserialize)]
struct Deleted<T> {
    deleted: T,
}

/// Client for a running todo server.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    http: reqwest::Client,
}

impl TodoClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http: reqwest::Client::new() }
    }

    /// Get the server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/todos{path}", self.base_url)
    }

    /// List every todo.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with an error.
    pub async fn list(&self) -> Result<Vec<Todo>> {
        decode(self.http.get(self.url("")).send().await?).await
    }

    /// Get a todo by id, or `None` if the server does not know it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with an
    /// error other than 404.
    pub async fn get(&self, id: Uuid) -> Result<Option<Todo>> {
        let response = self.http.get(self.url(&format!("/{id}"))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    /// Create a todo.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the title is rejected.
    pub async fn create(&self, title: &str) -> Result<Todo> {
        let body = json!({ "title": title });
        decode(self.http.post(self.url("")).json(&body).send().await?).await
    }

    /// Apply `patch` to a todo and return the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the patch is rejected, or the
    /// todo does not exist.
    pub async fn update(&self, id: Uuid, patch: &TodoPatch) -> Result<Todo> {
        decode(self.http.patch(self.url(&format!("/{id}"))).json(patch).send().await?).await
    }

    /// Delete a todo. Returns whether the server removed anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with an error.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let response = self.http.delete(self.url(&format!("/{id}"))).send().await?;
        Ok(decode::<Deleted<bool>>(response).await?.deleted)
    }

    /// Delete every todo in `ids`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with an error.
    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<usize> {
        self.delete_many_with(json!({ "ids": ids })).await
    }

    /// Delete every todo. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with an error.
    pub async fn clear_all(&self) -> Result<usize> {
        self.delete_many_with(json!({ "clearAll": true })).await
    }

    async fn delete_many_with(&self, body: Value) -> Result<usize> {
        let response = self.http.delete(self.url("/many")).json(&body).send().await?;
        Ok(decode::<Deleted<usize>>(response).await?.deleted)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body: Value = response.json().await.unwrap_or(Value::Null);
    Err(Error::Api { status: status.as_u16(), message: error_message(status, &body) })
}

/// Pull a readable message out of an error body.
fn error_message(status: StatusCode, body: &Value) -> String {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(errors) =
        body.get("error").and_then(|e| serde_json::from_value::<ValidationErrors>(e.clone()).ok())
    {
        return errors.to_string();
    }
    status.canonical_reason().unwrap_or("request failed").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = TodoClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/many"), "http://localhost:5000/todos/many");
    }

    #[test]
    fn test_error_message_prefers_server_message() {
        let body = json!({"message": "Todo not found"});
        assert_eq!(error_message(StatusCode::NOT_FOUND, &body), "Todo not found");
    }

    #[test]
    fn test_error_message_flattens_validation_errors() {
        let body = json!({"error": {"formErrors": [], "fieldErrors": {"title": ["Required"]}}});
        assert_eq!(error_message(StatusCode::BAD_REQUEST, &body), "title: Required");
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, &Value::Null), "Bad Gateway");
    }
}
