//! Validation of todo records and API inputs.
//!
//! Every input that reaches the record store passes through one of the
//! parsers here first. Parsers take the raw JSON body so that every problem
//! with a payload can be reported at once, in the flattened shape returned
//! by the API:
//!
//! ```json
//! { "formErrors": [], "fieldErrors": { "title": ["Required"] } }
//! ```

use crate::todos::models::{DeleteMany, NewTodo, Todo, TodoPatch};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Minimum title length, in characters, after trimming.
pub const TITLE_MIN_LEN: usize = 3;

/// Maximum title length, in characters, after trimming.
pub const TITLE_MAX_LEN: usize = 200;

/// A structured list of validation failures.
///
/// Form errors apply to the payload as a whole; field errors are keyed by
/// the offending field (`ids.2` for the third element of `ids`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    /// Errors not tied to a single field.
    pub form_errors: Vec<String>,
    /// Errors keyed by field name.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error list holding a single form error.
    #[must_use]
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_form(message);
        errors
    }

    /// Create an error list holding a single field error.
    #[must_use]
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_field(name, message);
        errors
    }

    /// Record a form error.
    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    /// Record an error against a field.
    pub fn add_field(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.field_errors.entry(name.into()).or_default().push(message.into());
    }

    /// Check if no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Return `value` if no errors were recorded, or the errors otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` if any error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            for message in messages {
                parts.push(format!("{field}: {message}"));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validated input for creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodoInput {
    /// Trimmed title.
    pub title: String,
}

impl CreateTodoInput {
    /// Parse a create payload: `{ "title": string }`.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns the validation errors if the payload is not an object or the
    /// title is missing, not a string, or out of bounds.
    pub fn parse(body: &Value) -> Result<Self, ValidationErrors> {
        let object = expect_object(body)?;
        let mut errors = ValidationErrors::new();
        let title = match object.get("title") {
            Some(value) => check_title("title", value, &mut errors),
            None => {
                errors.add_field("title", "Required");
                None
            }
        };
        match title {
            Some(title) if errors.is_empty() => Ok(Self { title }),
            _ => Err(errors),
        }
    }

    /// Turn the input into a new, not yet completed, todo.
    #[must_use]
    pub fn into_new_todo(self) -> NewTodo {
        NewTodo::new(self.title)
    }
}

/// Validated input for updating a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTodoInput {
    /// New trimmed title, if given.
    pub title: Option<String>,
    /// New completion flag, if given.
    pub completed: Option<bool>,
}

impl UpdateTodoInput {
    /// Parse an update payload: `{ "completed"?: bool, "title"?: string }`.
    ///
    /// An `id` key is ignored like any other unknown key.
    ///
    /// # Errors
    ///
    /// Returns the validation errors if the payload is not an object or a
    /// present field has the wrong type or an out of bounds title.
    pub fn parse(body: &Value) -> Result<Self, ValidationErrors> {
        let object = expect_object(body)?;
        let mut errors = ValidationErrors::new();
        let title = object.get("title").and_then(|value| check_title("title", value, &mut errors));
        let completed = match object.get("completed") {
            Some(Value::Bool(completed)) => Some(*completed),
            Some(other) => {
                errors.add_field("completed", type_mismatch("boolean", other));
                None
            }
            None => None,
        };
        errors.into_result(Self { title, completed })
    }

    /// Turn the input into a patch for the record store.
    #[must_use]
    pub fn into_patch(self) -> TodoPatch {
        TodoPatch { title: self.title, completed: self.completed }
    }
}

/// Parse a delete-many payload: `{ "ids": [uuid, ...] }` or `{ "clearAll": true }`.
///
/// Exactly one of the two keys must be present.
///
/// # Errors
///
/// Returns the validation errors if neither or both keys are present,
/// `clearAll` is anything but `true`, or an id is not a UUID string.
pub fn parse_delete_many(body: &Value) -> Result<DeleteMany, ValidationErrors> {
    let object = expect_object(body)?;
    match (object.get("ids"), object.get("clearAll")) {
        (Some(_), Some(_)) => {
            Err(ValidationErrors::form("Provide either ids or clearAll, not both"))
        }
        (None, None) => Err(ValidationErrors::form("Provide either ids or clearAll")),
        (None, Some(Value::Bool(true))) => Ok(DeleteMany::ClearAll),
        (None, Some(_)) => {
            Err(ValidationErrors::field("clearAll", "Invalid literal value, expected true"))
        }
        (Some(Value::Array(items)), None) => {
            let mut errors = ValidationErrors::new();
            let mut ids = HashSet::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let field = format!("ids.{index}");
                match item {
                    Value::String(raw) => match Uuid::parse_str(raw) {
                        Ok(id) => {
                            ids.insert(id);
                        }
                        Err(_) => errors.add_field(field, "Invalid uuid"),
                    },
                    other => errors.add_field(field, type_mismatch("string", other)),
                }
            }
            errors.into_result(DeleteMany::Ids(ids))
        }
        (Some(other), None) => Err(ValidationErrors::field("ids", type_mismatch("array", other))),
    }
}

/// Parse a todo id from a path segment.
///
/// # Errors
///
/// Returns a field error on `id` if the string is not a UUID.
pub fn parse_todo_id(raw: &str) -> Result<Uuid, ValidationErrors> {
    Uuid::parse_str(raw).map_err(|_| ValidationErrors::field("id", "Invalid uuid"))
}

/// Trim a title and check its length.
///
/// # Errors
///
/// Returns a message describing the violated bound.
pub fn normalize_title(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < TITLE_MIN_LEN {
        Err(format!("String must contain at least {TITLE_MIN_LEN} character(s)"))
    } else if len > TITLE_MAX_LEN {
        Err(format!("String must contain at most {TITLE_MAX_LEN} character(s)"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Check the title of a record as it is stored: already trimmed and within
/// bounds.
fn check_stored_title(title: &str) -> Result<(), String> {
    if title != title.trim() {
        return Err("String must not have leading or trailing whitespace".to_string());
    }
    normalize_title(title).map(|_| ())
}

/// Trim a record's title in place and check it, ready to be stored.
///
/// # Errors
///
/// Returns a field error on `title` if it is out of bounds after trimming.
pub fn normalize_todo(todo: &mut Todo) -> Result<(), ValidationErrors> {
    todo.title =
        normalize_title(&todo.title).map_err(|message| ValidationErrors::field("title", message))?;
    Ok(())
}

/// Check a single stored record.
///
/// # Errors
///
/// Returns a field error on `title` if it is untrimmed or out of bounds.
pub fn validate_todo(todo: &Todo) -> Result<(), ValidationErrors> {
    check_stored_title(&todo.title).map_err(|message| ValidationErrors::field("title", message))
}

/// Check the full contents of a store.
///
/// Field errors are keyed by record index (`2.title`, `3.id`).
///
/// # Errors
///
/// Returns every untrimmed or out of bounds title and every repeated id.
pub fn validate_todos(todos: &[Todo]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut seen = HashSet::with_capacity(todos.len());
    for (index, todo) in todos.iter().enumerate() {
        if let Err(message) = check_stored_title(&todo.title) {
            errors.add_field(format!("{index}.title"), message);
        }
        if !seen.insert(todo.id) {
            errors.add_field(format!("{index}.id"), "Duplicate id");
        }
    }
    errors.into_result(())
}

fn expect_object(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| ValidationErrors::form(type_mismatch("object", body)))
}

fn check_title(field: &str, value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let Value::String(raw) = value else {
        errors.add_field(field, type_mismatch("string", value));
        return None;
    };
    match normalize_title(raw) {
        Ok(title) => Some(title),
        Err(message) => {
            errors.add_field(field, message);
            None
        }
    }
}

fn type_mismatch(expected: &str, received: &Value) -> String {
    let received = match received {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("Expected {expected}, received {received}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_create_trims_title() {
        let input = CreateTodoInput::parse(&json!({"title": "  Buy milk  "})).unwrap();
        assert_eq!(input.title, "Buy milk");
    }

    #[test]
    fn test_create_ignores_unknown_keys() {
        let input = CreateTodoInput::parse(&json!({"title": "Buy milk", "id": "x"})).unwrap();
        assert_eq!(input.into_new_todo(), NewTodo::new("Buy milk".to_string()));
    }

    #[test]
    fn test_create_requires_title() {
        let errors = CreateTodoInput::parse(&json!({})).unwrap_err();
        assert_eq!(errors.field_errors["title"], vec!["Required"]);
    }

    #[test]
    fn test_create_rejects_short_title() {
        let errors = CreateTodoInput::parse(&json!({"title": "  a "})).unwrap_err();
        assert_eq!(
            errors.field_errors["title"],
            vec!["String must contain at least 3 character(s)"]
        );
    }

    #[test]
    fn test_create_rejects_empty_title() {
        assert!(CreateTodoInput::parse(&json!({"title": ""})).is_err());
    }

    #[test]
    fn test_create_rejects_long_title() {
        let title = "x".repeat(TITLE_MAX_LEN + 1);
        let errors = CreateTodoInput::parse(&json!({ "title": title })).unwrap_err();
        assert!(errors.field_errors["title"][0].contains("at most"));
    }

    #[test]
    fn test_create_rejects_wrong_type() {
        let errors = CreateTodoInput::parse(&json!({"title": 42})).unwrap_err();
        assert_eq!(errors.field_errors["title"], vec!["Expected string, received number"]);
    }

    #[test]
    fn test_create_rejects_non_object() {
        let errors = CreateTodoInput::parse(&json!(["Buy milk"])).unwrap_err();
        assert_eq!(errors.form_errors, vec!["Expected object, received array"]);
        assert!(errors.field_errors.is_empty());
    }

    #[test]
    fn test_update_accepts_completed_only() {
        let input = UpdateTodoInput::parse(&json!({"completed": true})).unwrap();
        assert_eq!(input, UpdateTodoInput { title: None, completed: Some(true) });
    }

    #[test]
    fn test_update_ignores_id() {
        let patch = UpdateTodoInput::parse(&json!({"id": "nope", "completed": false}))
            .unwrap()
            .into_patch();
        assert_eq!(patch, TodoPatch { title: None, completed: Some(false) });
    }

    #[test]
    fn test_update_empty_is_valid() {
        let input = UpdateTodoInput::parse(&json!({})).unwrap();
        assert!(input.into_patch().is_empty());
    }

    #[test]
    fn test_update_reports_every_bad_field() {
        let body = json!({"completed": "yes", "title": "x"});
        let errors = UpdateTodoInput::parse(&body).unwrap_err();
        assert_eq!(errors.field_errors["completed"], vec!["Expected boolean, received string"]);
        assert_eq!(errors.field_errors.len(), 2);
    }

    #[test]
    fn test_update_rejects_null_completed() {
        let errors = UpdateTodoInput::parse(&json!({"completed": null})).unwrap_err();
        assert_eq!(errors.field_errors["completed"], vec!["Expected boolean, received null"]);
    }

    #[test]
    fn test_delete_many_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parsed = parse_delete_many(&json!({"ids": [a.to_string(), b.to_string()]})).unwrap();
        assert_eq!(parsed, DeleteMany::Ids(HashSet::from([a, b])));
    }

    #[test]
    fn test_delete_many_clear_all() {
        assert_eq!(parse_delete_many(&json!({"clearAll": true})).unwrap(), DeleteMany::ClearAll);
    }

    #[test]
    fn test_delete_many_clear_all_must_be_true() {
        let errors = parse_delete_many(&json!({"clearAll": false})).unwrap_err();
        assert!(errors.field_errors.contains_key("clearAll"));
    }

    #[test]
    fn test_delete_many_requires_exactly_one_mode() {
        let both = parse_delete_many(&json!({"ids": [], "clearAll": true})).unwrap_err();
        assert_eq!(both.form_errors.len(), 1);
        let neither = parse_delete_many(&json!({})).unwrap_err();
        assert_eq!(neither.form_errors.len(), 1);
    }

    #[test]
    fn test_delete_many_reports_bad_ids_by_index() {
        let good = Uuid::new_v4().to_string();
        let errors = parse_delete_many(&json!({"ids": [good, "nope", 7]})).unwrap_err();
        assert_eq!(errors.field_errors["ids.1"], vec!["Invalid uuid"]);
        assert_eq!(errors.field_errors["ids.2"], vec!["Expected string, received number"]);
        assert!(!errors.field_errors.contains_key("ids.0"));
    }

    #[test]
    fn test_parse_todo_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_todo_id(&id.to_string()).unwrap(), id);
        let errors = parse_todo_id("123").unwrap_err();
        assert_eq!(errors.field_errors["id"], vec!["Invalid uuid"]);
    }

    #[test]
    fn test_validate_todos_flags_duplicates() {
        let id = Uuid::new_v4();
        let todos = vec![
            Todo { id, title: "First".to_string(), completed: false },
            Todo { id, title: "Second".to_string(), completed: true },
        ];
        let errors = validate_todos(&todos).unwrap_err();
        assert_eq!(errors.field_errors["1.id"], vec!["Duplicate id"]);
    }

    #[test]
    fn test_validate_todos_flags_bad_titles() {
        let todos = vec![Todo { id: Uuid::new_v4(), title: " ".to_string(), completed: false }];
        let errors = validate_todos(&todos).unwrap_err();
        assert!(errors.field_errors.contains_key("0.title"));
    }

    #[test]
    fn test_validate_todos_flags_untrimmed_titles() {
        let todos =
            vec![Todo { id: Uuid::new_v4(), title: "  abc  ".to_string(), completed: false }];
        let errors = validate_todos(&todos).unwrap_err();
        assert_eq!(
            errors.field_errors["0.title"],
            vec!["String must not have leading or trailing whitespace"]
        );
        assert!(validate_todo(&todos[0]).is_err());
    }

    #[test]
    fn test_normalize_todo_trims_title() {
        let mut todo =
            Todo { id: Uuid::new_v4(), title: "  Buy milk ".to_string(), completed: false };
        normalize_todo(&mut todo).unwrap();
        assert_eq!(todo.title, "Buy milk");
        validate_todo(&todo).unwrap();

        let mut short = Todo { id: Uuid::new_v4(), title: "  ab  ".to_string(), completed: false };
        let errors = normalize_todo(&mut short).unwrap_err();
        assert!(errors.field_errors.contains_key("title"));
    }

    #[test]
    fn test_display_lists_form_and_field_errors() {
        let mut errors = ValidationErrors::form("Bad payload");
        errors.add_field("title", "Required");
        assert_eq!(errors.to_string(), "Bad payload; title: Required");
    }

    #[test]
    fn test_serializes_flattened_shape() {
        let errors = ValidationErrors::field("title", "Required");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"formErrors": [], "fieldErrors": {"title": ["Required"]}})
        );
    }

    proptest! {
        #[test]
        fn prop_valid_titles_are_trimmed(
            pad_left in " {0,4}",
            core in "[a-zA-Z0-9][a-zA-Z0-9 ]{1,150}[a-zA-Z0-9]",
            pad_right in " {0,4}",
        ) {
            let raw = format!("{pad_left}{core}{pad_right}");
            let body = json!({ "title": raw });
            let input = CreateTodoInput::parse(&body).unwrap();
            prop_assert_eq!(input.title, core);
        }

        #[test]
        fn prop_short_titles_are_rejected(core in "[a-z]{0,2}", pad in " {0,3}") {
            let raw = format!("{pad}{core}{pad}");
            let body = json!({ "title": raw });
            prop_assert!(CreateTodoInput::parse(&body).is_err());
        }
    }
}
