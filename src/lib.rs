//! # `todo_store`
//!
//! A small todo service: a flat JSON record store, a validated REST API on
//! top of it, and a thin client for that API.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod schema;
pub mod todos;

pub use client::TodoClient;
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use todos::{JsonFileStore, Todo, TodoStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
