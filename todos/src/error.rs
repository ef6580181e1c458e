//! Error types for the todo state layer.
//!
//! Three layers, from the outside in:
//!
//! - [`TodoError`]: the fixed vocabulary shown to the user. At most one is
//!   active at a time (see [`crate::types::TodoState::error`]).
//! - [`ApiError`]: why a remote call failed. Logged, never shown; every
//!   variant maps to the same user-facing error for the operation in flight.
//! - [`ConfigError`]: startup configuration problems.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-visible error notifications
///
/// The `Display` text is the exact message rendered in the notification.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TodoError {
    /// The initial list could not be fetched
    #[error("Unable to load todos")]
    LoadTodos,

    /// A todo was submitted with a blank title (raised before any request)
    #[error("Title should not be empty")]
    EmptyTitle,

    /// Creating a todo failed
    #[error("Unable to add a todo")]
    AddTodo,

    /// Deleting a todo failed
    #[error("Unable to delete a todo")]
    DeleteTodo,

    /// Updating a todo (title or completion) failed
    #[error("Unable to update a todo")]
    UpdateTodo,
}

/// Errors from the remote todo API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection, DNS, timeout)
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-2xx status
    #[error("API error (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not the expected JSON
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No user id configured; the application refuses to operate
    #[error("No user id configured (set TODOS_USER_ID)")]
    MissingUserId,

    /// The user id is not a positive integer
    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    /// The base URL is not an http(s) URL
    #[error("Invalid API base URL: {0:?}")]
    InvalidBaseUrl(String),

    /// A duration variable is not a whole number of milliseconds
    #[error("Invalid value for {var}: {value:?}")]
    InvalidDuration {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}
