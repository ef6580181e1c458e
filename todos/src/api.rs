//! Remote todo API client.
//!
//! Four operations, one round-trip each, no retries. Callers treat every
//! [`ApiError`] the same way; the variants exist for logging.

use crate::config::TodosConfig;
use crate::error::{ApiError, ConfigError};
use crate::types::{NewTodo, Todo, TodoId, UserId};
use reqwest::{Client, Response};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

/// Boxed future returned by [`TodoApi`] operations
pub type ApiFuture<'a, T> = BoxFuture<'a, Result<T, ApiError>>;

/// Remote CRUD backend for todos
///
/// Uses boxed futures so the reducer environment can hold an
/// `Arc<dyn TodoApi>`.
pub trait TodoApi: Send + Sync {
    /// Fetch every todo owned by `user_id`
    fn list(&self, user_id: UserId) -> ApiFuture<'_, Vec<Todo>>;

    /// Create a todo; the backend assigns the id
    fn create(&self, todo: NewTodo) -> ApiFuture<'_, Todo>;

    /// Persist the full todo; returns the stored version
    fn update(&self, todo: Todo) -> ApiFuture<'_, Todo>;

    /// Delete by id
    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()>;
}

/// HTTP implementation of [`TodoApi`]
///
/// - `GET {base}/todos?userId={id}`
/// - `POST {base}/todos`
/// - `PATCH {base}/todos/{id}`
/// - `DELETE {base}/todos/{id}`
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Create a client for the API at `base_url` using transport defaults
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from session configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying client cannot be built.
    pub fn from_config(config: &TodosConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self::with_client(client, config.base_url.as_str()))
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }
}

/// Reject non-2xx responses, keeping the body for the log
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn request_failed(error: &reqwest::Error) -> ApiError {
    ApiError::Request(error.to_string())
}

impl TodoApi for HttpTodoApi {
    fn list(&self, user_id: UserId) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            let response = self
                .client
                .get(format!("{}?userId={user_id}", self.todos_url()))
                .send()
                .await
                .map_err(|e| request_failed(&e))?;
            decode(response).await
        })
    }

    fn create(&self, todo: NewTodo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.todos_url())
                .json(&todo)
                .send()
                .await
                .map_err(|e| request_failed(&e))?;
            decode(response).await
        })
    }

    fn update(&self, todo: Todo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            let response = self
                .client
                .patch(self.todo_url(todo.id))
                .json(&todo)
                .send()
                .await
                .map_err(|e| request_failed(&e))?;
            decode(response).await
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let response = self
                .client
                .delete(self.todo_url(id))
                .send()
                .await
                .map_err(|e| request_failed(&e))?;
            check_status(response).await.map(|_| ())
        })
    }
}
