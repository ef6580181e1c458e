//! In-memory [`TodoApi`] for tests and offline runs.
//!
//! Records every call, can be told to fail by operation or by id, and can hold
//! all responses until released so callers can observe in-flight state.

use crate::api::{ApiFuture, TodoApi};
use crate::error::ApiError;
use crate::types::{NewTodo, Todo, TodoId, UserId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Remote operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `list`
    List,
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

/// A recorded call with its argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `list(user_id)`
    List(UserId),
    /// `create(todo)`
    Create(NewTodo),
    /// `update(todo)`
    Update(Todo),
    /// `delete(id)`
    Delete(TodoId),
}

impl ApiCall {
    /// Operation kind of this call
    #[must_use]
    pub const fn operation(&self) -> ApiOperation {
        match self {
            Self::List(_) => ApiOperation::List,
            Self::Create(_) => ApiOperation::Create,
            Self::Update(_) => ApiOperation::Update,
            Self::Delete(_) => ApiOperation::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Backend {
    todos: Vec<Todo>,
    next_id: u64,
    calls: Vec<ApiCall>,
    failing_operations: HashSet<ApiOperation>,
    failing_ids: HashSet<TodoId>,
}

impl Backend {
    fn should_fail(&self, operation: ApiOperation, id: Option<TodoId>) -> bool {
        self.failing_operations.contains(&operation)
            || id.is_some_and(|id| self.failing_ids.contains(&id))
    }
}

/// Mock todo API.
///
/// Uses in-memory storage for testing.
#[derive(Debug, Clone)]
pub struct MockTodoApi {
    backend: Arc<Mutex<Backend>>,
    /// `true` while responses flow; `false` holds them
    gate: Arc<watch::Sender<bool>>,
}

impl MockTodoApi {
    /// Create an empty backend whose first created todo gets id 1.
    #[must_use]
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            backend: Arc::new(Mutex::new(Backend {
                next_id: 1,
                ..Backend::default()
            })),
            gate: Arc::new(gate),
        }
    }

    /// Seed the backend; new ids continue after the largest seeded id.
    #[must_use]
    pub fn with_todos(self, todos: Vec<Todo>) -> Self {
        {
            let mut backend = self.lock();
            backend.next_id = todos.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
            backend.todos = todos;
        }
        self
    }

    /// Set the id the next created todo receives.
    #[must_use]
    pub fn with_next_id(self, id: u64) -> Self {
        self.lock().next_id = id;
        self
    }

    /// Make every call of `operation` fail.
    pub fn fail(&self, operation: ApiOperation) {
        self.lock().failing_operations.insert(operation);
    }

    /// Make updates and deletes of `id` fail.
    pub fn fail_id(&self, id: TodoId) {
        self.lock().failing_ids.insert(id);
    }

    /// Let every call succeed again.
    pub fn clear_failures(&self) {
        let mut backend = self.lock();
        backend.failing_operations.clear();
        backend.failing_ids.clear();
    }

    /// Hold responses until [`Self::release`]. Calls are still recorded.
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held and future responses through.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Every call issued so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of calls of `operation` issued so far.
    #[must_use]
    pub fn call_count(&self, operation: ApiOperation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Backend contents.
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call`, wait for the gate, then report whether to fail.
    async fn enter(&self, call: ApiCall, id: Option<TodoId>) -> Result<(), ApiError> {
        let operation = call.operation();
        self.lock().calls.push(call);

        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if self.lock().should_fail(operation, id) {
            return Err(ApiError::Status {
                status: 500,
                body: format!("mock {operation:?} failure"),
            });
        }
        Ok(())
    }
}

impl Default for MockTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: TodoId) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("todo {id} not found"),
    }
}

impl TodoApi for MockTodoApi {
    fn list(&self, user_id: UserId) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.enter(ApiCall::List(user_id), None).await?;
            Ok(self
                .lock()
                .todos
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    fn create(&self, todo: NewTodo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.enter(ApiCall::Create(todo.clone()), None).await?;
            let mut backend = self.lock();
            let created = Todo::new(
                TodoId::new(backend.next_id),
                todo.user_id,
                todo.title,
                todo.completed,
            );
            backend.next_id += 1;
            backend.todos.push(created.clone());
            Ok(created)
        })
    }

    fn update(&self, todo: Todo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.enter(ApiCall::Update(todo.clone()), Some(todo.id))
                .await?;
            let mut backend = self.lock();
            let slot = backend
                .todos
                .iter_mut()
                .find(|t| t.id == todo.id)
                .ok_or_else(|| not_found(todo.id))?;
            *slot = todo.clone();
            Ok(todo)
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.enter(ApiCall::Delete(id), Some(id)).await?;
            let mut backend = self.lock();
            let before = backend.todos.len();
            backend.todos.retain(|t| t.id != id);
            if backend.todos.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
    }
}
