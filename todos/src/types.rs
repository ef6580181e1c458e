//! Domain types for the todo list.
//!
//! The remote API owns identity: ids are assigned by the backend, except for
//! [`TodoId::TEMP`] which marks the optimistic placeholder shown while a
//! creation is in flight.

use crate::error::TodoError;
use crate::filter::{self, Filter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use todosync_macros::Action;

/// Backend-assigned todo identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Reserved for the not-yet-persisted placeholder
    pub const TEMP: Self = Self(0);

    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// True for the placeholder id
    #[must_use]
    pub const fn is_temp(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for TodoId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Owner of every todo in the session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wraps a raw user id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A single todo as stored by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Backend-assigned identifier
    pub id: TodoId,
    /// Owning user
    pub user_id: UserId,
    /// Trimmed, non-empty title
    pub title: String,
    /// Completion flag
    pub completed: bool,
}

impl Todo {
    /// Creates a todo
    #[must_use]
    pub fn new(id: TodoId, user_id: UserId, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            completed,
        }
    }

    /// Copy with a different title
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    /// Copy with a different completion flag
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }
}

/// Creation payload: a todo without an id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    /// Trimmed title
    pub title: String,
    /// Owning user
    pub user_id: UserId,
    /// Always false for new todos
    pub completed: bool,
}

impl NewTodo {
    /// New, incomplete todo for `user_id`
    #[must_use]
    pub fn new(title: impl Into<String>, user_id: UserId) -> Self {
        Self {
            title: title.into(),
            user_id,
            completed: false,
        }
    }

    /// The placeholder shown while this todo is being created
    #[must_use]
    pub fn placeholder(&self) -> Todo {
        Todo::new(TodoId::TEMP, self.user_id, self.title.clone(), self.completed)
    }
}

/// The error currently on display
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    /// What went wrong
    pub error: TodoError,
    /// Raise counter; a dismissal timer only clears the notice it was armed for
    pub seq: u64,
}

/// Session state of the todo list
///
/// Todos live once, in `todos`. Busy ids are tracked separately in
/// `processing` so consumers can overlay a loader without copying items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Canonical collection in insertion order, unique by id, never holding id 0
    pub todos: Vec<Todo>,
    /// Ids with a remote call in flight
    pub processing: BTreeSet<TodoId>,
    /// Placeholder for the creation in flight, outside the collection
    pub temp_todo: Option<Todo>,
    /// Current user-visible error
    pub error: Option<ErrorNotice>,
    /// Bumped whenever the new-todo input should take focus
    pub focus_requests: u64,
    last_error_seq: u64,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State holding `todos`, as after a successful load
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// True while a remote call for `id` is in flight
    #[must_use]
    pub fn is_processing(&self, id: TodoId) -> bool {
        self.processing.contains(&id)
    }

    /// The active error, if any
    #[must_use]
    pub fn error_kind(&self) -> Option<TodoError> {
        self.error.map(|notice| notice.error)
    }

    /// Text of the active error, if any
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error_kind().map(|error| error.to_string())
    }

    /// Todos shown under `filter`, in collection order
    #[must_use]
    pub fn visible(&self, filter: Filter) -> Vec<&Todo> {
        filter::project(filter, &self.todos)
    }

    /// "N items left"
    #[must_use]
    pub fn items_left(&self) -> usize {
        filter::count_active(&self.todos)
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        filter::count_completed(&self.todos)
    }

    /// Non-empty and every todo completed (toggle-all shows as active)
    #[must_use]
    pub fn all_completed(&self) -> bool {
        !self.todos.is_empty() && self.items_left() == 0
    }

    /// Whether "clear completed" has anything to do
    #[must_use]
    pub fn has_completed(&self) -> bool {
        self.todos.iter().any(|t| t.completed)
    }

    /// Shows `error`, replacing any current one; returns its sequence number
    pub(crate) fn raise(&mut self, error: TodoError) -> u64 {
        self.last_error_seq += 1;
        let seq = self.last_error_seq;
        self.error = Some(ErrorNotice { error, seq });
        seq
    }

    /// Clears the error only if it is still the one raised as `seq`
    pub(crate) fn dismiss(&mut self, seq: u64) -> bool {
        if self.error.is_some_and(|notice| notice.seq == seq) {
            self.error = None;
            true
        } else {
            false
        }
    }

    /// Appends `todo`, or replaces the item with the same id
    pub(crate) fn upsert(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => *slot = todo,
            None => self.todos.push(todo),
        }
    }

    /// Replaces the item with id `id`; no-op if it is gone
    pub(crate) fn replace(&mut self, id: TodoId, todo: Todo) -> bool {
        match self.todos.iter_mut().find(|t| t.id == id) {
            Some(slot) => {
                *slot = todo;
                true
            },
            None => false,
        }
    }

    /// Removes the item with id `id`
    pub(crate) fn remove(&mut self, id: TodoId) -> bool {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        self.todos.len() != before
    }
}

/// Actions for the todo list
///
/// Commands each trigger exactly one remote call. Events carry the settled
/// result back into the reducer, which applies it and releases the item's
/// busy state in the same step. Unmarked variants are timers and UI cues.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Fetch every todo of the configured user
    #[command]
    LoadTodos,

    /// Command: Create a todo with this title (trimmed before use)
    #[command]
    CreateTodo {
        /// Raw input text
        title: String,
    },

    /// Command: Persist the full todo
    #[command]
    UpdateTodo {
        /// Todo as edited by the caller
        todo: Todo,
        /// Dispatched after a successful update
        on_success: Option<Box<TodoAction>>,
    },

    /// Command: Delete a todo
    #[command]
    DeleteTodo {
        /// Todo to delete
        id: TodoId,
        /// Dispatched after a successful delete
        on_success: Option<Box<TodoAction>>,
    },

    // ========== Events ==========
    /// Event: The list was fetched
    #[event]
    TodosLoaded {
        /// Every todo of the user
        todos: Vec<Todo>,
    },

    /// Event: Fetching the list failed
    #[event]
    LoadFailed,

    /// Event: The backend created a todo
    #[event]
    TodoCreated {
        /// Todo with its server-assigned id
        todo: Todo,
    },

    /// Event: Creating a todo failed
    #[event]
    CreateFailed,

    /// Event: The backend accepted an update
    #[event]
    TodoUpdated {
        /// Id the update was sent for
        id: TodoId,
        /// Persisted version
        todo: Todo,
        /// Follow-up from the command
        on_success: Option<Box<TodoAction>>,
    },

    /// Event: Updating a todo failed
    #[event]
    UpdateFailed {
        /// Id the update was sent for
        id: TodoId,
    },

    /// Event: The backend deleted a todo
    #[event]
    TodoDeleted {
        /// Deleted id
        id: TodoId,
        /// Follow-up from the command
        on_success: Option<Box<TodoAction>>,
    },

    /// Event: Deleting a todo failed
    #[event]
    DeleteFailed {
        /// Id the delete was sent for
        id: TodoId,
    },

    // ========== Timers and UI cues ==========
    /// The auto-clear timer of error `seq` fired
    DismissError {
        /// Sequence number the timer was armed for
        seq: u64,
    },

    /// The user closed the error notification
    ClearError,

    /// The new-todo input should take focus
    FocusNewTodoInput,
}

impl TodoAction {
    /// `CreateTodo` command
    #[must_use]
    pub fn create(title: impl Into<String>) -> Self {
        Self::CreateTodo {
            title: title.into(),
        }
    }

    /// `UpdateTodo` command without follow-up
    #[must_use]
    pub const fn update(todo: Todo) -> Self {
        Self::UpdateTodo {
            todo,
            on_success: None,
        }
    }

    /// `DeleteTodo` command without follow-up
    #[must_use]
    pub const fn delete(id: TodoId) -> Self {
        Self::DeleteTodo {
            id,
            on_success: None,
        }
    }

    /// Attaches a success follow-up to an update or delete command
    ///
    /// Other actions are returned unchanged.
    #[must_use]
    pub fn on_success(self, follow_up: TodoAction) -> Self {
        match self {
            Self::UpdateTodo { todo, .. } => Self::UpdateTodo {
                todo,
                on_success: Some(Box::new(follow_up)),
            },
            Self::DeleteTodo { id, .. } => Self::DeleteTodo {
                id,
                on_success: Some(Box::new(follow_up)),
            },
            other => other,
        }
    }
}
