//! Title editing: rename on finish, delete when emptied, revert on cancel.

use crate::types::{Todo, TodoAction, TodoId};

/// What finishing an edit amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Trimmed title equals the original: leave edit mode, no remote call
    Unchanged,
    /// Persist the todo with its new, trimmed title
    Rename(Todo),
    /// The title was cleared: delete the todo
    Delete(TodoId),
}

impl EditOutcome {
    /// Command to dispatch, if any
    ///
    /// A successful rename or delete moves focus back to the new-todo input.
    #[must_use]
    pub fn into_action(self) -> Option<TodoAction> {
        match self {
            Self::Unchanged => None,
            Self::Rename(todo) => {
                Some(TodoAction::update(todo).on_success(TodoAction::FocusNewTodoInput))
            },
            Self::Delete(id) => {
                Some(TodoAction::delete(id).on_success(TodoAction::FocusNewTodoInput))
            },
        }
    }
}

/// Decide what a finished edit of `original` to `new_title` means
#[must_use]
pub fn reconcile(original: &Todo, new_title: &str) -> EditOutcome {
    let title = new_title.trim();
    if title == original.title {
        EditOutcome::Unchanged
    } else if title.is_empty() {
        EditOutcome::Delete(original.id)
    } else {
        EditOutcome::Rename(original.with_title(title))
    }
}

/// An in-progress title edit
///
/// Holds the todo as it was when editing began plus the text typed so far.
/// Dropping the value leaves edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEdit {
    original: Todo,
    buffer: String,
}

impl TitleEdit {
    /// Start editing `todo`; the buffer starts as its current title
    #[must_use]
    pub fn begin(todo: &Todo) -> Self {
        Self {
            original: todo.clone(),
            buffer: todo.title.clone(),
        }
    }

    /// The todo being edited
    #[must_use]
    pub const fn original(&self) -> &Todo {
        &self.original
    }

    /// Text typed so far
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the typed text
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Escape: revert the buffer to the original title
    pub fn cancel(&mut self) {
        self.buffer.clone_from(&self.original.title);
    }

    /// Blur or submit
    #[must_use]
    pub fn finish(&self) -> EditOutcome {
        reconcile(&self.original, &self.buffer)
    }
}
