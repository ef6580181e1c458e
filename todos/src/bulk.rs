//! Commands built from the current collection.
//!
//! Bulk operations fan out into one independent command per affected todo.
//! Nothing is atomic: each settles on its own, and a failure only raises the
//! operation's error.

use crate::filter::count_active;
use crate::types::{Todo, TodoAction};

/// Delete every completed todo
///
/// Each successful delete moves focus back to the new-todo input.
#[must_use]
pub fn clear_completed(todos: &[Todo]) -> Vec<TodoAction> {
    todos
        .iter()
        .filter(|todo| todo.completed)
        .map(|todo| TodoAction::delete(todo.id).on_success(TodoAction::FocusNewTodoInput))
        .collect()
}

/// Complete every active todo, or reopen all of them if none is active
#[must_use]
pub fn toggle_all(todos: &[Todo]) -> Vec<TodoAction> {
    let completed = count_active(todos) > 0;
    todos
        .iter()
        .filter(|todo| todo.completed != completed)
        .map(|todo| TodoAction::update(todo.with_completed(completed)))
        .collect()
}

/// Flip one todo's completion flag
#[must_use]
pub fn toggle(todo: &Todo) -> TodoAction {
    TodoAction::update(todo.with_completed(!todo.completed))
        .on_success(TodoAction::FocusNewTodoInput)
}
