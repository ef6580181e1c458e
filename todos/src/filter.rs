//! Filter projection: which todos a view shows.

use crate::types::Todo;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// View selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Every todo
    #[default]
    All,
    /// Incomplete todos
    Active,
    /// Completed todos
    Completed,
}

impl Filter {
    /// Every selector, in link order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Whether `todo` is shown under this selector
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }

    /// Fragment link of the selector
    #[must_use]
    pub const fn href(self) -> &'static str {
        match self {
            Self::All => "#/",
            Self::Active => "#/active",
            Self::Completed => "#/completed",
        }
    }

    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown filter name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown filter: {0:?} (expected all, active or completed)")]
pub struct ParseFilterError(pub String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    /// Accepts the name or the fragment link, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let name = normalized
            .strip_prefix("#/")
            .unwrap_or(normalized.as_str());
        match name {
            "all" | "" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// Todos matching `filter`, in their original relative order
#[must_use]
pub fn project(filter: Filter, todos: &[Todo]) -> Vec<&Todo> {
    todos.iter().filter(|todo| filter.matches(todo)).collect()
}

/// Number of incomplete todos
#[must_use]
pub fn count_active(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

/// Number of completed todos
#[must_use]
pub fn count_completed(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| todo.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TodoId, UserId};

    fn todos() -> Vec<Todo> {
        vec![
            Todo::new(TodoId::new(1), UserId::new(1), "a", false),
            Todo::new(TodoId::new(2), UserId::new(1), "b", true),
            Todo::new(TodoId::new(3), UserId::new(1), "c", false),
        ]
    }

    fn ids(todos: &[&Todo]) -> Vec<u64> {
        todos.iter().map(|t| t.id.get()).collect()
    }

    #[test]
    fn project_each_selector() {
        let todos = todos();
        assert_eq!(ids(&project(Filter::All, &todos)), vec![1, 2, 3]);
        assert_eq!(ids(&project(Filter::Active, &todos)), vec![1, 3]);
        assert_eq!(ids(&project(Filter::Completed, &todos)), vec![2]);
    }

    #[test]
    fn counts() {
        let todos = todos();
        assert_eq!(count_active(&todos), 2);
        assert_eq!(count_completed(&todos), 1);
        assert_eq!(count_active(&[]), 0);
    }

    #[test]
    fn parse_names_and_links() {
        assert_eq!("all".parse(), Ok(Filter::All));
        assert_eq!("Active".parse(), Ok(Filter::Active));
        assert_eq!("#/completed".parse(), Ok(Filter::Completed));
        assert_eq!("#/".parse(), Ok(Filter::All));
        assert_eq!(
            "done".parse::<Filter>(),
            Err(ParseFilterError("done".to_string()))
        );
    }

    #[test]
    fn display_and_href() {
        for filter in Filter::ALL {
            assert_eq!(filter.to_string().parse(), Ok(filter));
            assert_eq!(filter.href().parse(), Ok(filter));
        }
        assert_eq!(Filter::default(), Filter::All);
        assert_eq!(Filter::Active.href(), "#/active");
    }
}
