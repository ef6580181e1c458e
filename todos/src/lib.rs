//! Client-side todo list state, synchronized with a remote CRUD API.
//!
//! The state layer holds the canonical list, the ids with a remote call in
//! flight, a single placeholder for the todo being created and the current
//! error notification. Every create, update and delete performs exactly one
//! remote call and reconciles the list when it settles.
//!
//! - [`TodoReducer`] applies commands and their settled results
//! - [`TodoApi`] is the remote backend ([`HttpTodoApi`] or [`mocks::MockTodoApi`])
//! - [`filter`] projects the list for the All / Active / Completed views
//! - [`edit`] and [`bulk`] turn user intents into commands
//!
//! # Quick Start
//!
//! ```no_run
//! use todos::{TodoAction, TodoEnvironment, TodoReducer, TodoState, TodosConfig, UserId};
//! use todosync_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TodosConfig::new("http://localhost:3000").with_user_id(UserId::new(836));
//! let env = TodoEnvironment::from_config(&config)?;
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! // Load, then create; each handle resolves once the remote call settled
//! store.send(TodoAction::LoadTodos).await?.wait().await;
//! store.send(TodoAction::create(" buy milk ")).await?.wait().await;
//!
//! let left = store.state(TodoState::items_left).await;
//! println!("{left} items left");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod bulk;
pub mod config;
pub mod edit;
pub mod error;
pub mod filter;
pub mod mocks;
pub mod reducer;
pub mod types;

// Re-export commonly used types
pub use api::{HttpTodoApi, TodoApi};
pub use config::TodosConfig;
pub use edit::{EditOutcome, TitleEdit};
pub use error::{ApiError, ConfigError, TodoError};
pub use filter::Filter;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{NewTodo, Todo, TodoAction, TodoId, TodoState, UserId};

/// Store running the todo reducer
pub type TodoStore = todosync_runtime::Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
