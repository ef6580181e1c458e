//! Reducer logic for the todo list.
//!
//! Every command issues exactly one remote call through the environment's
//! [`TodoApi`] and returns it as an effect. The call settles into an event
//! that the reducer applies to whatever the collection looks like at that
//! moment, releasing the item's busy state in the same step. Update and
//! delete are never applied optimistically; create shows a placeholder.

use crate::api::{HttpTodoApi, TodoApi};
use crate::config::{TodosConfig, DEFAULT_ERROR_TIMEOUT};
use crate::error::{ConfigError, TodoError};
use crate::types::{NewTodo, Todo, TodoAction, TodoId, TodoState, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use todosync_core::{async_effect, delay, effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote backend
    pub api: Arc<dyn TodoApi>,
    /// Owner of every todo in the session
    pub user_id: UserId,
    /// How long an error stays visible
    pub error_timeout: Duration,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` with the default 3 s error timeout
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, user_id: UserId) -> Self {
        Self {
            api,
            user_id,
            error_timeout: DEFAULT_ERROR_TIMEOUT,
        }
    }

    /// Set the error auto-clear delay
    #[must_use]
    pub const fn with_error_timeout(mut self, timeout: Duration) -> Self {
        self.error_timeout = timeout;
        self
    }

    /// HTTP-backed environment for `config`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUserId`] without a user id, or
    /// [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn from_config(config: &TodosConfig) -> Result<Self, ConfigError> {
        let user_id = config.require_user_id()?;
        let api = HttpTodoApi::from_config(config)?;
        Ok(Self::new(Arc::new(api), user_id).with_error_timeout(config.error_timeout))
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("user_id", &self.user_id)
            .field("error_timeout", &self.error_timeout)
            .finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Show `error` and arm its auto-clear timer
    fn raise(state: &mut TodoState, error: TodoError, env: &TodoEnvironment) -> Effect<TodoAction> {
        let seq = state.raise(error);
        tracing::debug!(%error, seq, "Raised error");
        delay! {
            duration: env.error_timeout,
            action: TodoAction::DismissError { seq }
        }
    }

    /// Ask the presentation layer to focus the new-todo input once the
    /// current action has been applied
    fn refocus() -> Effect<TodoAction> {
        delay! {
            duration: Duration::ZERO,
            action: TodoAction::FocusNewTodoInput
        }
    }

    fn follow_up(on_success: Option<Box<TodoAction>>) -> Effect<TodoAction> {
        on_success.map_or(Effect::None, |action| Effect::send(*action))
    }

    /// Ids must be unique and the placeholder id never enters the collection
    fn sanitize_loaded(todos: Vec<Todo>) -> Vec<Todo> {
        let mut seen = HashSet::new();
        let total = todos.len();
        let todos: Vec<Todo> = todos
            .into_iter()
            .filter(|todo| !todo.id.is_temp() && seen.insert(todo.id))
            .collect();
        if todos.len() != total {
            tracing::warn!(
                dropped = total - todos.len(),
                "Loaded list contained placeholder or duplicate ids"
            );
        }
        todos
    }

    fn load(env: &TodoEnvironment) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        let user_id = env.user_id;
        async_effect! {
            match api.list(user_id).await {
                Ok(todos) => Some(TodoAction::TodosLoaded { todos }),
                Err(error) => {
                    tracing::warn!(%error, %user_id, "Loading todos failed");
                    Some(TodoAction::LoadFailed)
                },
            }
        }
    }

    fn create(new_todo: NewTodo, env: &TodoEnvironment) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        async_effect! {
            match api.create(new_todo).await {
                Ok(todo) => Some(TodoAction::TodoCreated { todo }),
                Err(error) => {
                    tracing::warn!(%error, "Creating todo failed");
                    Some(TodoAction::CreateFailed)
                },
            }
        }
    }

    fn update(
        todo: Todo,
        on_success: Option<Box<TodoAction>>,
        env: &TodoEnvironment,
    ) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        let id = todo.id;
        async_effect! {
            match api.update(todo).await {
                Ok(todo) => Some(TodoAction::TodoUpdated { id, todo, on_success }),
                Err(error) => {
                    tracing::warn!(%error, %id, "Updating todo failed");
                    Some(TodoAction::UpdateFailed { id })
                },
            }
        }
    }

    fn delete(
        id: TodoId,
        on_success: Option<Box<TodoAction>>,
        env: &TodoEnvironment,
    ) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        async_effect! {
            match api.delete(id).await {
                Ok(()) => Some(TodoAction::TodoDeleted { id, on_success }),
                Err(error) => {
                    tracing::warn!(%error, %id, "Deleting todo failed");
                    Some(TodoAction::DeleteFailed { id })
                },
            }
        }
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::LoadTodos => {
                tracing::debug!(user_id = %env.user_id, "Loading todos");
                smallvec![Self::load(env)]
            },

            TodoAction::CreateTodo { title } => {
                let title = title.trim();
                if title.is_empty() {
                    return smallvec![Self::raise(state, TodoError::EmptyTitle, env)];
                }
                if let Some(pending) = &state.temp_todo {
                    tracing::warn!(
                        pending = %pending.title,
                        "Ignoring create while another creation is in flight"
                    );
                    return SmallVec::new();
                }

                let new_todo = NewTodo::new(title, env.user_id);
                state.temp_todo = Some(new_todo.placeholder());
                tracing::debug!(title = %new_todo.title, "Creating todo");
                smallvec![Self::create(new_todo, env)]
            },

            TodoAction::UpdateTodo { todo, on_success } => {
                if todo.id.is_temp() {
                    tracing::warn!("Ignoring update of the placeholder todo");
                    return SmallVec::new();
                }
                state.processing.insert(todo.id);
                tracing::debug!(id = %todo.id, "Updating todo");
                smallvec![Self::update(todo, on_success, env)]
            },

            TodoAction::DeleteTodo { id, on_success } => {
                if id.is_temp() {
                    tracing::warn!("Ignoring delete of the placeholder todo");
                    return SmallVec::new();
                }
                state.processing.insert(id);
                tracing::debug!(%id, "Deleting todo");
                smallvec![Self::delete(id, on_success, env)]
            },

            // ========== Events ==========
            TodoAction::TodosLoaded { todos } => {
                state.todos = Self::sanitize_loaded(todos);
                tracing::info!(count = state.todos.len(), "Todos loaded");
                SmallVec::new()
            },

            TodoAction::LoadFailed => smallvec![Self::raise(state, TodoError::LoadTodos, env)],

            TodoAction::TodoCreated { todo } => {
                state.temp_todo = None;
                if todo.id.is_temp() {
                    tracing::warn!("Backend returned the placeholder id; dropping todo");
                } else {
                    state.upsert(todo);
                }
                smallvec![Self::refocus()]
            },

            TodoAction::CreateFailed => {
                state.temp_todo = None;
                smallvec![Self::raise(state, TodoError::AddTodo, env), Self::refocus()]
            },

            TodoAction::TodoUpdated {
                id,
                todo,
                on_success,
            } => {
                state.processing.remove(&id);
                if !state.replace(id, todo) {
                    tracing::debug!(%id, "Updated todo no longer in the list");
                }
                smallvec![Self::follow_up(on_success)]
            },

            TodoAction::UpdateFailed { id } => {
                state.processing.remove(&id);
                smallvec![Self::raise(state, TodoError::UpdateTodo, env)]
            },

            TodoAction::TodoDeleted { id, on_success } => {
                state.processing.remove(&id);
                state.remove(id);
                smallvec![Self::follow_up(on_success)]
            },

            TodoAction::DeleteFailed { id } => {
                state.processing.remove(&id);
                smallvec![Self::raise(state, TodoError::DeleteTodo, env)]
            },

            // ========== Timers and UI cues ==========
            TodoAction::DismissError { seq } => {
                if !state.dismiss(seq) {
                    tracing::trace!(seq, "Stale error timer");
                }
                SmallVec::new()
            },

            TodoAction::ClearError => {
                state.error = None;
                SmallVec::new()
            },

            TodoAction::FocusNewTodoInput => {
                state.focus_requests += 1;
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{ApiCall, ApiOperation, MockTodoApi};
    use std::collections::VecDeque;
    use todosync_testing::{assertions, effects, ReducerTest};

    const USER: UserId = UserId::new(836);
    const TIMEOUT: Duration = Duration::from_secs(3);

    fn todo(id: u64, title: &str, completed: bool) -> Todo {
        Todo::new(TodoId::new(id), USER, title, completed)
    }

    fn create_test_env(api: &MockTodoApi) -> TodoEnvironment {
        todosync_testing::init_test_tracing();
        TodoEnvironment::new(Arc::new(api.clone()), USER)
    }

    fn test_env() -> TodoEnvironment {
        create_test_env(&MockTodoApi::new())
    }

    /// Reduce `action` and feed every produced action back in until nothing
    /// is left, except error timers, which are returned unfired
    async fn dispatch(
        state: &mut TodoState,
        action: TodoAction,
        env: &TodoEnvironment,
    ) -> Vec<TodoAction> {
        let reducer = TodoReducer::new();
        let mut queue = VecDeque::from([action]);
        let mut timers = Vec::new();
        while let Some(action) = queue.pop_front() {
            if matches!(action, TodoAction::DismissError { .. }) {
                timers.push(action);
                continue;
            }
            let produced = effects::drain(reducer.reduce(state, action, env)).await;
            queue.extend(produced);
        }
        timers
    }

    #[test]
    fn test_create_todo_empty_title() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::create("   \t "))
            .then_state(|state| {
                assert_eq!(state.count(), 0);
                assert_eq!(state.temp_todo, None);
                assert_eq!(state.error_kind(), Some(TodoError::EmptyTitle));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                let action = assertions::assert_has_delay(effects, TIMEOUT);
                assert!(matches!(action, TodoAction::DismissError { .. }));
            })
            .run();
    }

    #[tokio::test]
    async fn empty_title_never_calls_the_api() {
        let api = MockTodoApi::new();
        let mut state = TodoState::new();
        dispatch(&mut state, TodoAction::create(""), &create_test_env(&api)).await;

        assert!(api.calls().is_empty());
        assert_eq!(state.error_message().as_deref(), Some("Title should not be empty"));
    }

    #[test]
    fn test_create_installs_placeholder() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::create("  walk the dog "))
            .then_state(|state| {
                let temp = state.temp_todo.as_ref().unwrap();
                assert_eq!(temp.id, TodoId::TEMP);
                assert_eq!(temp.title, "walk the dog");
                assert_eq!(temp.user_id, USER);
                assert!(!temp.completed);
                assert_eq!(state.count(), 0);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_second_create_while_pending_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::create("first"))
            .when_action(TodoAction::create("second"))
            .then_state(|state| {
                assert_eq!(state.temp_todo.as_ref().unwrap().title, "first");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn create_success_appends_server_todo() {
        let api = MockTodoApi::new().with_next_id(5);
        let env = create_test_env(&api);
        let mut state = TodoState::with_todos(vec![todo(1, "A", false)]);

        let timers = dispatch(&mut state, TodoAction::create(" buy milk "), &env).await;

        assert!(timers.is_empty());
        assert_eq!(state.todos, vec![todo(1, "A", false), todo(5, "buy milk", false)]);
        assert_eq!(state.temp_todo, None);
        assert_eq!(state.error, None);
        assert_eq!(state.focus_requests, 1);
        assert_eq!(
            api.calls(),
            vec![ApiCall::Create(NewTodo::new("buy milk", USER))]
        );
    }

    #[tokio::test]
    async fn create_failure_keeps_collection() {
        let api = MockTodoApi::new();
        api.fail(ApiOperation::Create);
        let env = create_test_env(&api);
        let mut state = TodoState::with_todos(vec![todo(1, "A", false)]);

        let timers = dispatch(&mut state, TodoAction::create("B"), &env).await;

        assert_eq!(state.todos, vec![todo(1, "A", false)]);
        assert_eq!(state.temp_todo, None);
        assert_eq!(state.error_kind(), Some(TodoError::AddTodo));
        assert_eq!(state.focus_requests, 1);
        assert_eq!(timers.len(), 1);
    }

    #[tokio::test]
    async fn load_replaces_collection() {
        let api = MockTodoApi::new().with_todos(vec![todo(3, "x", true), todo(4, "y", false)]);
        let env = create_test_env(&api);
        let mut state = TodoState::with_todos(vec![todo(1, "stale", false)]);

        dispatch(&mut state, TodoAction::LoadTodos, &env).await;

        assert_eq!(state.todos, vec![todo(3, "x", true), todo(4, "y", false)]);
        assert!(state.processing.is_empty());
        assert_eq!(api.calls(), vec![ApiCall::List(USER)]);
    }

    #[tokio::test]
    async fn load_failure_raises_error() {
        let api = MockTodoApi::new();
        api.fail(ApiOperation::List);
        let mut state = TodoState::new();

        dispatch(&mut state, TodoAction::LoadTodos, &create_test_env(&api)).await;

        assert_eq!(state.error_message().as_deref(), Some("Unable to load todos"));
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn test_loaded_list_drops_placeholder_and_duplicate_ids() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::TodosLoaded {
                todos: vec![todo(0, "temp", false), todo(1, "a", false), todo(1, "again", true)],
            })
            .then_state(|state| {
                assert_eq!(state.todos, vec![todo(1, "a", false)]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_update_marks_processing_without_applying() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::with_todos(vec![todo(1, "A", false)]))
            .when_action(TodoAction::update(todo(1, "A", true)))
            .then_state(|state| {
                assert!(state.is_processing(TodoId::new(1)));
                assert!(!state.get(TodoId::new(1)).unwrap().completed);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn update_success_replaces_and_runs_follow_up() {
        let api = MockTodoApi::new().with_todos(vec![todo(1, "A", false), todo(2, "B", false)]);
        let env = create_test_env(&api);
        let mut state = TodoState::with_todos(api.todos());

        let action = TodoAction::update(todo(1, "A", true)).on_success(TodoAction::FocusNewTodoInput);
        dispatch(&mut state, action, &env).await;

        assert_eq!(state.todos, vec![todo(1, "A", true), todo(2, "B", false)]);
        assert!(state.processing.is_empty());
        assert_eq!(state.focus_requests, 1);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn update_failure_keeps_item() {
        let api = MockTodoApi::new().with_todos(vec![todo(1, "A", false)]);
        api.fail_id(TodoId::new(1));
        let env = create_test_env(&api);
        let mut state = TodoState::with_todos(api.todos());

        let action = TodoAction::update(todo(1, "renamed", false)).on_success(TodoAction::FocusNewTodoInput);
        dispatch(&mut state, action, &env).await;

        assert_eq!(state.todos, vec![todo(1, "A", false)]);
        assert!(state.processing.is_empty());
        assert_eq!(state.error_kind(), Some(TodoError::UpdateTodo));
        assert_eq!(state.focus_requests, 0);
    }

    #[test]
    fn test_update_for_removed_item_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::with_todos(vec![todo(2, "B", false)]))
            .when_action(TodoAction::TodoUpdated {
                id: TodoId::new(1),
                todo: todo(1, "A", true),
                on_success: None,
            })
            .then_state(|state| {
                assert_eq!(state.todos, vec![todo(2, "B", false)]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_placeholder_is_never_updated_or_deleted() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::update(todo(0, "temp", true)))
            .when_action(TodoAction::delete(TodoId::TEMP))
            .then_state(|state| {
                assert!(state.processing.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn delete_success_removes_exactly_that_id() {
        let api = MockTodoApi::new().with_todos(vec![todo(1, "A", false), todo(2, "B", true)]);
        let env = create_test_env(&api);
        let mut state = TodoState::with_todos(api.todos());

        let action = TodoAction::delete(TodoId::new(2)).on_success(TodoAction::FocusNewTodoInput);
        dispatch(&mut state, action, &env).await;

        assert_eq!(state.todos, vec![todo(1, "A", false)]);
        assert!(state.processing.is_empty());
        assert_eq!(state.focus_requests, 1);
    }

    #[tokio::test]
    async fn delete_failure_leaves_collection_and_skips_callback() {
        let api = MockTodoApi::new().with_todos(vec![todo(1, "A", false)]);
        api.fail(ApiOperation::Delete);
        let env = create_test_env(&api);
        let mut state = TodoState::with_todos(api.todos());

        let action = TodoAction::delete(TodoId::new(1)).on_success(TodoAction::FocusNewTodoInput);
        let timers = dispatch(&mut state, action, &env).await;

        assert_eq!(state.todos, vec![todo(1, "A", false)]);
        assert!(state.processing.is_empty());
        assert_eq!(state.error_kind(), Some(TodoError::DeleteTodo));
        assert_eq!(state.focus_requests, 0);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_newer_error_survives_older_timer() {
        let mut state = TodoState::new();
        let env = test_env();
        let reducer = TodoReducer::new();

        let first = reducer.reduce(&mut state, TodoAction::LoadFailed, &env);
        let first_timer = assertions::assert_has_delay(&first, TIMEOUT).clone();
        let second = reducer.reduce(&mut state, TodoAction::DeleteFailed { id: TodoId::new(1) }, &env);
        let second_timer = assertions::assert_has_delay(&second, TIMEOUT).clone();

        reducer.reduce(&mut state, first_timer, &env);
        assert_eq!(state.error_kind(), Some(TodoError::DeleteTodo));

        reducer.reduce(&mut state, second_timer, &env);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_custom_error_timeout() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env().with_error_timeout(Duration::from_millis(250)))
            .given_state(TodoState::new())
            .when_action(TodoAction::UpdateFailed { id: TodoId::new(4) })
            .then_effects(|effects| {
                assertions::assert_has_delay(effects, Duration::from_millis(250));
            })
            .run();
    }

    #[test]
    fn test_clear_error() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::CreateFailed)
            .when_action(TodoAction::ClearError)
            .then_state(|state| {
                assert_eq!(state.error, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_create_failure_refocuses() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::CreateFailed)
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                let focus = assertions::assert_has_delay(effects, Duration::ZERO);
                assert_eq!(*focus, TodoAction::FocusNewTodoInput);
            })
            .run();
    }

    #[test]
    fn test_environment_from_config_requires_user() {
        let missing = TodoEnvironment::from_config(&TodosConfig::default());
        assert!(matches!(missing, Err(ConfigError::MissingUserId)));

        let config = TodosConfig::default()
            .with_user_id(USER)
            .with_error_timeout(Duration::from_secs(1));
        let env = TodoEnvironment::from_config(&config).unwrap();
        assert_eq!(env.user_id, USER);
        assert_eq!(env.error_timeout, Duration::from_secs(1));
    }
}
