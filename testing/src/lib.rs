//! # todosync testing
//!
//! Testing utilities and helpers for the todosync state layer.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`assertions`]: effect assertion helpers
//! - [`effects::drain`]: run effect descriptions inline and collect the
//!   actions they produce, without a Store
//! - [`init_test_tracing`]: opt-in log output for debugging a test
//!
//! ## Example
//!
//! ```ignore
//! use todosync_testing::{effects, ReducerTest};
//!
//! #[tokio::test]
//! async fn delete_settles() {
//!     let mut state = TodoState::default();
//!     let effects = TodoReducer::new().reduce(&mut state, TodoAction::delete(1), &env);
//!     let actions = effects::drain(effects).await;
//!     assert!(matches!(actions[0], TodoAction::TodoDeleted { .. }));
//! }
//! ```


/// Inline execution of effect descriptions
pub mod effects {
    use todosync_core::effect::Effect;

    /// Run effects to completion and collect the actions they produce
    ///
    /// Futures are awaited one after another in declaration order, so the
    /// result is deterministic even when the store would run them
    /// concurrently. Delays do not sleep: their action is collected
    /// immediately.
    pub async fn drain<A, I>(effects: I) -> Vec<A>
    where
        A: Send + 'static,
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();
        for effect in effects {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        actions.push(action);
                    }
                },
                Effect::Delay { action, .. } => actions.push(*action),
            }
        }
        actions
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`; safe to call from many tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub use reducer_test::{assertions, ReducerTest};
