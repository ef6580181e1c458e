//! Declarative macros for ergonomic effect construction
//!
//! Remote calls and timers make up nearly every effect the todo reducer
//! returns; these macros keep those call sites short.

/// Create an `Effect::Future` from an async block
///
/// The block evaluates to `Option<Action>`; `Some` is fed back into the store.
///
/// # Example
///
/// ```rust
/// use todosync_core::async_effect;
/// use todosync_core::effect::Effect;
///
/// #[derive(Debug)]
/// enum Action {
///     Loaded { count: usize },
/// }
///
/// let effect: Effect<Action> = async_effect! {
///     Some(Action::Loaded { count: 3 })
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust
/// use todosync_core::delay;
/// use todosync_core::effect::Effect;
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// enum Action {
///     DismissError { seq: u64 },
/// }
///
/// let effect: Effect<Action> = delay! {
///     duration: Duration::from_secs(3),
///     action: Action::DismissError { seq: 1 }
/// };
/// assert!(matches!(effect, Effect::Delay { .. }));
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
