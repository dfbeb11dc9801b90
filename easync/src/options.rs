use crate::{AsyncError, AsyncState, Output, SettlementContext};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub type SuccessCallback<T> = Arc<dyn Fn(&T, &SettlementContext) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&AsyncError, &SettlementContext) + Send + Sync>;
pub type LoadingTransition<T> = Arc<dyn Fn(&AsyncState<T>) -> AsyncState<T> + Send + Sync>;
pub type ResultTransition<T> = Arc<dyn Fn(T, &AsyncState<T>) -> AsyncState<T> + Send + Sync>;
pub type ErrorTransition<T> =
    Arc<dyn Fn(AsyncError, &AsyncState<T>) -> AsyncState<T> + Send + Sync>;
pub type InitialStateFactory<T> =
    Arc<dyn Fn(&AsyncOptions<T>) -> AsyncState<T> + Send + Sync>;

/// How a controller behaves: when it runs on its own, what it reports, and
/// how each lifecycle step rewrites its state.
///
/// Defaults: run on mount and on every watched-argument change, ignore
/// settlements, and use the [`AsyncState`] transitions.
///
/// ```
/// use easync::AsyncOptions;
///
/// let options = AsyncOptions::<String>::default()
///     .execute_on_update(false)
///     .on_error(|error, context| {
///         if context.is_current() {
///             eprintln!("request failed: {error}");
///         }
///     });
/// assert!(options.execute_on_mount);
/// assert!(!options.execute_on_update);
/// ```
#[derive(Clone)]
pub struct AsyncOptions<T: Output> {
    pub execute_on_mount: bool,
    pub execute_on_update: bool,
    pub(crate) on_success: SuccessCallback<T>,
    pub(crate) on_error: ErrorCallback,
    pub(crate) set_loading: LoadingTransition<T>,
    pub(crate) set_result: ResultTransition<T>,
    pub(crate) set_error: ErrorTransition<T>,
    pub(crate) initial_state: InitialStateFactory<T>,
}

impl<T: Output> Default for AsyncOptions<T> {
    fn default() -> Self {
        AsyncOptions {
            execute_on_mount: true,
            execute_on_update: true,
            on_success: Arc::new(|_: &T, _: &SettlementContext| {}),
            on_error: Arc::new(|_: &AsyncError, _: &SettlementContext| {}),
            set_loading: Arc::new(|previous: &AsyncState<T>| previous.to_loading()),
            set_result: Arc::new(|result: T, previous: &AsyncState<T>| previous.to_success(result)),
            set_error: Arc::new(|error: AsyncError, previous: &AsyncState<T>| {
                previous.to_error(error)
            }),
            initial_state: Arc::new(AsyncState::<T>::initial),
        }
    }
}

impl<T: Output> AsyncOptions<T> {
    /// Options for a controller that only runs when `execute` is called.
    pub fn callback() -> Self {
        Self::default()
            .execute_on_mount(false)
            .execute_on_update(false)
    }

    pub fn execute_on_mount(self, execute_on_mount: bool) -> Self {
        Self {
            execute_on_mount,
            ..self
        }
    }

    pub fn execute_on_update(self, execute_on_update: bool) -> Self {
        Self {
            execute_on_update,
            ..self
        }
    }

    /// Called for every fulfilled operation, current or not, mounted or not.
    pub fn on_success<F>(self, on_success: F) -> Self
    where
        F: Fn(&T, &SettlementContext) + Send + Sync + 'static,
    {
        Self {
            on_success: Arc::new(on_success),
            ..self
        }
    }

    /// Called for every failed operation, current or not, mounted or not.
    pub fn on_error<F>(self, on_error: F) -> Self
    where
        F: Fn(&AsyncError, &SettlementContext) + Send + Sync + 'static,
    {
        Self {
            on_error: Arc::new(on_error),
            ..self
        }
    }

    /// Runs while the controller holds its internal lock: the transition must
    /// not call back into the controller.
    pub fn set_loading<F>(self, set_loading: F) -> Self
    where
        F: Fn(&AsyncState<T>) -> AsyncState<T> + Send + Sync + 'static,
    {
        Self {
            set_loading: Arc::new(set_loading),
            ..self
        }
    }

    /// Runs while the controller holds its internal lock: the transition must
    /// not call back into the controller.
    pub fn set_result<F>(self, set_result: F) -> Self
    where
        F: Fn(T, &AsyncState<T>) -> AsyncState<T> + Send + Sync + 'static,
    {
        Self {
            set_result: Arc::new(set_result),
            ..self
        }
    }

    /// Runs while the controller holds its internal lock: the transition must
    /// not call back into the controller.
    pub fn set_error<F>(self, set_error: F) -> Self
    where
        F: Fn(AsyncError, &AsyncState<T>) -> AsyncState<T> + Send + Sync + 'static,
    {
        Self {
            set_error: Arc::new(set_error),
            ..self
        }
    }

    pub fn initial_state<F>(self, initial_state: F) -> Self
    where
        F: Fn(&AsyncOptions<T>) -> AsyncState<T> + Send + Sync + 'static,
    {
        Self {
            initial_state: Arc::new(initial_state),
            ..self
        }
    }

    /// The snapshot these options start from.
    pub fn build_initial_state(&self) -> AsyncState<T> {
        (self.initial_state)(self)
    }
}

impl<T: Output> Debug for AsyncOptions<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncOptions")
            .field("execute_on_mount", &self.execute_on_mount)
            .field("execute_on_update", &self.execute_on_update)
            .finish_non_exhaustive()
    }
}
