use crate::operation::SharedOutcome;
use crate::{
    AsyncError, AsyncOptions, AsyncState, AsyncStatePatch, AsyncStatus, ErrorCallback,
    ExecutionResult, Mountedness, OperationHandle, OperationId, Output, Params,
    SettlementContext, SuccessCallback,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use futures_signals::signal::{Mutable, MutableSignalCloned, Signal, SignalExt, SignalStream};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

type BoxedFunction<A, T> =
    Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, AsyncError>> + Send + Sync>;

struct Slot<A: Params, T: Output> {
    function: BoxedFunction<A, T>,
    options: AsyncOptions<T>,
    watched_args: A,
    current: Option<OperationHandle<A, T>>,
}

struct Inner<A: Params, T: Output> {
    state: Mutable<AsyncState<T>>,
    slot: Mutex<Slot<A, T>>,
    // Only advanced while `slot` is held; read lock-free by settlement contexts.
    latest: Arc<AtomicU64>,
    mountedness: Mountedness,
}

impl<A: Params, T: Output> Inner<A, T> {
    fn lock_slot(&self) -> MutexGuard<'_, Slot<A, T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, id: OperationId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }

    fn settle(&self, id: OperationId, outcome: &Result<T, AsyncError>) {
        let context = SettlementContext::new(id, self.latest.clone(), self.mountedness.clone());
        let callbacks = {
            let slot = self.lock_slot();
            if self.is_current(id) && self.mountedness.is_mounted() {
                let previous = self.state.get_cloned();
                let next = match outcome {
                    Ok(result) => (slot.options.set_result)(result.clone(), &previous),
                    Err(error) => (slot.options.set_error)(error.clone(), &previous),
                };
                debug!(operation = %id, status = %next.status, "operation settled");
                self.state.set(next);
            } else {
                trace!(
                    operation = %id,
                    mounted = self.mountedness.is_mounted(),
                    "dropping settlement of a superseded or detached operation"
                );
            }
            Callbacks::from(&slot.options)
        };
        callbacks.notify(outcome, &context);
    }
}

/// `on_success` / `on_error` taken out of the options, so they can be called
/// without holding the slot lock, or after the controller is gone.
struct Callbacks<T: Output> {
    on_success: SuccessCallback<T>,
    on_error: ErrorCallback,
}

impl<T: Output> From<&AsyncOptions<T>> for Callbacks<T> {
    fn from(options: &AsyncOptions<T>) -> Self {
        Callbacks {
            on_success: options.on_success.clone(),
            on_error: options.on_error.clone(),
        }
    }
}

impl<T: Output> Callbacks<T> {
    fn notify(&self, outcome: &Result<T, AsyncError>, context: &SettlementContext) {
        match outcome {
            Ok(result) => (self.on_success)(result, context),
            Err(error) => (self.on_error)(error, context),
        }
    }
}

/// Tracks one asynchronous operation on behalf of one consumer.
///
/// The controller owns the visible [`AsyncState`] and the identity of the
/// latest operation. Every call to [`execute`](Self::execute) supersedes the
/// previous one: older operations keep running, but when they settle their
/// outcome only reaches the `on_success` / `on_error` callbacks, never the
/// state. Settlements after [`detach`](Self::detach) are treated the same way.
///
/// Clones share the same controller. All methods that start work must be
/// called from within a tokio runtime.
pub struct AsyncController<A: Params, T: Output> {
    inner: Arc<Inner<A, T>>,
}

impl<A: Params, T: Output> Clone for AsyncController<A, T> {
    fn clone(&self) -> Self {
        AsyncController {
            inner: self.inner.clone(),
        }
    }
}

fn box_function<A, T, F, Fut, R>(function: F) -> BoxedFunction<A, T>
where
    A: Params,
    T: Output,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: ExecutionResult<T> + Send + 'static,
{
    Arc::new(move |args| {
        let future = function(args);
        async move { future.await.into_outcome() }.boxed()
    })
}

impl<A: Params, T: Output> AsyncController<A, T> {
    /// Attaches a controller for `function`, watching `watched_args`.
    ///
    /// The controller starts mounted. With `execute_on_mount` set, the first
    /// operation is started right away with `watched_args`.
    pub fn attach<F, Fut, R>(function: F, watched_args: A, options: AsyncOptions<T>) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: ExecutionResult<T> + Send + 'static,
    {
        let execute_on_mount = options.execute_on_mount;
        let controller = AsyncController {
            inner: Arc::new(Inner {
                state: Mutable::new(options.build_initial_state()),
                slot: Mutex::new(Slot {
                    function: box_function(function),
                    options,
                    watched_args: watched_args.clone(),
                    current: None,
                }),
                latest: Arc::new(AtomicU64::new(0)),
                mountedness: Mountedness::new(),
            }),
        };
        controller.inner.mountedness.mount();
        debug!(execute_on_mount, "controller attached");
        if execute_on_mount {
            let _ = controller.execute(watched_args);
        }
        controller
    }

    /// Attaches a controller that only runs on explicit `execute` calls,
    /// whatever `options` says about mount and update.
    pub fn attach_callback<F, Fut, R>(function: F, options: AsyncOptions<T>) -> Self
    where
        A: Default,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: ExecutionResult<T> + Send + 'static,
    {
        let options = options.execute_on_mount(false).execute_on_update(false);
        Self::attach(function, A::default(), options)
    }

    /// Starts a new operation with `args` and makes it the current one.
    ///
    /// The state switches to loading before this returns. The operation is
    /// driven on a spawned task, so it settles whether or not the returned
    /// handle is awaited.
    pub fn execute(&self, args: A) -> OperationHandle<A, T> {
        let function = self.inner.lock_slot().function.clone();
        let operation = match panic::catch_unwind(AssertUnwindSafe(|| function(args.clone()))) {
            Ok(operation) => operation,
            Err(payload) => futures::future::ready(Err(AsyncError::from_panic(payload))).boxed(),
        };

        let handle = {
            let mut slot = self.inner.lock_slot();
            let id = OperationId(self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1);

            // Weak: the handle stored in `slot.current` owns this future.
            let inner = Arc::downgrade(&self.inner);
            let orphaned = Callbacks::from(&slot.options);
            let context = SettlementContext::new(
                id,
                self.inner.latest.clone(),
                self.inner.mountedness.clone(),
            );
            let outcome: SharedOutcome<T> = async move {
                let outcome = match AssertUnwindSafe(operation).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(payload) => Err(AsyncError::from_panic(payload)),
                };
                match inner.upgrade() {
                    Some(inner) => inner.settle(id, &outcome),
                    None => {
                        trace!(operation = %id, "controller dropped before settlement");
                        orphaned.notify(&outcome, &context);
                    }
                }
                outcome
            }
            .boxed()
            .shared();

            let handle = OperationHandle::new(id, args, outcome);
            slot.current = Some(handle.clone());
            let loading = (slot.options.set_loading)(&self.inner.state.get_cloned());
            self.inner.state.set(loading);
            debug!(operation = %id, "operation started");
            handle
        };

        tokio::spawn(handle.clone());
        handle
    }

    /// Feeds a new value of the watched arguments.
    ///
    /// Values equal to the last one are ignored. A changed value is recorded,
    /// and while mounted with `execute_on_update` set it also starts an
    /// operation, whose handle is returned.
    pub fn update_args(&self, args: A) -> Option<OperationHandle<A, T>> {
        let execute_on_update = {
            let mut slot = self.inner.lock_slot();
            if slot.watched_args == args {
                return None;
            }
            slot.watched_args = args.clone();
            slot.options.execute_on_update
        };
        if execute_on_update && self.is_mounted() {
            Some(self.execute(args))
        } else {
            None
        }
    }

    /// Subscribes to `signal` as the source of watched arguments, passing every
    /// value to [`update_args`](Self::update_args). Aborting the returned task
    /// unsubscribes.
    pub fn bind_args<S>(&self, signal: S) -> JoinHandle<()>
    where
        S: Signal<Item = A> + Send + 'static,
    {
        let controller = self.clone();
        tokio::spawn(signal.for_each(move |args| {
            let _ = controller.update_args(args);
            async {}
        }))
    }

    /// Replaces the operation and the options in place. Operations already
    /// running report to the callbacks configured when they settle, or to the
    /// ones they started with if the controller is gone by then.
    pub fn configure<F, Fut, R>(&self, function: F, options: AsyncOptions<T>)
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: ExecutionResult<T> + Send + 'static,
    {
        let mut slot = self.inner.lock_slot();
        slot.function = box_function(function);
        slot.options = options;
    }

    /// Marks the consumer as gone. Operations still running will settle
    /// without touching the state.
    pub fn detach(&self) {
        self.inner.mountedness.unmount();
        debug!("controller detached");
    }

    /// Restores the initial state. Running operations are left alone.
    pub fn reset(&self) {
        let slot = self.inner.lock_slot();
        self.inner.state.set(slot.options.build_initial_state());
    }

    /// Replaces the whole state snapshot.
    pub fn set(&self, state: AsyncState<T>) {
        let _slot = self.inner.lock_slot();
        if !state.is_consistent() {
            warn!(status = %state.status, "state set to an inconsistent snapshot");
        }
        self.inner.state.set(state);
    }

    /// Overwrites the fields `patch` carries. Nothing stops the patch from
    /// leaving `status` at odds with `result` / `error`.
    pub fn merge(&self, patch: AsyncStatePatch<T>) {
        let _slot = self.inner.lock_slot();
        let merged = self.inner.state.lock_ref().merge(patch);
        if !merged.is_consistent() {
            warn!(status = %merged.status, "merge produced an inconsistent state");
        }
        self.inner.state.set(merged);
    }

    pub fn state(&self) -> AsyncState<T> {
        self.inner.state.get_cloned()
    }

    pub fn status(&self) -> AsyncStatus {
        self.inner.state.lock_ref().status
    }

    pub fn loading(&self) -> bool {
        self.inner.state.lock_ref().loading
    }

    pub fn result(&self) -> Option<T> {
        self.inner.state.lock_ref().result.clone()
    }

    pub fn error(&self) -> Option<AsyncError> {
        self.inner.state.lock_ref().error.clone()
    }

    /// Arguments of the most recent `execute` call.
    pub fn current_params(&self) -> Option<A> {
        self.inner
            .lock_slot()
            .current
            .as_ref()
            .map(|handle| handle.args().clone())
    }

    /// Handle of the most recent `execute` call.
    pub fn current_promise(&self) -> Option<OperationHandle<A, T>> {
        self.inner.lock_slot().current.clone()
    }

    pub fn watched_args(&self) -> A {
        self.inner.lock_slot().watched_args.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mountedness.is_mounted()
    }

    /// The attach/detach flag, for consumers that drive or observe it.
    pub fn mountedness(&self) -> Mountedness {
        self.inner.mountedness.clone()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<AsyncState<T>> {
        self.inner.state.signal_cloned()
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<AsyncState<T>>> {
        self.inner.state.signal_cloned().to_stream()
    }
}
