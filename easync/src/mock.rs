use crate::{AsyncError, Output};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// One recorded invocation of a [`ManualOperation`].
struct PendingCall<A, T> {
    args: A,
    sender: Option<oneshot::Sender<Result<T, AsyncError>>>,
}

/// An operation whose invocations only settle when told to.
///
/// Every call made through [`function`](ManualOperation::function) is
/// recorded in order and stays pending until [`resolve`](ManualOperation::resolve)
/// or [`reject`](ManualOperation::reject) is called with its index. This makes
/// settlement order fully controllable, which is what race tests need.
pub struct ManualOperation<A, T> {
    calls: Arc<Mutex<Vec<PendingCall<A, T>>>>,
}

impl<A, T> Clone for ManualOperation<A, T> {
    fn clone(&self) -> Self {
        ManualOperation {
            calls: self.calls.clone(),
        }
    }
}

impl<A, T> Default for ManualOperation<A, T> {
    fn default() -> Self {
        ManualOperation {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A, T> ManualOperation<A, T>
where
    A: Clone + Send + 'static,
    T: Output,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<PendingCall<A, T>>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The operation to hand to a controller.
    pub fn function(
        &self,
    ) -> impl Fn(A) -> BoxFuture<'static, Result<T, AsyncError>> + Send + Sync + 'static {
        let calls = self.calls.clone();
        move |args| {
            let (sender, receiver) = oneshot::channel();
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(PendingCall {
                    args,
                    sender: Some(sender),
                });
            async move {
                receiver
                    .await
                    .unwrap_or_else(|_| Err(AsyncError::message("manual operation dropped")))
            }
            .boxed()
        }
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Arguments of every call so far, oldest first.
    pub fn calls(&self) -> Vec<A> {
        self.lock_calls().iter().map(|call| call.args.clone()).collect()
    }

    /// Fulfills call `index`. Returns false if there is no such call or it
    /// has already settled.
    pub fn resolve(&self, index: usize, value: T) -> bool {
        self.settle(index, Ok(value))
    }

    /// Rejects call `index` with `message`.
    pub fn reject(&self, index: usize, message: impl Into<String>) -> bool {
        self.settle(index, Err(AsyncError::Error(message.into())))
    }

    fn settle(&self, index: usize, outcome: Result<T, AsyncError>) -> bool {
        let sender = self
            .lock_calls()
            .get_mut(index)
            .and_then(|call| call.sender.take());
        match sender {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        }
    }
}
