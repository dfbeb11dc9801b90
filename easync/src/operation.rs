use crate::{AsyncError, Mountedness};
use futures::future::{BoxFuture, Shared};
use pin_project::pin_project;
use std::fmt::{Debug, Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Identity of one `execute` call. Ids grow monotonically per controller,
/// and the controller's latest id decides which operation is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub u64);

impl Display for OperationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type SharedOutcome<T> = Shared<BoxFuture<'static, Result<T, AsyncError>>>;

/// One in-flight (or settled) invocation.
///
/// Awaiting the handle yields the operation's outcome whether or not that
/// outcome made it into the controller's state. Clones await the same run.
#[pin_project]
#[derive(Clone)]
#[must_use = "dropping the handle does not stop the operation"]
pub struct OperationHandle<A, T: Clone> {
    id: OperationId,
    args: A,
    #[pin]
    outcome: SharedOutcome<T>,
}

impl<A, T: Clone> OperationHandle<A, T> {
    pub(crate) fn new(id: OperationId, args: A, outcome: SharedOutcome<T>) -> Self {
        OperationHandle { id, args, outcome }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn args(&self) -> &A {
        &self.args
    }

    /// Same invocation, compared by identity rather than by arguments.
    pub fn is_same(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// The outcome, once the operation has settled and been processed.
    pub fn outcome(&self) -> Option<Result<T, AsyncError>> {
        self.outcome.peek().cloned()
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.peek().is_some()
    }
}

impl<A, T: Clone> Future for OperationHandle<A, T> {
    type Output = Result<T, AsyncError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().outcome.poll(cx)
    }
}

impl<A: Debug, T: Clone> Debug for OperationHandle<A, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandle")
            .field("id", &self.id)
            .field("args", &self.args)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Passed to `on_success` / `on_error` so callbacks can tell whether the
/// outcome they receive still matters.
#[derive(Debug, Clone)]
pub struct SettlementContext {
    id: OperationId,
    latest: Arc<AtomicU64>,
    mountedness: Mountedness,
}

impl SettlementContext {
    pub(crate) fn new(id: OperationId, latest: Arc<AtomicU64>, mountedness: Mountedness) -> Self {
        SettlementContext {
            id,
            latest,
            mountedness,
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Whether no newer operation has been started since this one. Evaluated
    /// on every call, not frozen at settlement time.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id.0
    }

    pub fn is_mounted(&self) -> bool {
        self.mountedness.is_mounted()
    }
}
