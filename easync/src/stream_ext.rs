use crate::AsyncState;
use futures_core::stream::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Extension methods for streams of [`AsyncState`] snapshots, such as the one
/// returned by [`AsyncController::to_stream`](crate::AsyncController::to_stream).
pub trait AsyncStateStreamExt<T: Clone>: Stream<Item = AsyncState<T>> {
    /// Yields snapshots up to and including the first settled one, then ends.
    ///
    /// ## Examples
    ///
    /// ```
    /// use easync::{AsyncController, AsyncOptions, AsyncStateStreamExt};
    /// use futures::StreamExt;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let controller = AsyncController::attach(
    ///     |id: u32| async move { Ok::<_, String>(id * 2) },
    ///     21,
    ///     AsyncOptions::default(),
    /// );
    /// let last = controller.to_stream().until_settled().collect::<Vec<_>>().await;
    /// assert_eq!(last.last().and_then(|state| state.result.clone()), Some(42));
    /// # }
    /// ```
    fn until_settled(self) -> UntilSettled<Self>
    where
        Self: Sized,
    {
        UntilSettled {
            stream: self,
            settled: false,
        }
    }
}

impl<T: Clone, S: ?Sized> AsyncStateStreamExt<T> for S where S: Stream<Item = AsyncState<T>> {}

/// Stream returned by [`AsyncStateStreamExt::until_settled`].
#[pin_project(project = UntilSettledProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct UntilSettled<S> {
    #[pin]
    stream: S,
    settled: bool,
}

impl<S, T> Stream for UntilSettled<S>
where
    S: Stream<Item = AsyncState<T>>,
    T: Clone,
{
    type Item = AsyncState<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let UntilSettledProj { stream, settled } = self.project();
        if *settled {
            return Poll::Ready(None);
        }
        match stream.poll_next(cx) {
            Poll::Ready(Some(state)) => {
                *settled = state.is_complete();
                Poll::Ready(Some(state))
            }
            Poll::Ready(None) => {
                *settled = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
