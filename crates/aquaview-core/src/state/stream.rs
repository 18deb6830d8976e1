// ── Reactive state stream ──
//
// Async subscription handle over the container's watch mirror, for
// consumers that live outside the synchronous render pipeline.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::ViewState;

/// A subscription to committed view-state snapshots.
///
/// Provides both point-in-time snapshot access and change notification
/// via `changed()`, or conversion to a `Stream`.
pub struct StateStream {
    current: Arc<ViewState>,
    receiver: watch::Receiver<Arc<ViewState>>,
}

impl StateStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<ViewState>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time (or the last `changed()`).
    pub fn current(&self) -> &Arc<ViewState> {
        &self.current
    }

    /// The latest committed snapshot.
    pub fn latest(&self) -> Arc<ViewState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next committed transition, returning the new
    /// snapshot. Returns `None` once the container has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<ViewState>> {
        self.receiver.changed().await.ok()?;
        let snapshot = self.receiver.borrow_and_update().clone();
        self.current = snapshot.clone();
        Some(snapshot)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per committed transition.
pub struct StateWatchStream {
    inner: WatchStream<Arc<ViewState>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<ViewState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin for Unpin items; Arc always is.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
