use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures::channel::oneshot;

/// How a scroll-to-item request ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollOutcome {
    /// The UI performed the scroll.
    Scrolled,
    /// The key did not resolve to an item (or the item was removed before the scroll).
    NotFound,
    /// Superseded by a later request, or the controller was destroyed.
    Cancelled,
}

/// The UI's half of a scroll-to-item request.
///
/// Call [`ScrollCompleter::complete`] once the scroll has actually been issued. Dropping it
/// resolves the request as [`ScrollOutcome::Cancelled`].
pub struct ScrollCompleter {
    tx: oneshot::Sender<ScrollOutcome>,
}

impl ScrollCompleter {
    pub fn complete(self) {
        self.resolve(ScrollOutcome::Scrolled);
    }

    /// `true` if the caller already dropped the [`ScrollCompletion`].
    pub fn is_canceled(&self) -> bool {
        self.tx.is_canceled()
    }

    pub(crate) fn resolve(self, outcome: ScrollOutcome) {
        // A dropped receiver means nobody is waiting.
        let _ = self.tx.send(outcome);
    }
}

impl fmt::Debug for ScrollCompleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollCompleter")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// Resolves once a scroll-to-item request finished. See [`ScrollOutcome`].
#[derive(Debug)]
#[must_use = "dropping the completion does not cancel the scroll, but its outcome is lost"]
pub struct ScrollCompletion {
    rx: oneshot::Receiver<ScrollOutcome>,
}

impl ScrollCompletion {
    pub(crate) fn resolved(outcome: ScrollOutcome) -> Self {
        let (completer, completion) = completion_pair();
        completer.resolve(outcome);
        completion
    }
}

impl Future for ScrollCompletion {
    type Output = ScrollOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(ScrollOutcome::Cancelled),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub(crate) fn completion_pair() -> (ScrollCompleter, ScrollCompletion) {
    let (tx, rx) = oneshot::channel();
    (ScrollCompleter { tx }, ScrollCompletion { rx })
}
