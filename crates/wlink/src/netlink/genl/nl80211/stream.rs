//! Scan results as a [`Stream`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

use super::scan::{ScanOutcome, Scanner};
use crate::netlink::error::Result;
use crate::netlink::socket::{NetlinkSocket, Transport};
use crate::wlan::Network;

type ScanFuture<T> = Pin<Box<dyn Future<Output = (Box<Scanner<T>>, Result<ScanOutcome>)> + Send>>;

enum StreamState<T> {
    /// Not polled yet; nothing has been sent.
    Idle(Box<Scanner<T>>),
    Scanning(ScanFuture<T>),
    Yielding(Box<Scanner<T>>, std::vec::IntoIter<Network>),
    Done(Option<Box<Scanner<T>>>),
}

/// Networks found by one scan.
///
/// The scan starts on first poll. Each network is yielded once, then the
/// stream ends. A failure yields a single `Err` and ends the stream.
/// Cancelling ends the stream without an error; the kernel's scan is left
/// to finish. An ended stream keeps returning `None`.
pub struct ScanStream<T = NetlinkSocket> {
    state: StreamState<T>,
    cancel: CancellationToken,
}

impl<T: Transport> ScanStream<T> {
    pub(crate) fn new(scanner: Scanner<T>) -> Self {
        Self {
            state: StreamState::Idle(Box::new(scanner)),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop scanning. The next poll ends the stream.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this stream, e.g. from a signal handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Recover the scanner, unless a scan is in flight.
    pub fn into_scanner(self) -> Option<Scanner<T>> {
        match self.state {
            StreamState::Idle(scanner)
            | StreamState::Yielding(scanner, _)
            | StreamState::Done(Some(scanner)) => Some(*scanner),
            StreamState::Scanning(_) | StreamState::Done(None) => None,
        }
    }
}

impl<T: Transport + 'static> Stream for ScanStream<T> {
    type Item = Result<Network>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            match std::mem::replace(&mut this.state, StreamState::Done(None)) {
                StreamState::Idle(scanner) if this.cancel.is_cancelled() => {
                    this.state = StreamState::Done(Some(scanner));
                }
                StreamState::Idle(mut scanner) => {
                    let cancel = this.cancel.clone();
                    this.state = StreamState::Scanning(Box::pin(async move {
                        let outcome = scanner.run(&cancel).await;
                        (scanner, outcome)
                    }));
                }
                StreamState::Scanning(mut future) => match future.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.state = StreamState::Scanning(future);
                        return Poll::Pending;
                    }
                    Poll::Ready((scanner, Ok(ScanOutcome::Completed(networks)))) => {
                        this.state = StreamState::Yielding(scanner, networks.into_iter());
                    }
                    Poll::Ready((scanner, Ok(ScanOutcome::Cancelled))) => {
                        this.state = StreamState::Done(Some(scanner));
                    }
                    Poll::Ready((scanner, Err(e))) => {
                        this.state = StreamState::Done(Some(scanner));
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                StreamState::Yielding(scanner, _) if this.cancel.is_cancelled() => {
                    this.state = StreamState::Done(Some(scanner));
                }
                StreamState::Yielding(scanner, mut networks) => match networks.next() {
                    Some(network) => {
                        this.state = StreamState::Yielding(scanner, networks);
                        return Poll::Ready(Some(Ok(network)));
                    }
                    None => this.state = StreamState::Done(Some(scanner)),
                },
                done @ StreamState::Done(_) => {
                    this.state = done;
                    return Poll::Ready(None);
                }
            }
        }
    }
}
