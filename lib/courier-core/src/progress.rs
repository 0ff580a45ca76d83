//! Upload progress channel.
//!
//! One channel per upload merges two producers, transport progress
//! callbacks and the final response, into a single ordered stream:
//!
//! - progress events arrive with non-decreasing `bytes_sent`;
//! - exactly one terminal item (data or error) ends the stream;
//! - nothing is delivered after the terminal item.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use bytes::Bytes;
//! use courier_core::{UploadEvent, progress_channel};
//!
//! let (reporter, stream) = progress_channel();
//! reporter.report(5, 10);
//! reporter.report(10, 10);
//! reporter.finish(Ok(Bytes::from_static(b"done")));
//!
//! let data = stream.completion().await.expect("upload succeeded");
//! assert_eq!(data.as_ref(), b"done");
//! # }
//! ```

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::{Error, Result, TransportFailure};

/// Bytes sent so far out of the bytes expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Progress {
    /// Bytes of the request body already handed to the transport.
    pub bytes_sent: u64,
    /// Total size of the request body.
    pub bytes_expected: u64,
}

impl Progress {
    /// Completed fraction in `[0, 1]`; `0` when nothing is expected.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.bytes_expected == 0 {
            return 0.0;
        }
        (self.bytes_sent as f64 / self.bytes_expected as f64).clamp(0.0, 1.0)
    }
}

/// An item of an upload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// Non-terminal progress update.
    Progress(Progress),
    /// Terminal event carrying the validated response body.
    Completed(Bytes),
}

#[derive(Debug, Default)]
struct State {
    last_sent: u64,
    finished: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    tx: mpsc::UnboundedSender<Result<UploadEvent>>,
}

/// Producer half of an upload channel.
///
/// Cheap to clone and safe to call from any thread; no method ever blocks
/// on the consumer.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    shared: Arc<Shared>,
}

impl ProgressReporter {
    /// Report upload progress.
    ///
    /// Returns `false` if the event was dropped, either because the stream
    /// already ended or because `bytes_sent` went backwards.
    pub fn report(&self, bytes_sent: u64, bytes_expected: u64) -> bool {
        let mut state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.finished || bytes_sent < state.last_sent {
            return false;
        }
        state.last_sent = bytes_sent;

        trace!(bytes_sent, bytes_expected, "upload progress");
        let progress = Progress {
            bytes_sent,
            bytes_expected,
        };
        self.shared
            .tx
            .send(Ok(UploadEvent::Progress(progress)))
            .is_ok()
    }

    /// Send the terminal event.
    ///
    /// Only the first call has an effect; it returns `false` afterwards.
    pub fn finish(&self, result: Result<Bytes>) -> bool {
        let mut state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.finished {
            return false;
        }
        state.finished = true;

        self.shared
            .tx
            .send(result.map(UploadEvent::Completed))
            .is_ok()
    }

    /// Returns `true` once the terminal event has been sent.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finished
    }
}

/// Consumer half of an upload channel.
///
/// If every [`ProgressReporter`] is dropped before finishing, the stream
/// ends with [`TransportFailure::Cancelled`].
#[derive(Debug)]
pub struct UploadStream {
    rx: mpsc::UnboundedReceiver<Result<UploadEvent>>,
    done: bool,
}

/// Create a connected reporter/stream pair.
#[must_use]
pub fn progress_channel() -> (ProgressReporter, UploadStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = ProgressReporter {
        shared: Arc::new(Shared {
            state: Mutex::new(State::default()),
            tx,
        }),
    };
    (reporter, UploadStream { rx, done: false })
}

impl Stream for UploadStream {
    type Item = Result<UploadEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(UploadEvent::Progress(progress)))) => {
                Poll::Ready(Some(Ok(UploadEvent::Progress(progress))))
            }
            Poll::Ready(Some(terminal)) => {
                this.done = true;
                this.rx.close();
                Poll::Ready(Some(terminal))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(Some(Err(Error::from(TransportFailure::Cancelled))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl UploadStream {
    async fn next_event(&mut self) -> Option<Result<UploadEvent>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    /// Skip progress events and wait for the response body.
    ///
    /// # Errors
    ///
    /// Returns the stream's terminal error.
    pub async fn completion(mut self) -> Result<Bytes> {
        while let Some(event) = self.next_event().await {
            if let UploadEvent::Completed(data) = event? {
                return Ok(data);
            }
        }
        Err(Error::from(TransportFailure::Cancelled))
    }

    /// Forward every event to `callback`, running it on `context`.
    ///
    /// Events are dispatched one at a time in stream order; with a serial
    /// context (such as a UI loop draining an [`mpsc`] queue) the callback
    /// is never invoked concurrently.
    pub async fn deliver_on<C, F>(mut self, context: &C, callback: F)
    where
        C: DeliveryContext + ?Sized,
        F: FnMut(Result<UploadEvent>) + Send + 'static,
    {
        let callback = Arc::new(Mutex::new(callback));
        while let Some(event) = self.next_event().await {
            let callback = Arc::clone(&callback);
            context.dispatch(Box::new(move || {
                let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
                callback(event);
            }));
        }
    }
}

/// Work item handed to a [`DeliveryContext`].
pub type DeliveryTask = Box<dyn FnOnce() + Send + 'static>;

/// Where upload events are delivered to the caller.
pub trait DeliveryContext {
    /// Run `task` on this context.
    fn dispatch(&self, task: DeliveryTask);
}

/// Runs tasks immediately on the task polling the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl DeliveryContext for Inline {
    fn dispatch(&self, task: DeliveryTask) {
        task();
    }
}

/// Queues tasks for a caller-owned loop (e.g. the UI thread) to run.
impl DeliveryContext for mpsc::UnboundedSender<DeliveryTask> {
    fn dispatch(&self, task: DeliveryTask) {
        if self.send(task).is_err() {
            warn!("delivery context closed, dropping upload event");
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use futures_util::StreamExt;

    use super::*;

    async fn collect(stream: UploadStream) -> Vec<Result<UploadEvent>> {
        stream.collect().await
    }

    fn sent(event: &Result<UploadEvent>) -> Option<u64> {
        match event {
            Ok(UploadEvent::Progress(progress)) => Some(progress.bytes_sent),
            _ => None,
        }
    }

    #[tokio::test]
    async fn progress_then_single_terminal() {
        let (reporter, stream) = progress_channel();
        check!(reporter.report(0, 30));
        check!(reporter.report(10, 30));
        check!(reporter.report(30, 30));
        check!(reporter.finish(Ok(Bytes::from("ok"))));

        let events = collect(stream).await;
        check!(events.len() == 4);
        let progress: Vec<_> = events.iter().filter_map(sent).collect();
        check!(progress == vec![0, 10, 30]);
        let_assert!(Some(Ok(UploadEvent::Completed(data))) = events.last());
        check!(data.as_ref() == b"ok");
    }

    #[tokio::test]
    async fn backwards_progress_is_dropped() {
        let (reporter, stream) = progress_channel();
        check!(reporter.report(20, 30));
        check!(!reporter.report(10, 30));
        check!(reporter.report(20, 30));
        reporter.finish(Ok(Bytes::new()));

        let events = collect(stream).await;
        let progress: Vec<_> = events.iter().filter_map(sent).collect();
        check!(progress == vec![20, 20]);
    }

    #[tokio::test]
    async fn nothing_after_terminal() {
        let (reporter, stream) = progress_channel();
        reporter.report(1, 2);
        check!(reporter.finish(Err(Error::http_status(500, None))));
        check!(reporter.is_finished());
        check!(!reporter.report(2, 2));
        check!(!reporter.finish(Ok(Bytes::new())));

        let events = collect(stream).await;
        check!(events.len() == 2);
        let_assert!(Some(Err(err)) = events.last());
        check!(err.status() == Some(500));
    }

    #[tokio::test]
    async fn dropped_reporter_ends_with_cancelled() {
        let (reporter, stream) = progress_channel();
        reporter.report(1, 2);
        drop(reporter);

        let events = collect(stream).await;
        check!(events.len() == 2);
        let_assert!(Some(Err(err)) = events.last());
        check!(err.is_cancelled());
    }

    #[tokio::test]
    async fn concurrent_reporters_stay_monotonic() {
        let (reporter, stream) = progress_channel();
        let handles: Vec<_> = (0..4_u64)
            .map(|worker| {
                let reporter = reporter.clone();
                std::thread::spawn(move || {
                    for step in 0..50_u64 {
                        reporter.report(step * 4 + worker, 200);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("reporter thread");
        }
        reporter.finish(Ok(Bytes::new()));

        let events = collect(stream).await;
        let progress: Vec<_> = events.iter().filter_map(sent).collect();
        check!(progress.windows(2).all(|pair| matches!(pair, [a, b] if a <= b)));
        let_assert!(Some(Ok(UploadEvent::Completed(_))) = events.last());
    }

    #[tokio::test]
    async fn completion_skips_progress() {
        let (reporter, stream) = progress_channel();
        reporter.report(4, 4);
        reporter.finish(Ok(Bytes::from("body")));

        let_assert!(Ok(data) = stream.completion().await);
        check!(data.as_ref() == b"body");
    }

    #[tokio::test]
    async fn deliver_on_queue_context() {
        let (reporter, stream) = progress_channel();
        reporter.report(1, 2);
        reporter.report(2, 2);
        reporter.finish(Ok(Bytes::from("done")));

        let (queue, mut main_loop) = mpsc::unbounded_channel::<DeliveryTask>();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        stream
            .deliver_on(&queue, move |event| {
                sink.lock().expect("lock").push(event.is_ok());
            })
            .await;

        check!(seen.lock().expect("lock").is_empty());
        while let Ok(task) = main_loop.try_recv() {
            task();
        }
        check!(*seen.lock().expect("lock") == vec![true, true, true]);
    }

    #[tokio::test]
    async fn deliver_inline() {
        let (reporter, stream) = progress_channel();
        reporter.finish(Err(Error::from(TransportFailure::Timeout)));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        stream
            .deliver_on(&Inline, move |event| {
                sink.lock().expect("lock").push(event.is_err());
            })
            .await;

        check!(*seen.lock().expect("lock") == vec![true]);
    }

    #[test]
    fn fraction() {
        let progress = Progress {
            bytes_sent: 25,
            bytes_expected: 100,
        };
        check!((progress.fraction() - 0.25).abs() < f64::EPSILON);
        check!(Progress::default().fraction() == 0.0);
    }
}
