//! Backpressure-aware streaming over a handle's byte range.
//!
//! A [`HandleStream`] is pull-based: nothing is read until the consumer polls
//! it. The first poll starts a producer task that feeds a bounded channel of
//! `high_water_mark` chunks. The producer reserves a channel slot *before*
//! every read, so it never reads ahead of the consumer's demand; while the
//! channel is full it sits in [`StreamState::Paused`] and resumes as soon as
//! the consumer drains a chunk.
//!
//! ```text
//!   Idle ──poll──▶ Demanding ◀──drain── Paused
//!                     │   └──full──────▶ ┘
//!                     ├──end of range──▶ Closed
//!                     └──cancel/drop───▶ Cancelled
//! ```
//!
//! `Closed` and `Cancelled` are terminal.

use crate::error::{StorageError, StorageResult};
use crate::handle::Resource;
use bytes::Bytes;
use futures::stream::{FusedStream, Stream};
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default chunk size: 64 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default number of chunks the producer may run ahead of the consumer.
pub const DEFAULT_HIGH_WATER_MARK: usize = 4;

/// Lifecycle of a [`HandleStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Created but never polled; no I/O has happened.
    Idle,
    /// The producer has demand and is reading from the source.
    Demanding,
    /// The consumer's demand is exhausted; the producer waits.
    Paused,
    /// The whole range was delivered (or the producer failed).
    Closed,
    /// The consumer cancelled or dropped the stream.
    Cancelled,
}

impl StreamState {
    /// Returns true for `Closed` and `Cancelled`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamState::Closed | StreamState::Cancelled)
    }
}

/// Chunking and demand limits for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Maximum bytes per chunk.
    pub chunk_size: usize,
    /// Maximum chunks buffered ahead of the consumer.
    pub high_water_mark: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }
}

impl StreamOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size (at least one byte).
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Sets the high-water mark (at least one chunk).
    #[must_use]
    pub fn with_high_water_mark(mut self, chunks: usize) -> Self {
        self.high_water_mark = chunks.max(1);
        self
    }
}

/// State shared between the consumer and the producer task.
#[derive(Debug)]
struct Shared {
    state: Mutex<StreamState>,
    queued: AtomicUsize,
    /// Set by the producer when it returns on its own.
    finished: AtomicBool,
}

impl Shared {
    /// Moves to `next` unless a terminal state was already reached.
    ///
    /// Returns true if the state changed.
    fn transition(&self, next: StreamState) -> bool {
        let mut state = self.state.lock();
        if state.is_terminal() || *state == next {
            return false;
        }
        tracing::trace!(from = ?*state, to = ?next, "stream state");
        *state = next;
        true
    }
}

struct Source {
    resource: Resource,
    start: u64,
    end: u64,
}

type Chunk = StorageResult<Bytes>;

/// A lazy, finite, non-restartable sequence of chunks over a byte range.
///
/// Created by [`crate::StorageHandle::stream`]. Dropping the stream cancels
/// it and stops the producer.
pub struct HandleStream {
    source: Option<Source>,
    options: StreamOptions,
    shared: Arc<Shared>,
    rx: Option<mpsc::Receiver<Chunk>>,
    producer: Option<JoinHandle<()>>,
}

impl HandleStream {
    pub(crate) fn new(resource: Resource, start: u64, end: u64, options: StreamOptions) -> Self {
        // Struct literals bypass the builder clamps.
        let options = StreamOptions {
            chunk_size: options.chunk_size.max(1),
            high_water_mark: options.high_water_mark.max(1),
        };
        Self {
            source: Some(Source {
                resource,
                start,
                end,
            }),
            options,
            shared: Arc::new(Shared {
                state: Mutex::new(StreamState::Idle),
                queued: AtomicUsize::new(0),
                finished: AtomicBool::new(false),
            }),
            rx: None,
            producer: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        *self.shared.state.lock()
    }

    /// Number of chunks read but not yet consumed.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::Acquire)
    }

    /// Remaining demand: how many more chunks the producer may read before
    /// it has to pause. Zero once the stream is terminal.
    #[must_use]
    pub fn desired_size(&self) -> usize {
        if self.state().is_terminal() {
            return 0;
        }
        self.options.high_water_mark.saturating_sub(self.queued())
    }

    /// Options this stream was created with.
    #[must_use]
    pub fn options(&self) -> StreamOptions {
        self.options
    }

    /// Cancels the stream, stopping the producer and releasing its hold on
    /// the resource. Has no effect once the stream is closed.
    pub fn cancel(&mut self) {
        if self.shared.transition(StreamState::Cancelled) {
            tracing::debug!("stream cancelled by consumer");
        }
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
        }
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
        self.source = None;
    }

    fn start(&mut self) -> Option<&mut mpsc::Receiver<Chunk>> {
        if let Some(source) = self.source.take() {
            let (tx, rx) = mpsc::channel(self.options.high_water_mark);
            self.shared.transition(StreamState::Demanding);
            self.producer = Some(tokio::spawn(produce(
                source,
                tx,
                Arc::clone(&self.shared),
                self.options.chunk_size,
            )));
            self.rx = Some(rx);
        }
        self.rx.as_mut()
    }
}

async fn produce(source: Source, tx: mpsc::Sender<Chunk>, shared: Arc<Shared>, chunk_size: usize) {
    feed(source, &tx, &shared, chunk_size).await;
    // Must be visible before `tx` drops and the consumer sees the channel end.
    shared.finished.store(true, Ordering::Release);
}

async fn feed(source: Source, tx: &mpsc::Sender<Chunk>, shared: &Shared, chunk_size: usize) {
    let mut pos = source.start;
    while pos < source.end {
        if tx.capacity() == 0 {
            shared.transition(StreamState::Paused);
        }
        let Ok(permit) = tx.reserve().await else {
            // Consumer went away.
            return;
        };
        shared.transition(StreamState::Demanding);

        let want = (source.end - pos).min(chunk_size as u64) as usize;
        match source.resource.read_at(pos, want).await {
            Ok(chunk) if chunk.is_empty() => break,
            Ok(chunk) => {
                pos += chunk.len() as u64;
                shared.queued.fetch_add(1, Ordering::AcqRel);
                permit.send(Ok(chunk));
            }
            Err(err) => {
                shared.queued.fetch_add(1, Ordering::AcqRel);
                permit.send(Err(err));
                return;
            }
        }
    }
}

impl Stream for HandleStream {
    type Item = StorageResult<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state().is_terminal() {
            return Poll::Ready(None);
        }

        let Some(rx) = this.start() else {
            return Poll::Ready(None);
        };

        match rx.poll_recv(cx) {
            Poll::Ready(Some(chunk)) => {
                this.shared.queued.fetch_sub(1, Ordering::AcqRel);
                Poll::Ready(Some(chunk))
            }
            Poll::Ready(None) => {
                let finished = this.shared.finished.load(Ordering::Acquire);
                this.shared.transition(StreamState::Closed);
                this.shutdown();
                if finished {
                    tracing::trace!("stream reached end of range");
                    Poll::Ready(None)
                } else {
                    tracing::warn!("stream producer stopped before end of range");
                    Poll::Ready(Some(Err(StorageError::StreamClosed)))
                }
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for HandleStream {
    fn is_terminated(&self) -> bool {
        self.state().is_terminal()
    }
}

impl Drop for HandleStream {
    fn drop(&mut self) {
        if self.producer.is_some() {
            self.shared.transition(StreamState::Cancelled);
        }
        self.shutdown();
    }
}

impl std::fmt::Debug for HandleStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleStream")
            .field("state", &self.state())
            .field("queued", &self.queued())
            .field("options", &self.options)
            .finish()
    }
}
