//! Synchronization primitives for the protocol front end.
//!
//! Provides the reader/processor hand-off channel and a shutdown flag
//! shared between handler code and the pipeline loops.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

struct QueueState {
    pending: Vec<String>,
    closed: bool,
}

/// One drained batch plus the queue state it was taken under.
///
/// `closed` is read under the same lock hold that swaps the batch out,
/// so `closed && lines.is_empty()` really means the queue is finished:
/// no line pushed before `close()` can be missed by checking the two
/// separately.
#[derive(Debug)]
pub struct Batch {
    pub lines: Vec<String>,
    pub closed: bool,
}

/// Unbounded line channel between the reader and the processor.
///
/// The reader appends lines as they arrive; the processor takes the
/// entire pending batch in one atomic swap, so reader writes can never
/// interleave with the batch currently being processed and the original
/// arrival order is preserved.
pub struct LineQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl LineQueue {
    #[must_use]
    pub fn new() -> Self {
        LineQueue {
            state: Mutex::new(QueueState {
                pending: Vec::new(),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Append one line and wake the processor if it is waiting.
    pub fn push(&self, line: String) {
        let mut state = self.state.lock();
        state.pending.push(line);
        self.ready.notify_one();
    }

    /// Atomically take every pending line, oldest first.
    #[must_use]
    pub fn take_all(&self) -> Vec<String> {
        mem::take(&mut self.state.lock().pending)
    }

    /// Take the pending batch, waiting up to `timeout` for lines to
    /// arrive if none are pending yet. May return an empty batch.
    ///
    /// The batch and the closed flag come from a single atomic snapshot.
    #[must_use]
    pub fn wait_batch(&self, timeout: Duration) -> Batch {
        let mut state = self.state.lock();
        if state.pending.is_empty() && !state.closed {
            self.ready.wait_for(&mut state, timeout);
        }
        Batch {
            lines: mem::take(&mut state.pending),
            closed: state.closed,
        }
    }

    /// Mark the input as finished (EOF or read error on the source).
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.ready.notify_one();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Default for LineQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// A thread-safe flag signalling that the processor loop should end.
///
/// The pipeline itself never terminates on its own; the quit handler (or
/// any other external party) requests shutdown through a clone of this.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    /// Create a new flag (initially not requested).
    #[must_use]
    pub fn new() -> Self {
        ShutdownFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Request shutdown.
    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether shutdown has been requested.
    #[inline]
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag.
    #[inline]
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
