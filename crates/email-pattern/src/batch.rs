//! Batch progress, cancellation, and background execution.
//!
//! Inference and synthesis are synchronous loops over an in-memory batch.
//! They report progress and check for cancellation between records through a
//! [`BatchObserver`]. [`spawn_batch`] runs such a loop on a worker thread and
//! forwards progress over a channel so a foreground surface stays responsive.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::error::BatchError;

/// How far a batch has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Records processed so far.
    pub processed: usize,
    /// Records in the batch.
    pub total: usize,
}

impl BatchProgress {
    /// Fraction of the batch processed, in `0.0..=1.0`.
    ///
    /// An empty batch counts as complete.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "the fraction is only used for display"
    )]
    pub const fn fraction(self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f64 / self.total as f64
    }

    /// Returns `true` once every record has been processed.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        self.processed >= self.total
    }
}

/// Receives progress from a running batch and may ask it to stop.
pub trait BatchObserver {
    /// Called after each record is processed.
    fn on_progress(&mut self, _progress: BatchProgress) {}

    /// Polled before each record; returning `true` stops the batch.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Observer that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Shared flag for best-effort cooperative cancellation.
///
/// ```
/// use email_pattern::CancelFlag;
///
/// let flag = CancelFlag::default();
/// let worker_view = flag.clone();
/// flag.cancel();
/// assert!(worker_view.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Runs `step` over every item, consulting `observer` between items.
///
/// # Errors
///
/// Returns [`BatchError::Cancelled`] if the observer reports cancellation
/// before the batch finishes.
pub(crate) fn drive<I, T, O, F>(
    items: &[I],
    observer: &mut O,
    mut step: F,
) -> Result<Vec<T>, BatchError>
where
    O: BatchObserver + ?Sized,
    F: FnMut(&I) -> T,
{
    let total = items.len();
    let mut results = Vec::with_capacity(total);
    for (processed, item) in items.iter().enumerate() {
        if observer.is_cancelled() {
            debug!(processed, total, "batch cancelled");
            return Err(BatchError::Cancelled { processed });
        }
        results.push(step(item));
        observer.on_progress(BatchProgress {
            processed: results.len(),
            total,
        });
    }
    Ok(results)
}

/// Observer used by [`spawn_batch`] workers.
///
/// Forwards every `every`-th progress event, and always the final one, over
/// a channel, and reads cancellation from a [`CancelFlag`].
#[derive(Debug)]
pub struct ChannelObserver {
    sender: Sender<BatchProgress>,
    cancel: CancelFlag,
    every: usize,
    since_last: usize,
}

impl BatchObserver for ChannelObserver {
    fn on_progress(&mut self, progress: BatchProgress) {
        self.since_last += 1;
        if self.since_last < self.every && !progress.is_complete() {
            return;
        }
        self.since_last = 0;
        // The receiver may already be gone; progress is advisory.
        if self.sender.send(progress).is_err() {
            debug!(?progress, "progress receiver dropped");
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A batch running on a background worker.
#[derive(Debug)]
pub struct BatchHandle<T> {
    progress: Receiver<BatchProgress>,
    cancel: CancelFlag,
    worker: JoinHandle<Result<T, BatchError>>,
}

impl<T> BatchHandle<T> {
    /// Blocking iterator over progress events; ends when the worker finishes.
    #[must_use]
    pub fn progress(&self) -> impl Iterator<Item = BatchProgress> + '_ {
        self.progress.iter()
    }

    /// Requests cancellation; the worker stops before its next record.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the worker and returns its result.
    ///
    /// # Errors
    ///
    /// Returns the job's own [`BatchError`], or
    /// [`BatchError::WorkerPanicked`] if the worker thread panicked.
    pub fn join(self) -> Result<T, BatchError> {
        self.worker
            .join()
            .map_err(|_| BatchError::WorkerPanicked)?
    }
}

/// Runs `job` on a named worker thread.
///
/// `progress_every` throttles progress events; `0` is treated as `1`.
///
/// # Errors
///
/// Returns an I/O error if the thread cannot be spawned.
///
/// ```
/// use email_pattern::{SampleRecord, infer_with, spawn_batch};
///
/// let records = vec![SampleRecord {
///     first_name: "Jane".to_owned(),
///     last_name: "Doe".to_owned(),
///     email: "jane.doe@acme.com".to_owned(),
/// }];
/// let handle = spawn_batch("inference", 1, move |observer| infer_with(&records, observer))
///     .expect("spawn worker");
/// let events = handle.progress().count();
/// let inference = handle.join().expect("batch completes");
///
/// assert_eq!(events, 1);
/// assert_eq!(inference.store.len(), 1);
/// ```
pub fn spawn_batch<T, F>(name: &str, progress_every: usize, job: F) -> io::Result<BatchHandle<T>>
where
    T: Send + 'static,
    F: FnOnce(&mut ChannelObserver) -> Result<T, BatchError> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let cancel = CancelFlag::default();
    let mut observer = ChannelObserver {
        sender,
        cancel: cancel.clone(),
        every: progress_every.max(1),
        since_last: 0,
    };
    let worker = thread::Builder::new()
        .name(format!("email-pattern-{name}"))
        .spawn(move || job(&mut observer))?;

    Ok(BatchHandle {
        progress: receiver,
        cancel,
        worker,
    })
}
