//! A bounded queue drained by one dedicated consumer thread.
//!
//! Both pipelines are built on `QueueWorker`. Producers block when the queue
//! is full, the consumer blocks while it is empty, and `stop` closes the queue
//! and waits until every queued item has been handled.
use crate::error::LogError;
use async_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, info};

/// Lifecycle of a queue worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Accepting items.
    Running,
    /// Closed to new items, consumer still draining.
    Closing,
    /// Consumer has emptied the queue and exited.
    Drained,
    /// Drain observed by a caller of `stop`.
    Terminated,
}

#[derive(Debug)]
pub struct QueueWorker<T> {
    name: &'static str,
    tx: Sender<T>,
    done_rx: Receiver<()>,
    observed: AtomicBool,
}

impl<T: Send + 'static> QueueWorker<T> {
    /// Spawns a consumer thread that feeds every queued item to `handler`.
    pub fn spawn<F>(name: &'static str, capacity: usize, mut handler: F) -> Result<Self, LogError>
    where
        F: FnMut(T) + Send + 'static,
    {
        if capacity == 0 {
            return Err(LogError::ZeroCapacity);
        }
        let (tx, rx) = async_channel::bounded::<T>(capacity);
        // The consumer owns the only sender; dropping it on exit closes the
        // channel, which is what `stop` waits for.
        let (done_tx, done_rx) = async_channel::bounded::<()>(1);

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _done = done_tx;
                debug!(worker = name, "Worker started.");
                while let Ok(item) = rx.recv_blocking() {
                    handler(item);
                }
                debug!(worker = name, "Queue closed and drained.");
            })
            .map_err(|source| LogError::Spawn { worker: name, source })?;

        Ok(Self {
            name,
            tx,
            done_rx,
            observed: AtomicBool::new(false),
        })
    }

    /// Enqueues an item, blocking while the queue is full.
    ///
    /// Hands the item back if the queue has been closed.
    pub fn submit(&self, item: T) -> Result<(), T> {
        self.tx.send_blocking(item).map_err(|e| e.into_inner())
    }

    /// Closes the queue. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    /// Closes the queue and blocks until the consumer has drained it and exited.
    pub fn stop(&self) {
        if self.close() {
            info!(worker = self.name, pending = self.tx.len(), "Stopping worker.");
        }
        // Only ever errors, once the consumer drops its end.
        let _ = self.done_rx.recv_blocking();
        self.observed.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> PipelineState {
        if !self.tx.is_closed() {
            PipelineState::Running
        } else if !self.done_rx.is_closed() {
            PipelineState::Closing
        } else if self.observed.load(Ordering::SeqCst) {
            PipelineState::Terminated
        } else {
            PipelineState::Drained
        }
    }

    /// Number of items waiting in the queue.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
