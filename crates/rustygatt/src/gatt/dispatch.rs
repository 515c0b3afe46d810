//! Deferred execution of user notification callbacks
//!
//! The controller's event context is time-constrained; user code must not
//! run there by default. Value-change payloads are copied out of the
//! transient event buffer and handed to a dedicated worker thread through a
//! bounded queue. In-place delivery remains available for consumers that
//! accept the event-context rules (no blocking, no reentrant protocol
//! calls).

use log::warn;
use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
use std::thread;

/// Upper bound on queued, not-yet-delivered callback runs.
const DISPATCH_QUEUE_DEPTH: usize = 16;

type Job = Box<dyn FnOnce() + Send>;

/// Worker that runs notification callbacks off the event context.
pub(crate) struct CallbackExecutor {
    tx: SyncSender<Job>,
}

impl CallbackExecutor {
    pub fn new() -> Self {
        let (tx, rx) = sync_channel::<Job>(DISPATCH_QUEUE_DEPTH);
        thread::Builder::new()
            .name("gatt-dispatch".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
            })
            .expect("failed to spawn dispatch worker");
        Self { tx }
    }

    /// Queue `job` for the worker. The queue is bounded; when it is full
    /// the dispatch is dropped rather than stalling the event context.
    pub fn submit(&self, job: Job) {
        match self.tx.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("dispatch queue full, notification dropped"),
            Err(TrySendError::Disconnected(_)) => {
                warn!("dispatch worker gone, notification dropped")
            }
        }
    }
}

impl Default for CallbackExecutor {
    fn default() -> Self {
        Self::new()
    }
}
