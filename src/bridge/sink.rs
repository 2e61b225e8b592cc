//! Sink contract
//!
//! `UnderlyingSink` is the producer-facing contract a sink implements:
//! start, zero or more writes, then close or abort. The stream machinery
//! (`PortWriter`) drives it and hands it a `SinkController` at start.

use super::gate::Ready;
use crate::protocol::Reason;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Sink lifecycle driven by the stream machinery
pub trait UnderlyingSink<W> {
    /// Called once before any write; the stream is started when the
    /// returned completion resolves
    fn start(&mut self, controller: SinkController) -> Ready;

    /// Accept one chunk; the next write waits for the returned completion
    fn write(&mut self, chunk: W) -> Ready;

    /// No further writes; finalize normally
    fn close(&mut self);

    /// No further writes; finalize abnormally
    fn abort(&mut self, reason: Reason);
}

#[derive(Debug, Default)]
struct ControllerState {
    error: Mutex<Option<Reason>>,
    signals: AtomicUsize,
}

/// Error-signaling capability handed to a sink at start
///
/// Shared between the sink and the stream machinery. The first reported
/// reason is kept; every call is counted.
#[derive(Debug, Clone, Default)]
pub struct SinkController {
    inner: Arc<ControllerState>,
}

impl SinkController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a fatal error independent of any write's own result
    pub fn error(&self, reason: Reason) {
        self.inner.signals.fetch_add(1, Ordering::SeqCst);
        let mut error = self.inner.error.lock();
        if error.is_none() {
            *error = Some(reason);
        }
    }

    /// First reported error, if any
    pub fn stored_error(&self) -> Option<Reason> {
        self.inner.error.lock().clone()
    }

    pub fn is_errored(&self) -> bool {
        self.inner.error.lock().is_some()
    }

    /// Number of `error` calls so far
    pub fn signal_count(&self) -> usize {
        self.inner.signals.load(Ordering::SeqCst)
    }
}
