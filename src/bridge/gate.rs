//! Readiness gate
//!
//! A `ReadyGate` is the single outstanding "producer may write" condition.
//! Each gate generation is backed by its own `watch` cell holding a
//! `GateStatus`; a `Ready` is a subscriber to one generation.
//!
//! - `reset`: replace the cell with a fresh pending one (new generation)
//! - `resolve`: settle the current cell successfully
//! - `reject`: settle the current cell with a failure, re-arming first if
//!   the current cell is no longer pending
//!
//! A cell settles at most once. Later settle attempts on the same
//! generation leave the outcome unchanged.

use crate::error::SinkError;
use crate::protocol::Reason;
use futures_util::future::BoxFuture;
use std::future::IntoFuture;
use tokio::sync::watch;

/// Outcome of one gate generation
#[derive(Debug, Clone, PartialEq)]
pub enum GateStatus {
    Pending,
    Resolved,
    Rejected(Reason),
}

impl GateStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Owner side of the readiness gate
#[derive(Debug)]
pub struct ReadyGate {
    tx: watch::Sender<GateStatus>,
    /// True while the current generation has not been settled by this gate
    pending: bool,
    generation: u64,
}

impl ReadyGate {
    /// Create a gate in the pending state
    pub fn new() -> Self {
        let (tx, _) = watch::channel(GateStatus::Pending);
        Self {
            tx,
            pending: true,
            generation: 0,
        }
    }

    /// Completion handle for the current generation
    pub fn ready(&self) -> Ready {
        Ready {
            rx: self.tx.subscribe(),
            generation: self.generation,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of times the gate has been re-armed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current generation's status
    pub fn status(&self) -> GateStatus {
        self.tx.borrow().clone()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(*self.tx.borrow(), GateStatus::Rejected(_))
    }

    /// Allocate a fresh pending generation
    pub fn reset(&mut self) {
        let (tx, _) = watch::channel(GateStatus::Pending);
        self.tx = tx;
        self.pending = true;
        self.generation += 1;
    }

    /// Settle the current generation successfully
    pub fn resolve(&mut self) {
        self.settle(GateStatus::Resolved);
        self.pending = false;
    }

    /// Settle with a failure so the next `ready()` observes it
    ///
    /// No diagnostic is emitted if nobody awaits the rejected generation:
    /// the failure is reported to the producer through the sink controller.
    pub fn reject(&mut self, reason: Reason) {
        if !self.pending {
            self.reset();
        }
        self.settle(GateStatus::Rejected(reason));
        self.pending = false;
    }

    fn settle(&self, outcome: GateStatus) {
        self.tx.send_if_modified(|status| {
            if status.is_pending() {
                *status = outcome;
                true
            } else {
                false
            }
        });
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending completion of one gate generation
///
/// Cloneable; every clone observes the same outcome. Await it directly
/// or through [`Ready::wait`].
#[derive(Debug, Clone)]
pub struct Ready {
    rx: watch::Receiver<GateStatus>,
    generation: u64,
}

impl Ready {
    /// Snapshot of the outcome without waiting
    pub fn status(&self) -> GateStatus {
        self.rx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.rx.borrow().is_pending()
    }

    /// Generation of the gate this completion belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait until the generation settles
    ///
    /// Fails with `SinkError::SessionEnded` if the gate is dropped
    /// while still pending.
    pub async fn wait(mut self) -> Result<(), SinkError> {
        let outcome = match self.rx.wait_for(|status| !status.is_pending()).await {
            Ok(status) => (*status).clone(),
            Err(_) => return Err(SinkError::SessionEnded),
        };

        match outcome {
            GateStatus::Resolved => Ok(()),
            GateStatus::Rejected(reason) => Err(SinkError::Errored(reason)),
            GateStatus::Pending => Err(SinkError::SessionEnded),
        }
    }
}

impl IntoFuture for Ready {
    type Output = Result<(), SinkError>;
    type IntoFuture = BoxFuture<'static, Result<(), SinkError>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
