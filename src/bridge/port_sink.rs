//! Port sink - backpressure state machine over a message port
//!
//! Turns sink calls into port messages and port replies into gate updates:
//!
//! ```text
//! write(chunk) ──► {"type":"write"} ──► consumer
//! close()      ──► {"type":"close"}
//! abort(r)     ──► {"type":"abort"}
//!
//! gate ◄── {"type":"backpressure"} ◄── consumer
//! gate + controller ◄── {"type":"error"}
//! ```
//!
//! The backpressure flag starts `true`, so the start gate stays pending
//! until the consumer announces readiness with `backpressure: false`.
//! Every write forces the flag back to `true`.
//!
//! `PortSink` is a plain `&mut self` state machine; it is owned by a
//! single session task which serializes port messages and producer calls.

use super::gate::{Ready, ReadyGate};
use super::sink::{SinkController, UnderlyingSink};
use super::stats::Stats;
use crate::protocol::{Reason, ReceiverMessage, SenderMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Sink writing into a message port with consumer-driven backpressure
pub struct PortSink<W> {
    port: mpsc::UnboundedSender<SenderMessage<W>>,
    controller: Option<SinkController>,
    /// Last known consumer state (`true` = not ready)
    backpressure: bool,
    gate: ReadyGate,
    stats: Arc<Stats>,
}

impl<W> PortSink<W> {
    /// Create a sink with pessimistic initial backpressure
    pub fn new(port: mpsc::UnboundedSender<SenderMessage<W>>) -> Self {
        Self::with_initial_backpressure(port, true)
    }

    /// Create a sink with an explicit initial backpressure state
    ///
    /// With `false` the start gate is already resolved, for consumers
    /// that never announce readiness.
    pub fn with_initial_backpressure(
        port: mpsc::UnboundedSender<SenderMessage<W>>,
        backpressure: bool,
    ) -> Self {
        let mut gate = ReadyGate::new();
        if !backpressure {
            gate.resolve();
        }
        Self {
            port,
            controller: None,
            backpressure,
            gate,
            stats: Arc::new(Stats::new()),
        }
    }

    /// Share traffic counters with the caller
    pub fn with_stats(mut self, stats: Arc<Stats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn backpressure(&self) -> bool {
        self.backpressure
    }

    /// Completion handle for the current gate
    pub fn ready(&self) -> Ready {
        self.gate.ready()
    }

    /// The gate itself, for inspection
    pub fn gate(&self) -> &ReadyGate {
        &self.gate
    }

    /// Handle one message delivered by the port
    pub fn on_message(&mut self, message: ReceiverMessage) {
        debug!("Port message in: {}", message.name());
        match message {
            ReceiverMessage::Backpressure { backpressure } => {
                self.stats.add_backpressure();
                self.update_backpressure(backpressure);
            }
            ReceiverMessage::Error { reason } => {
                self.stats.add_error();
                self.on_error(reason);
            }
        }
    }

    fn on_error(&mut self, reason: Reason) {
        match &self.controller {
            Some(controller) => controller.error(reason.clone()),
            None => warn!("Consumer error before start: {}", reason),
        }
        self.gate.reject(reason);
    }

    fn update_backpressure(&mut self, backpressure: bool) {
        if self.backpressure == backpressure {
            return;
        }
        if backpressure {
            // Rejection is terminal: later writes keep observing it
            if !self.gate.is_rejected() {
                self.gate.reset();
            }
        } else {
            self.gate.resolve();
        }
        self.backpressure = backpressure;
    }

    fn post(&self, message: SenderMessage<W>) {
        let name = message.name();
        if self.port.send(message).is_err() {
            self.stats.add_dropped();
            warn!("Port closed, dropping {} message", name);
            return;
        }
        debug!("Port message out: {}", name);
    }
}

impl<W> UnderlyingSink<W> for PortSink<W> {
    fn start(&mut self, controller: SinkController) -> Ready {
        self.controller = Some(controller);
        self.gate.ready()
    }

    fn write(&mut self, chunk: W) -> Ready {
        self.post(SenderMessage::Write { chunk });
        self.stats.add_write();
        // Wait for the consumer's next backpressure update
        self.update_backpressure(true);
        self.gate.ready()
    }

    fn close(&mut self) {
        self.post(SenderMessage::Close);
        self.stats.add_final();
    }

    fn abort(&mut self, reason: Reason) {
        self.post(SenderMessage::Abort { reason });
        self.stats.add_final();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::gate::GateStatus;
    use crate::error::SinkError;

    type Outbox = mpsc::UnboundedReceiver<SenderMessage<&'static str>>;

    fn started() -> (PortSink<&'static str>, Outbox, SinkController, Ready) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sink = PortSink::new(tx);
        let controller = SinkController::new();
        let start = sink.start(controller.clone());
        (sink, rx, controller, start)
    }

    fn drain(outbox: &mut Outbox) -> Vec<SenderMessage<&'static str>> {
        let mut out = Vec::new();
        while let Ok(m) = outbox.try_recv() {
            out.push(m);
        }
        out
    }

    fn ready_msg() -> ReceiverMessage {
        ReceiverMessage::Backpressure {
            backpressure: false,
        }
    }

    fn blocked_msg() -> ReceiverMessage {
        ReceiverMessage::Backpressure { backpressure: true }
    }

    #[test]
    fn test_start_is_gated_until_ready() {
        let (mut sink, mut outbox, _controller, start) = started();

        assert!(start.is_pending());
        assert!(sink.backpressure());
        // Start is purely local
        assert!(drain(&mut outbox).is_empty());

        sink.on_message(ready_msg());
        assert_eq!(start.status(), GateStatus::Resolved);
    }

    #[test]
    fn test_optimistic_start_is_resolved() {
        let (tx, _rx) = mpsc::unbounded_channel::<SenderMessage<()>>();
        let mut sink = PortSink::with_initial_backpressure(tx, false);
        let start = sink.start(SinkController::new());

        assert_eq!(start.status(), GateStatus::Resolved);
        assert!(!sink.backpressure());
    }

    #[test]
    fn test_repeated_backpressure_true_replaces_once() {
        let (mut sink, _outbox, _controller, _start) = started();
        sink.on_message(ready_msg());
        let generation = sink.gate().generation();

        sink.on_message(blocked_msg());
        let replaced = sink.ready();
        sink.on_message(blocked_msg());

        assert_eq!(sink.gate().generation(), generation + 1);
        assert_eq!(sink.ready().generation(), replaced.generation());
    }

    #[test]
    fn test_repeated_backpressure_false_is_noop() {
        let (mut sink, _outbox, _controller, start) = started();
        sink.on_message(ready_msg());
        sink.on_message(ready_msg());

        assert_eq!(start.status(), GateStatus::Resolved);
        assert_eq!(sink.gate().generation(), 0);
    }

    #[test]
    fn test_write_always_rearms() {
        let (mut sink, mut outbox, _controller, _start) = started();
        sink.on_message(ready_msg());

        let completion = sink.write("a");
        assert!(completion.is_pending());
        assert!(sink.backpressure());
        assert_eq!(drain(&mut outbox), vec![SenderMessage::Write { chunk: "a" }]);
    }

    #[test]
    fn test_write_while_blocked_reuses_gate() {
        let (mut sink, _outbox, _controller, start) = started();

        let completion = sink.write("early");
        assert!(completion.is_pending());
        assert_eq!(completion.generation(), start.generation());
    }

    #[test]
    fn test_backpressure_false_resolves_write_completion() {
        let (mut sink, _outbox, _controller, _start) = started();
        sink.on_message(ready_msg());

        let completion = sink.write("a");
        sink.on_message(ready_msg());

        assert_eq!(completion.status(), GateStatus::Resolved);
    }

    #[test]
    fn test_error_rejects_pending_start() {
        let (mut sink, _outbox, controller, start) = started();

        sink.on_message(ReceiverMessage::Error {
            reason: Reason::from("E"),
        });

        assert_eq!(start.status(), GateStatus::Rejected(Reason::from("E")));
        assert_eq!(controller.stored_error(), Some(Reason::from("E")));
        assert_eq!(controller.signal_count(), 1);
    }

    #[test]
    fn test_error_rejects_pending_write() {
        let (mut sink, _outbox, controller, _start) = started();
        sink.on_message(ready_msg());
        let completion = sink.write("a");

        sink.on_message(ReceiverMessage::Error {
            reason: Reason::from("E"),
        });

        assert_eq!(completion.status(), GateStatus::Rejected(Reason::from("E")));
        assert_eq!(controller.signal_count(), 1);
    }

    #[tokio::test]
    async fn test_error_after_resolution_fails_late_write() {
        let (mut sink, _outbox, controller, start) = started();
        sink.on_message(ready_msg());
        assert_eq!(start.status(), GateStatus::Resolved);

        sink.on_message(ReceiverMessage::Error {
            reason: Reason::from("E"),
        });
        // The resolved completion keeps its outcome
        assert_eq!(start.status(), GateStatus::Resolved);
        assert_eq!(controller.signal_count(), 1);

        let late = sink.write("late");
        assert_eq!(late.await, Err(SinkError::Errored(Reason::from("E"))));
    }

    #[test]
    fn test_backpressure_after_error_keeps_rejection() {
        let (mut sink, _outbox, _controller, start) = started();
        sink.on_message(ReceiverMessage::Error {
            reason: Reason::from("E"),
        });
        sink.on_message(ready_msg());
        sink.on_message(blocked_msg());

        assert_eq!(start.status(), GateStatus::Rejected(Reason::from("E")));
        assert_eq!(
            sink.ready().status(),
            GateStatus::Rejected(Reason::from("E"))
        );
    }

    #[test]
    fn test_close_and_abort_messages() {
        let (mut sink, mut outbox, _controller, start) = started();
        sink.close();
        sink.abort(Reason::from("R"));

        assert_eq!(
            drain(&mut outbox),
            vec![
                SenderMessage::Close,
                SenderMessage::Abort {
                    reason: Reason::from("R")
                },
            ]
        );
        // No gate interaction
        assert!(start.is_pending());
        assert_eq!(sink.gate().generation(), 0);
    }

    #[test]
    fn test_writes_keep_call_order() {
        let (mut sink, mut outbox, _controller, _start) = started();
        sink.write("1");
        sink.write("2");
        sink.write("3");

        let chunks: Vec<_> = drain(&mut outbox)
            .into_iter()
            .map(|m| match m {
                SenderMessage::Write { chunk } => chunk,
                other => panic!("Expected Write, got {:?}", other),
            })
            .collect();
        assert_eq!(chunks, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_post_to_closed_port_is_counted() {
        let (tx, rx) = mpsc::unbounded_channel::<SenderMessage<u8>>();
        drop(rx);
        let stats = Arc::new(Stats::new());
        let mut sink = PortSink::new(tx).with_stats(stats.clone());

        sink.write(1);

        let snap = stats.snapshot();
        assert_eq!(snap.dropped, 1);
        assert_eq!(snap.writes, 1);
    }
}
