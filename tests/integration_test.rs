//! Integration tests for the port sink bridge
//!
//! Drives the bridge through in-process ports with a scripted consumer.

use port_sink_bridge::bridge::sink::UnderlyingSink;
use port_sink_bridge::{
    from_writable_port, port, GateStatus, PeerPort, PortSink, PortWriter, Reason,
    ReceiverMessage, SenderMessage, SinkConfig, SinkController, SinkError, Stats,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const TIMEOUT: Duration = Duration::from_secs(1);

// =============================================================================
// Scripted Consumer
// =============================================================================

/// What the consumer answers after each WRITE
#[derive(Clone, Copy)]
enum Reply {
    /// Ready for more
    Ready,
    /// Fail with the given reason
    Fail(&'static str),
}

/// Consumer peer that records everything it receives
///
/// Announces readiness once bound, then answers each WRITE from a script.
/// Writes past the end of the script are answered with `Ready`. Stops when
/// the producer side of the port goes away.
struct ScriptedConsumer {
    handle: tokio::task::JoinHandle<Vec<SenderMessage<String>>>,
}

impl ScriptedConsumer {
    fn spawn(mut peer: PeerPort<String>, script: Vec<Reply>) -> Self {
        let handle = tokio::spawn(async move {
            peer.send(ReceiverMessage::Backpressure {
                backpressure: false,
            });
            let mut received = Vec::new();
            let mut script = script.into_iter();
            while let Some(message) = peer.recv().await {
                let is_write = matches!(message, SenderMessage::Write { .. });
                received.push(message);
                if !is_write {
                    continue;
                }
                match script.next().unwrap_or(Reply::Ready) {
                    Reply::Ready => {
                        peer.send(ReceiverMessage::Backpressure {
                            backpressure: false,
                        });
                    }
                    Reply::Fail(reason) => {
                        peer.send(ReceiverMessage::Error {
                            reason: Reason::from(reason),
                        });
                    }
                }
            }
            received
        });

        Self { handle }
    }

    /// Everything received, once the session has released the port
    async fn finished(self) -> Vec<SenderMessage<String>> {
        tokio::time::timeout(TIMEOUT, self.handle)
            .await
            .expect("timeout")
            .expect("join")
    }
}

fn writer_pair() -> (PortWriter<String>, PeerPort<String>) {
    let (sink_port, peer) = port::channel();
    let writer = from_writable_port(sink_port, &SinkConfig::default(), Arc::new(Stats::new()));
    (writer, peer)
}

fn write(chunk: &str) -> SenderMessage<String> {
    SenderMessage::Write {
        chunk: chunk.to_string(),
    }
}

// =============================================================================
// Core scenario
// =============================================================================

#[tokio::test]
async fn test_end_to_end_scenario() {
    let (tx, mut outbox) = mpsc::unbounded_channel::<SenderMessage<&str>>();
    let mut sink = PortSink::new(tx);
    let controller = SinkController::new();
    let _start = sink.start(controller.clone());
    sink.on_message(ReceiverMessage::Backpressure {
        backpressure: false,
    });

    // write "a": WRITE sent, completion pending
    let first = sink.write("a");
    assert_eq!(outbox.try_recv().unwrap(), SenderMessage::Write { chunk: "a" });
    assert!(first.is_pending());

    // consumer ready: completion resolves
    sink.on_message(ReceiverMessage::Backpressure {
        backpressure: false,
    });
    assert_eq!(first.status(), GateStatus::Resolved);

    // write "b": WRITE sent, pending again
    let second = sink.write("b");
    assert_eq!(outbox.try_recv().unwrap(), SenderMessage::Write { chunk: "b" });
    assert!(second.is_pending());

    // consumer error: completion fails, controller invoked once
    sink.on_message(ReceiverMessage::Error {
        reason: Reason::from("boom"),
    });
    assert_eq!(
        second.await,
        Err(SinkError::Errored(Reason::from("boom")))
    );
    assert_eq!(controller.stored_error(), Some(Reason::from("boom")));
    assert_eq!(controller.signal_count(), 1);
    assert!(outbox.try_recv().is_err());
}

// =============================================================================
// Writer over a scripted consumer
// =============================================================================

#[tokio::test]
async fn test_writer_delivers_chunks_then_close() {
    let (mut writer, peer) = writer_pair();
    let consumer = ScriptedConsumer::spawn(peer, vec![]);

    for chunk in ["one", "two", "three"] {
        tokio::time::timeout(TIMEOUT, writer.write(chunk.to_string()))
            .await
            .expect("timeout")
            .expect("write");
    }
    writer.close().await.expect("close");

    assert_eq!(
        consumer.finished().await,
        vec![
            write("one"),
            write("two"),
            write("three"),
            SenderMessage::Close
        ]
    );
}

#[tokio::test]
async fn test_consumer_error_stops_producer() {
    let (mut writer, peer) = writer_pair();
    let consumer = ScriptedConsumer::spawn(peer, vec![Reply::Ready, Reply::Fail("disk full")]);

    writer.write("a".to_string()).await.expect("first write");
    let err = tokio::time::timeout(TIMEOUT, writer.write("b".to_string()))
        .await
        .expect("timeout")
        .unwrap_err();
    assert_eq!(err, SinkError::Errored(Reason::from("disk full")));

    // Every later write fails immediately, nothing more reaches the consumer
    let err = writer.write("c".to_string()).await.unwrap_err();
    assert_eq!(err, SinkError::Errored(Reason::from("disk full")));
    assert_eq!(writer.controller().signal_count(), 1);

    drop(writer);
    assert_eq!(consumer.finished().await, vec![write("a"), write("b")]);
}

#[tokio::test]
async fn test_abort_reaches_consumer() {
    let (mut writer, peer) = writer_pair();
    let consumer = ScriptedConsumer::spawn(peer, vec![]);

    writer.write("partial".to_string()).await.expect("write");
    writer.abort("cancelled by user");

    assert_eq!(
        consumer.finished().await,
        vec![
            write("partial"),
            SenderMessage::Abort {
                reason: Reason::from("cancelled by user")
            }
        ]
    );
}

#[tokio::test]
async fn test_silent_consumer_keeps_producer_blocked() {
    let (mut writer, _peer) = writer_pair();

    let blocked = tokio::time::timeout(Duration::from_millis(100), writer.ready()).await;
    assert!(blocked.is_err());
    assert!(writer.has_pending());
}

#[tokio::test]
async fn test_error_after_readiness_fails_next_write() {
    let (mut writer, peer) = writer_pair();
    peer.send(ReceiverMessage::Backpressure {
        backpressure: false,
    });
    writer.ready().await.expect("ready");

    // The write fails whether it reaches the session before or after the error
    peer.send(ReceiverMessage::Error {
        reason: Reason::from("late"),
    });

    assert_eq!(
        writer.write("x".to_string()).await,
        Err(SinkError::Errored(Reason::from("late")))
    );
}
