//! Sink session - single-owner task driving a `PortSink`
//!
//! The session handles:
//! - Producer commands (write/close/abort) from a `PortWriter`
//! - Inbound port messages (backpressure/error)
//!
//! Both are serialized through one `select!` loop, so the sink state is
//! only ever touched from this task.
//!
//! The session does NOT handle:
//! - Write ordering or fail-fast checks (that's the writer's job)
//! - Reconnection (a closed port is reported as a consumer error)

use super::gate::Ready;
use super::port_sink::PortSink;
use super::sink::{SinkController, UnderlyingSink};
use crate::protocol::{Reason, ReceiverMessage};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Producer command sent from a `PortWriter` to its session
#[derive(Debug)]
pub(crate) enum Command<W> {
    Write { chunk: W, reply: oneshot::Sender<Ready> },
    Close,
    Abort { reason: Reason },
}

/// Session owning one started sink and the inbound half of its port
pub(crate) struct SinkSession<W> {
    sink: PortSink<W>,
    inbound: mpsc::UnboundedReceiver<ReceiverMessage>,
    commands: mpsc::UnboundedReceiver<Command<W>>,
    controller: SinkController,
}

impl<W> SinkSession<W> {
    pub(crate) fn new(
        sink: PortSink<W>,
        inbound: mpsc::UnboundedReceiver<ReceiverMessage>,
        commands: mpsc::UnboundedReceiver<Command<W>>,
        controller: SinkController,
    ) -> Self {
        Self {
            sink,
            inbound,
            commands,
            controller,
        }
    }

    /// Run until the sink is closed or aborted, or the writer is dropped
    pub(crate) async fn run(mut self) {
        let mut port_open = true;

        loop {
            tokio::select! {
                msg = self.inbound.recv(), if port_open => {
                    match msg {
                        Some(message) => self.sink.on_message(message),
                        None => {
                            port_open = false;
                            self.on_port_closed();
                        }
                    }
                }

                cmd = self.commands.recv() => {
                    match cmd {
                        Some(command) => {
                            if self.handle(command) {
                                break;
                            }
                        }
                        None => {
                            debug!("Writer dropped, ending sink session");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Apply one producer command; returns true once the sink is finished
    fn handle(&mut self, command: Command<W>) -> bool {
        match command {
            Command::Write { chunk, reply } => {
                // Writer may have given up waiting; the write still stands
                let _ = reply.send(self.sink.write(chunk));
                false
            }
            Command::Close => {
                self.sink.close();
                info!("Sink closed");
                true
            }
            Command::Abort { reason } => {
                info!("Sink aborted: {}", reason);
                self.sink.abort(reason);
                true
            }
        }
    }

    fn on_port_closed(&mut self) {
        if self.controller.is_errored() {
            return;
        }
        warn!("Port closed by consumer");
        self.sink.on_message(ReceiverMessage::Error {
            reason: Reason::disconnected(),
        });
    }
}
