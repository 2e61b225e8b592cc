//! Port writer - producer handle for a port sink
//!
//! `PortWriter` is the stream machinery around `PortSink`: it starts the
//! sink, waits for readiness before each write, fails fast once the sink
//! is errored, and finalizes with close or abort.
//!
//! It can be used directly (`write().await`) or as a
//! `futures_util::Sink`:
//!
//! ```ignore
//! let mut writer = from_writable_port::<String>(port, &config, stats);
//! writer.send("hello".to_string()).await?;
//! writer.close().await?;
//! ```

use super::gate::Ready;
use super::port_sink::PortSink;
use super::session::{Command, SinkSession};
use super::sink::{SinkController, UnderlyingSink};
use super::stats::Stats;
use crate::config::SinkConfig;
use crate::error::SinkError;
use crate::port::SinkPort;
use crate::protocol::Reason;
use futures_util::future::BoxFuture;
use futures_util::Sink;
use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::sync::{mpsc, oneshot};

/// Writer lifecycle as seen by the producer
#[derive(Debug, Clone, PartialEq)]
enum WriterState {
    Writable,
    Closed,
    Aborted(Reason),
    /// Session task is gone
    Ended,
}

/// Producer handle over a port sink
pub struct PortWriter<W> {
    commands: mpsc::UnboundedSender<Command<W>>,
    controller: SinkController,
    state: WriterState,
    /// Completion of the last start/write, not yet observed
    pending: Option<BoxFuture<'static, Result<(), SinkError>>>,
}

/// Wrap a producer-side port in a writer
///
/// Spawns the session task (requires a tokio runtime) and starts the
/// sink. The writer becomes ready once the consumer announces readiness,
/// unless `config.initial_backpressure` is `false`.
pub fn from_writable_port<W>(
    port: SinkPort<W>,
    config: &SinkConfig,
    stats: Arc<Stats>,
) -> PortWriter<W>
where
    W: Send + 'static,
{
    let (outbound, inbound) = port.split();
    let mut sink = PortSink::with_initial_backpressure(outbound, config.initial_backpressure)
        .with_stats(stats);
    let controller = SinkController::new();
    // Started before the session sees any port message
    let start = sink.start(controller.clone());
    let (commands, command_rx) = mpsc::unbounded_channel();

    let session = SinkSession::new(sink, inbound, command_rx, controller.clone());
    tokio::spawn(session.run());

    PortWriter {
        commands,
        controller,
        state: WriterState::Writable,
        pending: Some(Box::pin(start.wait())),
    }
}

impl<W: Send + 'static> PortWriter<W> {
    /// Error reported by the consumer, if any
    pub fn error(&self) -> Option<Reason> {
        self.controller.stored_error()
    }

    /// Error-signaling capability shared with the sink
    pub fn controller(&self) -> &SinkController {
        &self.controller
    }

    /// True while a start or write completion is outstanding
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait until the next write may be issued
    pub async fn ready(&mut self) -> Result<(), SinkError> {
        self.check_state()?;
        poll_fn(|cx| self.poll_pending(cx)).await?;
        self.check_state()
    }

    /// Write one chunk and wait for the consumer to accept more
    pub async fn write(&mut self, chunk: W) -> Result<(), SinkError> {
        self.ready().await?;
        self.start_write(chunk)?;
        poll_fn(|cx| self.poll_pending(cx)).await
    }

    /// Wait for readiness, then finalize normally
    pub async fn close(&mut self) -> Result<(), SinkError> {
        if self.state == WriterState::Closed {
            return Err(SinkError::Closed);
        }
        self.ready().await?;
        self.finish_close()
    }

    /// Finalize abnormally without waiting
    ///
    /// No-op if the writer is already finished or errored.
    pub fn abort(&mut self, reason: impl Into<Reason>) {
        if self.state != WriterState::Writable || self.controller.is_errored() {
            return;
        }
        let reason = reason.into();
        self.pending = None;
        let command = Command::Abort {
            reason: reason.clone(),
        };
        // A dead session leaves the writer Ended
        if self.send_command(command).is_ok() {
            self.state = WriterState::Aborted(reason);
        }
    }

    fn check_state(&self) -> Result<(), SinkError> {
        if let Some(reason) = self.controller.stored_error() {
            return Err(SinkError::Errored(reason));
        }
        match &self.state {
            WriterState::Writable => Ok(()),
            WriterState::Closed => Err(SinkError::Closed),
            WriterState::Aborted(reason) => Err(SinkError::Aborted(reason.clone())),
            WriterState::Ended => Err(SinkError::SessionEnded),
        }
    }

    fn start_write(&mut self, chunk: W) -> Result<(), SinkError> {
        self.check_state()?;
        let (reply, reply_rx) = oneshot::channel();
        self.send_command(Command::Write { chunk, reply })?;
        self.pending = Some(completion(reply_rx));
        Ok(())
    }

    fn finish_close(&mut self) -> Result<(), SinkError> {
        self.send_command(Command::Close)?;
        self.state = WriterState::Closed;
        Ok(())
    }

    fn send_command(&mut self, command: Command<W>) -> Result<(), SinkError> {
        if self.commands.send(command).is_err() {
            self.state = WriterState::Ended;
            return Err(SinkError::SessionEnded);
        }
        Ok(())
    }

    fn poll_pending(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), SinkError>> {
        if let Some(pending) = self.pending.as_mut() {
            let result = ready!(pending.as_mut().poll(cx));
            self.pending = None;
            if result == Err(SinkError::SessionEnded) {
                self.state = WriterState::Ended;
            }
            result?;
        }
        Poll::Ready(Ok(()))
    }
}

/// Completion of a command: the session's reply, then the gate it names
fn completion(reply: oneshot::Receiver<Ready>) -> BoxFuture<'static, Result<(), SinkError>> {
    Box::pin(async move {
        let ready = reply.await.map_err(|_| SinkError::SessionEnded)?;
        ready.wait().await
    })
}

impl<W: Send + 'static> Sink<W> for PortWriter<W> {
    type Error = SinkError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let this = self.get_mut();
        this.check_state()?;
        ready!(this.poll_pending(cx))?;
        Poll::Ready(this.check_state())
    }

    fn start_send(self: Pin<&mut Self>, item: W) -> Result<(), Self::Error> {
        self.get_mut().start_write(item)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.get_mut().poll_pending(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let this = self.get_mut();
        if this.state == WriterState::Closed {
            return Poll::Ready(Ok(()));
        }
        this.check_state()?;
        ready!(this.poll_pending(cx))?;
        this.check_state()?;
        Poll::Ready(this.finish_close())
    }
}
