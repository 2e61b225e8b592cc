//! port-sink - stream stdin to a consumer over a flow-controlled port
//!
//! Usage:
//!   port-sink send                      Send stdin lines, close at EOF
//!   port-sink send --abort-on-eof WHY   Send stdin lines, abort at EOF
//!   port-sink --url ws://host:port send Override the consumer URL
//!   port-sink config                    Print the effective config

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use port_sink_bridge::codec::JsonCodec;
use port_sink_bridge::config::{self, Config};
use port_sink_bridge::constants::FLUSH_TIMEOUT_MS;
use port_sink_bridge::error::{BridgeError, Result};
use port_sink_bridge::transport::WebSocketTransport;
use port_sink_bridge::{from_writable_port, logging, port, PortWriter, SinkPort, Stats};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => Config::default(),
    };
    if let Some(url) = cli.url {
        config.transport.url = url;
    }

    logging::init_tracing(cli.verbose || config.logs.verbose);

    match cli.command {
        Command::Config => {
            let text = toml::to_string_pretty(&config).map_err(|e| {
                BridgeError::ConfigValidation {
                    field: "config",
                    reason: e.to_string(),
                }
            })?;
            print!("{}", text);
            Ok(())
        }
        Command::Send {
            abort_on_eof,
            no_wait,
            ready_timeout,
        } => {
            if no_wait {
                config.sink.initial_backpressure = false;
            }
            if let Some(ms) = ready_timeout {
                config.sink.ready_timeout_ms = ms;
            }
            config.validate()?;

            let rt = tokio::runtime::Runtime::new()
                .map_err(|source| BridgeError::Runtime { source })?;
            rt.block_on(run_send(config, abort_on_eof))
        }
    }
}

/// How the input pump ended
enum Finish {
    Eof,
    Interrupted,
}

async fn run_send(config: Config, abort_on_eof: Option<String>) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let connection = WebSocketTransport::new(config.transport.url.as_str())
        .connect(shutdown.clone())
        .await?;
    let port: SinkPort<String> = port::bind(connection.channels, JsonCodec);

    let stats = Arc::new(Stats::new());
    let mut writer = from_writable_port(port, &config.sink, stats.clone());

    let outcome = tokio::select! {
        result = pump_stdin(&mut writer, config.sink.ready_timeout()) => result,
        _ = tokio::signal::ctrl_c() => Ok(Finish::Interrupted),
    };

    let result = match outcome {
        Ok(Finish::Eof) => match abort_on_eof {
            Some(reason) => {
                writer.abort(reason);
                Ok(())
            }
            None => writer.close().await.map_err(BridgeError::from),
        },
        Ok(Finish::Interrupted) => {
            warn!("Interrupted, aborting");
            writer.abort("interrupted");
            Ok(())
        }
        Err(e) => {
            // No-op if the consumer already errored the sink
            writer.abort(e.to_string());
            Err(e)
        }
    };

    // Session ends with the writer; wait for CLOSE/ABORT to reach the wire
    drop(writer);
    let flush = Duration::from_millis(FLUSH_TIMEOUT_MS);
    if tokio::time::timeout(flush, connection.flushed).await.is_err() {
        warn!("Outbound frames not flushed after {} ms", FLUSH_TIMEOUT_MS);
    }
    shutdown.store(true, Ordering::SeqCst);

    let snap = stats.snapshot();
    info!(
        "Sent {} chunks ({} backpressure updates, {} dropped)",
        snap.writes, snap.backpressure, snap.dropped
    );
    result
}

/// Write stdin into the sink line by line until EOF
async fn pump_stdin(
    writer: &mut PortWriter<String>,
    ready_timeout: Option<Duration>,
) -> Result<Finish> {
    wait_ready(writer, ready_timeout).await?;
    info!("Consumer ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = lines.next_line().await.map_err(|source| BridgeError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
        match line {
            Some(line) => writer.write(line).await?,
            None => return Ok(Finish::Eof),
        }
    }
}

/// Wait for the consumer's first readiness, bounded by `ready_timeout`
async fn wait_ready<W: Send + 'static>(
    writer: &mut PortWriter<W>,
    ready_timeout: Option<Duration>,
) -> Result<()> {
    match ready_timeout {
        Some(after) => match tokio::time::timeout(after, writer.ready()).await {
            Ok(ready) => Ok(ready?),
            Err(_) => Err(BridgeError::ReadyTimeout { after }),
        },
        None => Ok(writer.ready().await?),
    }
}
