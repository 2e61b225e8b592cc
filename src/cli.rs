//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Stream data to a consumer over a flow-controlled message port
#[derive(Parser, Debug)]
#[command(name = "port-sink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Consumer WebSocket URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send stdin to the consumer, one chunk per line
    Send {
        /// Abort with this reason at end of input instead of closing
        #[arg(long, value_name = "REASON")]
        abort_on_eof: Option<String>,

        /// Start writing without waiting for the consumer's first signal
        #[arg(long)]
        no_wait: bool,

        /// Give up if the consumer is not ready in time (milliseconds)
        #[arg(long, value_name = "MS")]
        ready_timeout: Option<u64>,
    },

    /// Print the effective configuration as TOML
    Config,
}

// =============================================================================
// Tests
// =============================================================================
