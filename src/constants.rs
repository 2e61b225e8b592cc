//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Network
// =============================================================================

/// Default consumer endpoint
pub const DEFAULT_URL: &str = "ws://127.0.0.1:9000";

// =============================================================================
// Sink
// =============================================================================

/// Assume the consumer is not ready until it says otherwise
pub const DEFAULT_INITIAL_BACKPRESSURE: bool = true;

/// Readiness timeout for the CLI (milliseconds, 0 = wait forever)
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 0;

// =============================================================================
// Timing
// =============================================================================

/// Interval at which relay tasks check the shutdown flag (milliseconds)
pub const SHUTDOWN_POLL_INTERVAL_MS: u64 = 100;

/// Maximum wait for outbound frames to flush on exit (milliseconds)
pub const FLUSH_TIMEOUT_MS: u64 = 2000;

// =============================================================================
// Buffers
// =============================================================================

/// Channel capacity between transport tasks and the codec layer
pub const CHANNEL_CAPACITY: usize = 256;
