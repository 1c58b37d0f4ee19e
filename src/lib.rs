//! logdrop — receive JSON log records over UDP and print them.
//!
//! The heavy lifting lives in the workspace crates; this crate only wires
//! them into a runnable process so that integration tests can drive the same
//! code path the binary uses.
//!
//! # Architecture
//!
//! ```text
//! Listener (per endpoint) ──► Runtime task ──► OutputFormat ──► stdout
//!        │
//!        └──► ParseError ──► tracing (debug) + counters
//! ```

pub mod output;
pub mod runtime;

pub use logdrop_core::{config, LogRecord, ParseError, Severity};
pub use output::OutputFormat;
pub use runtime::{ListenerSummary, Runtime, SharedWriter};
