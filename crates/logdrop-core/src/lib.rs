//! logdrop-core — types, parser, and configuration for logdrop.
//!
//! # Pipeline
//!
//! ```text
//! UDP socket ──► RawDatagram ──► DatagramParser ──► Result<LogRecord, ParseError>
//! ```
//!
//! The socket side lives in `logdrop-listener`; everything here is
//! synchronous and free of I/O so it can be exercised directly in tests and
//! benchmarks.

pub mod config;
pub mod error;
pub mod parser;
pub mod types;

pub use error::ParseError;
pub use parser::{DatagramParser, Field, SeverityPolicy};
pub use types::{LogRecord, RawDatagram, Severity, SeverityParseError};
