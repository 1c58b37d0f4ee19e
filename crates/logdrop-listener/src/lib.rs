//! logdrop-listener — the UDP side of logdrop.
//!
//! Each [`Listener`] binds one socket, reads one JSON log record per
//! datagram, and hands the caller a `Result<LogRecord, ParseError>` per
//! datagram until it is stopped. Listeners are independent values; run as
//! many as needed.

pub mod stats;
pub mod udp;

pub use stats::{ListenerStats, StatsSnapshot};
pub use udp::{BindError, Listener, StopHandle};
