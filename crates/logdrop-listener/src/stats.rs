//! Per-listener counters.
//!
//! Owned by one listener and shared by `Arc` with whoever wants to watch it.
//! All updates are `Relaxed`: the counters are informational and never used
//! for synchronisation.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ListenerStats {
    received: AtomicU64,
    records: AtomicU64,
    rejected: AtomicU64,
    receive_errors: AtomicU64,
}

/// Point-in-time copy of [`ListenerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Datagrams read off the socket.
    pub received: u64,
    /// Datagrams that became a `LogRecord`.
    pub records: u64,
    /// Datagrams that became a `ParseError`.
    pub rejected: u64,
    /// Failed `recv` calls on an otherwise healthy socket.
    pub receive_errors: u64,
}

impl ListenerStats {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_accepted(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_receive_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "received={} records={} rejected={} receive_errors={}",
            self.received, self.records, self.rejected, self.receive_errors
        )
    }
}
