//! Core types for logdrop-core.
//!
//! This module defines the data structures shared by the parser, the
//! listener, and the host binary: the inbound [`RawDatagram`], the validated
//! [`LogRecord`], and its closed [`Severity`] set.

use std::net::SocketAddr;
use std::str::FromStr;

use serde::Serialize;

/// One datagram exactly as it came off the socket, paired with its sender.
///
/// Borrowed from the listener's receive buffer; it lives only for the
/// duration of a single parse.
#[derive(Debug, Clone, Copy)]
pub struct RawDatagram<'a> {
    pub payload: &'a [u8],
    pub peer: SocketAddr,
}

impl<'a> RawDatagram<'a> {
    pub fn new(payload: &'a [u8], peer: SocketAddr) -> Self {
        Self { payload, peer }
    }
}

/// A validated, normalised log record produced from a single datagram.
///
/// Every required wire field is present and well-typed. `timestamp` may be
/// negative, meaning the producer could not resolve wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Canonical severity.
    pub severity: Severity,
    /// Producer-side numeric level, passed through untouched.
    pub levelno: u64,
    /// Message text. May be empty.
    pub message: String,
    /// Nanoseconds since the Unix epoch; negative when unresolved.
    pub timestamp: i64,
    pub pid: u64,
    pub tid: u64,
    /// Address the datagram was received from.
    pub peer: SocketAddr,
    /// Any top-level keys beyond the required six, kept verbatim.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Returns `false` for the negative "timestamp unknown" sentinel.
    pub fn is_timestamp_resolved(&self) -> bool {
        self.timestamp >= 0
    }

    /// Wall-clock time of the record, or `None` when the timestamp is unresolved.
    pub fn datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.is_timestamp_resolved()
            .then(|| chrono::DateTime::from_timestamp_nanos(self.timestamp))
    }
}

/// Log severity, restricted to the levels the wire format accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// Single-letter tag used by the human-readable output.
    pub fn initial(&self) -> char {
        match self {
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warn => 'W',
            Severity::Error => 'E',
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known severity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity {0:?}")]
pub struct SeverityParseError(pub String);

impl FromStr for Severity {
    type Err = SeverityParseError;

    /// Case-insensitive. Only the four canonical names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("debug") {
            Ok(Severity::Debug)
        } else if s.eq_ignore_ascii_case("info") {
            Ok(Severity::Info)
        } else if s.eq_ignore_ascii_case("warn") {
            Ok(Severity::Warn)
        } else if s.eq_ignore_ascii_case("error") {
            Ok(Severity::Error)
        } else {
            Err(SeverityParseError(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(timestamp: i64) -> LogRecord {
        LogRecord {
            severity: Severity::Info,
            levelno: 20,
            message: "hello".to_string(),
            timestamp,
            pid: 1,
            tid: 2,
            peer: "127.0.0.1:9000".parse().unwrap(),
            fields: serde_json::Map::new(),
        }
    }

    #[test]
    fn severity_parse_ignores_case() {
        for s in ["debug", "DEBUG", "Debug", "dEbUg"] {
            assert_eq!(s.parse::<Severity>().unwrap(), Severity::Debug);
        }
    }

    #[test]
    fn severity_parse_has_no_aliases() {
        for s in ["warning", "WARNING", "err", "critical", "fatal", "trace"] {
            assert_eq!(s.parse::<Severity>(), Err(SeverityParseError(s.to_string())));
        }
    }

    #[test]
    fn severity_parse_rejects_unknown() {
        let err = "critical".parse::<Severity>().unwrap_err();
        assert_eq!(err, SeverityParseError("critical".to_string()));
    }

    #[test]
    fn severity_display_roundtrips_through_from_str() {
        for severity in Severity::ALL {
            assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
        }
    }

    #[test]
    fn negative_timestamp_is_unresolved() {
        assert!(!record(-1).is_timestamp_resolved());
        assert!(record(-1).datetime().is_none());
        assert!(record(0).is_timestamp_resolved());
    }

    #[test]
    fn datetime_keeps_nanoseconds() {
        let dt = record(1_705_312_800_123_456_789).datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_705_312_800);
        assert_eq!(dt.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn serializes_severity_upper_case_and_skips_empty_fields() {
        let json = serde_json::to_value(record(5)).unwrap();
        assert_eq!(json["severity"], "INFO");
        assert_eq!(json["peer"], "127.0.0.1:9000");
        assert!(json.get("fields").is_none());
    }
}
