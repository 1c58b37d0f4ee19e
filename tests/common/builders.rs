//! Test builders — ergonomic constructors for wire payloads.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// PayloadBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for datagram payloads. Starts from a complete, valid record
/// shaped like the reference sender's traffic.
///
/// # Example
///
/// ```rust
/// let bytes = PayloadBuilder::new()
///     .severity("error")
///     .timestamp(-1)
///     .without("tid")
///     .bytes();
/// ```
pub struct PayloadBuilder {
    object: Map<String, Value>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        let object = match json!({
            "severity": "DEBUG",
            "levelno": 0,
            "message": "le message",
            "timestamp": 1_705_312_800_000_000_000i64,
            "pid": 31337,
            "tid": 140_245_000_000_000u64,
        }) {
            Value::Object(object) => object,
            _ => unreachable!(),
        };
        Self { object }
    }

    pub fn severity(self, severity: &str) -> Self {
        self.set("severity", severity)
    }

    pub fn levelno(self, levelno: u64) -> Self {
        self.set("levelno", levelno)
    }

    pub fn message(self, message: &str) -> Self {
        self.set("message", message)
    }

    pub fn timestamp(self, timestamp: i64) -> Self {
        self.set("timestamp", timestamp)
    }

    pub fn pid(self, pid: u64) -> Self {
        self.set("pid", pid)
    }

    pub fn tid(self, tid: u64) -> Self {
        self.set("tid", tid)
    }

    /// Set any key to any JSON value, including wrongly-typed ones.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.object.insert(key.to_string(), value.into());
        self
    }

    /// Drop a key entirely.
    pub fn without(mut self, key: &str) -> Self {
        self.object.remove(key);
        self
    }

    pub fn value(self) -> Value {
        Value::Object(self.object)
    }

    pub fn bytes(self) -> Vec<u8> {
        serde_json::to_vec(&self.value()).expect("payload must serialize")
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// A valid payload with the given severity spelling.
pub fn payload_with_severity(severity: &str) -> Vec<u8> {
    PayloadBuilder::new().severity(severity).bytes()
}

/// A valid payload with the given timestamp.
pub fn payload_with_timestamp(timestamp: i64) -> Vec<u8> {
    PayloadBuilder::new().timestamp(timestamp).bytes()
}
