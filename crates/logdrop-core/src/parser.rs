//! Parser — turns one [`RawDatagram`] into a validated [`LogRecord`].
//!
//! The datagram boundary is the message boundary: the whole payload must be a
//! single JSON object. Validation runs in a fixed order so that a given bad
//! payload always produces the same [`ParseError`]:
//!
//! 1. size cap (`max_datagram_size`), before any decoding
//! 2. UTF-8 and JSON syntax, then "is it an object"
//! 3. presence of every required field, in [`Field::REQUIRED`] order
//! 4. type of every required field, in the same order
//! 5. severity canonicalisation, subject to the [`SeverityPolicy`]

use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::types::{LogRecord, RawDatagram, Severity, SeverityParseError};

// ---------------------------------------------------------------------------
// Required fields
// ---------------------------------------------------------------------------

/// A required key of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Severity,
    Levelno,
    Message,
    Timestamp,
    Pid,
    Tid,
}

impl Field {
    /// Every required field, in validation order.
    pub const REQUIRED: [Field; 6] = [
        Field::Severity,
        Field::Levelno,
        Field::Message,
        Field::Timestamp,
        Field::Pid,
        Field::Tid,
    ];

    /// The JSON key of this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Severity => "severity",
            Field::Levelno => "levelno",
            Field::Message => "message",
            Field::Timestamp => "timestamp",
            Field::Pid => "pid",
            Field::Tid => "tid",
        }
    }

    /// Human description of the accepted JSON type.
    pub fn expected(&self) -> &'static str {
        match self {
            Field::Severity | Field::Message => "a string",
            Field::Levelno | Field::Pid | Field::Tid => "a non-negative integer",
            Field::Timestamp => "a 64-bit signed integer",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Unknown severity policy
// ---------------------------------------------------------------------------

/// What to do with a `severity` string outside the known set.
///
/// Spelled `"reject"` or a level name (`"debug"`, `"info"`, `"warn"`,
/// `"error"`) in config files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SeverityPolicy {
    /// Yield [`ParseError::UnknownSeverity`].
    #[default]
    Reject,
    /// Accept the record, replacing its severity with the given level.
    Fallback(Severity),
}

impl FromStr for SeverityPolicy {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("reject") {
            return Ok(SeverityPolicy::Reject);
        }
        s.parse().map(SeverityPolicy::Fallback)
    }
}

impl TryFrom<String> for SeverityPolicy {
    type Error = SeverityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for SeverityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityPolicy::Reject => f.write_str("reject"),
            SeverityPolicy::Fallback(severity) => {
                write!(f, "{}", severity.as_str().to_ascii_lowercase())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Stateless datagram-to-record decoder. Cheap to copy; one per listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatagramParser {
    max_datagram_size: Option<usize>,
    unknown_severity: SeverityPolicy,
}

impl DatagramParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject payloads longer than `limit` bytes without decoding them.
    pub fn with_max_datagram_size(mut self, limit: Option<usize>) -> Self {
        self.max_datagram_size = limit;
        self
    }

    pub fn with_severity_policy(mut self, policy: SeverityPolicy) -> Self {
        self.unknown_severity = policy;
        self
    }

    pub fn max_datagram_size(&self) -> Option<usize> {
        self.max_datagram_size
    }

    pub fn severity_policy(&self) -> SeverityPolicy {
        self.unknown_severity
    }

    /// Decode and validate a single datagram.
    pub fn parse(&self, datagram: RawDatagram<'_>) -> Result<LogRecord, ParseError> {
        let len = datagram.payload.len();

        if let Some(limit) = self.max_datagram_size {
            if len > limit {
                return Err(ParseError::Oversized { len, limit });
            }
        }

        let text = std::str::from_utf8(datagram.payload).map_err(|_| ParseError::Malformed {
            len,
            diagnostic: None,
        })?;

        let value: Value = serde_json::from_str(text).map_err(|err| ParseError::Malformed {
            len,
            diagnostic: Some(err.to_string()),
        })?;

        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ParseError::Malformed {
                    len,
                    diagnostic: Some(format!("expected a JSON object, found {}", kind(&other))),
                })
            }
        };

        if let Some(missing) = Field::REQUIRED
            .into_iter()
            .find(|field| !object.contains_key(field.as_str()))
        {
            return Err(ParseError::MissingField(missing));
        }

        let severity = take_string(&mut object, Field::Severity)?;
        let levelno = take_u64(&mut object, Field::Levelno)?;
        let message = take_string(&mut object, Field::Message)?;
        let timestamp = take_i64(&mut object, Field::Timestamp)?;
        let pid = take_u64(&mut object, Field::Pid)?;
        let tid = take_u64(&mut object, Field::Tid)?;

        let severity = match (severity.parse::<Severity>(), self.unknown_severity) {
            (Ok(severity), _) => severity,
            (Err(_), SeverityPolicy::Fallback(fallback)) => fallback,
            (Err(SeverityParseError(value)), SeverityPolicy::Reject) => {
                return Err(ParseError::UnknownSeverity(value))
            }
        };

        Ok(LogRecord {
            severity,
            levelno,
            message,
            timestamp,
            pid,
            tid,
            peer: datagram.peer,
            fields: object,
        })
    }
}

fn take_string(object: &mut Map<String, Value>, field: Field) -> Result<String, ParseError> {
    match object.remove(field.as_str()) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ParseError::TypeMismatch(field)),
        None => Err(ParseError::MissingField(field)),
    }
}

fn take_u64(object: &mut Map<String, Value>, field: Field) -> Result<u64, ParseError> {
    match object.remove(field.as_str()) {
        Some(value) => value.as_u64().ok_or(ParseError::TypeMismatch(field)),
        None => Err(ParseError::MissingField(field)),
    }
}

fn take_i64(object: &mut Map<String, Value>, field: Field) -> Result<i64, ParseError> {
    match object.remove(field.as_str()) {
        Some(value) => value.as_i64().ok_or(ParseError::TypeMismatch(field)),
        None => Err(ParseError::MissingField(field)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
