//! Per-datagram rejection reasons.

use crate::parser::Field;

/// Why a datagram did not become a [`LogRecord`](crate::LogRecord).
///
/// None of these are fatal to the listener; they are yielded on the record
/// stream in place of the record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The payload is not a JSON object. `diagnostic` is `None` when the
    /// payload is not even valid UTF-8.
    #[error("malformed datagram ({len} bytes){}", fmt_diagnostic(.diagnostic))]
    Malformed {
        len: usize,
        diagnostic: Option<String>,
    },

    /// The payload exceeded the configured `max_datagram_size` and was
    /// dropped unparsed.
    #[error("datagram of {len} bytes exceeds the {limit} byte limit")]
    Oversized { len: usize, limit: usize },

    #[error("missing required field `{0}`")]
    MissingField(Field),

    #[error("field `{field}` has an unexpected type, expected {expected}", field = .0, expected = Field::expected(.0))]
    TypeMismatch(Field),

    #[error("unknown severity {0:?}")]
    UnknownSeverity(String),
}

impl ParseError {
    /// The field the error refers to, if it is a per-field error.
    pub fn field(&self) -> Option<Field> {
        match self {
            ParseError::MissingField(field) | ParseError::TypeMismatch(field) => Some(*field),
            ParseError::UnknownSeverity(_) => Some(Field::Severity),
            ParseError::Malformed { .. } | ParseError::Oversized { .. } => None,
        }
    }
}

fn fmt_diagnostic(diagnostic: &Option<String>) -> String {
    match diagnostic {
        Some(d) => format!(": {d}"),
        None => ": payload is not valid UTF-8".to_string(),
    }
}
