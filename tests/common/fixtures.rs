//! Static payload corpora used across harnesses.

/// Well-formed records in a few shapes. Every one must parse.
pub const CORPUS_VALID: &[&str] = &[
    r#"{"severity":"DEBUG","levelno":0,"message":"le message","timestamp":1705312800000000000,"pid":4242,"tid":140245}"#,
    r#"{"severity":"info","levelno":20,"message":"Server started","timestamp":1705312801000000000,"pid":1,"tid":1,"port":8080}"#,
    r#"{"severity":"Warn","levelno":30,"message":"","timestamp":-1,"pid":0,"tid":0}"#,
    r#"{"tid":7,"pid":7,"timestamp":0,"message":"key order does not matter","levelno":40,"severity":"ERROR"}"#,
    r#"{"severity":"wARN","levelno":30,"message":"Slow query","timestamp":1705312802123456789,"pid":99,"tid":100,"context":{"duration_ms":4200}}"#,
    "{ \"severity\" : \"INFO\" ,\n \"levelno\" : 20 , \"message\" : \"whitespace\" , \"timestamp\" : 5 , \"pid\" : 2 , \"tid\" : 3 }",
];

/// Payloads that are not a JSON object at all.
pub const CORPUS_MALFORMED: &[&str] = &[
    "",
    "not json",
    "{",
    r#"{"severity":"INFO",}"#,
    "[]",
    "42",
    r#""just a string""#,
    "null",
    r#"{"severity":"INFO"}{"severity":"INFO"}"#,
];

/// One payload per required field with that field removed, paired with the
/// field's name.
pub fn corpus_missing_each_field() -> Vec<(&'static str, Vec<u8>)> {
    ["severity", "levelno", "message", "timestamp", "pid", "tid"]
        .into_iter()
        .map(|field| (field, super::builders::PayloadBuilder::new().without(field).bytes()))
        .collect()
}
