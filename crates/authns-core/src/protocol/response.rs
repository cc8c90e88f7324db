//! Response framing

use super::{FIELD_NAME, FIELD_TTL, FIELD_TYPE, FIELD_VALUE};
use crate::store::{Record, RecordKey};

/// Registration accepted
pub const TOKEN_OK: &str = "OK";
/// Registration rejected
pub const TOKEN_FAIL: &str = "FAIL";
/// Query unresolved or malformed
pub const TOKEN_NOT_FOUND: &str = "NOT_FOUND";

/// A reply to one datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Registration stored
    Ok,
    /// Registration rejected
    Fail,
    /// Nothing to resolve
    NotFound,
    /// Query answer: echoes the queried key plus the stored record
    Record {
        /// Queried key
        key: RecordKey,
        /// Stored record
        record: Record,
    },
}

impl Response {
    /// Encode the response payload
    ///
    /// A record answer is four `KEY=VALUE` lines, each newline-terminated.
    pub fn encode(&self) -> String {
        match self {
            Response::Ok => TOKEN_OK.to_string(),
            Response::Fail => TOKEN_FAIL.to_string(),
            Response::NotFound => TOKEN_NOT_FOUND.to_string(),
            Response::Record { key, record } => format!(
                "{}={}\n{}={}\n{}={}\n{}={}\n",
                FIELD_TYPE,
                key.record_type,
                FIELD_NAME,
                key.name,
                FIELD_VALUE,
                record.value,
                FIELD_TTL,
                record.ttl
            ),
        }
    }

    /// Short label for logs and events
    pub fn label(&self) -> &'static str {
        match self {
            Response::Ok => TOKEN_OK,
            Response::Fail => TOKEN_FAIL,
            Response::NotFound => TOKEN_NOT_FOUND,
            Response::Record { .. } => "RECORD",
        }
    }
}
