//! Message classification
//!
//! Turns a [`FieldMap`] into an explicit [`Message`] right after parsing, so
//! the content-sniffing rule lives in exactly one place.

use std::fmt;

use super::fields::{FieldMap, parse_fields};
use super::{FIELD_NAME, FIELD_TTL, FIELD_TYPE, FIELD_VALUE};
use crate::store::{Record, RecordKey};

/// What a datagram was classified as, independent of validity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Carries both `VALUE` and `TTL`
    Registration,
    /// Everything else
    Query,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Registration => write!(f, "registration"),
            MessageKind::Query => write!(f, "query"),
        }
    }
}

/// A classified and validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Create or overwrite the record at `key`
    Registration {
        /// Target slot
        key: RecordKey,
        /// Record to store
        record: Record,
    },

    /// Resolve the record at `key`
    Query {
        /// Slot to look up
        key: RecordKey,
    },

    /// Classified, but missing required fields
    Malformed {
        /// How the payload was classified
        kind: MessageKind,
        /// Human-readable reason, for logs only
        reason: String,
    },
}

impl Message {
    /// Parse and classify a payload
    pub fn parse(payload: &str) -> Self {
        Self::classify(&parse_fields(payload))
    }

    /// Classify parsed fields
    ///
    /// Registration requires `TYPE`, `NAME`, and non-empty `VALUE` and `TTL`.
    /// Query requires `TYPE` and `NAME`.
    pub fn classify(fields: &FieldMap) -> Self {
        let kind = if fields.contains(FIELD_VALUE) && fields.contains(FIELD_TTL) {
            MessageKind::Registration
        } else {
            MessageKind::Query
        };

        let (Some(record_type), Some(name)) = (fields.get(FIELD_TYPE), fields.get(FIELD_NAME))
        else {
            return Message::Malformed {
                kind,
                reason: format!("missing {} or {}", FIELD_TYPE, FIELD_NAME),
            };
        };
        let key = RecordKey::new(name, record_type);

        match kind {
            MessageKind::Query => Message::Query { key },
            MessageKind::Registration => {
                let value = fields.get(FIELD_VALUE).unwrap_or_default();
                let ttl = fields.get(FIELD_TTL).unwrap_or_default();

                if value.is_empty() || ttl.is_empty() {
                    return Message::Malformed {
                        kind,
                        reason: format!("empty {} or {}", FIELD_VALUE, FIELD_TTL),
                    };
                }

                Message::Registration {
                    key,
                    record: Record::new(value, ttl),
                }
            }
        }
    }

    /// How this message was classified
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Registration { .. } => MessageKind::Registration,
            Message::Query { .. } => MessageKind::Query,
            Message::Malformed { kind, .. } => *kind,
        }
    }
}
