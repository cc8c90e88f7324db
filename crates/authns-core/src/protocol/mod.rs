//! Wire protocol
//!
//! Every datagram carries newline-separated `KEY=VALUE` lines. The protocol
//! has no opcode: a payload whose fields include both `VALUE` and `TTL` is a
//! registration, anything else is a query. That rule is fixed for
//! compatibility with existing clients.
//!
//! ```text
//! TYPE=A            TYPE=A
//! NAME=foo          NAME=foo
//! VALUE=1.2.3.4
//! TTL=5
//! (registration)    (query)
//! ```

pub mod fields;
pub mod message;
pub mod response;

pub use fields::{FieldMap, parse_fields};
pub use message::{Message, MessageKind};
pub use response::Response;

/// Field carrying the record type
pub const FIELD_TYPE: &str = "TYPE";
/// Field carrying the record name
pub const FIELD_NAME: &str = "NAME";
/// Field carrying the record value
pub const FIELD_VALUE: &str = "VALUE";
/// Field carrying the record TTL
pub const FIELD_TTL: &str = "TTL";
