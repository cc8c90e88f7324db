//! `KEY=VALUE` line parsing

use std::collections::HashMap;

/// Fields extracted from one datagram payload
///
/// Duplicate keys resolve to the last value seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: HashMap<String, String>,
}

impl FieldMap {
    /// Create an empty field map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Check whether a field is present (possibly with an empty value)
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set a field, replacing any earlier value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Number of distinct fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no fields were parsed
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a payload into fields
///
/// Surrounding whitespace of the whole payload is ignored, so a trailing
/// newline is optional. Lines without `=` are skipped. Only the first `=`
/// splits, so values may contain `=`.
pub fn parse_fields(payload: &str) -> FieldMap {
    let mut fields = FieldMap::new();

    for line in payload.trim().split('\n') {
        if let Some((key, value)) = line.split_once('=') {
            fields.insert(key, value);
        }
    }

    fields
}
