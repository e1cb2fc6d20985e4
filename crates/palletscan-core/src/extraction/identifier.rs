//! Shipment (container) identifier lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::patterns::SHIPMENT_ID;
use super::{ExtractionMatch, FieldExtractor};

/// Sentinel used when a document carries no recognizable identifier.
pub const UNKNOWN_IDENTIFIER: &str = "UNKNOWN";

/// Shipment identifier of a document, or the sentinel that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentId {
    /// Identifier text.
    pub value: String,
    /// Whether the value was found in the document.
    pub detected: bool,
}

impl ShipmentId {
    pub fn detected(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            detected: true,
        }
    }

    pub fn unknown(sentinel: impl Into<String>) -> Self {
        Self {
            value: sentinel.into(),
            detected: false,
        }
    }

    /// Use the located identifier, falling back to `sentinel`.
    pub fn resolve(found: Option<String>, sentinel: &str) -> Self {
        match found {
            Some(value) => Self::detected(value),
            None => Self::unknown(sentinel),
        }
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Locates container numbers. The first occurrence wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentifierLocator;

impl IdentifierLocator {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for IdentifierLocator {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        SHIPMENT_ID.find(text).map(|m| {
            ExtractionMatch::new(m.as_str().to_string(), m.as_str()).with_position(m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        SHIPMENT_ID
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Find the first shipment identifier in the text.
pub fn locate_identifier(text: &str) -> Option<String> {
    IdentifierLocator::new().extract(text).map(|m| m.value)
}
