//! Encoding of outbound messages.
//!
//! Events are sent as flat JSON objects discriminated by `event_type` (see
//! [`RfbEvent`]).  Hosts without a model-sync channel of their own mirror
//! property writes to the producer as `{"type":"property", ...}` messages.

use serde::{Deserialize, Serialize};

use crate::domain::events::RfbEvent;
use crate::domain::properties::{Property, PropertyValue};

/// A property write mirrored to the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "property")]
pub struct PropertyUpdate {
    pub name: String,
    pub value: PropertyValue,
}

impl PropertyUpdate {
    pub fn new(property: Property, value: PropertyValue) -> Self {
        Self {
            name: property.name().to_string(),
            value,
        }
    }
}

/// Serializes an event record to its JSON text form.
///
/// # Errors
///
/// Returns the serializer error.  The event types in this crate always
/// serialize, so callers may treat an error as a bug.
pub fn encode_event(event: &RfbEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Serializes a property write to its JSON text form.
///
/// # Errors
///
/// Returns the serializer error (see [`encode_event`]).
pub fn encode_property(property: Property, value: &PropertyValue) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PropertyUpdate::new(property, value.clone()))
}
