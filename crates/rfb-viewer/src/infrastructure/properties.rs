//! Property store mirrored to the producer.
//!
//! Writes made by the client ([`PropertyStore::set`]) are stored and then
//! echoed to the producer as `{"type":"property","name":..,"value":..}` text
//! messages.  Writes made by the producer arrive through
//! [`RemoteProperties::apply_remote`] and are only stored.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

use rfb_core::protocol::encode_property;
use rfb_core::{Property, PropertyStore, PropertyValue};

use crate::application::RemoteProperties;

pub struct MirroredProperties {
    values: Mutex<HashMap<Property, PropertyValue>>,
    outbound: UnboundedSender<String>,
}

impl MirroredProperties {
    pub fn new(outbound: UnboundedSender<String>) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            outbound,
        }
    }

    fn values(&self) -> MutexGuard<'_, HashMap<Property, PropertyValue>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PropertyStore for MirroredProperties {
    fn get(&self, property: Property) -> Option<PropertyValue> {
        self.values().get(&property).cloned()
    }

    fn set(&self, property: Property, value: PropertyValue) {
        match encode_property(property, &value) {
            Ok(text) => {
                if self.outbound.send(text).is_err() {
                    trace!("transport gone; {} not mirrored", property.name());
                }
            }
            Err(e) => debug!("could not encode {}: {e}", property.name()),
        }
        self.values().insert(property, value);
    }
}

impl RemoteProperties for MirroredProperties {
    fn apply_remote(&self, property: Property, value: PropertyValue) {
        self.values().insert(property, value);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
