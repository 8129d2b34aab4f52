//! One viewer session: the client core plus the routing around it.
//!
//! The infrastructure layer owns the sockets and the tokio runtime and
//! forwards two kinds of input here:
//!
//! - complete inbound messages from the producer ([`Session::handle_inbound`])
//! - callbacks raised by the headless host ports ([`HostEvent`], via
//!   [`Session::handle_host_event`])
//!
//! Everything else (scheduling, throttling, feedback) happens inside
//! [`RemoteFrameBuffer`].

use std::sync::Arc;

use tracing::{debug, info};

use rfb_core::protocol::PropertyUpdate;
use rfb_core::{
    Property, PropertyStore, PropertyValue, RemoteFrameBuffer, SurfaceGeometry, SurfaceId, TimerKey,
};

use crate::application::assembler::InboundMessage;
use crate::application::error::ViewerError;

/// Callbacks the host ports raise back into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A timer requested through the timer port elapsed.
    Timer(TimerKey),
    /// A surface finished loading the image it was given.
    ContentLoaded(SurfaceId),
    /// Visibility of observed surfaces changed.
    Visibility(Vec<(SurfaceId, bool)>),
}

/// A property store that can also take writes coming from the producer.
///
/// Producer writes must not be mirrored back, so they bypass
/// [`PropertyStore::set`].
pub trait RemoteProperties: PropertyStore {
    fn apply_remote(&self, property: Property, value: PropertyValue);
}

/// Message type of a producer-side property write.
const PROPERTY_MESSAGE_TYPE: &str = "property";

pub struct Session {
    rfb: RemoteFrameBuffer,
    properties: Arc<dyn RemoteProperties>,
    geometry: SurfaceGeometry,
}

impl Session {
    pub fn new(
        rfb: RemoteFrameBuffer,
        properties: Arc<dyn RemoteProperties>,
        geometry: SurfaceGeometry,
    ) -> Self {
        Self {
            rfb,
            properties,
            geometry,
        }
    }

    pub fn rfb(&self) -> &RemoteFrameBuffer {
        &self.rfb
    }

    /// Starts the client and reports the initial surface geometry, which
    /// sends the producer its first `resize` event.
    pub fn start(&mut self) {
        self.rfb.start();
        self.rfb.geometry_changed(self.geometry);
    }

    /// Routes one complete inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError`] for a property message that cannot be
    /// applied.  Frame messages never fail here; the core drops malformed
    /// ones itself.
    pub fn handle_inbound(&mut self, inbound: InboundMessage) -> Result<(), ViewerError> {
        match inbound.message_type() {
            Some(PROPERTY_MESSAGE_TYPE) => {
                let update: PropertyUpdate = serde_json::from_value(inbound.msg)?;
                self.apply_property(update)
            }
            _ => {
                self.rfb.receive_frame(&inbound.msg, inbound.buffers);
                Ok(())
            }
        }
    }

    fn apply_property(&mut self, update: PropertyUpdate) -> Result<(), ViewerError> {
        let property =
            Property::from_name(&update.name).ok_or(ViewerError::UnknownProperty(update.name))?;
        if property.is_write_only() {
            debug!("ignored producer write to {}", property.name());
            return Ok(());
        }
        self.properties.apply_remote(property, update.value);
        self.rfb.on_property_change(property);
        Ok(())
    }

    pub fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Timer(key) => self.rfb.on_timer(key),
            HostEvent::ContentLoaded(surface) => self.rfb.on_content_loaded(surface),
            HostEvent::Visibility(changes) => self.rfb.on_visibility_change(&changes),
        }
    }

    /// Closes the client; the `close` event is queued on the outbound channel.
    pub fn close(&mut self) {
        if self.rfb.is_closed() {
            return;
        }
        let stats = self.rfb.stats();
        info!(
            "closing session: {} frames applied, {} idle ticks, max queue depth {}",
            stats.applied_frames, stats.idle_ticks, stats.max_queue_depth
        );
        self.rfb.close();
    }
}
