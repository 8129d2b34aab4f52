//! Host ports: everything the core needs from the environment it runs in.
//!
//! A host (a browser widget, a headless test harness, a native window)
//! implements these traits and hands them to
//! [`RemoteFrameBuffer::new`](crate::RemoteFrameBuffer::new).  Port methods
//! take `&self`; implementations that record or buffer state use interior
//! mutability.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::domain::events::RfbEvent;
use crate::domain::properties::{Property, PropertyValue};
use crate::domain::surface::{FrameSource, StyleUpdate, SurfaceId, TransientResource};

/// Error returned by an [`EventSink`] that could not deliver a message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection to the producer is gone.
    #[error("transport closed")]
    Closed,
    /// The message could not be encoded or written.
    #[error("send failed: {0}")]
    Send(String),
}

/// The rendering surfaces of one client instance.
pub trait FrameSink: Send + Sync {
    /// Ids of all currently attached surfaces.
    fn surfaces(&self) -> Vec<SurfaceId>;

    /// Replaces the observed set with `surfaces`.
    ///
    /// The host drops all prior visibility observation and content-loaded
    /// listeners, then observes each surface in `surfaces` and reports
    /// through [`RemoteFrameBuffer::on_visibility_change`] and
    /// [`RemoteFrameBuffer::on_content_loaded`].
    ///
    /// [`RemoteFrameBuffer::on_visibility_change`]: crate::RemoteFrameBuffer::on_visibility_change
    /// [`RemoteFrameBuffer::on_content_loaded`]: crate::RemoteFrameBuffer::on_content_loaded
    fn observe(&self, surfaces: &[SurfaceId]);

    /// Shows `source` on every surface in `surfaces`.
    fn display(&self, surfaces: &[SurfaceId], source: FrameSource<'_>);

    /// Creates a host resource from which surfaces can load a binary image.
    fn create_transient(&self, data: &[u8], mime_type: &str) -> TransientResource;

    /// Frees a resource created by [`FrameSink::create_transient`].
    fn release_transient(&self, resource: TransientResource);

    /// Applies a presentation change to the display box.
    fn apply_style(&self, update: &StyleUpdate);
}

/// The host's named property bag.
///
/// Changes made by the producer are announced by the host calling
/// [`RemoteFrameBuffer::on_property_change`](crate::RemoteFrameBuffer::on_property_change).
pub trait PropertyStore: Send + Sync {
    fn get(&self, property: Property) -> Option<PropertyValue>;

    /// Writes a property; the whole value becomes visible to the producer at once.
    fn set(&self, property: Property, value: PropertyValue);
}

/// Outbound channel to the producer.
pub trait EventSink: Send + Sync {
    /// Delivers one event record, in order, at most once.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the message could not be handed to the
    /// transport.  The core treats this as a dropped message.
    fn send(&self, event: &RfbEvent) -> Result<(), TransportError>;
}

/// Identifies a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    /// Next scheduling opportunity of the frame loop.  The host fires it at
    /// the first paint opportunity after the delay.
    FrameTick,
    /// Trailing edge of the throttle window for the given event type.
    Throttle(&'static str),
    /// Emission of the accumulated wheel deltas.
    WheelFlush,
    /// Periodic visibility re-scan.
    VisibilityScan,
    /// Re-scan after a surface detached.
    DetachRescan,
}

/// One-shot timers.
///
/// Scheduling a key that is already pending is allowed; the host may fire
/// both or only the latest, and the core tolerates either.
/// A timer may also fire somewhat before its delay has passed.
pub trait TimerPort: Send + Sync {
    fn schedule(&self, key: TimerKey, delay: Duration);
}

/// Time sources.
pub trait Clock: Send + Sync {
    /// Monotonic time, used for throttle windows.
    fn now(&self) -> Instant;

    /// Wall-clock seconds since the Unix epoch, used for `time_stamp` and
    /// feedback `localtime`.
    fn wall_time(&self) -> f64;
}

/// [`Clock`] backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}
