//! Domain types for the remote frame buffer client.
//!
//! Everything in here is plain data with no behaviour beyond validation and
//! conversion.  None of these types know about timers, transports, or the
//! host surface; the `application` layer gives them life.

pub mod config;
pub mod events;
pub mod frame;
pub mod properties;
pub mod surface;

pub use config::{DisplayDefaults, RfbConfig, TimingConfig};
pub use events::{Button, Modifier, ModifierState, RfbEvent};
pub use frame::{Frame, FrameFeedback, FramePayload};
pub use properties::{Property, PropertyValue};
pub use surface::{FrameSource, StyleUpdate, SurfaceGeometry, SurfaceId, SurfaceOrigin, TransientResource};
