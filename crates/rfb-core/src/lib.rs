//! # rfb-core
//!
//! Client half of a remote frame buffer protocol: a remote producer renders
//! image frames and streams them to a thin display surface, which shows them
//! at its own pace, confirms every applied frame, and forwards normalized
//! user input back to the producer.
//!
//! This crate has zero dependencies on async runtimes, sockets, or UI
//! toolkits.  Everything the core needs from the outside world is expressed
//! as a small set of host ports (traits) that are injected at construction
//! time, so the whole client can be driven deterministically from tests.
//!
//! # Architecture overview
//!
//! ```text
//!                inbound frames
//! host transport ───────────────► FrameScheduler ──► FrameSink (surfaces)
//!                                       │
//!                                       └─► PropertyStore (frame_feedback)
//!
//! raw input ──► EventNormalizer ─┐
//! geometry  ──► ResizeDetector  ─┼─► ThrottleGate ──► EventSink (outbound)
//! visibility ─► VisibilityTracker ─► PropertyStore (has_visible_views)
//! ```
//!
//! - **`domain`** – Plain data: frames, feedback, canonical event records,
//!   display properties, and the tunable [`RfbConfig`].
//!
//! - **`protocol`** – How messages look on the transport boundary: parsing
//!   the inbound `framebufferdata` message and encoding outbound events as
//!   JSON.
//!
//! - **`application`** – The state machines (throttle gate, scheduler,
//!   visibility tracker, resize detector, event normalizer) and the
//!   [`RemoteFrameBuffer`] facade that wires them to the host ports.
//!
//! # Threading model
//!
//! Single-threaded and cooperative.  The host owns one [`RemoteFrameBuffer`]
//! and calls into it from its event loop; timers requested through
//! [`TimerPort`] are delivered back via [`RemoteFrameBuffer::on_timer`].

pub mod application;
pub mod domain;
pub mod protocol;

pub use application::client::{HostPorts, InputResponse, RemoteFrameBuffer};
pub use application::ports::{
    Clock, EventSink, FrameSink, PropertyStore, SystemClock, TimerKey, TimerPort, TransportError,
};
pub use domain::config::{ConfigError, RfbConfig};
pub use domain::events::{Button, Modifier, ModifierState, RfbEvent};
pub use domain::frame::{Frame, FrameFeedback, FramePayload};
pub use domain::properties::{Property, PropertyValue};
pub use domain::surface::{FrameSource, StyleUpdate, SurfaceGeometry, SurfaceId, SurfaceOrigin, TransientResource};
pub use protocol::inbound::{parse_frame_message, ProtocolError};
