//! Infrastructure layer: tokio-backed host ports and the WebSocket session.
//!
//! - [`timers`]: [`rfb_core::TimerPort`] over `tokio::time`
//! - [`surfaces`]: headless [`rfb_core::FrameSink`] with optional frame dumps
//! - [`properties`]: property store mirrored to the producer
//! - [`transport`]: [`rfb_core::EventSink`] over an outbound channel
//! - [`ws_client`]: connect, then run the session event loop

pub mod properties;
pub mod surfaces;
pub mod timers;
pub mod transport;
pub mod ws_client;

pub use properties::MirroredProperties;
pub use surfaces::HeadlessSurfaces;
pub use timers::TokioTimers;
pub use transport::ChannelEventSink;
pub use ws_client::run_viewer;
