//! Application layer: the client state machines and the host-facing facade.
//!
//! Each state machine is plain synchronous Rust with no knowledge of timers
//! or surfaces; [`client::RemoteFrameBuffer`] feeds them host callbacks and
//! turns their decisions into calls on the injected [`ports`].

pub mod client;
pub mod normalizer;
pub mod ports;
pub mod resize;
pub mod scheduler;
pub mod throttle;
pub mod visibility;
