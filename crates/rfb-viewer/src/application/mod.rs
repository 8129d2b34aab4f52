//! Application layer: turns transport traffic into calls on the client core.
//!
//! This layer is responsible for:
//!
//! - Pairing frame headers with the binary attachment that follows them
//!   ([`InboundAssembler`])
//! - Routing inbound messages and host events into a
//!   [`rfb_core::RemoteFrameBuffer`] ([`Session`])
//! - Defining the [`ViewerError`] type for viewer-level failures
//!
//! It holds no sockets and no tokio state, so all of it is testable with
//! plain `#[test]` functions.

pub mod assembler;
pub mod error;
pub mod session;

pub use assembler::{InboundAssembler, InboundMessage};
pub use error::ViewerError;
pub use session::{HostEvent, RemoteProperties, Session};
