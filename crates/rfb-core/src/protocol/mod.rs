//! Messages exchanged with the frame producer.
//!
//! Inbound traffic is a JSON header tagged `"framebufferdata"` plus an
//! optional binary attachment; outbound traffic is the canonical event records
//! of [`crate::domain::events`] serialized as JSON objects.

pub mod inbound;
pub mod outbound;

pub use inbound::{awaits_attachment, parse_frame_message, ProtocolError, FRAME_MESSAGE_TYPE};
pub use outbound::{encode_event, encode_property, PropertyUpdate};
