//! Parsing of inbound `framebufferdata` messages.
//!
//! # Message shape
//!
//! ```json
//! {"type":"framebufferdata","index":12,"timestamp":1700000000.5,
//!  "mimetype":"image/jpeg"}
//! ```
//!
//! The image itself is either carried inline (`data_b64`, or `src` in older
//! producers) as a `data:` URL, or delivered as exactly one binary attachment
//! next to the header.  In the binary case `mimetype` is mandatory.
//!
//! Any other message type is not an error for the client as a whole: the
//! caller logs the [`ProtocolError`] and drops the message.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::frame::{Frame, FramePayload};

/// Value of the `type` field that identifies a frame message.
pub const FRAME_MESSAGE_TYPE: &str = "framebufferdata";

/// Reasons an inbound message is rejected.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The message is not tagged `"framebufferdata"`.
    #[error("not a frame message (type {0:?})")]
    NotAFrame(Option<String>),

    /// A required field is missing or has the wrong type.
    #[error("malformed frame header: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Neither inline data nor a binary attachment is present.
    #[error("frame {index} carries no image data")]
    MissingPayload { index: u64 },

    /// A binary attachment arrived without a `mimetype`.
    #[error("frame {index} has a binary attachment but no mimetype")]
    MissingMimeType { index: u64 },

    /// Inline data and a binary attachment are both present.
    #[error("frame {index} carries both inline data and a binary attachment")]
    AmbiguousPayload { index: u64 },

    /// More than one binary attachment is present.
    #[error("frame message has {0} binary attachments, at most one is allowed")]
    TooManyBuffers(usize),
}

/// The JSON header of a frame message.
#[derive(Debug, Deserialize)]
struct FrameHeader {
    index: u64,
    timestamp: f64,
    #[serde(default)]
    mimetype: Option<String>,
    #[serde(default)]
    data_b64: Option<String>,
    #[serde(default)]
    src: Option<String>,
}

impl FrameHeader {
    fn inline_data(self) -> Option<String> {
        self.data_b64.or(self.src)
    }
}

fn message_type(msg: &Value) -> Option<&str> {
    msg.get("type").and_then(Value::as_str)
}

/// Builds a [`Frame`] from a message header and its binary attachments.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the message is not a well-formed frame
/// message; the caller is expected to ignore it.
pub fn parse_frame_message(msg: &Value, mut buffers: Vec<Vec<u8>>) -> Result<Frame, ProtocolError> {
    match message_type(msg) {
        Some(FRAME_MESSAGE_TYPE) => {}
        other => return Err(ProtocolError::NotAFrame(other.map(str::to_string))),
    }
    if buffers.len() > 1 {
        return Err(ProtocolError::TooManyBuffers(buffers.len()));
    }

    let header = FrameHeader::deserialize(msg)?;
    let index = header.index;
    let timestamp = header.timestamp;

    let payload = match buffers.pop() {
        Some(data) => {
            if header.data_b64.is_some() || header.src.is_some() {
                return Err(ProtocolError::AmbiguousPayload { index });
            }
            let mime_type = header
                .mimetype
                .ok_or(ProtocolError::MissingMimeType { index })?;
            FramePayload::Binary { data, mime_type }
        }
        None => {
            let src = header
                .inline_data()
                .ok_or(ProtocolError::MissingPayload { index })?;
            FramePayload::Inline(src)
        }
    };

    Ok(Frame::new(index, timestamp, payload))
}

/// Returns `true` for a frame header whose image arrives as a separate
/// binary attachment (it names a `mimetype` but carries no inline data).
///
/// Transports that cannot bundle attachments with the header use this to
/// decide whether to wait for the next binary message.
pub fn awaits_attachment(msg: &Value) -> bool {
    message_type(msg) == Some(FRAME_MESSAGE_TYPE)
        && msg.get("mimetype").is_some_and(Value::is_string)
        && msg.get("data_b64").is_none()
        && msg.get("src").is_none()
}
