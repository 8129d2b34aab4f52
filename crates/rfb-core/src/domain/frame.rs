//! Frames received from the remote producer and the feedback sent back.
//!
//! # Flow control (for beginners)
//!
//! The producer numbers every frame it sends.  The client does not confirm a
//! frame when it *arrives*, only when it has actually been *applied* to the
//! display surfaces.  The confirmation ([`FrameFeedback`]) carries the index
//! and producer timestamp of the applied frame, so the producer can compute
//! how many frames are still in flight and how long a round trip takes, and
//! slow itself down when the client falls behind.

use serde::{Deserialize, Serialize};

/// A 1×1 grey PNG shown before the first real frame arrives.
pub const PLACEHOLDER_SRC: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVR42mOor68HAAL+AX6E2KOJAAAAAElFTkSuQmCC";

/// Image data carried by a [`Frame`].
///
/// Exactly one representation is present per frame; the producer picks
/// whichever is cheaper for it to send.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    /// A self-contained encoded image, typically a `data:` URL.
    Inline(String),
    /// Raw encoded image bytes sent as a binary attachment.
    ///
    /// Displaying these requires a transient host resource (an object URL),
    /// see [`crate::FrameSink::create_transient`].
    Binary {
        /// Encoded image bytes (PNG, JPEG, ...).
        data: Vec<u8>,
        /// MIME type of `data`, e.g. `"image/jpeg"`.
        mime_type: String,
    },
}

impl FramePayload {
    /// Returns `true` for the binary attachment variant.
    pub fn is_binary(&self) -> bool {
        matches!(self, FramePayload::Binary { .. })
    }
}

/// One unit of image data plus its sequence index and producer timestamp.
///
/// Frames are immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: u64,
    timestamp: f64,
    payload: FramePayload,
}

impl Frame {
    /// Creates a frame.
    pub fn new(index: u64, timestamp: f64, payload: FramePayload) -> Self {
        Self {
            index,
            timestamp,
            payload,
        }
    }

    /// The stub frame that counts as "last applied" before anything arrives.
    ///
    /// It has index 0 and timestamp 0, which the producer treats as "nothing
    /// confirmed yet".
    pub fn placeholder() -> Self {
        Self::new(0, 0.0, FramePayload::Inline(PLACEHOLDER_SRC.to_string()))
    }

    /// Producer-assigned sequence number.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Producer wall-clock time (seconds since the Unix epoch) at send time.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// The image data.
    pub fn payload(&self) -> &FramePayload {
        &self.payload
    }

    /// Builds the confirmation record for this frame.
    ///
    /// `local_time` is the client wall clock in seconds since the Unix epoch.
    pub fn feedback(&self, local_time: f64) -> FrameFeedback {
        FrameFeedback {
            index: self.index,
            timestamp: self.timestamp,
            local_time,
        }
    }
}

/// Acknowledgment written after a frame has been applied.
///
/// Written to the `frame_feedback` property as a single value, so the
/// producer never observes a half-updated record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameFeedback {
    /// Index of the last applied frame.
    pub index: u64,
    /// Producer timestamp of the last applied frame.
    pub timestamp: f64,
    /// Client wall-clock time at which the frame was applied.
    #[serde(rename = "localtime")]
    pub local_time: f64,
}
