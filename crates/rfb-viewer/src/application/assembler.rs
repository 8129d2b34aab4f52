//! Reassembly of inbound messages split across WebSocket frames.
//!
//! # Wire format (for beginners)
//!
//! The producer sends JSON text messages.  A frame header whose image is
//! delivered as raw bytes names a `mimetype` but carries no inline data;
//! the very next WebSocket message is then a *binary* message holding the
//! encoded image:
//!
//! ```text
//! text   {"type":"framebufferdata","index":7,"timestamp":..,"mimetype":"image/jpeg"}
//! binary <jpeg bytes>
//! ```
//!
//! [`InboundAssembler`] glues the two back together into one
//! [`InboundMessage`] so the core sees a header plus its attachments, the
//! same shape a host with native binary-buffer support would deliver.

use serde_json::Value;
use tracing::debug;

use rfb_core::protocol::awaits_attachment;

use crate::application::error::ViewerError;

/// One complete inbound message: the JSON body plus any binary attachments.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub msg: Value,
    pub buffers: Vec<Vec<u8>>,
}

impl InboundMessage {
    /// The `type` tag of the message, if any.
    pub fn message_type(&self) -> Option<&str> {
        self.msg.get("type").and_then(Value::as_str)
    }
}

/// Pairs frame headers with the binary message that follows them.
#[derive(Debug, Default)]
pub struct InboundAssembler {
    pending: Option<Value>,
}

impl InboundAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a header is waiting for its attachment.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feeds one text message.
    ///
    /// Returns an empty `Vec` when the message is a header that waits for a
    /// binary attachment.  A header still pending at this point never got its
    /// attachment; it is passed on as-is (the core rejects it for lack of a
    /// payload) rather than being paired with a later binary message.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidJson`] if `text` is not JSON.
    pub fn push_text(&mut self, text: &str) -> Result<Vec<InboundMessage>, ViewerError> {
        let value: Value = serde_json::from_str(text)?;
        let mut ready = Vec::with_capacity(2);

        if let Some(orphan) = self.pending.take() {
            debug!("frame header was not followed by its attachment");
            ready.push(InboundMessage {
                msg: orphan,
                buffers: Vec::new(),
            });
        }

        if awaits_attachment(&value) {
            self.pending = Some(value);
        } else {
            ready.push(InboundMessage {
                msg: value,
                buffers: Vec::new(),
            });
        }
        Ok(ready)
    }

    /// Feeds one binary message, completing the pending header.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnexpectedBinary`] if no header is pending.
    pub fn push_binary(&mut self, data: Vec<u8>) -> Result<InboundMessage, ViewerError> {
        match self.pending.take() {
            Some(msg) => Ok(InboundMessage {
                msg,
                buffers: vec![data],
            }),
            None => Err(ViewerError::UnexpectedBinary(data.len())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn binary_header(index: u64) -> String {
        json!({
            "type": "framebufferdata",
            "index": index,
            "timestamp": 1.0,
            "mimetype": "image/jpeg",
        })
        .to_string()
    }

    #[test]
    fn test_inline_frame_is_ready_immediately() {
        // Arrange
        let mut assembler = InboundAssembler::new();
        let text = json!({
            "type": "framebufferdata",
            "index": 1,
            "timestamp": 1.0,
            "data_b64": "data:image/png;base64,AAAA",
        })
        .to_string();

        // Act
        let ready = assembler.push_text(&text).unwrap();

        // Assert
        assert_eq!(ready.len(), 1);
        assert!(ready[0].buffers.is_empty());
        assert!(!assembler.has_pending());
    }

    #[test]
    fn test_binary_header_waits_for_attachment() {
        // Arrange
        let mut assembler = InboundAssembler::new();

        // Act
        let ready = assembler.push_text(&binary_header(2)).unwrap();
        let message = assembler.push_binary(vec![0xFF, 0xD8]).unwrap();

        // Assert
        assert!(ready.is_empty());
        assert_eq!(message.msg["index"], 2);
        assert_eq!(message.buffers, vec![vec![0xFF, 0xD8]]);
        assert_eq!(message.message_type(), Some("framebufferdata"));
        assert!(!assembler.has_pending());
    }

    #[test]
    fn test_orphan_header_is_flushed_by_next_text_message() {
        // Arrange: a header whose attachment never arrives
        let mut assembler = InboundAssembler::new();
        assembler.push_text(&binary_header(3)).unwrap();

        // Act
        let ready = assembler.push_text(&binary_header(4)).unwrap();

        // Assert: the orphan is handed on without buffers; the new header waits
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].msg["index"], 3);
        assert!(ready[0].buffers.is_empty());
        assert!(assembler.has_pending());
    }

    #[test]
    fn test_binary_without_header_is_an_error() {
        let mut assembler = InboundAssembler::new();

        let result = assembler.push_binary(vec![1, 2, 3]);

        assert!(matches!(result, Err(ViewerError::UnexpectedBinary(3))));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut assembler = InboundAssembler::new();

        let result = assembler.push_text("{not json");

        assert!(matches!(result, Err(ViewerError::InvalidJson(_))));
    }

    #[test]
    fn test_non_frame_message_passes_through() {
        let mut assembler = InboundAssembler::new();

        let ready = assembler
            .push_text(r#"{"type":"property","name":"cursor","value":"crosshair"}"#)
            .unwrap();

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].message_type(), Some("property"));
    }
}
