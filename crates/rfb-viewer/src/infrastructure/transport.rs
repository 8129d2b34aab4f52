//! Outbound event channel.
//!
//! The core sends events synchronously; the WebSocket sink is async.  The two
//! are decoupled by an unbounded channel of encoded JSON text that the
//! session loop drains into the socket, which keeps events in send order.

use tokio::sync::mpsc::UnboundedSender;

use rfb_core::protocol::encode_event;
use rfb_core::{EventSink, RfbEvent, TransportError};

pub struct ChannelEventSink {
    outbound: UnboundedSender<String>,
}

impl ChannelEventSink {
    pub fn new(outbound: UnboundedSender<String>) -> Self {
        Self { outbound }
    }
}

impl EventSink for ChannelEventSink {
    fn send(&self, event: &RfbEvent) -> Result<(), TransportError> {
        let text = encode_event(event).map_err(|e| TransportError::Send(e.to_string()))?;
        self.outbound.send(text).map_err(|_| TransportError::Closed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tokio::sync::mpsc;

    use rfb_core::domain::events::CloseEvent;

    use super::*;

    #[test]
    fn test_send_encodes_event_as_json_text() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelEventSink::new(tx);

        // Act
        sink.send(&RfbEvent::Close(CloseEvent { time_stamp: 5.0 }))
            .unwrap();

        // Assert
        let sent: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(sent["event_type"], "close");
        assert_eq!(sent["time_stamp"], 5.0);
    }

    #[test]
    fn test_send_after_receiver_dropped_is_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ChannelEventSink::new(tx);

        let result = sink.send(&RfbEvent::Close(CloseEvent { time_stamp: 0.0 }));

        assert_eq!(result, Err(TransportError::Closed));
    }
}
