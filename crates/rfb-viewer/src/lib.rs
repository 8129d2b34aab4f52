//! rfb-viewer library crate.
//!
//! A headless host for [`rfb_core`]: it connects to a frame producer over
//! WebSocket, drives the client core from a tokio event loop, and reports
//! frame feedback and visibility back to the producer.  Useful for load
//! testing producers, for recording streams to disk, and as a reference
//! host implementation.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Frame producer (JSON + binary over WebSocket)
//!         ↕
//! [rfb-viewer]
//!   ├── domain/           ViewerConfig
//!   ├── application/      Message reassembly and routing into the core
//!   └── infrastructure/
//!         ├── ws_client/  Connect + session event loop (tokio-tungstenite)
//!         ├── timers/     TimerPort over tokio::time
//!         ├── surfaces/   Headless FrameSink (optional frame dumps)
//!         ├── properties/ PropertyStore mirrored to the producer
//!         └── transport/  EventSink over an outbound channel
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `rfb-core` only; no sockets, no
//!   runtime.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tokio-tungstenite`.

/// Domain layer: runtime configuration.
pub mod domain;

/// Application layer: reassembly and routing.
pub mod application;

/// Infrastructure layer: host ports and the WebSocket session.
pub mod infrastructure;
