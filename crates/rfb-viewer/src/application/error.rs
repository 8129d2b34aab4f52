//! Viewer error type.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the viewer outside the client core.
///
/// The core itself never fails; these cover the transport and the host side.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// A text message from the producer is not valid JSON.
    #[error("invalid JSON from producer: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A binary message arrived while no frame header was waiting for it.
    #[error("unexpected binary message ({0} bytes) with no pending frame header")]
    UnexpectedBinary(usize),

    /// A property message named a property the client does not know.
    #[error("unknown property {0:?}")]
    UnknownProperty(String),

    /// The WebSocket connection could not be established.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// A binary frame could not be written to the dump directory.
    #[error("failed to dump frame to {path}: {source}")]
    DumpFrame {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
