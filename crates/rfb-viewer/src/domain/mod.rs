//! Domain layer for the viewer: runtime configuration.

pub mod config;

pub use config::{ViewportSize, ViewerConfig};
