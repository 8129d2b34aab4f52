//! Viewer configuration types.
//!
//! [`ViewerConfig`] collects everything a viewer session needs at runtime.
//! It is built once at startup from CLI arguments (see `main.rs`) and an
//! optional TOML file holding the client timings ([`RfbConfig`]).
//!
//! Keeping this a plain struct (no environment reads, no global state) lets
//! tests construct a session without going through the command line.

use std::path::PathBuf;

use rfb_core::{RfbConfig, SurfaceGeometry};

/// Size of the headless viewport the surfaces are laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    /// Logical width in pixels.
    pub width: f64,
    /// Logical height in pixels.
    pub height: f64,
    /// Physical-to-logical pixel ratio.
    pub pixel_ratio: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
        }
    }
}

impl ViewportSize {
    /// The geometry reported for every headless surface.
    ///
    /// Headless surfaces fill the whole viewport and always have a concrete
    /// size, so the auto-sizing path of the resize detector never triggers.
    pub fn geometry(&self) -> SurfaceGeometry {
        SurfaceGeometry {
            width: self.width,
            height: self.height,
            pixel_ratio: self.pixel_ratio,
            size_assigned: true,
            viewport_width: self.width,
            viewport_height: self.height,
        }
    }
}

/// All runtime configuration for one viewer session.
///
/// # Example
///
/// ```rust
/// use rfb_viewer::domain::ViewerConfig;
///
/// let cfg = ViewerConfig::new("ws://127.0.0.1:8765/rfb");
/// assert_eq!(cfg.surfaces, 1);
/// assert!(cfg.dump_dir.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// WebSocket URL of the frame producer.
    pub url: String,
    /// Client timings and display defaults.
    pub core: RfbConfig,
    /// Number of headless surfaces to attach.  Zero is allowed: frames are
    /// then queued but never applied.
    pub surfaces: usize,
    /// Directory binary frames are written to as they are displayed.
    pub dump_dir: Option<PathBuf>,
    /// Headless viewport geometry.
    pub viewport: ViewportSize,
}

impl ViewerConfig {
    /// A configuration with one surface, default timings and no dumping.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            core: RfbConfig::default(),
            surfaces: 1,
            dump_dir: None,
            viewport: ViewportSize::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
