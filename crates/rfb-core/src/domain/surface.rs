//! Rendering surfaces as seen by the core.
//!
//! A *rendering surface* is the host element a frame is drawn into.  There
//! may be zero, one, or several of them at once (the same stream can be shown
//! in more than one place).  The core never touches a surface directly; it
//! refers to surfaces by [`SurfaceId`] and asks the host to act on them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable handle for one attached rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub Uuid);

impl SurfaceId {
    /// Allocates a fresh random id.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A host resource created to display one binary frame (e.g. an object URL).
///
/// Deliberately not `Clone`: the value is handed back to the host exactly
/// once through [`crate::FrameSink::release_transient`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "transient resources must be released through the frame sink"]
pub struct TransientResource {
    url: String,
}

impl TransientResource {
    /// Wraps a host-created resource locator.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The locator the surfaces load the image from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What a surface should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource<'a> {
    /// An inline encoded image, e.g. a `data:` URL.
    Inline(&'a str),
    /// A transient resource holding a binary frame.
    Transient(&'a TransientResource),
}

impl FrameSource<'_> {
    /// The locator to assign to the surface.
    pub fn src(&self) -> &str {
        match self {
            FrameSource::Inline(src) => src,
            FrameSource::Transient(resource) => resource.url(),
        }
    }
}

/// A presentation change the host should apply to the display box.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleUpdate {
    /// CSS width of the box.
    Width(String),
    /// CSS height of the box.
    Height(String),
    /// Whether the box shows a user resize handle.
    Resizable(bool),
    /// CSS cursor name.
    Cursor(String),
    /// Upper bound on the box size in pixels, guarding against runaway
    /// auto-growth.
    MaxSize { width: u32, height: u32 },
}

/// Position of the surface's top-left corner in the host's client
/// coordinate space.  Event coordinates are reported relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceOrigin {
    pub left: f64,
    pub top: f64,
}

/// One geometry observation of a rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    /// Logical width of the surface.
    pub width: f64,
    /// Logical height of the surface.
    pub height: f64,
    /// Physical-to-logical pixel ratio of the display.
    pub pixel_ratio: f64,
    /// `false` while the host has not yet given the box a concrete size
    /// (its width hint is empty).
    pub size_assigned: bool,
    /// Width of the host viewport, used to cap auto-growth.
    pub viewport_width: f64,
    /// Height of the host viewport, used to cap auto-growth.
    pub viewport_height: f64,
}
