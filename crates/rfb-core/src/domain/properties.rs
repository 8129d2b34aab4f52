//! Named display properties shared with the host.
//!
//! The host keeps a small property bag that is synchronized with the
//! producer.  The core reads the sizing/cursor properties and writes the two
//! derived ones (`has_visible_views` and `frame_feedback`).

use serde::{Deserialize, Serialize};

use crate::domain::frame::FrameFeedback;

/// Every property the core reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// CSS width of the display box, e.g. `"500px"`.
    CssWidth,
    /// CSS height of the display box, e.g. `"300px"`.
    CssHeight,
    /// Whether the user may resize the display box.
    Resizable,
    /// CSS cursor name shown over the surface.
    Cursor,
    /// Whether any attached surface is currently in view (written by the core).
    HasVisibleViews,
    /// Confirmation of the last applied frame (written by the core).
    FrameFeedback,
}

impl Property {
    /// All properties, in declaration order.
    pub const ALL: [Property; 6] = [
        Property::CssWidth,
        Property::CssHeight,
        Property::Resizable,
        Property::Cursor,
        Property::HasVisibleViews,
        Property::FrameFeedback,
    ];

    /// The property name used by the host.
    pub fn name(&self) -> &'static str {
        match self {
            Property::CssWidth => "css_width",
            Property::CssHeight => "css_height",
            Property::Resizable => "resizable",
            Property::Cursor => "cursor",
            Property::HasVisibleViews => "has_visible_views",
            Property::FrameFeedback => "frame_feedback",
        }
    }

    /// Looks up a property by its host name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Properties the core only writes; changes made by others are ignored.
    pub fn is_write_only(&self) -> bool {
        matches!(self, Property::HasVisibleViews | Property::FrameFeedback)
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Text(String),
    Feedback(FrameFeedback),
}

impl PropertyValue {
    /// Returns the string value, if this is a text property.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a flag property.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the feedback record, if this is the `frame_feedback` property.
    pub fn as_feedback(&self) -> Option<&FrameFeedback> {
        match self {
            PropertyValue::Feedback(fb) => Some(fb),
            _ => None,
        }
    }
}
