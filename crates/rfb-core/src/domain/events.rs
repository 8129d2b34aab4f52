//! Canonical event records sent from the client to the producer.
//!
//! Every interaction is reported with the same vocabulary regardless of the
//! input device: a string tag (`event_type`), coordinates relative to the
//! rendering surface's top-left corner, buttons and modifiers, and a
//! wall-clock `time_stamp` in seconds.
//!
//! # JSON shape
//!
//! ```json
//! {"event_type":"pointer_down","x":12.0,"y":30.5,"button":1,"buttons":[1],
//!  "modifiers":["Shift"],"ntouches":1,"touches":{"1":{"x":12.0,"y":30.5,"pressure":0.5}},
//!  "time_stamp":1700000000.123}
//! ```
//!
//! Serde's `#[serde(tag = "event_type")]` puts the discriminant into the same
//! object as the payload fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Buttons ───────────────────────────────────────────────────────────────────

/// Pointer button identifier on the wire.
///
/// The numbering is fixed by the protocol and independent of platform
/// conventions: primary=1, middle=2, secondary=3, back=4, forward=5, and 0
/// when no button changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Button {
    None = 0,
    Primary = 1,
    Middle = 2,
    Secondary = 3,
    Back = 4,
    Forward = 5,
}

impl From<Button> for u8 {
    fn from(button: Button) -> Self {
        button as u8
    }
}

impl TryFrom<u8> for Button {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Button::None),
            1 => Ok(Button::Primary),
            2 => Ok(Button::Middle),
            3 => Ok(Button::Secondary),
            4 => Ok(Button::Back),
            5 => Ok(Button::Forward),
            other => Err(format!("unknown button code {other}")),
        }
    }
}

impl Button {
    /// Maps a platform "button that changed" index to the wire numbering.
    ///
    /// Platform indices follow the DOM convention: 0 primary, 1 auxiliary
    /// (middle), 2 secondary, 3 back, 4 forward; anything else (including
    /// `-1` for "no button") maps to [`Button::None`].
    pub fn from_platform_index(index: i16) -> Self {
        match index {
            0 => Button::Primary,
            1 => Button::Middle,
            2 => Button::Secondary,
            3 => Button::Back,
            4 => Button::Forward,
            _ => Button::None,
        }
    }

    /// Decodes a platform "buttons held" bitmask into the wire numbering.
    ///
    /// Bit layout (DOM convention):
    /// - Bit 0: primary
    /// - Bit 1: secondary
    /// - Bit 2: middle
    /// - Bit 3: back
    /// - Bit 4: forward
    ///
    /// The result is sorted by wire number.
    pub fn from_platform_mask(mask: u16) -> Vec<Button> {
        const BITS: [(u16, Button); 5] = [
            (1 << 0, Button::Primary),
            (1 << 1, Button::Secondary),
            (1 << 2, Button::Middle),
            (1 << 3, Button::Back),
            (1 << 4, Button::Forward),
        ];
        let mut held: Vec<Button> = BITS
            .iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|(_, button)| *button)
            .collect();
        held.sort_unstable();
        held
    }
}

// ── Modifiers ─────────────────────────────────────────────────────────────────

/// A modifier key held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Alt,
    Shift,
    #[serde(rename = "Control")]
    Ctrl,
    Meta,
}

impl Modifier {
    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Ctrl => "Control",
            Modifier::Meta => "Meta",
        }
    }
}

/// Modifier flags as reported by the platform for a single input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl ModifierState {
    /// Returns the held modifiers in canonical order (Alt, Shift, Ctrl, Meta).
    pub fn to_list(self) -> Vec<Modifier> {
        let mut list = Vec::with_capacity(4);
        if self.alt {
            list.push(Modifier::Alt);
        }
        if self.shift {
            list.push(Modifier::Shift);
        }
        if self.ctrl {
            list.push(Modifier::Ctrl);
        }
        if self.meta {
            list.push(Modifier::Meta);
        }
        list
    }
}

// ── Payload structs ───────────────────────────────────────────────────────────

/// Last-known state of one active pointer, reported in multi-touch payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

/// Payload of `pointer_down`, `pointer_up` and `pointer_move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Horizontal position relative to the surface origin, logical pixels.
    pub x: f64,
    /// Vertical position relative to the surface origin, logical pixels.
    pub y: f64,
    /// The button that changed state ([`Button::None`] for moves).
    pub button: Button,
    /// All buttons currently held.
    pub buttons: Vec<Button>,
    pub modifiers: Vec<Modifier>,
    /// Number of active pointers, equal to `touches.len()`.
    pub ntouches: usize,
    /// Active pointers keyed by pointer id.
    pub touches: BTreeMap<i64, Touch>,
    pub time_stamp: f64,
}

/// Payload of `double_click`: a pointer event without touch fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub x: f64,
    pub y: f64,
    pub button: Button,
    pub buttons: Vec<Button>,
    pub modifiers: Vec<Modifier>,
    pub time_stamp: f64,
}

/// Payload of `wheel`.
///
/// `dx`/`dy` are the deltas accumulated since the previous wheel event,
/// normalized to pixel-equivalents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub buttons: Vec<Button>,
    pub modifiers: Vec<Modifier>,
    pub time_stamp: f64,
}

/// Payload of `key_down` and `key_up`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Canonical key name, e.g. `"a"`, `"%"`, `"Escape"`.
    pub key: String,
    pub modifiers: Vec<Modifier>,
    pub time_stamp: f64,
}

/// Payload of `resize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeEvent {
    /// Logical width of the surface.
    pub width: f64,
    /// Logical height of the surface.
    pub height: f64,
    /// Ratio between physical and logical pixels.
    pub pixel_ratio: f64,
    pub time_stamp: f64,
}

/// Payload of `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseEvent {
    pub time_stamp: f64,
}

// ── Top-level event enum ──────────────────────────────────────────────────────

/// Every event the client can send, discriminated by `event_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RfbEvent {
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    PointerMove(PointerEvent),
    DoubleClick(ClickEvent),
    Wheel(WheelEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    Resize(ResizeEvent),
    Close(CloseEvent),
}

impl RfbEvent {
    /// The `event_type` tag; also the throttle key for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            RfbEvent::PointerDown(_) => "pointer_down",
            RfbEvent::PointerUp(_) => "pointer_up",
            RfbEvent::PointerMove(_) => "pointer_move",
            RfbEvent::DoubleClick(_) => "double_click",
            RfbEvent::Wheel(_) => "wheel",
            RfbEvent::KeyDown(_) => "key_down",
            RfbEvent::KeyUp(_) => "key_up",
            RfbEvent::Resize(_) => "resize",
            RfbEvent::Close(_) => "close",
        }
    }

    /// Wall-clock time at which the event was generated.
    pub fn time_stamp(&self) -> f64 {
        match self {
            RfbEvent::PointerDown(e) | RfbEvent::PointerUp(e) | RfbEvent::PointerMove(e) => {
                e.time_stamp
            }
            RfbEvent::DoubleClick(e) => e.time_stamp,
            RfbEvent::Wheel(e) => e.time_stamp,
            RfbEvent::KeyDown(e) | RfbEvent::KeyUp(e) => e.time_stamp,
            RfbEvent::Resize(e) => e.time_stamp,
            RfbEvent::Close(e) => e.time_stamp,
        }
    }

    /// Whether this event belongs to a continuous stream that is rate limited.
    ///
    /// Discrete events (down/up/click/key/close) must never be dropped or
    /// delayed and bypass the throttle gate.
    pub fn is_throttled(&self) -> bool {
        matches!(self, RfbEvent::PointerMove(_) | RfbEvent::Resize(_))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
