//! Converts raw platform input into canonical [`RfbEvent`] records.
//!
//! The host reports input in platform terms (client coordinates, DOM-style
//! button indices and bitmasks, wheel deltas with a delta mode).  The
//! normalizer turns those into the one record shape used on the wire and
//! keeps the little bit of state that needs to survive between events:
//!
//! - [`PointerState`]: every pointer that is currently down (captured), so
//!   multi-touch payloads can carry all active touches.
//! - [`WheelAccumulator`]: wheel deltas summed between flushes.
//! - The buttons of the last pointer event, reused for wheel events because
//!   not all platforms report button state on wheel input.
//! - Whether the focus element holds input focus; wheel input is only
//!   consumed while it does.

use std::collections::BTreeMap;

use crate::domain::events::{
    Button, ClickEvent, KeyEvent, ModifierState, PointerEvent, RfbEvent, Touch, WheelEvent,
};
use crate::domain::surface::SurfaceOrigin;

// ── Raw input ─────────────────────────────────────────────────────────────────

/// A pointer event as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointerInput {
    pub pointer_id: i64,
    /// Horizontal position in the host's client coordinate space.
    pub client_x: f64,
    /// Vertical position in the host's client coordinate space.
    pub client_y: f64,
    pub pressure: f64,
    /// DOM-style index of the button that changed (`-1` for none).
    pub button: i16,
    /// DOM-style bitmask of held buttons.
    pub buttons: u16,
    pub modifiers: ModifierState,
}

/// Unit of the deltas in a [`RawWheelInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    Pixel,
    Line,
    Page,
}

/// A wheel event as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawWheelInput {
    pub client_x: f64,
    pub client_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_mode: DeltaMode,
    pub modifiers: ModifierState,
}

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

/// A key event as reported by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct RawKeyInput {
    pub direction: KeyDirection,
    /// Platform key name, e.g. `"a"`, `"Esc"`, `"ArrowLeft"`.
    pub key: String,
    /// `true` for auto-repeat events.
    pub repeat: bool,
    pub modifiers: ModifierState,
}

// ── Key names ─────────────────────────────────────────────────────────────────

/// Abbreviated key names some platforms report, and their canonical form.
const KEY_REMAP: [(&str, &str); 3] = [("Ctrl", "Control"), ("Del", "Delete"), ("Esc", "Escape")];

/// Returns the canonical name for a platform key name.
pub fn canonical_key_name(key: &str) -> &str {
    KEY_REMAP
        .iter()
        .find(|(short, _)| *short == key)
        .map_or(key, |(_, canonical)| *canonical)
}

// ── Pointer state ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedPointer {
    client_x: f64,
    client_y: f64,
    pressure: f64,
}

/// Pointers that are currently down, keyed by pointer id.
#[derive(Debug, Default)]
pub struct PointerState {
    pointers: BTreeMap<i64, TrackedPointer>,
}

impl PointerState {
    fn track(&mut self, raw: &RawPointerInput) {
        self.pointers.insert(
            raw.pointer_id,
            TrackedPointer {
                client_x: raw.client_x,
                client_y: raw.client_y,
                pressure: raw.pressure,
            },
        );
    }

    fn release(&mut self, pointer_id: i64) {
        self.pointers.remove(&pointer_id);
    }

    pub fn contains(&self, pointer_id: i64) -> bool {
        self.pointers.contains_key(&pointer_id)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    fn touches(&self, origin: SurfaceOrigin) -> BTreeMap<i64, Touch> {
        self.pointers
            .iter()
            .map(|(id, p)| {
                let touch = Touch {
                    x: p.client_x - origin.left,
                    y: p.client_y - origin.top,
                    pressure: p.pressure,
                };
                (*id, touch)
            })
            .collect()
    }
}

// ── Wheel accumulation ────────────────────────────────────────────────────────

/// Wheel deltas summed since the last flush.
#[derive(Debug, Default)]
pub struct WheelAccumulator {
    pub dx: f64,
    pub dy: f64,
    /// `true` while a flush is scheduled.
    pub pending: bool,
    last: Option<(f64, f64, ModifierState)>,
}

impl WheelAccumulator {
    fn add(&mut self, dx: f64, dy: f64, position: (f64, f64), modifiers: ModifierState) {
        self.dx += dx;
        self.dy += dy;
        self.last = Some((position.0, position.1, modifiers));
    }

    fn reset(&mut self) {
        self.dx = 0.0;
        self.dy = 0.0;
        self.pending = false;
    }
}

/// Result of feeding a wheel event to the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// The focus element does not hold focus; the event is not consumed.
    Ignored,
    /// Deltas were added to an already scheduled flush.
    Accumulated,
    /// Deltas were added and the caller must schedule a flush.
    ArmFlush,
}

// ── Normalizer ────────────────────────────────────────────────────────────────

/// Stateful converter from raw input to [`RfbEvent`]s.
#[derive(Debug, Default)]
pub struct EventNormalizer {
    pointers: PointerState,
    last_buttons: Vec<Button>,
    wheel: WheelAccumulator,
    focused: bool,
}

impl EventNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointers(&self) -> &PointerState {
        &self.pointers
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    /// Records whether the focus element holds input focus.
    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// A pointer went down: it is captured and added to the pointer state.
    ///
    /// Pressing a pointer also focuses the focus element.
    pub fn pointer_down(
        &mut self,
        raw: &RawPointerInput,
        origin: SurfaceOrigin,
        time_stamp: f64,
    ) -> RfbEvent {
        self.focused = true;
        self.pointers.track(raw);
        let event = self.pointer_event(raw, origin, time_stamp);
        self.last_buttons = event.buttons.clone();
        RfbEvent::PointerDown(event)
    }

    /// A pointer lost capture (it went up or was cancelled).
    ///
    /// The emitted `pointer_up` still lists the released pointer among its
    /// touches; it is removed from the pointer state afterwards.
    pub fn pointer_capture_lost(
        &mut self,
        raw: &RawPointerInput,
        origin: SurfaceOrigin,
        time_stamp: f64,
    ) -> RfbEvent {
        let event = self.pointer_event(raw, origin, time_stamp);
        self.pointers.release(raw.pointer_id);
        self.last_buttons = event.buttons.clone();
        RfbEvent::PointerUp(event)
    }

    /// A pointer moved.
    ///
    /// Returns `None` when the pointer is not down while some other pointer
    /// is: hover movement must not compete with an active gesture.
    pub fn pointer_move(
        &mut self,
        raw: &RawPointerInput,
        origin: SurfaceOrigin,
        time_stamp: f64,
    ) -> Option<RfbEvent> {
        if self.pointers.contains(raw.pointer_id) {
            self.pointers.track(raw);
        } else if !self.pointers.is_empty() {
            return None;
        }
        Some(RfbEvent::PointerMove(self.pointer_event(raw, origin, time_stamp)))
    }

    /// A double click; reported without touch fields.
    pub fn double_click(
        &self,
        raw: &RawPointerInput,
        origin: SurfaceOrigin,
        time_stamp: f64,
    ) -> RfbEvent {
        RfbEvent::DoubleClick(ClickEvent {
            x: raw.client_x - origin.left,
            y: raw.client_y - origin.top,
            button: Button::from_platform_index(raw.button),
            buttons: Button::from_platform_mask(raw.buttons),
            modifiers: raw.modifiers.to_list(),
            time_stamp,
        })
    }

    /// Accumulates a wheel event.
    ///
    /// Deltas are scaled to pixel equivalents: pixel deltas by
    /// `1 / pixel_ratio`, line deltas by 16 and page deltas by 600.
    pub fn wheel(&mut self, raw: &RawWheelInput, origin: SurfaceOrigin, pixel_ratio: f64) -> WheelOutcome {
        if !self.focused {
            return WheelOutcome::Ignored;
        }
        let scale = match raw.delta_mode {
            DeltaMode::Pixel if pixel_ratio > 0.0 => 1.0 / pixel_ratio,
            DeltaMode::Pixel => 1.0,
            DeltaMode::Line => 16.0,
            DeltaMode::Page => 600.0,
        };
        self.wheel.add(
            raw.delta_x * scale,
            raw.delta_y * scale,
            (raw.client_x - origin.left, raw.client_y - origin.top),
            raw.modifiers,
        );
        if self.wheel.pending {
            WheelOutcome::Accumulated
        } else {
            self.wheel.pending = true;
            WheelOutcome::ArmFlush
        }
    }

    /// Emits the accumulated wheel deltas and resets the accumulator.
    ///
    /// Returns `None` if no flush is pending.
    pub fn flush_wheel(&mut self, time_stamp: f64) -> Option<RfbEvent> {
        if !self.wheel.pending {
            return None;
        }
        let (x, y, modifiers) = self.wheel.last.unwrap_or_default();
        let event = WheelEvent {
            x,
            y,
            dx: self.wheel.dx,
            dy: self.wheel.dy,
            buttons: self.last_buttons.clone(),
            modifiers: modifiers.to_list(),
            time_stamp,
        };
        self.wheel.reset();
        Some(RfbEvent::Wheel(event))
    }

    /// Converts a key event; auto-repeat events produce nothing.
    pub fn key(&self, raw: &RawKeyInput, time_stamp: f64) -> Option<RfbEvent> {
        if raw.repeat {
            return None;
        }
        let event = KeyEvent {
            key: canonical_key_name(&raw.key).to_string(),
            modifiers: raw.modifiers.to_list(),
            time_stamp,
        };
        Some(match raw.direction {
            KeyDirection::Down => RfbEvent::KeyDown(event),
            KeyDirection::Up => RfbEvent::KeyUp(event),
        })
    }

    /// Forgets all pointers, buttons and wheel deltas.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn pointer_event(&self, raw: &RawPointerInput, origin: SurfaceOrigin, time_stamp: f64) -> PointerEvent {
        let touches = self.pointers.touches(origin);
        PointerEvent {
            x: raw.client_x - origin.left,
            y: raw.client_y - origin.top,
            button: Button::from_platform_index(raw.button),
            buttons: Button::from_platform_mask(raw.buttons),
            modifiers: raw.modifiers.to_list(),
            ntouches: touches.len(),
            touches,
            time_stamp,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
