//! RemoteFrameBuffer: the host-facing facade of the client.
//!
//! The facade owns every state machine of the client and is the only piece
//! that talks to the host ports.  A host drives it from its event loop:
//!
//! - transport callbacks: [`RemoteFrameBuffer::receive_frame`]
//! - timer callbacks: [`RemoteFrameBuffer::on_timer`]
//! - surface lifecycle: [`RemoteFrameBuffer::surface_attached`],
//!   [`RemoteFrameBuffer::surface_detached`],
//!   [`RemoteFrameBuffer::on_content_loaded`],
//!   [`RemoteFrameBuffer::on_visibility_change`],
//!   [`RemoteFrameBuffer::geometry_changed`]
//! - user input: the pointer, wheel and key handlers, each of which returns an
//!   [`InputResponse`] telling the host what to do with the platform event
//! - property changes: [`RemoteFrameBuffer::on_property_change`]
//!
//! Nothing here returns an error.  Malformed inbound messages are dropped and
//! failed sends are treated as no-ops; both are logged at `debug` level.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::application::normalizer::{
    EventNormalizer, RawKeyInput, RawPointerInput, RawWheelInput, WheelOutcome,
};
use crate::application::ports::{Clock, EventSink, FrameSink, PropertyStore, TimerKey, TimerPort};
use crate::application::resize::{ResizeDetector, ResizeOutcome, TargetSize};
use crate::application::scheduler::{FrameScheduler, SchedulerStats};
use crate::application::throttle::{Expiry, ThrottleDecision, ThrottleGate};
use crate::application::visibility::VisibilityTracker;
use crate::domain::config::RfbConfig;
use crate::domain::events::{CloseEvent, ModifierState, ResizeEvent, RfbEvent};
use crate::domain::properties::{Property, PropertyValue};
use crate::domain::surface::{StyleUpdate, SurfaceGeometry, SurfaceId, SurfaceOrigin};
use crate::protocol::inbound::parse_frame_message;

/// The host services a [`RemoteFrameBuffer`] runs on.
#[derive(Clone)]
pub struct HostPorts {
    pub frames: Arc<dyn FrameSink>,
    pub properties: Arc<dyn PropertyStore>,
    pub events: Arc<dyn EventSink>,
    pub timers: Arc<dyn TimerPort>,
    pub clock: Arc<dyn Clock>,
}

/// How the host should treat the platform event it just forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResponse {
    /// Suppress the platform's default action (scrolling, context menu, ...).
    pub prevent_default: bool,
    /// Keep the event from reaching enclosing elements.
    pub stop_propagation: bool,
    /// Capture this pointer so its moves and release are delivered even
    /// outside the surface.
    pub capture_pointer: Option<i64>,
    /// Give input focus to the focus element.
    pub request_focus: bool,
}

impl InputResponse {
    fn prevent_unless_alt(modifiers: ModifierState) -> Self {
        Self {
            prevent_default: !modifiers.alt,
            ..Self::default()
        }
    }
}

/// One client instance.
pub struct RemoteFrameBuffer {
    config: RfbConfig,
    ports: HostPorts,
    scheduler: FrameScheduler,
    gate: ThrottleGate<&'static str, RfbEvent>,
    visibility: VisibilityTracker,
    resize: ResizeDetector,
    normalizer: EventNormalizer,
    started: bool,
    closed: bool,
}

impl RemoteFrameBuffer {
    pub fn new(config: RfbConfig, ports: HostPorts) -> Self {
        Self {
            config,
            ports,
            scheduler: FrameScheduler::new(),
            gate: ThrottleGate::new(),
            visibility: VisibilityTracker::new(),
            resize: ResizeDetector::new(),
            normalizer: EventNormalizer::new(),
            started: false,
            closed: false,
        }
    }

    pub fn config(&self) -> &RfbConfig {
        &self.config
    }

    pub fn stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    pub fn queue_len(&self) -> usize {
        self.scheduler.queue_len()
    }

    pub fn has_visible_views(&self) -> bool {
        self.visibility.has_visible_views()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Applies the display properties, registers the attached surfaces,
    /// shows them the placeholder frame and starts the draw loop and the
    /// periodic visibility re-scan.  Calling it again has no effect.
    pub fn start(&mut self) {
        if self.started || self.closed {
            return;
        }
        self.started = true;
        debug!("remote frame buffer starting");

        for property in [Property::CssWidth, Property::CssHeight, Property::Resizable, Property::Cursor] {
            self.on_property_change(property);
        }
        let attached = self.ports.frames.surfaces();
        self.scheduler.show_last_frame(self.ports.frames.as_ref(), &attached);
        self.rescan_surfaces();
        self.ports.timers.schedule(
            TimerKey::VisibilityScan,
            self.config.timing.visibility_scan_interval(),
        );
    }

    // ── Transport ────────────────────────────────────────────────────────────

    /// Handles one inbound message with its binary attachments.
    ///
    /// Frame messages are queued; anything else is ignored.
    pub fn receive_frame(&mut self, msg: &Value, buffers: Vec<Vec<u8>>) {
        if self.closed {
            return;
        }
        match parse_frame_message(msg, buffers) {
            Ok(frame) => self.scheduler.enqueue(frame),
            Err(e) => debug!("ignored inbound message: {e}"),
        }
    }

    /// Sends an event right away.
    pub fn send_event(&self, event: &RfbEvent) {
        if self.closed {
            return;
        }
        if let Err(e) = self.ports.events.send(event) {
            debug!("dropped {} event: {e}", event.event_type());
        }
    }

    /// Sends an event through the throttle gate keyed by its `event_type`.
    pub fn send_throttled(&mut self, event: RfbEvent) {
        if self.closed {
            return;
        }
        let key = event.event_type();
        let wait = self.config.timing.throttle_window(key);
        match self.gate.call(key, wait, event, self.ports.clock.now()) {
            ThrottleDecision::Fire(event) => self.send_event(&event),
            ThrottleDecision::Deferred { arm: Some(delay) } => {
                self.ports.timers.schedule(TimerKey::Throttle(key), delay);
            }
            ThrottleDecision::Deferred { arm: None } => {}
        }
    }

    /// Reads a display property.
    pub fn property(&self, property: Property) -> Option<PropertyValue> {
        self.ports.properties.get(property)
    }

    /// Writes a display property.
    pub fn set_property(&self, property: Property, value: PropertyValue) {
        self.ports.properties.set(property, value);
    }

    /// Re-applies a display property after the host reported a change.
    pub fn on_property_change(&mut self, property: Property) {
        if self.closed {
            return;
        }
        let display = &self.config.display;
        let update = match property {
            Property::CssWidth => StyleUpdate::Width(self.text_property(property, &display.css_width)),
            Property::CssHeight => StyleUpdate::Height(self.text_property(property, &display.css_height)),
            Property::Resizable => StyleUpdate::Resizable(
                self.property(property)
                    .and_then(|v| v.as_flag())
                    .unwrap_or(display.resizable),
            ),
            Property::Cursor => StyleUpdate::Cursor(self.text_property(property, &display.cursor)),
            Property::HasVisibleViews | Property::FrameFeedback => return,
        };
        trace!("applying {update:?}");
        self.ports.frames.apply_style(&update);
    }

    // ── Timers ───────────────────────────────────────────────────────────────

    /// Handles an elapsed timer requested through the [`TimerPort`].
    pub fn on_timer(&mut self, key: TimerKey) {
        if self.closed {
            return;
        }
        match key {
            TimerKey::FrameTick => self.run_tick(),
            TimerKey::Throttle(event_type) => match self.gate.on_expire(&event_type, self.ports.clock.now()) {
                Expiry::Fire(event) => self.send_event(&event),
                Expiry::Rearm(remaining) => {
                    trace!("{event_type} timer fired {remaining:?} early");
                    self.ports.timers.schedule(TimerKey::Throttle(event_type), remaining);
                }
                Expiry::Nothing => {}
            },
            TimerKey::WheelFlush => {
                if let Some(event) = self.normalizer.flush_wheel(self.ports.clock.wall_time()) {
                    self.send_event(&event);
                }
            }
            TimerKey::VisibilityScan => {
                self.rescan_surfaces();
                self.ports.timers.schedule(
                    TimerKey::VisibilityScan,
                    self.config.timing.visibility_scan_interval(),
                );
            }
            TimerKey::DetachRescan => self.rescan_surfaces(),
        }
    }

    fn run_tick(&mut self) {
        let surfaces = self.visibility.surfaces();
        let outcome = self.scheduler.tick(
            self.ports.frames.as_ref(),
            &surfaces,
            self.ports.clock.wall_time(),
        );
        if let Some(feedback) = outcome.applied {
            self.ports
                .properties
                .set(Property::FrameFeedback, PropertyValue::Feedback(feedback));
        }
        if outcome.rearm {
            self.arm_tick();
        }
    }

    fn arm_tick(&mut self) {
        if self.scheduler.request_tick() {
            self.ports
                .timers
                .schedule(TimerKey::FrameTick, self.config.timing.frame_defer());
        }
    }

    // ── Surfaces ─────────────────────────────────────────────────────────────

    /// A surface was attached: it shows the last applied frame at once.
    pub fn surface_attached(&mut self, surface: SurfaceId) {
        if self.closed {
            return;
        }
        self.scheduler
            .show_last_frame(self.ports.frames.as_ref(), &[surface]);
        self.rescan_surfaces();
    }

    /// A surface was detached; the view set is re-scanned shortly after.
    pub fn surface_detached(&mut self, surface: SurfaceId) {
        if self.closed {
            return;
        }
        trace!("surface {surface} detached");
        self.ports.timers.schedule(
            TimerKey::DetachRescan,
            self.config.timing.detach_rescan_delay(),
        );
    }

    /// A surface finished loading its current image; the draw loop may
    /// continue.
    pub fn on_content_loaded(&mut self, surface: SurfaceId) {
        if self.closed {
            return;
        }
        trace!("surface {surface} loaded its frame");
        self.arm_tick();
    }

    /// Visibility changed for the listed surfaces.
    pub fn on_visibility_change(&mut self, changes: &[(SurfaceId, bool)]) {
        if self.closed {
            return;
        }
        if let Some(visible) = self.visibility.update(changes) {
            self.publish_visibility(visible);
        }
    }

    /// The surface geometry or the display density may have changed.
    pub fn geometry_changed(&mut self, geometry: SurfaceGeometry) {
        if self.closed {
            return;
        }
        let display = &self.config.display;
        let css_width = self.text_property(Property::CssWidth, &display.css_width);
        let css_height = self.text_property(Property::CssHeight, &display.css_height);
        let target = TargetSize {
            css_width: &css_width,
            css_height: &css_height,
            min_size_cap: self.config.display.min_size_cap,
        };
        match self.resize.observe(&geometry, Some(target)) {
            ResizeOutcome::Unchanged => {}
            ResizeOutcome::ApplyTargetSize(updates) => {
                for update in &updates {
                    self.ports.frames.apply_style(update);
                }
            }
            ResizeOutcome::Changed(size) => {
                let event = RfbEvent::Resize(ResizeEvent {
                    width: size.width,
                    height: size.height,
                    pixel_ratio: size.pixel_ratio,
                    time_stamp: self.ports.clock.wall_time(),
                });
                self.send_throttled(event);
            }
        }
    }

    fn rescan_surfaces(&mut self) {
        let attached = self.ports.frames.surfaces();
        self.ports.frames.observe(&attached);
        if let Some(visible) = self.visibility.rescan(&attached) {
            self.publish_visibility(visible);
        }
        // A surface that dropped out may have been the one expected to re-arm the loop.
        self.arm_tick();
    }

    fn publish_visibility(&self, visible: bool) {
        debug!("has_visible_views -> {visible}");
        self.ports
            .properties
            .set(Property::HasVisibleViews, PropertyValue::Flag(visible));
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Records whether the focus element holds input focus.
    pub fn set_focus(&mut self, focused: bool) {
        self.normalizer.set_focus(focused);
    }

    pub fn pointer_down(&mut self, raw: &RawPointerInput, origin: SurfaceOrigin) -> InputResponse {
        if self.closed {
            return InputResponse::default();
        }
        let event = self
            .normalizer
            .pointer_down(raw, origin, self.ports.clock.wall_time());
        self.send_event(&event);
        InputResponse {
            capture_pointer: Some(raw.pointer_id),
            request_focus: true,
            ..InputResponse::prevent_unless_alt(raw.modifiers)
        }
    }

    /// The pointer went up or was cancelled.
    pub fn pointer_capture_lost(&mut self, raw: &RawPointerInput, origin: SurfaceOrigin) -> InputResponse {
        if self.closed {
            return InputResponse::default();
        }
        let event = self
            .normalizer
            .pointer_capture_lost(raw, origin, self.ports.clock.wall_time());
        self.send_event(&event);
        InputResponse::default()
    }

    pub fn pointer_move(&mut self, raw: &RawPointerInput, origin: SurfaceOrigin) -> InputResponse {
        if self.closed {
            return InputResponse::default();
        }
        let time_stamp = self.ports.clock.wall_time();
        if let Some(event) = self.normalizer.pointer_move(raw, origin, time_stamp) {
            self.send_throttled(event);
        }
        InputResponse::default()
    }

    pub fn double_click(&mut self, raw: &RawPointerInput, origin: SurfaceOrigin) -> InputResponse {
        if self.closed {
            return InputResponse::default();
        }
        let event = self
            .normalizer
            .double_click(raw, origin, self.ports.clock.wall_time());
        self.send_event(&event);
        InputResponse::prevent_unless_alt(raw.modifiers)
    }

    /// Wheel input; consumed only while the focus element has focus.
    pub fn wheel(&mut self, raw: &RawWheelInput, origin: SurfaceOrigin, pixel_ratio: f64) -> InputResponse {
        if self.closed {
            return InputResponse::default();
        }
        match self.normalizer.wheel(raw, origin, pixel_ratio) {
            WheelOutcome::Ignored => return InputResponse::default(),
            WheelOutcome::Accumulated => {}
            WheelOutcome::ArmFlush => self.ports.timers.schedule(
                TimerKey::WheelFlush,
                self.config.timing.wheel_flush_interval(),
            ),
        }
        InputResponse::prevent_unless_alt(raw.modifiers)
    }

    /// Key input.  Ignored while no surface is attached; otherwise the
    /// platform event is always consumed, auto-repeats included.
    pub fn key(&mut self, raw: &RawKeyInput) -> InputResponse {
        if self.closed || self.ports.frames.surfaces().is_empty() {
            return InputResponse::default();
        }
        if let Some(event) = self.normalizer.key(raw, self.ports.clock.wall_time()) {
            self.send_event(&event);
        }
        InputResponse {
            prevent_default: true,
            stop_propagation: true,
            ..InputResponse::default()
        }
    }

    /// The platform is about to show a context menu; it is suppressed unless
    /// Shift is held.
    pub fn context_menu(&self, modifiers: ModifierState) -> InputResponse {
        if modifiers.shift {
            return InputResponse::default();
        }
        InputResponse {
            prevent_default: true,
            stop_propagation: true,
            ..InputResponse::default()
        }
    }

    // ── Teardown ─────────────────────────────────────────────────────────────

    /// Tears the instance down.
    ///
    /// Sends a single `close` event (best effort), drops queued frames and
    /// releases the transient resource of the frame on screen.  Every later
    /// call into the instance, including another `close`, does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.send_event(&RfbEvent::Close(CloseEvent {
            time_stamp: self.ports.clock.wall_time(),
        }));
        self.closed = true;
        self.scheduler.teardown(self.ports.frames.as_ref());
        self.gate.clear();
        self.normalizer.reset();
        debug!("remote frame buffer closed");
    }

    fn text_property(&self, property: Property, default: &str) -> String {
        self.property(property)
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }
}
