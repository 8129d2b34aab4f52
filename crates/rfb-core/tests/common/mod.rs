//! Recording fakes of every host port, plus a harness that owns a
//! [`RemoteFrameBuffer`] and drives its timers on a manual clock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rfb_core::{
    Clock, EventSink, FrameSink, FrameSource, HostPorts, Property, PropertyStore, PropertyValue,
    RemoteFrameBuffer, RfbConfig, RfbEvent, StyleUpdate, SurfaceId, TimerKey, TimerPort,
    TransientResource, TransportError,
};

/// Wall clock value the fake clock starts at.
pub const WALL_START: f64 = 1_700_000_000.0;

// ── Clock ─────────────────────────────────────────────────────────────────────

pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set(&self, offset: Duration) {
        *self.offset.lock().unwrap() = offset;
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn wall_time(&self) -> f64 {
        WALL_START + self.elapsed().as_secs_f64()
    }
}

// ── Timers ────────────────────────────────────────────────────────────────────

pub struct ManualTimers {
    clock: Arc<ManualClock>,
    pending: Mutex<Vec<(TimerKey, Duration)>>,
    log: Mutex<Vec<(TimerKey, Duration)>>,
}

impl ManualTimers {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            pending: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Every `schedule` call as `(key, delay)`.
    pub fn log(&self) -> Vec<(TimerKey, Duration)> {
        self.log.lock().unwrap().clone()
    }

    pub fn scheduled(&self, key: TimerKey) -> usize {
        self.log().iter().filter(|(k, _)| *k == key).count()
    }

    pub fn pending(&self, key: TimerKey) -> usize {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == key)
            .count()
    }

    /// Removes and returns the earliest timer due at or before `deadline`.
    fn pop_due(&self, deadline: Duration) -> Option<(TimerKey, Duration)> {
        let mut pending = self.pending.lock().unwrap();
        let position = pending
            .iter()
            .enumerate()
            .filter(|(_, (_, due))| *due <= deadline)
            .min_by_key(|(_, (_, due))| *due)
            .map(|(i, _)| i)?;
        Some(pending.remove(position))
    }
}

impl TimerPort for ManualTimers {
    fn schedule(&self, key: TimerKey, delay: Duration) {
        let due = self.clock.elapsed() + delay;
        self.pending.lock().unwrap().push((key, due));
        self.log.lock().unwrap().push((key, delay));
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingEvents {
    sent: Mutex<Vec<RfbEvent>>,
    closed: AtomicBool,
}

impl RecordingEvents {
    pub fn sent(&self) -> Vec<RfbEvent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.sent().iter().map(RfbEvent::event_type).collect()
    }

    pub fn close_transport(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl EventSink for RecordingEvents {
    fn send(&self, event: &RfbEvent) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

pub struct MemoryProperties {
    values: Mutex<HashMap<Property, PropertyValue>>,
    writes: Mutex<Vec<(Property, PropertyValue)>>,
}

impl MemoryProperties {
    /// A store holding the default display properties.
    pub fn with_defaults() -> Self {
        let values = HashMap::from([
            (Property::CssWidth, PropertyValue::Text("500px".into())),
            (Property::CssHeight, PropertyValue::Text("300px".into())),
            (Property::Resizable, PropertyValue::Flag(true)),
            (Property::Cursor, PropertyValue::Text("default".into())),
            (Property::HasVisibleViews, PropertyValue::Flag(false)),
        ]);
        Self {
            values: Mutex::new(values),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Changes a value the way the producer would (not recorded as a write).
    pub fn put(&self, property: Property, value: PropertyValue) {
        self.values.lock().unwrap().insert(property, value);
    }

    pub fn writes(&self) -> Vec<(Property, PropertyValue)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn writes_of(&self, property: Property) -> Vec<PropertyValue> {
        self.writes()
            .into_iter()
            .filter(|(p, _)| *p == property)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn feedback_indices(&self) -> Vec<u64> {
        self.writes_of(Property::FrameFeedback)
            .iter()
            .filter_map(|v| v.as_feedback().map(|fb| fb.index))
            .collect()
    }
}

impl PropertyStore for MemoryProperties {
    fn get(&self, property: Property) -> Option<PropertyValue> {
        self.values.lock().unwrap().get(&property).cloned()
    }

    fn set(&self, property: Property, value: PropertyValue) {
        self.values.lock().unwrap().insert(property, value.clone());
        self.writes.lock().unwrap().push((property, value));
    }
}

// ── Surfaces ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Observe(Vec<SurfaceId>),
    Display(Vec<SurfaceId>, String),
    Create(String),
    Release(String),
    Style(StyleUpdate),
}

#[derive(Default)]
pub struct FakeSurfaces {
    attached: Mutex<Vec<SurfaceId>>,
    calls: Mutex<Vec<SurfaceCall>>,
    blobs: Mutex<u32>,
}

impl FakeSurfaces {
    pub fn attach(&self) -> SurfaceId {
        let id = SurfaceId::new_random();
        self.attached.lock().unwrap().push(id);
        id
    }

    pub fn detach(&self, id: SurfaceId) {
        self.attached.lock().unwrap().retain(|s| *s != id);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Sources displayed so far, in order.
    pub fn displayed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Display(_, src) => Some(src),
                _ => None,
            })
            .collect()
    }

    pub fn styles(&self) -> Vec<StyleUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Style(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn released(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Release(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl FrameSink for FakeSurfaces {
    fn surfaces(&self) -> Vec<SurfaceId> {
        self.attached.lock().unwrap().clone()
    }

    fn observe(&self, surfaces: &[SurfaceId]) {
        self.record(SurfaceCall::Observe(surfaces.to_vec()));
    }

    fn display(&self, surfaces: &[SurfaceId], source: FrameSource<'_>) {
        self.record(SurfaceCall::Display(surfaces.to_vec(), source.src().to_string()));
    }

    fn create_transient(&self, _data: &[u8], mime_type: &str) -> TransientResource {
        let mut blobs = self.blobs.lock().unwrap();
        *blobs += 1;
        let url = format!("blob:{mime_type}/{}", *blobs);
        self.record(SurfaceCall::Create(url.clone()));
        TransientResource::new(url)
    }

    fn release_transient(&self, resource: TransientResource) {
        self.record(SurfaceCall::Release(resource.url().to_string()));
    }

    fn apply_style(&self, update: &StyleUpdate) {
        self.record(SurfaceCall::Style(update.clone()));
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

pub struct Harness {
    pub rfb: RemoteFrameBuffer,
    pub clock: Arc<ManualClock>,
    pub timers: Arc<ManualTimers>,
    pub events: Arc<RecordingEvents>,
    pub properties: Arc<MemoryProperties>,
    pub surfaces: Arc<FakeSurfaces>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RfbConfig::default())
    }

    pub fn with_config(config: RfbConfig) -> Self {
        Self::with_events(config, Arc::new(RecordingEvents::default()))
    }

    fn with_events(config: RfbConfig, events: Arc<RecordingEvents>) -> Self {
        let clock = Arc::new(ManualClock::new());
        let timers = Arc::new(ManualTimers::new(Arc::clone(&clock)));
        let properties = Arc::new(MemoryProperties::with_defaults());
        let surfaces = Arc::new(FakeSurfaces::default());
        let ports = HostPorts {
            frames: surfaces.clone(),
            properties: properties.clone(),
            events: events.clone(),
            timers: timers.clone(),
            clock: clock.clone(),
        };
        Self {
            rfb: RemoteFrameBuffer::new(config, ports),
            clock,
            timers,
            events,
            properties,
            surfaces,
        }
    }

    /// Advances the manual clock by `ms`, firing every timer that falls due
    /// on the way, in due order.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.clock.elapsed() + Duration::from_millis(ms);
        while let Some((key, due)) = self.timers.pop_due(deadline) {
            self.clock.set(due.max(self.clock.elapsed()));
            self.rfb.on_timer(key);
        }
        self.clock.set(deadline);
    }

    /// Runs exactly one pending frame tick, regardless of its due time.
    pub fn fire_tick(&mut self) -> bool {
        self.fire_now(TimerKey::FrameTick)
    }

    /// Fires the earliest pending `key` timer at the current clock value,
    /// even if it is not due yet.  Models hosts whose timers fire early.
    pub fn fire_now(&mut self, key: TimerKey) -> bool {
        let mut pending = self.timers.pending.lock().unwrap();
        let Some(position) = pending
            .iter()
            .enumerate()
            .filter(|(_, (k, _))| *k == key)
            .min_by_key(|(_, (_, due))| *due)
            .map(|(i, _)| i)
        else {
            return false;
        };
        pending.remove(position);
        drop(pending);
        self.rfb.on_timer(key);
        true
    }
}

// ── Message builders ──────────────────────────────────────────────────────────

pub fn inline_frame(index: u64) -> serde_json::Value {
    serde_json::json!({
        "type": "framebufferdata",
        "index": index,
        "timestamp": 1000.0 + index as f64,
        "data_b64": format!("data:image/png;base64,frame{index}"),
    })
}

pub fn binary_header(index: u64) -> serde_json::Value {
    serde_json::json!({
        "type": "framebufferdata",
        "index": index,
        "timestamp": 1000.0 + index as f64,
        "mimetype": "image/jpeg",
    })
}
