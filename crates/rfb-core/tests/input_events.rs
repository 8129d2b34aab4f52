//! Integration tests for outbound events: normalization, throttling, resize
//! detection and teardown.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeSurfaces, Harness, ManualClock, ManualTimers, MemoryProperties};
use mockall::mock;
use rfb_core::application::normalizer::{
    DeltaMode, KeyDirection, RawKeyInput, RawPointerInput, RawWheelInput,
};
use rfb_core::{
    Button, EventSink, HostPorts, InputResponse, ModifierState, RemoteFrameBuffer, RfbConfig,
    RfbEvent, StyleUpdate, SurfaceGeometry, SurfaceOrigin, TimerKey, TransportError,
};

const ORIGIN: SurfaceOrigin = SurfaceOrigin { left: 0.0, top: 0.0 };

fn pointer(pointer_id: i64, x: f64) -> RawPointerInput {
    RawPointerInput {
        pointer_id,
        client_x: x,
        client_y: 0.0,
        pressure: 0.5,
        button: 0,
        buttons: 1,
        modifiers: ModifierState::default(),
    }
}

fn hover(pointer_id: i64, x: f64) -> RawPointerInput {
    RawPointerInput {
        button: -1,
        buttons: 0,
        ..pointer(pointer_id, x)
    }
}

fn geometry(width: f64, height: f64, pixel_ratio: f64) -> SurfaceGeometry {
    SurfaceGeometry {
        width,
        height,
        pixel_ratio,
        size_assigned: true,
        viewport_width: 1280.0,
        viewport_height: 800.0,
    }
}

fn move_xs(h: &Harness) -> Vec<f64> {
    h.events
        .sent()
        .into_iter()
        .filter_map(|e| match e {
            RfbEvent::PointerMove(p) => Some(p.x),
            _ => None,
        })
        .collect()
}

// ── Pointer ───────────────────────────────────────────────────────────────────

#[test]
fn test_hover_from_other_pointer_is_suppressed_during_capture() {
    // Arrange
    let mut h = Harness::new();
    h.rfb.start();

    // Act
    let down = h.rfb.pointer_down(&pointer(1, 10.0), ORIGIN);
    h.rfb.pointer_move(&hover(2, 20.0), ORIGIN);
    h.rfb.pointer_capture_lost(&pointer(1, 10.0), ORIGIN);
    h.rfb.pointer_move(&hover(2, 30.0), ORIGIN);

    // Assert
    assert_eq!(down.capture_pointer, Some(1));
    assert!(down.request_focus);
    assert!(down.prevent_default);
    assert_eq!(
        h.events.event_types(),
        vec!["pointer_down", "pointer_up", "pointer_move"]
    );
    assert_eq!(move_xs(&h), vec![30.0]);
}

#[test]
fn test_pointer_down_with_alt_keeps_platform_default() {
    let mut h = Harness::new();
    let mut input = pointer(1, 0.0);
    input.modifiers.alt = true;

    let response = h.rfb.pointer_down(&input, ORIGIN);

    assert!(!response.prevent_default);
    assert_eq!(response.capture_pointer, Some(1));
}

#[test]
fn test_pointer_down_and_up_are_never_throttled() {
    let mut h = Harness::new();

    for i in 0..5 {
        h.rfb.pointer_down(&pointer(1, i as f64), ORIGIN);
        h.rfb.pointer_capture_lost(&pointer(1, i as f64), ORIGIN);
    }

    assert_eq!(h.events.sent().len(), 10);
}

#[test]
fn test_pointer_move_is_throttled_leading_and_trailing() {
    // Arrange
    let mut h = Harness::new();
    h.rfb.start();

    // Act – moves at t, t+5 and t+30 with a 20 ms window
    h.rfb.pointer_move(&hover(1, 0.0), ORIGIN);
    h.advance(5);
    h.rfb.pointer_move(&hover(1, 5.0), ORIGIN);
    assert_eq!(move_xs(&h), vec![0.0]);
    h.advance(15);
    assert_eq!(move_xs(&h), vec![0.0, 5.0]);
    h.advance(10);
    h.rfb.pointer_move(&hover(1, 30.0), ORIGIN);

    // Assert
    assert_eq!(move_xs(&h), vec![0.0, 5.0, 30.0]);
}

#[test]
fn test_burst_of_moves_delivers_only_the_latest_at_window_end() {
    let mut h = Harness::new();
    h.rfb.pointer_move(&hover(1, 0.0), ORIGIN);
    for x in 1..=10 {
        h.advance(1);
        h.rfb.pointer_move(&hover(1, x as f64), ORIGIN);
    }

    h.advance(20);

    assert_eq!(move_xs(&h), vec![0.0, 10.0]);
    assert_eq!(h.timers.scheduled(TimerKey::Throttle("pointer_move")), 1);
}

#[test]
fn test_double_click_is_sent_without_touches() {
    let mut h = Harness::new();

    let response = h.rfb.double_click(&pointer(1, 4.0), ORIGIN);

    assert!(response.prevent_default);
    match h.events.sent().as_slice() {
        [RfbEvent::DoubleClick(click)] => {
            assert_eq!(click.button, Button::Primary);
            assert_eq!(click.x, 4.0);
        }
        other => panic!("expected one double click, got {other:?}"),
    }
}

// ── Wheel ─────────────────────────────────────────────────────────────────────

#[test]
fn test_wheel_needs_focus() {
    let mut h = Harness::new();
    let input = RawWheelInput {
        client_x: 0.0,
        client_y: 0.0,
        delta_x: 0.0,
        delta_y: 1.0,
        delta_mode: DeltaMode::Line,
        modifiers: ModifierState::default(),
    };

    let response = h.rfb.wheel(&input, ORIGIN, 1.0);
    h.advance(50);

    assert_eq!(response, InputResponse::default());
    assert!(h.events.sent().is_empty());
}

#[test]
fn test_wheel_deltas_accumulate_until_flush() {
    // Arrange
    let mut h = Harness::new();
    h.rfb.set_focus(true);
    let input = RawWheelInput {
        client_x: 12.0,
        client_y: 8.0,
        delta_x: 0.0,
        delta_y: 1.0,
        delta_mode: DeltaMode::Line,
        modifiers: ModifierState::default(),
    };

    // Act
    let response = h.rfb.wheel(&input, ORIGIN, 1.0);
    h.rfb.wheel(&input, ORIGIN, 1.0);
    h.rfb.wheel(&input, ORIGIN, 1.0);
    h.advance(20);

    // Assert
    assert!(response.prevent_default);
    assert_eq!(h.timers.scheduled(TimerKey::WheelFlush), 1);
    match h.events.sent().as_slice() {
        [RfbEvent::Wheel(wheel)] => {
            assert_eq!((wheel.dx, wheel.dy), (0.0, 48.0));
            assert_eq!((wheel.x, wheel.y), (12.0, 8.0));
        }
        other => panic!("expected one wheel event, got {other:?}"),
    }
}

// ── Keys ──────────────────────────────────────────────────────────────────────

#[test]
fn test_keys_are_ignored_without_surfaces() {
    let mut h = Harness::new();
    let input = RawKeyInput {
        direction: KeyDirection::Down,
        key: "a".into(),
        repeat: false,
        modifiers: ModifierState::default(),
    };

    let response = h.rfb.key(&input);

    assert_eq!(response, InputResponse::default());
    assert!(h.events.sent().is_empty());
}

#[test]
fn test_keys_are_consumed_and_repeats_dropped() {
    // Arrange
    let mut h = Harness::new();
    h.surfaces.attach();
    h.rfb.start();
    let mut input = RawKeyInput {
        direction: KeyDirection::Down,
        key: "Esc".into(),
        repeat: false,
        modifiers: ModifierState::default(),
    };

    // Act
    let first = h.rfb.key(&input);
    input.repeat = true;
    let repeated = h.rfb.key(&input);
    input.repeat = false;
    input.direction = KeyDirection::Up;
    h.rfb.key(&input);

    // Assert
    assert!(first.stop_propagation && first.prevent_default);
    assert!(repeated.stop_propagation && repeated.prevent_default);
    assert_eq!(h.events.event_types(), vec!["key_down", "key_up"]);
    assert!(matches!(&h.events.sent()[0], RfbEvent::KeyDown(k) if k.key == "Escape"));
}

#[test]
fn test_context_menu_suppressed_unless_shift() {
    let h = Harness::new();

    let plain = h.rfb.context_menu(ModifierState::default());
    let shifted = h.rfb.context_menu(ModifierState { shift: true, ..Default::default() });

    assert!(plain.prevent_default && plain.stop_propagation);
    assert_eq!(shifted, InputResponse::default());
}

// ── Resize ────────────────────────────────────────────────────────────────────

#[test]
fn test_unsized_box_gets_target_size_without_event() {
    let mut h = Harness::new();
    let mut unsized_box = geometry(0.0, 0.0, 1.0);
    unsized_box.size_assigned = false;

    h.rfb.geometry_changed(unsized_box);

    assert!(h.events.sent().is_empty());
    assert_eq!(
        h.surfaces.styles(),
        vec![
            StyleUpdate::Width("500px".into()),
            StyleUpdate::Height("300px".into()),
            StyleUpdate::MaxSize { width: 1280, height: 1024 },
        ]
    );
}

#[test]
fn test_resize_only_on_change_and_throttled() {
    // Arrange
    let mut h = Harness::new();

    // Act
    h.rfb.geometry_changed(geometry(100.0, 100.0, 1.0));
    h.rfb.geometry_changed(geometry(100.0, 100.0, 1.0));
    h.advance(50);
    h.rfb.geometry_changed(geometry(200.0, 100.0, 1.0));
    let before_window_end = h.events.sent().len();
    h.advance(150);

    // Assert
    assert_eq!(before_window_end, 1);
    let sizes: Vec<(f64, f64, f64)> = h
        .events
        .sent()
        .into_iter()
        .filter_map(|e| match e {
            RfbEvent::Resize(r) => Some((r.width, r.height, r.pixel_ratio)),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![(100.0, 100.0, 1.0), (200.0, 100.0, 1.0)]);
}

#[test]
fn test_early_throttle_timer_still_delivers_final_resize() {
    // Arrange: a deferred resize whose 200 ms window ends at t+200
    let mut h = Harness::new();
    h.rfb.geometry_changed(geometry(100.0, 100.0, 1.0));
    h.advance(50);
    h.rfb.geometry_changed(geometry(300.0, 200.0, 1.0));
    let key = TimerKey::Throttle("resize");

    // Act: the host fires the window timer 1 ms early
    h.clock.set(Duration::from_millis(199));
    assert!(h.fire_now(key));
    let after_early_fire = h.events.sent().len();
    h.advance(1);

    // Assert: nothing sent early, the timer was re-armed, and the final
    // size arrives once at window end
    assert_eq!(after_early_fire, 1);
    assert_eq!(h.timers.log().last(), Some(&(key, Duration::from_millis(1))));
    let last = h.events.sent().into_iter().last();
    match last {
        Some(RfbEvent::Resize(r)) => assert_eq!((r.width, r.height), (300.0, 200.0)),
        other => panic!("expected the deferred resize, got {other:?}"),
    }
    assert_eq!(h.events.event_types(), vec!["resize", "resize"]);
}

#[test]
fn test_zero_geometry_is_not_reported() {
    let mut h = Harness::new();

    h.rfb.geometry_changed(geometry(0.0, 0.0, 2.0));

    assert!(h.events.sent().is_empty());
}

// ── Teardown ──────────────────────────────────────────────────────────────────

#[test]
fn test_close_sends_one_close_event() {
    // Arrange
    let mut h = Harness::new();
    h.rfb.start();

    // Act
    h.rfb.close();
    h.rfb.close();
    h.rfb.pointer_down(&pointer(1, 0.0), ORIGIN);

    // Assert
    match h.events.sent().as_slice() {
        [RfbEvent::Close(close)] => assert_eq!(close.time_stamp, common::WALL_START),
        other => panic!("expected a single close event, got {other:?}"),
    }
}

#[test]
fn test_pending_throttled_event_is_dropped_on_close() {
    let mut h = Harness::new();
    h.rfb.pointer_move(&hover(1, 0.0), ORIGIN);
    h.rfb.pointer_move(&hover(1, 1.0), ORIGIN);

    h.rfb.close();
    h.advance(50);

    assert_eq!(h.events.event_types(), vec!["pointer_move", "close"]);
}

#[test]
fn test_closed_transport_is_a_no_op() {
    let mut h = Harness::new();
    h.rfb.start();
    h.events.close_transport();

    h.rfb.pointer_down(&pointer(1, 0.0), ORIGIN);
    h.rfb.close();

    assert!(h.events.sent().is_empty());
    assert!(h.rfb.is_closed());
}

// ── Expectation-based transport ───────────────────────────────────────────────

mock! {
    Transport {}

    impl EventSink for Transport {
        fn send(&self, event: &RfbEvent) -> Result<(), TransportError>;
    }
}

fn with_transport(transport: MockTransport) -> RemoteFrameBuffer {
    let clock = Arc::new(ManualClock::new());
    let ports = HostPorts {
        frames: Arc::new(FakeSurfaces::default()),
        properties: Arc::new(MemoryProperties::with_defaults()),
        events: Arc::new(transport),
        timers: Arc::new(ManualTimers::new(Arc::clone(&clock))),
        clock,
    };
    RemoteFrameBuffer::new(RfbConfig::default(), ports)
}

#[test]
fn test_close_is_sent_exactly_once_even_if_transport_is_gone() {
    // Arrange
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .withf(|event| event.event_type() == "close")
        .times(1)
        .returning(|_| Err(TransportError::Closed));
    let mut rfb = with_transport(transport);

    // Act / Assert – mockall verifies the call count on drop
    rfb.close();
    rfb.close();
}

#[test]
fn test_failed_send_does_not_stop_later_sends() {
    let mut transport = MockTransport::new();
    let mut seq = mockall::Sequence::new();
    transport
        .expect_send()
        .withf(|event| event.event_type() == "pointer_down")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(TransportError::Send("buffer full".into())));
    transport
        .expect_send()
        .withf(|event| event.event_type() == "pointer_up")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    let mut rfb = with_transport(transport);

    rfb.pointer_down(&pointer(1, 0.0), ORIGIN);
    rfb.pointer_capture_lost(&pointer(1, 0.0), ORIGIN);
}
