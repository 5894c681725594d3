use super::*;
use crate::{geometry::Vector, gesture::test_support::Harness, touch::TouchId};

fn tap_detector(finger_count: usize) -> Harness<TapDetector> {
    Harness::new(TapDetector::new(finger_count, &GestureConfig::default()))
}

fn anchor_of(event: &GestureEvent) -> &TouchRecord {
    match event {
        GestureEvent::Tap { anchor, .. } => anchor,
        other => panic!("expected tap, got {other:?}"),
    }
}

#[test]
fn still_press_and_release_emits_tap_with_anchor() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 100.0, 100.0)]);
    h.move_to(150, &[(1, 103.0, 101.0)]);
    h.up(300, &[1]);

    let events = h.take();
    assert_eq!(events.len(), 1);
    let anchor = anchor_of(&events[0]);
    assert_eq!(anchor.len(), 1);
    assert_eq!(
        anchor.get(TouchId(1)).map(|p| p.position),
        Some(Vector::new(100.0, 100.0))
    );
}

#[test]
fn movement_beyond_tolerance_cancels_tap() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 100.0, 100.0)]);
    h.move_to(100, &[(1, 140.0, 100.0)]);
    h.up(200, &[1]);

    assert!(h.take().is_empty());
}

#[test]
fn release_after_tap_window_is_discarded() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 50.0, 50.0)]);
    h.up(751, &[1]);
    assert!(h.take().is_empty());
    assert!(!h.detector.tracker.in_flight());
}

#[test]
fn release_exactly_at_window_edge_still_counts() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 50.0, 50.0)]);
    h.up(750, &[1]);
    assert_eq!(h.take().len(), 1);
}

#[test]
fn timeout_via_tick_discards_without_release() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 50.0, 50.0)]);
    assert_eq!(h.detector.next_deadline_ms(), Some(750));
    h.tick(800);
    assert_eq!(h.detector.next_deadline_ms(), None);
    h.up(900, &[1]);
    assert!(h.take().is_empty());
}

#[test]
fn two_finger_tap_accepts_staggered_touchdown() {
    let mut h = tap_detector(2);
    h.down(0, &[(1, 100.0, 100.0)]);
    h.down(40, &[(2, 200.0, 100.0)]);
    h.up(200, &[1]);
    h.up(240, &[2]);

    let events = h.take();
    assert_eq!(events.len(), 1);
    let anchor = anchor_of(&events[0]);
    assert_eq!(anchor.ids().map(|id| id.0).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn one_finger_detector_ignores_two_finger_press() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    h.up(100, &[1, 2]);
    assert!(h.take().is_empty());
}

#[test]
fn extra_finger_during_release_cancels_tap() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 100.0, 100.0)]);
    h.down(50, &[(2, 300.0, 300.0)]);
    h.up(100, &[1, 2]);
    assert!(h.take().is_empty());
}

#[test]
fn dropping_a_finger_before_target_count_invalidates_press() {
    let mut h = tap_detector(2);
    h.down(0, &[(1, 100.0, 100.0)]);
    h.up(20, &[1]);
    h.down(40, &[(2, 200.0, 100.0)]);
    h.up(80, &[2]);
    assert!(h.take().is_empty());
}

#[test]
fn consecutive_taps_each_emit() {
    let mut h = tap_detector(1);
    h.down(0, &[(1, 10.0, 10.0)]);
    h.up(80, &[1]);
    h.down(1_000, &[(2, 400.0, 400.0)]);
    h.up(1_090, &[2]);

    assert_eq!(h.take().len(), 2);
}

#[test]
fn attempt_stays_in_flight_until_resolved() {
    let mut h = tap_detector(2);
    h.down(0, &[(1, 10.0, 10.0)]);
    assert!(h.detector.tracker.in_flight());
    assert_eq!(h.detector.next_deadline_ms(), None);

    h.down(30, &[(2, 60.0, 10.0)]);
    assert!(h.detector.tracker.in_flight());
    assert_eq!(h.detector.next_deadline_ms(), Some(780));

    h.up(90, &[1, 2]);
    assert!(!h.detector.tracker.in_flight());
    assert_eq!(h.take().len(), 1);
}
