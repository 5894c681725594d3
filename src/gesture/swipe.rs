use std::rc::Rc;

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    config::GestureConfig,
    geometry::Vector,
    touch::{TouchRecord, TouchState},
};

use super::{timer::Deadline, GestureDetector, GestureEvent, MovementStep, MovementTracker};

#[derive(Clone, Debug)]
enum SwipeHsmEvent {
    Step(MovementStep),
    Deadline { now_ms: u64 },
}

#[derive(Default)]
struct DispatchContext {
    emitted: Option<TouchRecord>,
}

/// Quick N-finger flick: the movement must end within `swipe_time_ms` of
/// the press and its last centroid must be more than `swipe_min_travel_px`
/// away from the anchor centroid.
pub struct SwipeDetector {
    movement: MovementTracker,
    machine: statig::blocking::StateMachine<SwipeHsm>,
}

impl SwipeDetector {
    pub fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            movement: MovementTracker::new(finger_count, config),
            machine: SwipeHsm::new(config).state_machine(),
        }
    }

    fn dispatch(&mut self, event: SwipeHsmEvent, out: &mut Vec<GestureEvent>) {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        if let Some(final_snapshot) = context.emitted {
            out.push(GestureEvent::Swipe {
                finger_count: self.movement.finger_count(),
                final_snapshot,
            });
        }
    }
}

impl GestureDetector for SwipeDetector {
    fn on_touches(&mut self, now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>) {
        for step in self.movement.observe(now_ms, state) {
            self.dispatch(SwipeHsmEvent::Step(step), out);
        }
    }

    fn on_deadline(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) {
        self.dispatch(SwipeHsmEvent::Deadline { now_ms }, out);
    }

    fn next_deadline_ms(&self) -> Option<u64> {
        self.machine.inner().cutoff.at_ms()
    }
}

struct SwipeHsm {
    swipe_time_ms: u64,
    min_travel_sq: f32,
    origin: Vector,
    last: Option<TouchRecord>,
    cutoff: Deadline,
}

impl SwipeHsm {
    fn new(config: &GestureConfig) -> Self {
        Self {
            swipe_time_ms: config.swipe_time_ms,
            min_travel_sq: config.swipe_min_travel_sq(),
            origin: Vector::ZERO,
            last: None,
            cutoff: Deadline::default(),
        }
    }

    fn begin(&mut self, anchor: &TouchRecord, t_ms: u64) -> Outcome<State> {
        self.origin = anchor.centroid();
        self.last = None;
        self.cutoff.arm(t_ms.saturating_add(self.swipe_time_ms));
        Transition(State::observing())
    }
}

#[state_machine(initial = "State::idle()")]
impl SwipeHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &SwipeHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            SwipeHsmEvent::Step(MovementStep::Started { anchor, t_ms }) => {
                self.begin(anchor, *t_ms)
            }
            SwipeHsmEvent::Step(_) | SwipeHsmEvent::Deadline { .. } => Handled,
        }
    }

    #[state]
    fn observing(
        &mut self,
        context: &mut DispatchContext,
        event: &SwipeHsmEvent,
    ) -> Outcome<State> {
        match event {
            SwipeHsmEvent::Step(MovementStep::Started { anchor, t_ms }) => {
                self.begin(anchor, *t_ms)
            }
            SwipeHsmEvent::Step(MovementStep::Moved(touches)) => {
                self.last = Some(touches.clone());
                Handled
            }
            SwipeHsmEvent::Step(MovementStep::Preempted) => {
                self.cutoff.disarm();
                self.last = None;
                Transition(State::idle())
            }
            SwipeHsmEvent::Step(MovementStep::Ended) => {
                self.cutoff.disarm();
                let Some(last) = self.last.take() else {
                    return Transition(State::idle());
                };
                let travel_sq = last.centroid().distance_sq(self.origin);
                if travel_sq > self.min_travel_sq {
                    log::debug!("swipe: detected fingers={} travel_sq={travel_sq}", last.len());
                    context.emitted = Some(last);
                } else {
                    log::debug!("swipe: discarded travel_sq={travel_sq} reason=short");
                }
                Transition(State::idle())
            }
            SwipeHsmEvent::Deadline { now_ms } => {
                if !self.cutoff.fire(*now_ms) {
                    return Handled;
                }
                log::debug!("swipe: discarded t_ms={now_ms} reason=timeout");
                self.last = None;
                Transition(State::idle())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gesture::test_support::Harness, touch::TouchId};

    fn swipe(finger_count: usize) -> Harness<SwipeDetector> {
        Harness::new(SwipeDetector::new(finger_count, &GestureConfig::default()))
    }

    #[test]
    fn long_fast_movement_is_a_swipe() {
        let mut h = swipe(1);
        h.down(0, &[(1, 0.0, 0.0)]);
        h.move_to(100, &[(1, 120.0, 0.0)]);
        h.move_to(200, &[(1, 250.0, 0.0)]);
        h.up(300, &[1]);

        let events = h.take();
        assert_eq!(events.len(), 1);
        match &events[0] {
            GestureEvent::Swipe {
                finger_count,
                final_snapshot,
            } => {
                assert_eq!(*finger_count, 1);
                assert_eq!(
                    final_snapshot.get(TouchId(1)).map(|p| p.position),
                    Some(Vector::new(250.0, 0.0))
                );
            }
            other => panic!("expected swipe, got {other:?}"),
        }
    }

    #[test]
    fn short_travel_is_not_a_swipe() {
        let mut h = swipe(1);
        h.down(0, &[(1, 0.0, 0.0)]);
        h.move_to(100, &[(1, 199.0, 0.0)]);
        h.up(200, &[1]);
        assert!(h.take().is_empty());
    }

    #[test]
    fn travel_exactly_at_minimum_is_not_a_swipe() {
        let mut h = swipe(1);
        h.down(0, &[(1, 0.0, 0.0)]);
        h.move_to(100, &[(1, 200.0, 0.0)]);
        h.up(200, &[1]);
        assert!(h.take().is_empty());
    }

    #[test]
    fn slow_movement_is_not_a_swipe() {
        let mut h = swipe(1);
        h.down(0, &[(1, 0.0, 0.0)]);
        h.move_to(300, &[(1, 300.0, 0.0)]);
        h.up(600, &[1]);
        assert!(h.take().is_empty());
    }

    #[test]
    fn release_at_cutoff_still_counts() {
        let mut h = swipe(1);
        h.down(0, &[(1, 0.0, 0.0)]);
        h.move_to(250, &[(1, 300.0, 0.0)]);
        h.up(500, &[1]);
        assert_eq!(h.take().len(), 1);
    }

    #[test]
    fn two_finger_swipe_uses_centroid_travel() {
        let mut h = swipe(2);
        h.down(0, &[(1, 0.0, 0.0), (2, 50.0, 0.0)]);
        h.move_to(100, &[(1, 0.0, 260.0), (2, 50.0, 260.0)]);
        h.up(150, &[1, 2]);
        assert_eq!(h.take().len(), 1);
    }

    #[test]
    fn press_without_movement_is_not_a_swipe() {
        let mut h = swipe(1);
        h.down(0, &[(1, 0.0, 0.0)]);
        h.up(100, &[1]);
        assert!(h.take().is_empty());
        assert_eq!(h.detector.next_deadline_ms(), None);
    }
}
