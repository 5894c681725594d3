use std::rc::Rc;

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    config::GestureConfig,
    touch::{TouchRecord, TouchState},
};

use super::{
    press::{PressCandidate, PressEdge, PressStep},
    timer::Deadline,
    GestureDetector, GestureEvent,
};

#[derive(Clone, Debug)]
enum TapHsmEvent {
    Touches {
        now_ms: u64,
        state: Rc<TouchState>,
        pressed: bool,
    },
    Deadline {
        now_ms: u64,
    },
}

#[derive(Default)]
struct DispatchContext {
    completed: Option<TouchRecord>,
}

/// One tap attempt at a time: press confirmation, then release within the
/// tap window. New presses are ignored while an attempt is in flight.
///
/// Shared by the tap, double-tap and single-tap detectors.
pub struct TapTracker {
    edge: PressEdge,
    machine: statig::blocking::StateMachine<TapHsm>,
}

impl TapTracker {
    pub fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            edge: PressEdge::default(),
            machine: TapHsm::new(finger_count, config).state_machine(),
        }
    }

    /// Returns the anchor of an attempt that completed on this snapshot.
    pub fn observe(&mut self, now_ms: u64, state: &Rc<TouchState>) -> Option<TouchRecord> {
        let pressed = self.edge.observe(&state.touches);
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(
            &TapHsmEvent::Touches {
                now_ms,
                state: Rc::clone(state),
                pressed,
            },
            &mut context,
        );
        context.completed
    }

    pub fn expire(&mut self, now_ms: u64) {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&TapHsmEvent::Deadline { now_ms }, &mut context);
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.machine.inner().deadline.at_ms()
    }

    pub fn in_flight(&self) -> bool {
        self.machine.inner().in_flight
    }
}

struct TapHsm {
    finger_count: usize,
    tolerance_sq: f32,
    tap_time_ms: u64,
    candidate: Option<PressCandidate>,
    anchor: TouchRecord,
    prev_count: usize,
    deadline: Deadline,
    in_flight: bool,
}

impl TapHsm {
    fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            finger_count,
            tolerance_sq: config.tap_tolerance_sq(),
            tap_time_ms: config.tap_time_ms,
            candidate: None,
            anchor: TouchRecord::new(),
            prev_count: 0,
            deadline: Deadline::default(),
            in_flight: false,
        }
    }

    fn begin_press(&mut self, now_ms: u64, touches: &TouchRecord) -> Outcome<State> {
        let mut candidate = PressCandidate::seed(touches, self.finger_count, self.tolerance_sq);
        let step = candidate.advance(touches);
        self.candidate = Some(candidate);
        self.in_flight = true;
        match self.resolve_press(now_ms, step) {
            Some(next) => next,
            None => Transition(State::anchor_pending()),
        }
    }

    /// `None` while the press is still pending.
    fn resolve_press(&mut self, now_ms: u64, step: PressStep) -> Option<Outcome<State>> {
        match step {
            PressStep::Pending => None,
            PressStep::Accepted(anchor) => {
                self.candidate = None;
                self.prev_count = anchor.len();
                self.anchor = anchor;
                self.deadline.arm(now_ms.saturating_add(self.tap_time_ms));
                log::debug!(
                    "tap: accepted fingers={} t_ms={now_ms}",
                    self.finger_count
                );
                Some(Transition(State::releasing()))
            }
            PressStep::Invalid => {
                log::trace!("tap: press discarded fingers={}", self.finger_count);
                Some(self.discard())
            }
        }
    }

    fn discard(&mut self) -> Outcome<State> {
        self.candidate = None;
        self.deadline.disarm();
        self.in_flight = false;
        Transition(State::idle())
    }
}

#[state_machine(initial = "State::idle()")]
impl TapHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &TapHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            TapHsmEvent::Touches {
                now_ms,
                state,
                pressed: true,
            } => self.begin_press(*now_ms, &state.touches),
            _ => Handled,
        }
    }

    #[state]
    fn anchor_pending(
        &mut self,
        context: &mut DispatchContext,
        event: &TapHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            TapHsmEvent::Touches { now_ms, state, .. } => {
                let Some(candidate) = self.candidate.as_mut() else {
                    return self.discard();
                };
                let step = candidate.advance(&state.touches);
                self.resolve_press(*now_ms, step).unwrap_or(Handled)
            }
            TapHsmEvent::Deadline { .. } => Handled,
        }
    }

    #[state]
    fn releasing(&mut self, context: &mut DispatchContext, event: &TapHsmEvent) -> Outcome<State> {
        match event {
            TapHsmEvent::Touches { now_ms, state, .. } => {
                let touches = &state.touches;
                if touches.len() > self.prev_count
                    || !touches.within_tolerance_of(&self.anchor, self.tolerance_sq)
                {
                    log::debug!(
                        "tap: discarded fingers={} t_ms={now_ms} reason=moved_or_added",
                        self.finger_count
                    );
                    return self.discard();
                }
                self.prev_count = touches.len();
                if !touches.is_empty() {
                    return Handled;
                }

                log::debug!(
                    "tap: completed fingers={} t_ms={now_ms}",
                    self.finger_count
                );
                context.completed = Some(self.anchor.clone());
                self.discard()
            }
            TapHsmEvent::Deadline { now_ms } => {
                if !self.deadline.fire(*now_ms) {
                    return Handled;
                }
                log::debug!(
                    "tap: discarded fingers={} t_ms={now_ms} reason=timeout",
                    self.finger_count
                );
                self.discard()
            }
        }
    }
}

/// Emits [`GestureEvent::Tap`] for every completed attempt.
pub struct TapDetector {
    finger_count: usize,
    tracker: TapTracker,
}

impl TapDetector {
    pub fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            finger_count,
            tracker: TapTracker::new(finger_count, config),
        }
    }
}

impl GestureDetector for TapDetector {
    fn on_touches(&mut self, now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>) {
        if let Some(anchor) = self.tracker.observe(now_ms, state) {
            out.push(GestureEvent::Tap {
                finger_count: self.finger_count,
                anchor,
            });
        }
    }

    fn on_deadline(&mut self, now_ms: u64, _out: &mut Vec<GestureEvent>) {
        self.tracker.expire(now_ms);
    }

    fn next_deadline_ms(&self) -> Option<u64> {
        self.tracker.deadline_ms()
    }
}

#[cfg(test)]
mod tests;
