use std::rc::Rc;

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    config::GestureConfig,
    touch::{TouchRecord, TouchState},
};

use super::press::{PressCandidate, PressEdge, PressStep};

/// Output of [`MovementTracker`] for one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum MovementStep {
    /// A press reached the target count; the continuation starts after it.
    Started { anchor: TouchRecord, t_ms: u64 },
    /// First and later records once any finger left the tolerance radius.
    Moved(TouchRecord),
    /// Finger count changed; the continuation is over.
    Ended,
    /// A newer press replaced the session. No further steps belong to it.
    Preempted,
}

#[derive(Clone, Debug)]
enum MovementHsmEvent {
    Touches {
        now_ms: u64,
        state: Rc<TouchState>,
        pressed: bool,
    },
}

#[derive(Default)]
struct DispatchContext {
    steps: Vec<MovementStep>,
}

/// Shared press-to-move primitive for pan, swipe and pinch.
///
/// Latest session wins: a new press while a session is pending or tracking
/// replaces it.
pub struct MovementTracker {
    edge: PressEdge,
    machine: statig::blocking::StateMachine<MovementHsm>,
}

impl MovementTracker {
    pub fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            edge: PressEdge::default(),
            machine: MovementHsm::new(finger_count, config).state_machine(),
        }
    }

    pub fn observe(&mut self, now_ms: u64, state: &Rc<TouchState>) -> Vec<MovementStep> {
        let pressed = self.edge.observe(&state.touches);
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(
            &MovementHsmEvent::Touches {
                now_ms,
                state: Rc::clone(state),
                pressed,
            },
            &mut context,
        );
        context.steps
    }

    pub fn finger_count(&self) -> usize {
        self.machine.inner().finger_count
    }
}

struct MovementHsm {
    finger_count: usize,
    tolerance_sq: f32,
    candidate: Option<PressCandidate>,
    anchor: TouchRecord,
    moving: bool,
}

impl MovementHsm {
    fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            finger_count,
            tolerance_sq: config.tap_tolerance_sq(),
            candidate: None,
            anchor: TouchRecord::new(),
            moving: false,
        }
    }

    fn begin_press(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        touches: &TouchRecord,
    ) -> Outcome<State> {
        let mut candidate = PressCandidate::seed(touches, self.finger_count, self.tolerance_sq);
        let step = candidate.advance(touches);
        self.candidate = Some(candidate);
        self.resolve_press(context, now_ms, step)
            .unwrap_or(Transition(State::anchor_pending()))
    }

    fn resolve_press(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        step: PressStep,
    ) -> Option<Outcome<State>> {
        match step {
            PressStep::Pending => None,
            PressStep::Accepted(anchor) => {
                self.candidate = None;
                self.moving = false;
                self.anchor = anchor.clone();
                log::debug!(
                    "movement: session started fingers={} t_ms={now_ms}",
                    self.finger_count
                );
                context.steps.push(MovementStep::Started {
                    anchor,
                    t_ms: now_ms,
                });
                Some(Transition(State::tracking()))
            }
            PressStep::Invalid => {
                self.candidate = None;
                Some(Transition(State::idle()))
            }
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl MovementHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &MovementHsmEvent) -> Outcome<State> {
        match event {
            MovementHsmEvent::Touches {
                now_ms,
                state,
                pressed: true,
            } => self.begin_press(context, *now_ms, &state.touches),
            MovementHsmEvent::Touches { .. } => Handled,
        }
    }

    #[state(superstate = "session")]
    fn anchor_pending(
        &mut self,
        context: &mut DispatchContext,
        event: &MovementHsmEvent,
    ) -> Outcome<State> {
        match event {
            MovementHsmEvent::Touches { pressed: true, .. } => Super,
            MovementHsmEvent::Touches { now_ms, state, .. } => {
                let Some(candidate) = self.candidate.as_mut() else {
                    return Transition(State::idle());
                };
                let step = candidate.advance(&state.touches);
                self.resolve_press(context, *now_ms, step)
                    .unwrap_or(Handled)
            }
        }
    }

    #[state(superstate = "session")]
    fn tracking(
        &mut self,
        context: &mut DispatchContext,
        event: &MovementHsmEvent,
    ) -> Outcome<State> {
        match event {
            MovementHsmEvent::Touches { pressed: true, .. } => {
                context.steps.push(MovementStep::Preempted);
                Super
            }
            MovementHsmEvent::Touches { now_ms, state, .. } => {
                let touches = &state.touches;
                if touches.len() != self.finger_count {
                    log::debug!(
                        "movement: session ended fingers={} t_ms={now_ms}",
                        self.finger_count
                    );
                    context.steps.push(MovementStep::Ended);
                    return Transition(State::idle());
                }
                if !self.moving && touches.within_tolerance_of(&self.anchor, self.tolerance_sq) {
                    return Handled;
                }
                self.moving = true;
                context.steps.push(MovementStep::Moved(touches.clone()));
                Handled
            }
        }
    }

    #[superstate]
    fn session(
        &mut self,
        context: &mut DispatchContext,
        event: &MovementHsmEvent,
    ) -> Outcome<State> {
        match event {
            MovementHsmEvent::Touches {
                now_ms,
                state,
                pressed: true,
            } => {
                log::debug!(
                    "movement: session preempted fingers={} t_ms={now_ms}",
                    self.finger_count
                );
                self.begin_press(context, *now_ms, &state.touches)
            }
            MovementHsmEvent::Touches { .. } => Handled,
        }
    }
}
