use std::rc::Rc;

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    config::GestureConfig,
    touch::{TouchRecord, TouchState},
};

use super::{
    tap::TapTracker,
    timer::{earliest, Deadline},
    GestureDetector, GestureEvent,
};

/// How long after discarding activity completions are still ignored.
const SETTLE_MS: u64 = 100;

#[derive(Clone, Debug)]
enum SingleTapHsmEvent {
    Touches { now_ms: u64, state: Rc<TouchState> },
    Deadline { now_ms: u64 },
}

#[derive(Default)]
struct DispatchContext {
    emitted: Option<TouchRecord>,
}

/// Tap that is confirmed only after the double-tap window passes with no
/// further touch activity.
///
/// Activity inside the window discards the pending tap. Taps completing
/// within `SETTLE_MS` of that activity are not candidates; later ones are.
pub struct SingleTapDetector {
    finger_count: usize,
    machine: statig::blocking::StateMachine<SingleTapHsm>,
}

impl SingleTapDetector {
    pub fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            finger_count,
            machine: SingleTapHsm::new(finger_count, config).state_machine(),
        }
    }

    fn dispatch(&mut self, event: SingleTapHsmEvent, out: &mut Vec<GestureEvent>) {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        if let Some(anchor) = context.emitted {
            out.push(GestureEvent::SingleTap {
                finger_count: self.finger_count,
                anchor,
            });
        }
    }
}

impl GestureDetector for SingleTapDetector {
    fn on_touches(&mut self, now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>) {
        self.dispatch(
            SingleTapHsmEvent::Touches {
                now_ms,
                state: Rc::clone(state),
            },
            out,
        );
    }

    fn on_deadline(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) {
        self.dispatch(SingleTapHsmEvent::Deadline { now_ms }, out);
    }

    fn next_deadline_ms(&self) -> Option<u64> {
        let hsm = self.machine.inner();
        earliest(hsm.taps.deadline_ms(), hsm.confirm.at_ms())
    }
}

struct SingleTapHsm {
    finger_count: usize,
    quiet_ms: u64,
    taps: TapTracker,
    pending: TouchRecord,
    confirm: Deadline,
}

impl SingleTapHsm {
    fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            finger_count,
            quiet_ms: config.double_tap_time_ms,
            taps: TapTracker::new(finger_count, config),
            pending: TouchRecord::new(),
            confirm: Deadline::default(),
        }
    }
}

#[state_machine(initial = "State::awaiting_tap()")]
impl SingleTapHsm {
    #[state]
    fn awaiting_tap(
        &mut self,
        context: &mut DispatchContext,
        event: &SingleTapHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            SingleTapHsmEvent::Touches { now_ms, state } => {
                let Some(anchor) = self.taps.observe(*now_ms, state) else {
                    return Handled;
                };
                self.pending = anchor;
                self.confirm.arm(now_ms.saturating_add(self.quiet_ms));
                Transition(State::confirming())
            }
            SingleTapHsmEvent::Deadline { now_ms } => {
                self.taps.expire(*now_ms);
                Handled
            }
        }
    }

    #[state]
    fn confirming(
        &mut self,
        context: &mut DispatchContext,
        event: &SingleTapHsmEvent,
    ) -> Outcome<State> {
        match event {
            SingleTapHsmEvent::Touches { now_ms, state } => {
                let _ = self.taps.observe(*now_ms, state);
                log::debug!(
                    "single_tap: discarded fingers={} t_ms={now_ms} reason=activity",
                    self.finger_count
                );
                self.confirm.arm(now_ms.saturating_add(SETTLE_MS));
                Transition(State::suppressed())
            }
            SingleTapHsmEvent::Deadline { now_ms } => {
                self.taps.expire(*now_ms);
                if !self.confirm.fire(*now_ms) {
                    return Handled;
                }
                log::debug!(
                    "single_tap: confirmed fingers={} t_ms={now_ms}",
                    self.finger_count
                );
                context.emitted = Some(core::mem::take(&mut self.pending));
                Transition(State::awaiting_tap())
            }
        }
    }

    /// Short settle period after a discarded tap. Taps completing here are
    /// dropped; the tracker keeps following contacts so a tap still in
    /// progress at the end of the period can complete as a new candidate.
    #[state]
    fn suppressed(
        &mut self,
        context: &mut DispatchContext,
        event: &SingleTapHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            SingleTapHsmEvent::Touches { now_ms, state } => {
                let _ = self.taps.observe(*now_ms, state);
                Handled
            }
            SingleTapHsmEvent::Deadline { now_ms } => {
                self.taps.expire(*now_ms);
                if self.confirm.fire(*now_ms) {
                    Transition(State::awaiting_tap())
                } else {
                    Handled
                }
            }
        }
    }
}
