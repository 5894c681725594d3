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

#[derive(Clone, Debug)]
enum DoubleTapHsmEvent {
    Touches { now_ms: u64, state: Rc<TouchState> },
    Deadline { now_ms: u64 },
}

#[derive(Default)]
struct DispatchContext {
    emitted: Option<TouchRecord>,
}

/// Pairs two tap attempts of the same finger count.
///
/// When the first attempt completes, a fresh attempt is started and every
/// completion it yields inside the window is counted. At window close the
/// first anchor is emitted iff exactly one second tap landed.
pub struct DoubleTapDetector {
    finger_count: usize,
    machine: statig::blocking::StateMachine<DoubleTapHsm>,
}

impl DoubleTapDetector {
    pub fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            finger_count,
            machine: DoubleTapHsm::new(finger_count, config).state_machine(),
        }
    }

    fn dispatch(&mut self, event: DoubleTapHsmEvent, out: &mut Vec<GestureEvent>) {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        if let Some(anchor) = context.emitted {
            out.push(GestureEvent::DoubleTap {
                finger_count: self.finger_count,
                anchor,
            });
        }
    }
}

impl GestureDetector for DoubleTapDetector {
    fn on_touches(&mut self, now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>) {
        self.dispatch(
            DoubleTapHsmEvent::Touches {
                now_ms,
                state: Rc::clone(state),
            },
            out,
        );
    }

    fn on_deadline(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) {
        self.dispatch(DoubleTapHsmEvent::Deadline { now_ms }, out);
    }

    fn next_deadline_ms(&self) -> Option<u64> {
        let hsm = self.machine.inner();
        let second = hsm.second.as_ref().and_then(TapTracker::deadline_ms);
        earliest(
            earliest(hsm.first.deadline_ms(), second),
            hsm.window.at_ms(),
        )
    }
}

struct DoubleTapHsm {
    finger_count: usize,
    config: GestureConfig,
    /// Keeps running through the window; its completions are ignored there.
    first: TapTracker,
    second: Option<TapTracker>,
    first_anchor: TouchRecord,
    second_taps: usize,
    window: Deadline,
}

impl DoubleTapHsm {
    fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            finger_count,
            config: *config,
            first: TapTracker::new(finger_count, config),
            second: None,
            first_anchor: TouchRecord::new(),
            second_taps: 0,
            window: Deadline::default(),
        }
    }

    fn open_window(&mut self, now_ms: u64, anchor: TouchRecord) {
        self.first_anchor = anchor;
        self.second = Some(TapTracker::new(self.finger_count, &self.config));
        self.second_taps = 0;
        self.window
            .arm(now_ms.saturating_add(self.config.double_tap_time_ms));
        log::debug!(
            "double_tap: window open fingers={} t_ms={now_ms}",
            self.finger_count
        );
    }

    fn expire_attempts(&mut self, now_ms: u64) {
        self.first.expire(now_ms);
        if let Some(second) = self.second.as_mut() {
            second.expire(now_ms);
        }
    }
}

#[state_machine(initial = "State::awaiting_first()")]
impl DoubleTapHsm {
    #[state]
    fn awaiting_first(
        &mut self,
        context: &mut DispatchContext,
        event: &DoubleTapHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            DoubleTapHsmEvent::Touches { now_ms, state } => {
                match self.first.observe(*now_ms, state) {
                    Some(anchor) => {
                        self.open_window(*now_ms, anchor);
                        Transition(State::collecting_second())
                    }
                    None => Handled,
                }
            }
            DoubleTapHsmEvent::Deadline { now_ms } => {
                self.first.expire(*now_ms);
                Handled
            }
        }
    }

    #[state]
    fn collecting_second(
        &mut self,
        context: &mut DispatchContext,
        event: &DoubleTapHsmEvent,
    ) -> Outcome<State> {
        match event {
            DoubleTapHsmEvent::Touches { now_ms, state } => {
                let _ = self.first.observe(*now_ms, state);
                if let Some(second) = self.second.as_mut() {
                    if second.observe(*now_ms, state).is_some() {
                        self.second_taps += 1;
                    }
                }
                Handled
            }
            DoubleTapHsmEvent::Deadline { now_ms } => {
                self.expire_attempts(*now_ms);
                if !self.window.fire(*now_ms) {
                    return Handled;
                }

                self.second = None;
                if self.second_taps == 1 {
                    log::debug!(
                        "double_tap: detected fingers={} t_ms={now_ms}",
                        self.finger_count
                    );
                    context.emitted = Some(core::mem::take(&mut self.first_anchor));
                } else {
                    log::debug!(
                        "double_tap: discarded fingers={} second_taps={}",
                        self.finger_count,
                        self.second_taps
                    );
                }
                Transition(State::awaiting_first())
            }
        }
    }
}
