use std::rc::Rc;

use crate::touch::{TouchRecord, TouchState};

use super::{GestureDetector, GestureEvent};

/// Watches consecutive records for the "no fingers" -> "some fingers" edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct PressEdge {
    prev_count: usize,
}

impl PressEdge {
    pub fn observe(&mut self, touches: &TouchRecord) -> bool {
        let pressed = self.prev_count == 0 && !touches.is_empty();
        self.prev_count = touches.len();
        pressed
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PressStep {
    Pending,
    /// Base reached the target finger count while every finger stayed put.
    Accepted(TouchRecord),
    /// A finger left or drifted past tolerance; the press yields nothing.
    Invalid,
}

/// One press being evaluated from its seed record onwards.
#[derive(Clone, Debug)]
pub struct PressCandidate {
    base: TouchRecord,
    target: usize,
    tolerance_sq: f32,
}

impl PressCandidate {
    pub fn seed(seed: &TouchRecord, target: usize, tolerance_sq: f32) -> Self {
        Self {
            base: seed.clone(),
            target,
            tolerance_sq,
        }
    }

    /// Folds the next record into the running base. The seed record itself
    /// must be the first record advanced.
    pub fn advance(&mut self, current: &TouchRecord) -> PressStep {
        let Some(base) = self.base.merge_base(current) else {
            return PressStep::Invalid;
        };
        if !base.within_tolerance_of(current, self.tolerance_sq) {
            return PressStep::Invalid;
        }
        self.base = base;
        if self.base.len() == self.target {
            PressStep::Accepted(self.base.clone())
        } else {
            PressStep::Pending
        }
    }
}

/// Standalone press/anchor detector. Every press edge is evaluated as its own
/// candidate; each candidate is accepted at most once.
pub struct PressDetector {
    finger_count: usize,
    tolerance_sq: f32,
    edge: PressEdge,
    candidates: Vec<PressCandidate>,
}

impl PressDetector {
    pub fn new(finger_count: usize, tolerance_sq: f32) -> Self {
        Self {
            finger_count,
            tolerance_sq,
            edge: PressEdge::default(),
            candidates: Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.candidates.len()
    }
}

impl GestureDetector for PressDetector {
    fn on_touches(&mut self, _now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>) {
        let touches = &state.touches;
        if self.edge.observe(touches) {
            self.candidates.push(PressCandidate::seed(
                touches,
                self.finger_count,
                self.tolerance_sq,
            ));
        }

        let finger_count = self.finger_count;
        self.candidates.retain_mut(|candidate| match candidate.advance(touches) {
            PressStep::Pending => true,
            PressStep::Accepted(anchor) => {
                log::debug!("press: accepted fingers={finger_count}");
                out.push(GestureEvent::Press {
                    finger_count,
                    anchor,
                });
                false
            }
            PressStep::Invalid => {
                log::trace!("press: discarded fingers={finger_count}");
                false
            }
        });
    }
}
