use std::rc::Rc;

use crate::{
    config::GestureConfig,
    touch::{TouchRecord, TouchState},
};

use super::{GestureDetector, GestureEvent, MovementStep, MovementTracker};

const PINCH_FINGERS: usize = 2;

/// Two-finger scale relative to the finger spread at press time.
pub struct PinchDetector {
    movement: MovementTracker,
    /// Squared spread of the anchor; `None` outside a usable session.
    baseline_sq: Option<f32>,
    sampled: bool,
}

impl PinchDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            movement: MovementTracker::new(PINCH_FINGERS, config),
            baseline_sq: None,
            sampled: false,
        }
    }
}

fn spread_sq(touches: &TouchRecord) -> Option<f32> {
    let mut positions = touches.positions();
    match (positions.next(), positions.next()) {
        (Some(a), Some(b)) => Some(a.distance_sq(b)),
        _ => None,
    }
}

impl GestureDetector for PinchDetector {
    fn on_touches(&mut self, now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>) {
        for step in self.movement.observe(now_ms, state) {
            match step {
                MovementStep::Started { anchor, .. } => {
                    self.sampled = false;
                    self.baseline_sq = spread_sq(&anchor).filter(|spread| *spread > 0.0);
                    if self.baseline_sq.is_none() {
                        log::debug!("pinch: session skipped t_ms={now_ms} reason=zero_spread");
                    }
                }
                MovementStep::Moved(touches) => {
                    let (Some(baseline_sq), Some(current_sq)) =
                        (self.baseline_sq, spread_sq(&touches))
                    else {
                        continue;
                    };
                    self.sampled = true;
                    out.push(GestureEvent::PinchSample {
                        center: touches.centroid(),
                        scale: (current_sq / baseline_sq).sqrt(),
                    });
                }
                MovementStep::Ended => {
                    self.baseline_sq = None;
                    if std::mem::take(&mut self.sampled) {
                        out.push(GestureEvent::PinchEnd);
                    }
                }
                MovementStep::Preempted => {
                    self.baseline_sq = None;
                    self.sampled = false;
                }
            }
        }
    }
}
