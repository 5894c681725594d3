use std::rc::Rc;

use crate::{config::GestureConfig, touch::TouchState};

use super::{GestureDetector, GestureEvent, MovementStep, MovementTracker};

/// Live centroid of an N-finger movement.
pub struct PanDetector {
    movement: MovementTracker,
    sampled: bool,
}

impl PanDetector {
    pub fn new(finger_count: usize, config: &GestureConfig) -> Self {
        Self {
            movement: MovementTracker::new(finger_count, config),
            sampled: false,
        }
    }
}

impl GestureDetector for PanDetector {
    fn on_touches(&mut self, now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>) {
        let finger_count = self.movement.finger_count();
        for step in self.movement.observe(now_ms, state) {
            match step {
                MovementStep::Started { .. } | MovementStep::Preempted => self.sampled = false,
                MovementStep::Moved(touches) => {
                    self.sampled = true;
                    out.push(GestureEvent::PanSample {
                        finger_count,
                        centroid: touches.centroid(),
                    });
                }
                MovementStep::Ended => {
                    if std::mem::take(&mut self.sampled) {
                        out.push(GestureEvent::PanEnd { finger_count });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::Vector, gesture::test_support::Harness};

    #[test]
    fn pan_reports_centroid_per_move_and_end() {
        let mut h = Harness::new(PanDetector::new(2, &GestureConfig::default()));
        h.down(0, &[(1, 0.0, 0.0), (2, 100.0, 0.0)]);
        h.move_to(10, &[(1, 5.0, 0.0)]);
        h.move_to(20, &[(1, 40.0, 20.0), (2, 140.0, 20.0)]);
        h.move_to(30, &[(1, 60.0, 40.0), (2, 160.0, 40.0)]);
        h.up(40, &[1]);

        let events = h.take();
        assert_eq!(
            events,
            vec![
                GestureEvent::PanSample {
                    finger_count: 2,
                    centroid: Vector::new(90.0, 20.0),
                },
                GestureEvent::PanSample {
                    finger_count: 2,
                    centroid: Vector::new(110.0, 40.0),
                },
                GestureEvent::PanEnd { finger_count: 2 },
            ]
        );
    }

    #[test]
    fn still_press_produces_no_pan_events() {
        let mut h = Harness::new(PanDetector::new(1, &GestureConfig::default()));
        h.down(0, &[(1, 10.0, 10.0)]);
        h.move_to(50, &[(1, 12.0, 11.0)]);
        h.up(100, &[1]);
        assert!(h.take().is_empty());
    }

    #[test]
    fn pan_is_unbounded_in_time() {
        let mut h = Harness::new(PanDetector::new(1, &GestureConfig::default()));
        h.down(0, &[(1, 0.0, 0.0)]);
        h.move_to(5_000, &[(1, 50.0, 0.0)]);
        h.move_to(60_000, &[(1, 80.0, 0.0)]);
        assert_eq!(h.take().len(), 2);
    }
}
