//! Gesture detectors layered on the shared touch-state stream.
//!
//! Every detector is an explicit state machine fed with the same
//! `Rc<TouchState>` snapshots in input order, plus deadline callbacks for the
//! windowed ones. Losing a race or an invalidated session simply produces no
//! event.

mod double_tap;
mod movement;
mod pan;
mod pinch;
mod press;
mod single_tap;
mod swipe;
mod tap;
mod timer;

#[cfg(test)]
pub(crate) mod test_support;

use std::rc::Rc;

use crate::{geometry::Vector, touch::TouchRecord, touch::TouchState};

pub use double_tap::DoubleTapDetector;
pub use movement::{MovementStep, MovementTracker};
pub use pan::PanDetector;
pub use pinch::PinchDetector;
pub use press::{PressCandidate, PressDetector, PressEdge, PressStep};
pub use single_tap::SingleTapDetector;
pub use swipe::SwipeDetector;
pub use tap::{TapDetector, TapTracker};
pub use timer::Deadline;

/// Which stream a consumer subscribes to. The payload is the finger count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Press(usize),
    Tap(usize),
    DoubleTap(usize),
    SingleTap(usize),
    Swipe(usize),
    Pan(usize),
    /// Always two fingers.
    Pinch,
}

impl GestureKind {
    pub fn finger_count(self) -> usize {
        match self {
            GestureKind::Press(n)
            | GestureKind::Tap(n)
            | GestureKind::DoubleTap(n)
            | GestureKind::SingleTap(n)
            | GestureKind::Swipe(n)
            | GestureKind::Pan(n) => n,
            GestureKind::Pinch => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// Anchor confirmed with the target finger count.
    Press {
        finger_count: usize,
        anchor: TouchRecord,
    },
    Tap {
        finger_count: usize,
        anchor: TouchRecord,
    },
    DoubleTap {
        finger_count: usize,
        anchor: TouchRecord,
    },
    /// A tap that was not followed by any touch activity inside the
    /// double-tap window.
    SingleTap {
        finger_count: usize,
        anchor: TouchRecord,
    },
    Swipe {
        finger_count: usize,
        final_snapshot: TouchRecord,
    },
    PanSample {
        finger_count: usize,
        centroid: Vector,
    },
    PanEnd {
        finger_count: usize,
    },
    PinchSample {
        center: Vector,
        scale: f32,
    },
    PinchEnd,
}

impl GestureEvent {
    pub fn label(&self) -> &'static str {
        match self {
            GestureEvent::Press { .. } => "press",
            GestureEvent::Tap { .. } => "tap",
            GestureEvent::DoubleTap { .. } => "double_tap",
            GestureEvent::SingleTap { .. } => "single_tap",
            GestureEvent::Swipe { .. } => "swipe",
            GestureEvent::PanSample { .. } => "pan",
            GestureEvent::PanEnd { .. } => "pan_end",
            GestureEvent::PinchSample { .. } => "pinch",
            GestureEvent::PinchEnd => "pinch_end",
        }
    }
}

/// One subscriber on the shared touch-state broadcast.
///
/// `on_touches` runs once per aggregated snapshot, in input order. The surface
/// calls `on_deadline` with the due time whenever `next_deadline_ms` has been
/// reached; implementations must disarm every deadline `<= now_ms` they handle.
pub trait GestureDetector {
    fn on_touches(&mut self, now_ms: u64, state: &Rc<TouchState>, out: &mut Vec<GestureEvent>);

    fn on_deadline(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) {
        let _ = (now_ms, out);
    }

    fn next_deadline_ms(&self) -> Option<u64> {
        None
    }
}
