/// One-shot deadline slot for a windowed detector.
///
/// The detector arms it when a window opens and disarms it when the
/// completion condition wins; `fire` disarms and reports whether the deadline
/// had been reached, so a late timer after resolution is a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline {
    at_ms: Option<u64>,
}

impl Deadline {
    pub fn arm(&mut self, at_ms: u64) {
        self.at_ms = Some(at_ms);
    }

    pub fn disarm(&mut self) {
        self.at_ms = None;
    }

    pub fn at_ms(&self) -> Option<u64> {
        self.at_ms
    }

    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.at_ms {
            Some(at_ms) if at_ms <= now_ms => {
                self.at_ms = None;
                true
            }
            _ => false,
        }
    }
}

pub(crate) fn earliest(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_only_once_when_due() {
        let mut deadline = Deadline::default();
        assert!(!deadline.fire(10));

        deadline.arm(100);
        assert!(!deadline.fire(99));
        assert_eq!(deadline.at_ms(), Some(100));
        assert!(deadline.fire(100));
        assert!(!deadline.fire(200));
        assert_eq!(deadline.at_ms(), None);
    }

    #[test]
    fn disarm_makes_late_fire_a_no_op() {
        let mut deadline = Deadline::default();
        deadline.arm(50);
        deadline.disarm();
        assert!(!deadline.fire(60));
    }

    #[test]
    fn earliest_prefers_the_smaller_armed_value() {
        assert_eq!(earliest(Some(5), Some(3)), Some(3));
        assert_eq!(earliest(None, Some(3)), Some(3));
        assert_eq!(earliest(Some(5), None), Some(5));
        assert_eq!(earliest(None, None), None);
    }
}
