use crate::geometry::{centroid, Vector};

use super::{TouchId, TouchPoint};

/// Finger id -> position/timestamp. Ids are unique; iteration follows
/// insertion order so display layers can keep stable colours per finger.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchRecord {
    entries: Vec<(TouchId, TouchPoint)>,
}

impl TouchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TouchId) -> Option<&TouchPoint> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, point)| point)
    }

    pub fn contains(&self, id: TouchId) -> bool {
        self.get(id).is_some()
    }

    /// Inserts or overwrites; an overwritten finger keeps its slot.
    pub fn insert(&mut self, id: TouchId, point: TouchPoint) {
        match self.entries.iter_mut().find(|(entry_id, _)| *entry_id == id) {
            Some((_, slot)) => *slot = point,
            None => self.entries.push((id, point)),
        }
    }

    pub fn remove(&mut self, id: TouchId) -> Option<TouchPoint> {
        let idx = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TouchId, &TouchPoint)> + '_ {
        self.entries.iter().map(|(id, point)| (*id, point))
    }

    pub fn ids(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn positions(&self) -> impl Iterator<Item = Vector> + '_ {
        self.entries.iter().map(|(_, point)| point.position)
    }

    /// # Panics
    ///
    /// Panics on an empty record.
    pub fn centroid(&self) -> Vector {
        centroid(self.positions())
    }

    /// True when every finger in `self` is also in `reference` and within
    /// `tolerance_sq` (squared px) of its reference position.
    pub fn within_tolerance_of(&self, reference: &TouchRecord, tolerance_sq: f32) -> bool {
        self.iter().all(|(id, point)| {
            reference
                .get(id)
                .is_some_and(|anchor| anchor.position.distance_sq(point.position) < tolerance_sq)
        })
    }

    /// Folds `current` into a running press base.
    ///
    /// Returns `None` when a finger of `self` has left `current`. Otherwise the
    /// result holds every finger of `current`; fingers already in the base keep
    /// their base position, newcomers take their current one.
    pub fn merge_base(&self, current: &TouchRecord) -> Option<TouchRecord> {
        if self.ids().any(|id| !current.contains(id)) {
            return None;
        }
        let mut next = current.clone();
        for (id, point) in self.iter() {
            next.insert(id, *point);
        }
        Some(next)
    }
}

impl FromIterator<(TouchId, TouchPoint)> for TouchRecord {
    fn from_iter<I: IntoIterator<Item = (TouchId, TouchPoint)>>(iter: I) -> Self {
        let mut record = TouchRecord::new();
        for (id, point) in iter {
            record.insert(id, point);
        }
        record
    }
}
