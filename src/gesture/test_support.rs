use std::rc::Rc;

use crate::touch::{Contact, ContactEventKind, RawContactBatch, TouchState, TouchStateAggregator};

use super::{GestureDetector, GestureEvent};

/// Drives one detector with aggregated states built from finger scripts,
/// firing deadlines the same way the surface does.
pub(crate) struct Harness<D> {
    pub(crate) detector: D,
    aggregator: TouchStateAggregator,
    fingers: Vec<Contact>,
    events: Vec<GestureEvent>,
}

impl<D: GestureDetector> Harness<D> {
    pub(crate) fn new(detector: D) -> Self {
        Self {
            detector,
            aggregator: TouchStateAggregator::new(),
            fingers: Vec::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn down(&mut self, t_ms: u64, fingers: &[(u64, f32, f32)]) -> &mut Self {
        let mut changed = Vec::new();
        for &(id, x, y) in fingers {
            let contact = Contact::new(id, x, y, t_ms);
            self.fingers.push(contact);
            changed.push(contact);
        }
        self.dispatch(ContactEventKind::Start, t_ms, changed)
    }

    pub(crate) fn move_to(&mut self, t_ms: u64, fingers: &[(u64, f32, f32)]) -> &mut Self {
        let mut changed = Vec::new();
        for &(id, x, y) in fingers {
            let contact = Contact::new(id, x, y, t_ms);
            if let Some(slot) = self.fingers.iter_mut().find(|c| c.id == contact.id) {
                *slot = contact;
            }
            changed.push(contact);
        }
        self.dispatch(ContactEventKind::Move, t_ms, changed)
    }

    pub(crate) fn up(&mut self, t_ms: u64, ids: &[u64]) -> &mut Self {
        let mut changed = Vec::new();
        self.fingers.retain(|contact| {
            if ids.contains(&contact.id.0) {
                changed.push(*contact);
                false
            } else {
                true
            }
        });
        self.dispatch(ContactEventKind::End, t_ms, changed)
    }

    pub(crate) fn tick(&mut self, now_ms: u64) -> &mut Self {
        while let Some(due) = self.detector.next_deadline_ms() {
            if due > now_ms {
                break;
            }
            self.detector.on_deadline(due, &mut self.events);
        }
        self
    }

    pub(crate) fn take(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    fn dispatch(
        &mut self,
        kind: ContactEventKind,
        t_ms: u64,
        changed: Vec<Contact>,
    ) -> &mut Self {
        while let Some(due) = self.detector.next_deadline_ms() {
            if due >= t_ms {
                break;
            }
            self.detector.on_deadline(due, &mut self.events);
        }
        let batch = RawContactBatch {
            kind,
            t_ms,
            current: self.fingers.clone(),
            changed,
        };
        let state: Rc<TouchState> = self
            .aggregator
            .apply(&batch)
            .expect("scripted batch should be well formed");
        self.detector.on_touches(t_ms, &state, &mut self.events);
        self
    }
}
