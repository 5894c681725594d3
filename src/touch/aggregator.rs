use std::rc::Rc;

use crate::error::InputError;

use super::{Contact, ContactEventKind, RawContactBatch, TouchPoint, TouchState};

/// Folds raw contact batches into the live [`TouchState`].
///
/// Emits one snapshot per accepted batch. Snapshots are immutable and shared
/// by reference count, so every consumer observes the same bookkeeping.
#[derive(Debug, Default)]
pub struct TouchStateAggregator {
    state: Rc<TouchState>,
}

impl TouchStateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Rc<TouchState> {
        &self.state
    }

    pub fn apply(&mut self, batch: &RawContactBatch) -> Result<Rc<TouchState>, InputError> {
        self.validate(batch)?;

        let mut touches = self.state.touches.clone();
        match batch.kind {
            ContactEventKind::Start | ContactEventKind::Move => {
                for contact in &batch.current {
                    touches.insert(
                        contact.id,
                        TouchPoint {
                            position: contact.position,
                            t_ms: contact.t_ms,
                        },
                    );
                }
            }
            ContactEventKind::End | ContactEventKind::Cancel => {
                for contact in &batch.changed {
                    touches.remove(contact.id);
                }
            }
        }

        self.state = Rc::new(TouchState {
            last_update_ms: Some(batch.t_ms),
            last_event_kind: batch.kind,
            touches,
        });
        log::trace!(
            "touch: {:?} t_ms={} fingers={}",
            batch.kind,
            batch.t_ms,
            self.state.touches.len()
        );
        Ok(Rc::clone(&self.state))
    }

    /// Checks `batch` against the current state without applying it.
    pub fn validate(&self, batch: &RawContactBatch) -> Result<(), InputError> {
        if let Some(clock_ms) = self.state.last_update_ms {
            if batch.t_ms < clock_ms {
                return Err(InputError::ClockRegression {
                    clock_ms,
                    t_ms: batch.t_ms,
                });
            }
        }
        reject_duplicates(&batch.current)?;
        reject_duplicates(&batch.changed)?;

        if matches!(batch.kind, ContactEventKind::Start | ContactEventKind::Move) {
            for contact in &batch.current {
                if let Some(previous) = self.state.touches.get(contact.id) {
                    if contact.t_ms < previous.t_ms {
                        return Err(InputError::TimestampRegression {
                            id: contact.id,
                            previous_ms: previous.t_ms,
                            t_ms: contact.t_ms,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn reject_duplicates(contacts: &[Contact]) -> Result<(), InputError> {
    for (idx, contact) in contacts.iter().enumerate() {
        if contacts[..idx].iter().any(|other| other.id == contact.id) {
            return Err(InputError::DuplicateContact { id: contact.id });
        }
    }
    Ok(())
}
