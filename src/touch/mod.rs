//! Raw contact model and the live "who is touching where" record.

mod aggregator;
mod record;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Vector;

pub use aggregator::TouchStateAggregator;
pub use record::TouchRecord;

/// Stable per-finger identifier assigned by the input source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TouchId(pub u64);

impl fmt::Display for TouchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactEventKind {
    Start,
    Move,
    End,
    Cancel,
}

/// One finger's reading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: TouchId,
    #[serde(flatten)]
    pub position: Vector,
    pub t_ms: u64,
}

impl Contact {
    pub fn new(id: u64, x: f32, y: f32, t_ms: u64) -> Self {
        Self {
            id: TouchId(id),
            position: Vector::new(x, y),
            t_ms,
        }
    }
}

/// Normalized form of one platform touch event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawContactBatch {
    pub kind: ContactEventKind,
    pub t_ms: u64,
    /// Every contact still on the surface after this event.
    #[serde(default)]
    pub current: Vec<Contact>,
    /// The contacts this event is about.
    #[serde(default)]
    pub changed: Vec<Contact>,
}

/// Position and timestamp of one finger inside a [`TouchRecord`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub position: Vector,
    pub t_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TouchState {
    /// `None` until the first batch arrives.
    pub last_update_ms: Option<u64>,
    pub last_event_kind: ContactEventKind,
    pub touches: TouchRecord,
}

impl Default for TouchState {
    fn default() -> Self {
        Self {
            last_update_ms: None,
            last_event_kind: ContactEventKind::End,
            touches: TouchRecord::new(),
        }
    }
}
