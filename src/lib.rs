//! Multi-touch gesture recognition over a stream of raw contact batches.
//!
//! A [`TouchSurface`] folds batches into one shared [`TouchState`] snapshot
//! and fans it out to per-subscription gesture detectors: press, tap,
//! double/single tap, swipe, pan and pinch.

pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod surface;
pub mod touch;

pub use config::GestureConfig;
pub use error::{ConfigError, GestureError, InputError, SurfaceError};
pub use geometry::Vector;
pub use gesture::{GestureEvent, GestureKind};
pub use surface::{Dispatch, GestureNotification, SubscriptionId, TouchSurface};
pub use touch::{
    Contact, ContactEventKind, RawContactBatch, TouchId, TouchPoint, TouchRecord, TouchState,
};
