//! Owner of the aggregator and the subscriber list.
//!
//! Input batches and clock ticks are pushed in; every accepted batch yields
//! one shared snapshot that is fanned out to the subscribed detectors in
//! subscription order.

use core::fmt;
use std::rc::Rc;

use crate::{
    config::GestureConfig,
    error::{ConfigError, GestureError, InputError},
    gesture::{
        DoubleTapDetector, GestureDetector, GestureEvent, GestureKind, PanDetector, PinchDetector,
        PressDetector, SingleTapDetector, SwipeDetector, TapDetector,
    },
    touch::{RawContactBatch, TouchState, TouchStateAggregator},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureNotification {
    pub subscription: SubscriptionId,
    /// Batch time, or the deadline that produced the event.
    pub t_ms: u64,
    pub event: GestureEvent,
}

/// Result of one input batch or clock tick.
#[derive(Clone, Debug)]
pub struct Dispatch {
    /// Snapshot after the batch; unchanged on a tick.
    pub state: Rc<TouchState>,
    /// Gestures in the order they were produced.
    pub gestures: Vec<GestureNotification>,
}

struct Subscription {
    id: SubscriptionId,
    kind: GestureKind,
    detector: Box<dyn GestureDetector>,
    /// Off until the subscriber has seen the surface with no fingers down, so
    /// a contact that predates the subscription is never read as a press.
    armed: bool,
}

pub struct TouchSurface {
    config: GestureConfig,
    aggregator: TouchStateAggregator,
    subscriptions: Vec<Subscription>,
    next_id: u64,
    clock_ms: Option<u64>,
}

impl Default for TouchSurface {
    fn default() -> Self {
        Self {
            config: GestureConfig::default(),
            aggregator: TouchStateAggregator::new(),
            subscriptions: Vec::new(),
            next_id: 0,
            clock_ms: None,
        }
    }
}

impl TouchSurface {
    pub fn new(config: GestureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Latest snapshot, for display consumers.
    pub fn state(&self) -> &Rc<TouchState> {
        self.aggregator.state()
    }

    pub fn clock_ms(&self) -> Option<u64> {
        self.clock_ms
    }

    pub fn subscribe(&mut self, kind: GestureKind) -> Result<SubscriptionId, GestureError> {
        let finger_count = kind.finger_count();
        if finger_count == 0 {
            return Err(GestureError::InvalidFingerCount(finger_count));
        }

        let config = &self.config;
        let detector: Box<dyn GestureDetector> = match kind {
            GestureKind::Press(n) => Box::new(PressDetector::new(n, config.tap_tolerance_sq())),
            GestureKind::Tap(n) => Box::new(TapDetector::new(n, config)),
            GestureKind::DoubleTap(n) => Box::new(DoubleTapDetector::new(n, config)),
            GestureKind::SingleTap(n) => Box::new(SingleTapDetector::new(n, config)),
            GestureKind::Swipe(n) => Box::new(SwipeDetector::new(n, config)),
            GestureKind::Pan(n) => Box::new(PanDetector::new(n, config)),
            GestureKind::Pinch => Box::new(PinchDetector::new(config)),
        };

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kind,
            detector,
            armed: self.aggregator.state().touches.is_empty(),
        });
        log::debug!("surface: subscribed {id} kind={kind:?}");
        Ok(id)
    }

    /// Drops one subscriber's detector chain. The shared state is untouched.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        let removed = self.subscriptions.len() != before;
        if removed {
            log::debug!("surface: unsubscribed {id}");
        }
        removed
    }

    pub fn subscription_kind(&self, id: SubscriptionId) -> Option<GestureKind> {
        self.subscriptions
            .iter()
            .find(|sub| sub.id == id)
            .map(|sub| sub.kind)
    }

    /// Folds one batch into the touch state and broadcasts the snapshot.
    ///
    /// Deadlines strictly earlier than the batch fire first; a deadline equal
    /// to the batch time loses to the input. A rejected batch changes nothing.
    pub fn dispatch(&mut self, batch: &RawContactBatch) -> Result<Dispatch, InputError> {
        if let Some(clock_ms) = self.clock_ms {
            if batch.t_ms < clock_ms {
                log::warn!(
                    "surface: batch rejected t_ms={} clock_ms={clock_ms}",
                    batch.t_ms
                );
                return Err(InputError::ClockRegression {
                    clock_ms,
                    t_ms: batch.t_ms,
                });
            }
        }
        if let Err(err) = self.aggregator.validate(batch) {
            log::warn!("surface: batch rejected t_ms={} err={err}", batch.t_ms);
            return Err(err);
        }

        let mut gestures = Vec::new();
        self.fire_deadlines(batch.t_ms, false, &mut gestures);

        let state = self.aggregator.apply(batch)?;
        self.clock_ms = Some(batch.t_ms);

        let mut out = Vec::new();
        for sub in &mut self.subscriptions {
            if !sub.armed {
                if !state.touches.is_empty() {
                    continue;
                }
                sub.armed = true;
            }
            sub.detector.on_touches(batch.t_ms, &state, &mut out);
            gestures.extend(out.drain(..).map(|event| GestureNotification {
                subscription: sub.id,
                t_ms: batch.t_ms,
                event,
            }));
        }

        Ok(Dispatch { state, gestures })
    }

    /// Advances the clock without input, firing every deadline `<= now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Dispatch {
        let mut gestures = Vec::new();
        if self.clock_ms.is_none_or(|clock_ms| now_ms >= clock_ms) {
            self.fire_deadlines(now_ms, true, &mut gestures);
            self.clock_ms = Some(now_ms);
        }
        Dispatch {
            state: Rc::clone(self.aggregator.state()),
            gestures,
        }
    }

    /// Earliest pending deadline across all subscribers.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.subscriptions
            .iter()
            .filter_map(|sub| sub.detector.next_deadline_ms())
            .min()
    }

    fn fire_deadlines(
        &mut self,
        limit_ms: u64,
        inclusive: bool,
        gestures: &mut Vec<GestureNotification>,
    ) {
        let due = |at_ms: u64| {
            if inclusive {
                at_ms <= limit_ms
            } else {
                at_ms < limit_ms
            }
        };

        let mut out = Vec::new();
        loop {
            // Earliest first; ties go to the older subscription.
            let next = self
                .subscriptions
                .iter()
                .enumerate()
                .filter_map(|(idx, sub)| sub.detector.next_deadline_ms().map(|at| (at, idx)))
                .filter(|&(at, _)| due(at))
                .min();
            let Some((at_ms, idx)) = next else {
                break;
            };

            let sub = &mut self.subscriptions[idx];
            sub.detector.on_deadline(at_ms, &mut out);
            gestures.extend(out.drain(..).map(|event| GestureNotification {
                subscription: sub.id,
                t_ms: at_ms,
                event,
            }));

            if sub.detector.next_deadline_ms() == Some(at_ms) {
                log::error!(
                    "surface: {} left deadline armed at_ms={at_ms}; dropping it",
                    sub.id
                );
                self.subscriptions.remove(idx);
            }
        }
    }
}
