//! Offline replay of recorded contact traces through a [`TouchSurface`].

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};
use touch_gestures::{
    GestureConfig, GestureEvent, GestureKind, RawContactBatch, SubscriptionId, TouchSurface,
};

pub const CSV_HEADER: &str = "gesture,ms,kind,fingers,x,y,scale";

/// One emitted gesture, tagged with the subscription that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayEvent {
    pub gesture: String,
    pub t_ms: u64,
    pub event: GestureEvent,
}

impl ReplayEvent {
    pub fn csv_row(&self) -> String {
        let (fingers, point, scale) = match &self.event {
            GestureEvent::Press {
                finger_count,
                anchor,
            }
            | GestureEvent::Tap {
                finger_count,
                anchor,
            }
            | GestureEvent::DoubleTap {
                finger_count,
                anchor,
            }
            | GestureEvent::SingleTap {
                finger_count,
                anchor,
            } => (*finger_count, Some(anchor.centroid()), None),
            GestureEvent::Swipe {
                finger_count,
                final_snapshot,
            } => (*finger_count, Some(final_snapshot.centroid()), None),
            GestureEvent::PanSample {
                finger_count,
                centroid,
            } => (*finger_count, Some(*centroid), None),
            GestureEvent::PanEnd { finger_count } => (*finger_count, None, None),
            GestureEvent::PinchSample { center, scale } => (2, Some(*center), Some(*scale)),
            GestureEvent::PinchEnd => (2, None, None),
        };

        let (x, y) = point
            .map(|p| (format!("{:.1}", p.x), format!("{:.1}", p.y)))
            .unwrap_or_default();
        let scale = scale.map(|s| format!("{s:.3}")).unwrap_or_default();
        format!(
            "{},{},{},{},{},{},{}",
            self.gesture,
            self.t_ms,
            self.event.label(),
            fingers,
            x,
            y,
            scale
        )
    }
}

/// Replay result: gestures in emission order plus the number of batches the
/// surface refused.
#[derive(Debug, Default)]
pub struct ReplayOutcome {
    pub events: Vec<ReplayEvent>,
    pub rejected: usize,
}

impl ReplayOutcome {
    pub fn labels(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.event.label()).collect()
    }
}

/// Parses `tap:2`, `double_tap:1`, `single_tap:1`, `press:3`, `swipe:1`,
/// `pan:2` or `pinch`.
pub fn parse_gesture(arg: &str) -> Result<GestureKind> {
    let arg = arg.trim().to_ascii_lowercase();
    if arg == "pinch" {
        return Ok(GestureKind::Pinch);
    }

    let (name, count) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("gesture '{arg}' needs a finger count, e.g. tap:1"))?;
    let count: usize = count
        .parse()
        .with_context(|| format!("invalid finger count in gesture '{arg}'"))?;

    let kind = match name {
        "press" => GestureKind::Press(count),
        "tap" => GestureKind::Tap(count),
        "double_tap" => GestureKind::DoubleTap(count),
        "single_tap" => GestureKind::SingleTap(count),
        "swipe" => GestureKind::Swipe(count),
        "pan" => GestureKind::Pan(count),
        other => bail!("unknown gesture '{other}'"),
    };
    Ok(kind)
}

pub fn gesture_name(kind: GestureKind) -> String {
    match kind {
        GestureKind::Press(n) => format!("press:{n}"),
        GestureKind::Tap(n) => format!("tap:{n}"),
        GestureKind::DoubleTap(n) => format!("double_tap:{n}"),
        GestureKind::SingleTap(n) => format!("single_tap:{n}"),
        GestureKind::Swipe(n) => format!("swipe:{n}"),
        GestureKind::Pan(n) => format!("pan:{n}"),
        GestureKind::Pinch => "pinch".to_string(),
    }
}

/// Tap, double tap, swipe and pan for one to three fingers, then pinch.
pub fn default_gestures() -> Vec<GestureKind> {
    let mut kinds = Vec::new();
    for n in 1..=3 {
        kinds.extend([
            GestureKind::Tap(n),
            GestureKind::DoubleTap(n),
            GestureKind::Swipe(n),
            GestureKind::Pan(n),
        ]);
    }
    kinds.push(GestureKind::Pinch);
    kinds
}

/// Reads a JSON-lines trace. Blank lines and `#` comments are skipped.
pub fn parse_trace<R: BufRead>(reader: R, source: &str) -> Result<Vec<RawContactBatch>> {
    let mut batches = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("failed to read {source}:{line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let batch: RawContactBatch = serde_json::from_str(trimmed)
            .with_context(|| format!("{source}:{line_no} invalid contact batch"))?;
        batches.push(batch);
    }
    Ok(batches)
}

pub fn load_trace(path: &Path) -> Result<Vec<RawContactBatch>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_trace(BufReader::new(file), &path.display().to_string())
}

/// Reads expected kind labels, one per line, `#` comments allowed.
pub fn parse_expected<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read expected labels")?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        labels.push(token.to_ascii_lowercase());
    }
    Ok(labels)
}

pub fn load_expected(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_expected(BufReader::new(file))
}

pub fn check_expected(outcome: &ReplayOutcome, expected: &[String]) -> Result<()> {
    let actual = outcome.labels();
    if actual.iter().copied().eq(expected.iter().map(String::as_str)) {
        return Ok(());
    }
    bail!(
        "gesture sequence mismatch\nexpected: {}\nactual:   {}",
        expected.join(","),
        actual.join(",")
    )
}

/// Feeds every batch through a fresh surface, then ticks the clock `tail_ms`
/// past the last batch so pending windows resolve.
pub fn replay(
    config: GestureConfig,
    gestures: &[GestureKind],
    batches: &[RawContactBatch],
    tail_ms: u64,
) -> Result<ReplayOutcome> {
    let mut surface = TouchSurface::new(config)?;
    let mut names: Vec<(SubscriptionId, String)> = Vec::with_capacity(gestures.len());
    for &kind in gestures {
        let id = surface.subscribe(kind)?;
        names.push((id, gesture_name(kind)));
    }
    let name_of = |id: SubscriptionId| {
        names
            .iter()
            .find(|(sub, _)| *sub == id)
            .map(|(_, name)| name.clone())
            .unwrap_or_default()
    };

    let mut outcome = ReplayOutcome::default();
    for batch in batches {
        let dispatch = match surface.dispatch(batch) {
            Ok(dispatch) => dispatch,
            Err(err) => {
                log::warn!("replay: skipped batch t_ms={} err={err}", batch.t_ms);
                outcome.rejected += 1;
                continue;
            }
        };
        log::debug!(
            "replay: t_ms={} fingers={} gestures={}",
            batch.t_ms,
            dispatch.state.touches.len(),
            dispatch.gestures.len()
        );
        outcome
            .events
            .extend(dispatch.gestures.into_iter().map(|n| ReplayEvent {
                gesture: name_of(n.subscription),
                t_ms: n.t_ms,
                event: n.event,
            }));
    }

    if let Some(last_ms) = surface.clock_ms() {
        let tail = surface.tick(last_ms.saturating_add(tail_ms));
        outcome
            .events
            .extend(tail.gestures.into_iter().map(|n| ReplayEvent {
                gesture: name_of(n.subscription),
                t_ms: n.t_ms,
                event: n.event,
            }));
    }

    Ok(outcome)
}
