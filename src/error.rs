use thiserror::Error;

use crate::touch::TouchId;

/// Structural violation of the input contract. The only error class the
/// recognition path surfaces; a rejected batch leaves the touch state as it was.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("contact {id} appears more than once in one batch")]
    DuplicateContact { id: TouchId },
    #[error("contact {id} timestamp went backwards ({previous_ms} ms -> {t_ms} ms)")]
    TimestampRegression {
        id: TouchId,
        previous_ms: u64,
        t_ms: u64,
    },
    #[error("batch timestamp {t_ms} ms is older than surface clock {clock_ms} ms")]
    ClockRegression { clock_ms: u64, t_ms: u64 },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GestureError {
    #[error("gesture finger count must be at least 1, got {0}")]
    InvalidFingerCount(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Gesture(#[from] GestureError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
