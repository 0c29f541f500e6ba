//! Error types
//!
//! Everything here is raised at construction/configuration time. Ticks never
//! fail: recoverable conditions are absorbed into valid values.

use thiserror::Error;

/// Invalid game or estimator configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Crofton step {step} must satisfy 0 < step <= min({width}, {height})")]
    InvalidStep { step: u32, width: u32, height: u32 },
    #[error("Surface must be non-empty, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
    #[error("Keep fraction {0} must lie in (0, 1)")]
    InvalidKeepFraction(f64),
    #[error("Need at least {min} participants, got {got}")]
    TooFewParticipants { min: usize, got: usize },
    #[error("Target range {low}..{high} is empty or negative")]
    InvalidTargetRange { low: f64, high: f64 },
    #[error("Line thickness {0} must be positive")]
    InvalidThickness(f32),
    #[error("Platformer needs at least one stage")]
    NoStages,
}

/// Failure loading or saving settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Audio backend failure. Never reaches game logic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("Audio device unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to play {effect}: {reason}")]
    Playback { effect: &'static str, reason: String },
}
