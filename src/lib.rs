//! Crofton Draw - drawing-skill games scored from rendered pixels
//!
//! Core modules:
//! - `stroke`: Pointer sample recording
//! - `smooth`: Spectral (low-pass) stroke smoothing
//! - `raster`: Drawable surfaces, ink sampling and the Crofton length estimator
//! - `sim`: Deterministic platformer simulation (actor physics, drawn platforms)
//! - `game`: Ranking/tournament state machine and the drawing session
//! - `settings`: Data-driven configuration
//! - `hud` / `audio`: Text lines and fire-and-forget sound triggers

pub mod audio;
pub mod error;
pub mod game;
pub mod hud;
pub mod input;
pub mod raster;
pub mod settings;
pub mod sim;
pub mod smooth;
pub mod stroke;

pub use error::{AudioError, ConfigError, SettingsError};
pub use settings::{Difficulty, PlatformerSettings, Settings};

/// Game configuration constants
pub mod consts {
    /// Logical ticks per second (one tick per rendered frame)
    pub const TICK_RATE: u32 = 60;

    /// Default drawing surface size
    pub const SURFACE_WIDTH: u32 = 800;
    pub const SURFACE_HEIGHT: u32 = 600;

    /// Fraction of the spectrum kept by the smoother
    pub const DEFAULT_KEEP_FRACTION: f64 = 0.05;
    /// Scan line spacing for the Crofton estimator (pixels)
    pub const DEFAULT_CROFTON_STEP: u32 = 10;
    /// Preview scan lines are this many times sparser than the full estimate
    pub const PREVIEW_STEP_FACTOR: u32 = 4;

    /// Strokes with fewer samples are discarded instead of scored
    pub const MIN_SCORED_POINTS: usize = 3;
    /// Ink line thickness in pixels
    pub const LINE_THICKNESS: f32 = 3.0;

    /// A main-round deviation within this margin counts toward the achievement
    pub const ACHIEVEMENT_MARGIN: f64 = 100.0;
    /// Close matches needed to unlock the achievement
    pub const ACHIEVEMENT_GOAL: u32 = 3;

    /// Elimination animation hold (seconds)
    pub const ELIMINATION_HOLD_SECS: f64 = 2.0;
    /// How long a live length hint stays on screen (seconds)
    pub const HINT_DURATION_SECS: f64 = 2.0;

    /// Platformer physics, in pixels per tick
    pub const BASE_GRAVITY: f32 = 0.5;
    pub const GRAVITY_INCREMENT: f32 = 0.05;
    pub const JUMP_IMPULSE: f32 = -10.0;
    pub const MOVE_SPEED: f32 = 5.0;

    /// Platformer geometry
    pub const ACTOR_RADIUS: f32 = 20.0;
    pub const GROUND_HEIGHT: f32 = 20.0;
    pub const STAR_RADIUS: f32 = 15.0;
    pub const ACTOR_START_X: f32 = 50.0;
}

/// Player palette, indexed by participant
pub const PLAYER_COLORS: [raster::Rgb; 5] = [
    raster::Rgb::new(255, 255, 255),
    raster::Rgb::new(255, 0, 0),
    raster::Rgb::new(0, 255, 0),
    raster::Rgb::new(0, 0, 255),
    raster::Rgb::new(255, 255, 0),
];

/// Colour for a participant (palette wraps for large games)
#[inline]
pub fn player_color(participant: usize) -> raster::Rgb {
    PLAYER_COLORS[participant % PLAYER_COLORS.len()]
}

/// Absolute difference between a measured length and a target
#[inline]
pub fn deviation(length: f64, target: f64) -> f64 {
    (length - target).abs()
}
