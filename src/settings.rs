//! Game settings and tuning
//!
//! Loaded from / saved to JSON. Every field has a default so partial files
//! are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, SettingsError};
use crate::raster::CroftonFormula;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Range round targets are drawn from
    pub fn target_range(&self) -> (f64, f64) {
        match self {
            Difficulty::Easy => (1000.0, 3000.0),
            Difficulty::Normal => (1000.0, 5000.0),
            Difficulty::Hard => (3000.0, 6000.0),
        }
    }

    /// Per-turn time limit in seconds
    pub fn time_limit_secs(&self) -> f64 {
        match self {
            Difficulty::Easy => 20.0,
            Difficulty::Normal => 15.0,
            Difficulty::Hard => 10.0,
        }
    }
}

/// Which game the drawing session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameFormat {
    /// One pre-game ranking round then one scored round
    Ranking,
    /// Pre-game + scored round + elimination, until one participant remains
    #[default]
    Tournament,
}

/// How drawn pixels are told apart from background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InkMode {
    /// Any non-zero channel is ink
    #[default]
    AnyChannel,
    /// Only the drawing participant's exact colour is ink
    PlayerColor,
}

/// Drawing game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub format: GameFormat,
    pub participants: usize,
    /// Enforce the difficulty's per-turn time limit
    pub timed_turns: bool,

    // === Surface ===
    pub surface_width: u32,
    pub surface_height: u32,
    pub line_thickness: f32,

    // === Scoring ===
    pub keep_fraction: f64,
    pub crofton_step: u32,
    pub crofton_formula: CroftonFormula,
    pub ink_mode: InkMode,

    // === Achievements ===
    pub achievement_margin: f64,
    pub achievement_goal: u32,

    // === Timing ===
    pub elimination_hold_secs: f64,
    pub hint_duration_secs: f64,
    /// Show live too-long/too-short hints while drawing
    pub hints: bool,

    // === Audio ===
    pub master_volume: f32,
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            format: GameFormat::Tournament,
            participants: 5,
            timed_turns: true,

            surface_width: SURFACE_WIDTH,
            surface_height: SURFACE_HEIGHT,
            line_thickness: LINE_THICKNESS,

            keep_fraction: DEFAULT_KEEP_FRACTION,
            crofton_step: DEFAULT_CROFTON_STEP,
            crofton_formula: CroftonFormula::GridStep,
            ink_mode: InkMode::AnyChannel,

            achievement_margin: ACHIEVEMENT_MARGIN,
            achievement_goal: ACHIEVEMENT_GOAL,

            elimination_hold_secs: ELIMINATION_HOLD_SECS,
            hint_duration_secs: HINT_DURATION_SECS,
            hints: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Settings for a difficulty preset, everything else default
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Per-turn time limit, if turns are timed
    pub fn time_limit_secs(&self) -> Option<f64> {
        self.timed_turns.then(|| self.difficulty.time_limit_secs())
    }

    /// Reject configurations the game cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participants < 2 {
            return Err(ConfigError::TooFewParticipants {
                min: 2,
                got: self.participants,
            });
        }
        if !(self.keep_fraction > 0.0 && self.keep_fraction < 1.0) {
            return Err(ConfigError::InvalidKeepFraction(self.keep_fraction));
        }
        if !(self.line_thickness > 0.0) {
            return Err(ConfigError::InvalidThickness(self.line_thickness));
        }
        let (low, high) = self.difficulty.target_range();
        if !(low >= 0.0 && high > low) {
            return Err(ConfigError::InvalidTargetRange { low, high });
        }
        let min_side = self.surface_width.min(self.surface_height);
        if min_side == 0 {
            return Err(ConfigError::EmptySurface {
                width: self.surface_width,
                height: self.surface_height,
            });
        }
        if self.crofton_step == 0 || self.crofton_step > min_side {
            return Err(ConfigError::InvalidStep {
                step: self.crofton_step,
                width: self.surface_width,
                height: self.surface_height,
            });
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

/// One platformer stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Total ink (polyline length, pixels) the player may draw
    pub ink_budget: f32,
    /// Jumps available, refilled on every landing
    pub jumps: u32,
}

/// Platformer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerSettings {
    pub stages: Vec<StageSpec>,
    pub surface_width: f32,
    pub surface_height: f32,
    pub base_gravity: f32,
    pub gravity_increment: f32,
    pub jump_impulse: f32,
    pub move_speed: f32,
    pub actor_radius: f32,
    pub ground_height: f32,
    pub star_radius: f32,
}

impl Default for PlatformerSettings {
    fn default() -> Self {
        let stages = [(1000.0, 5), (900.0, 4), (800.0, 3), (700.0, 2), (600.0, 1)]
            .into_iter()
            .map(|(ink_budget, jumps)| StageSpec { ink_budget, jumps })
            .collect();
        Self {
            stages,
            surface_width: SURFACE_WIDTH as f32,
            surface_height: SURFACE_HEIGHT as f32,
            base_gravity: BASE_GRAVITY,
            gravity_increment: GRAVITY_INCREMENT,
            jump_impulse: JUMP_IMPULSE,
            move_speed: MOVE_SPEED,
            actor_radius: ACTOR_RADIUS,
            ground_height: GROUND_HEIGHT,
            star_radius: STAR_RADIUS,
        }
    }
}

impl PlatformerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        if !(self.surface_width > 0.0 && self.surface_height > 0.0) {
            return Err(ConfigError::EmptySurface {
                width: self.surface_width as u32,
                height: self.surface_height as u32,
            });
        }
        Ok(())
    }

    /// Gravity for a stage; each stage pulls a little harder
    pub fn gravity_for_stage(&self, stage_index: usize) -> f32 {
        self.base_gravity + self.gravity_increment * stage_index as f32
    }

    /// Y coordinate of the screen floor
    pub fn floor_y(&self) -> f32 {
        self.surface_height - self.ground_height
    }
}
