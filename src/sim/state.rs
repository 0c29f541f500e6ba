//! Platformer state and core simulation types
//!
//! One `PlatformerState` is one session: it owns the single actor, the
//! platform list, the stroke being drawn and the seeded RNG.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Platform;
use crate::error::ConfigError;
use crate::raster::{Rgb, Surface};
use crate::settings::{PlatformerSettings, StageSpec};
use crate::stroke::StrokeRecorder;

const BACKGROUND: Rgb = Rgb::BLACK;
const GROUND_COLOR: Rgb = Rgb::new(100, 100, 100);
const PLATFORM_COLOR: Rgb = Rgb::new(0, 255, 0);
const STROKE_COLOR: Rgb = Rgb::WHITE;
const STAR_COLOR: Rgb = Rgb::new(255, 255, 0);
const ACTOR_COLOR: Rgb = Rgb::new(0, 0, 255);
const PLATFORM_THICKNESS: f32 = 4.0;
const STROKE_THICKNESS: f32 = 2.0;

/// Current phase of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    /// Drawing platforms, ink budget running down
    Draw,
    /// Actor moves, platforms frozen
    Play,
    /// Stage over
    Result(StageOutcome),
}

/// How a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Star reached, more stages follow
    Cleared,
    /// Out of jumps in mid-air
    Failed,
    /// Star reached on the final stage
    Complete,
}

/// Things that happened during a tick (for audio and HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    InkExhausted,
    PlayStarted,
    Jumped,
    Landed,
    StageCleared,
    StageFailed,
    AllStagesComplete,
}

/// The physics actor
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub on_ground: bool,
    pub remaining_jumps: u32,
    /// Jump allowance restored on every landing
    pub max_jumps: u32,
}

impl Actor {
    pub fn new(pos: Vec2, radius: f32, max_jumps: u32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            on_ground: false,
            remaining_jumps: max_jumps,
            max_jumps,
        }
    }

    /// Come to rest with the centre at `rest_y`
    pub fn land(&mut self, rest_y: f32) {
        self.pos.y = rest_y;
        self.vel.y = 0.0;
        self.on_ground = true;
        self.remaining_jumps = self.max_jumps;
    }

    /// Jump if any jumps are left. Every press spends one (never below zero).
    ///
    /// Returns whether the impulse was applied.
    pub fn jump(&mut self, impulse: f32) -> bool {
        let had_jump = self.remaining_jumps > 0;
        self.remaining_jumps = self.remaining_jumps.saturating_sub(1);
        if had_jump {
            self.vel.y = impulse;
            self.on_ground = false;
        }
        had_jump
    }
}

/// Complete platformer session state
#[derive(Debug, Clone)]
pub struct PlatformerState {
    pub settings: PlatformerSettings,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub stage_index: usize,
    pub phase: StagePhase,
    /// Platforms in insertion order
    pub platforms: Vec<Platform>,
    pub actor: Actor,
    pub star: Vec2,
    pub gravity: f32,
    /// Ink drawn so far this stage
    pub ink_used: f32,
    pub recorder: StrokeRecorder,
    pub time_ticks: u64,
}

impl PlatformerState {
    pub fn new(settings: PlatformerSettings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let stage = settings.stages[0];
        let actor = Actor::new(Vec2::ZERO, settings.actor_radius, stage.jumps);
        let mut state = Self {
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            stage_index: 0,
            phase: StagePhase::Draw,
            platforms: Vec::new(),
            actor,
            star: Vec2::ZERO,
            gravity: 0.0,
            ink_used: 0.0,
            recorder: StrokeRecorder::new(),
            time_ticks: 0,
        };
        state.reset_stage();
        Ok(state)
    }

    pub fn stage(&self) -> StageSpec {
        self.settings.stages[self.stage_index]
    }

    pub fn is_last_stage(&self) -> bool {
        self.stage_index + 1 >= self.settings.stages.len()
    }

    /// Ink left to draw this stage
    pub fn ink_remaining(&self) -> f32 {
        (self.stage().ink_budget - self.ink_used).max(0.0)
    }

    /// Reset the current stage: clear platforms, respawn actor, move the star
    pub fn reset_stage(&mut self) {
        let stage = self.stage();
        let s = &self.settings;

        self.platforms.clear();
        self.recorder.clear();
        self.ink_used = 0.0;
        self.gravity = s.gravity_for_stage(self.stage_index);

        let start = Vec2::new(crate::consts::ACTOR_START_X, s.floor_y() - s.actor_radius);
        self.actor = Actor::new(start, s.actor_radius, stage.jumps);

        let w = s.surface_width;
        let star_x_min = w / 2.0;
        let star_x_max = (w - 100.0).max(star_x_min + 1.0);
        let star_y_min = 100.0;
        let star_y_max = (s.floor_y() - s.star_radius - 100.0).max(star_y_min + 1.0);
        self.star = Vec2::new(
            self.rng.random_range(star_x_min..star_x_max).floor(),
            self.rng.random_range(star_y_min..star_y_max).floor(),
        );

        self.phase = StagePhase::Draw;
        log::info!(
            "Stage {} ready: ink {}, jumps {}, gravity {:.2}, star at ({}, {})",
            self.stage_index + 1,
            stage.ink_budget,
            stage.jumps,
            self.gravity,
            self.star.x,
            self.star.y
        );
    }

    /// Advance to the next stage (no-op after the last one)
    pub fn next_stage(&mut self) {
        if self.is_last_stage() {
            return;
        }
        self.stage_index += 1;
        self.reset_stage();
    }

    /// Draw the current frame: ground, platforms, live stroke, star, actor
    pub fn render(&self, surface: &mut impl Surface) {
        let s = &self.settings;
        surface.fill(BACKGROUND);

        let ground_mid = s.floor_y() + s.ground_height * 0.5;
        surface.draw_line(
            Vec2::new(0.0, ground_mid),
            Vec2::new(s.surface_width, ground_mid),
            GROUND_COLOR,
            s.ground_height,
        );

        for platform in &self.platforms {
            surface.draw_line(platform.a, platform.b, PLATFORM_COLOR, PLATFORM_THICKNESS);
        }
        if self.recorder.is_recording() {
            surface.draw_polyline(self.recorder.points(), STROKE_COLOR, STROKE_THICKNESS);
        }

        surface.draw_circle(self.star, s.star_radius, STAR_COLOR);
        surface.draw_circle(self.actor.pos, self.actor.radius, ACTOR_COLOR);
    }

    /// Whether the actor overlaps the star
    pub fn star_reached(&self) -> bool {
        self.actor.pos.distance(self.star) < self.actor.radius + self.settings.star_radius
    }
}
