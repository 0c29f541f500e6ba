//! One drawing game session
//!
//! Owns the canvas, the stroke being drawn, the estimator and the round
//! state machine. The platform layer feeds it one `FrameInput` per tick and
//! reads back the phase, HUD lines and the canvas to present.

use glam::Vec2;

use super::tournament::{Phase, Tournament, TournamentEvent};
use crate::audio::{AudioManager, SoundEffect};
use crate::consts::MIN_SCORED_POINTS;
use crate::error::ConfigError;
use crate::hud::{self, Hint};
use crate::input::{Button, FrameInput, InputEvent};
use crate::player_color;
use crate::raster::{Canvas, CroftonConfig, CroftonEstimator, InkPolicy, Rgb, Surface};
use crate::settings::{GameFormat, InkMode, Settings};
use crate::smooth::smooth;
use crate::stroke::StrokeRecorder;

#[derive(Debug)]
pub struct DrawingSession {
    settings: Settings,
    canvas: Canvas,
    recorder: StrokeRecorder,
    estimator: CroftonEstimator,
    tournament: Tournament,
    audio: AudioManager,
    last_estimate: Option<f64>,
    hint: Option<Hint>,
    now: f64,
}

impl DrawingSession {
    /// Session with seeded uniform targets
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        let tournament = Tournament::new(&settings, seed)?;
        Self::with_tournament(settings, tournament)
    }

    /// Session around a pre-built state machine (custom policies)
    pub fn with_tournament(settings: Settings, tournament: Tournament) -> Result<Self, ConfigError> {
        settings.validate()?;
        let estimator = CroftonEstimator::new(
            CroftonConfig {
                step: settings.crofton_step,
                formula: settings.crofton_formula,
            },
            settings.surface_width,
            settings.surface_height,
        )?;
        let mut audio = AudioManager::silent();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        Ok(Self {
            canvas: Canvas::new(settings.surface_width, settings.surface_height),
            recorder: StrokeRecorder::new(),
            estimator,
            tournament,
            audio,
            last_estimate: None,
            hint: None,
            now: 0.0,
            settings,
        })
    }

    /// Replace the audio manager (volumes are taken from settings)
    pub fn set_audio(&mut self, mut audio: AudioManager) {
        audio.set_master_volume(self.settings.master_volume);
        audio.set_sfx_volume(self.settings.sfx_volume);
        self.audio = audio;
    }

    // === Exposed state ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.tournament.phase()
    }

    pub fn participant(&self) -> Option<usize> {
        self.tournament.current_participant()
    }

    pub fn last_estimate(&self) -> Option<f64> {
        self.last_estimate
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint.filter(|h| h.is_visible(self.now))
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    /// The renderable frame
    pub fn frame(&self) -> &Canvas {
        &self.canvas
    }

    pub fn hud_lines(&self) -> Vec<String> {
        hud::tournament_lines(
            &self.tournament,
            &self.settings,
            self.last_estimate,
            self.hint.as_ref(),
            self.now,
        )
    }

    // === Tick ===

    /// Process one tick of input
    pub fn update(&mut self, input: &FrameInput) -> Vec<TournamentEvent> {
        self.now = input.now;
        let mut events = Vec::new();

        for event in &input.events {
            match *event {
                InputEvent::PointerDown {
                    button: Button::Left,
                    pos,
                } => self.begin_stroke(pos),
                InputEvent::PointerDown {
                    button: Button::Right,
                    ..
                } => self.clear(),
                InputEvent::PointerMove { pos } => self.extend_stroke(pos),
                InputEvent::PointerUp {
                    button: Button::Left,
                    ..
                } => events.extend(self.submit_stroke()),
                _ => {}
            }
        }

        let polled = self.tournament.update(input.now);
        if polled
            .iter()
            .any(|e| matches!(e, TournamentEvent::Scored(s) if s.forfeited))
        {
            self.clear();
        }
        events.extend(polled);

        self.react(&events);
        events
    }

    fn ink_policy(&self, participant: usize) -> InkPolicy {
        match self.settings.ink_mode {
            InkMode::AnyChannel => InkPolicy::AnyChannel,
            InkMode::PlayerColor => InkPolicy::ExactColor(player_color(participant)),
        }
    }

    fn clear(&mut self) {
        self.canvas.fill(Rgb::BLACK);
        self.recorder.clear();
    }

    fn begin_stroke(&mut self, pos: Vec2) {
        if self.participant().is_none() {
            return;
        }
        self.canvas.fill(Rgb::BLACK);
        self.recorder.begin_at(pos);
        self.hint = None;
    }

    fn extend_stroke(&mut self, pos: Vec2) {
        let Some(participant) = self.participant() else {
            return;
        };
        let Some(last) = self.recorder.last() else {
            return;
        };
        if !self.recorder.push(pos) {
            return;
        }
        self.canvas.draw_line(
            last,
            pos,
            player_color(participant),
            self.settings.line_thickness,
        );

        let hints_on = self.settings.hints && self.settings.format == GameFormat::Tournament;
        if !hints_on || self.hint().is_some() {
            return;
        }
        let Some(target) = self.tournament.current_target() else {
            return;
        };
        let preview = self
            .estimator
            .preview(&self.canvas, self.ink_policy(participant));
        self.hint = Some(Hint::new(
            preview,
            target,
            self.now + self.settings.hint_duration_secs,
        ));
        self.audio.play(SoundEffect::Hint);
    }

    /// Smooth, redraw and score the finished stroke
    fn submit_stroke(&mut self) -> Vec<TournamentEvent> {
        if !self.recorder.is_recording() {
            return Vec::new();
        }
        let stroke = self.recorder.finish();
        let Some(participant) = self.participant() else {
            return Vec::new();
        };
        if stroke.len() < MIN_SCORED_POINTS {
            log::warn!(
                "Discarded stroke with {} points from player {}",
                stroke.len(),
                participant + 1
            );
            self.canvas.fill(Rgb::BLACK);
            return Vec::new();
        }

        let smoothed = smooth(stroke.points(), self.settings.keep_fraction);
        self.canvas.fill(Rgb::BLACK);
        self.canvas.draw_polyline(
            &smoothed,
            player_color(participant),
            self.settings.line_thickness,
        );
        let length = self
            .estimator
            .estimate(&self.canvas, self.ink_policy(participant));
        log::debug!(
            "Player {} stroke: {} samples, polyline {:.1}, estimate {:.1}",
            participant + 1,
            stroke.len(),
            stroke.polyline_length(),
            length
        );
        self.last_estimate = Some(length);
        self.hint = None;
        self.tournament.record_length(length, self.now)
    }

    fn react(&mut self, events: &[TournamentEvent]) {
        let margin = self.settings.achievement_margin;
        for event in events {
            match event {
                TournamentEvent::Scored(score) => {
                    let effect = if !score.forfeited && score.deviation <= margin {
                        SoundEffect::Success
                    } else {
                        SoundEffect::Fail
                    };
                    self.audio.play(effect);
                }
                TournamentEvent::Eliminated(_) => self.audio.play(SoundEffect::Elimination),
                TournamentEvent::Finished { .. } => self.audio.play(SoundEffect::StageClear),
                _ => {}
            }
        }
    }
}
