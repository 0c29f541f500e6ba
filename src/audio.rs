//! Audio triggers
//!
//! Procedurally described sound effects - no external files needed. The game
//! only ever fires and forgets: a missing or failing backend degrades to
//! silence and never touches game state.

use crate::error::AudioError;
use crate::sim::SimEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Draw landed close to the target
    Success,
    /// Draw missed the target (or the turn ran out)
    Fail,
    /// Participant eliminated
    Elimination,
    /// Live too-long/too-short hint shown
    Hint,
    /// Stage cleared or match won
    StageClear,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One note of a procedural effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    pub start: f32,
    pub duration: f32,
    pub waveform: Waveform,
}

const fn tone(freq: f32, start: f32, duration: f32, waveform: Waveform) -> Tone {
    Tone {
        freq,
        start,
        duration,
        waveform,
    }
}

const SUCCESS: [Tone; 3] = [
    tone(523.0, 0.0, 0.12, Waveform::Sine),
    tone(659.0, 0.1, 0.12, Waveform::Sine),
    tone(784.0, 0.2, 0.2, Waveform::Sine),
];
const FAIL: [Tone; 2] = [
    tone(300.0, 0.0, 0.15, Waveform::Sawtooth),
    tone(200.0, 0.15, 0.3, Waveform::Sawtooth),
];
const ELIMINATION: [Tone; 3] = [
    tone(400.0, 0.0, 0.2, Waveform::Square),
    tone(300.0, 0.2, 0.2, Waveform::Square),
    tone(150.0, 0.4, 0.5, Waveform::Triangle),
];
const HINT: [Tone; 1] = [tone(880.0, 0.0, 0.05, Waveform::Triangle)];
const STAGE_CLEAR: [Tone; 4] = [
    tone(523.0, 0.0, 0.1, Waveform::Square),
    tone(659.0, 0.08, 0.1, Waveform::Square),
    tone(784.0, 0.16, 0.1, Waveform::Square),
    tone(1047.0, 0.24, 0.3, Waveform::Sine),
];

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Success => "success",
            SoundEffect::Fail => "fail",
            SoundEffect::Elimination => "elimination",
            SoundEffect::Hint => "hint",
            SoundEffect::StageClear => "stage-clear",
        }
    }

    /// Effect for a platformer event, if it has one
    pub fn for_sim_event(event: SimEvent) -> Option<Self> {
        match event {
            SimEvent::StageCleared | SimEvent::AllStagesComplete => Some(SoundEffect::StageClear),
            SimEvent::StageFailed => Some(SoundEffect::Fail),
            SimEvent::InkExhausted => Some(SoundEffect::Hint),
            SimEvent::PlayStarted | SimEvent::Jumped | SimEvent::Landed => None,
        }
    }

    /// Notes making up the effect
    pub fn tones(&self) -> &'static [Tone] {
        match self {
            SoundEffect::Success => &SUCCESS,
            SoundEffect::Fail => &FAIL,
            SoundEffect::Elimination => &ELIMINATION,
            SoundEffect::Hint => &HINT,
            SoundEffect::StageClear => &STAGE_CLEAR,
        }
    }
}

/// Something that can actually make noise
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;
}

/// Backend that only logs what it would play (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
        let tones = effect.tones();
        let length = tones
            .iter()
            .map(|t| t.start + t.duration)
            .fold(0.0f32, f32::max);
        log::debug!(
            "Playing {} ({} tones, {:.2}s) at volume {:.2}",
            effect.as_str(),
            tones.len(),
            length,
            volume
        );
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("enabled", &self.backend.is_some())
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend: Some(backend),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// No backend: every trigger is a no-op
    pub fn silent() -> Self {
        Self {
            backend: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Use the backend if it came up, otherwise run silent
    pub fn from_result(backend: Result<Box<dyn AudioBackend>, AudioError>) -> Self {
        match backend {
            Ok(backend) => Self::new(backend),
            Err(e) => {
                log::warn!("{} - audio disabled", e);
                Self::silent()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(e) = backend.play(effect, vol) {
            log::warn!("Audio: {}", e);
        }
    }
}
