//! Discretized input delivered by the platform layer once per tick

use glam::Vec2;

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// Keys the games react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Jump,
    Confirm,
}

/// A single discrete event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { button: Button, pos: Vec2 },
    PointerUp { button: Button, pos: Vec2 },
    PointerMove { pos: Vec2 },
    KeyDown(Key),
}

/// Movement keys are polled as held state, not events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}

/// Everything the core sees for one tick
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub events: Vec<InputEvent>,
    pub held: HeldKeys,
    /// Wall-clock time in seconds (monotonic)
    pub now: f64,
}

impl FrameInput {
    /// An event-free frame at `now`
    pub fn idle(now: f64) -> Self {
        Self {
            now,
            ..Default::default()
        }
    }

    pub fn with_events(now: f64, events: Vec<InputEvent>) -> Self {
        Self {
            events,
            now,
            ..Default::default()
        }
    }
}
