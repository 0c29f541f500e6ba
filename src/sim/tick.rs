//! Fixed timestep platformer tick
//!
//! One call per rendered frame. Physics constants are in pixels per tick.

use glam::Vec2;

use super::collision::{DownwardLanding, LandingRule, Platform, PlatformResolution, resolve_platforms};
use super::state::{Actor, PlatformerState, SimEvent, StageOutcome, StagePhase};
use crate::input::{Button, FrameInput, HeldKeys, InputEvent, Key};
use crate::settings::PlatformerSettings;

/// Advance the platformer by one tick with the default landing rule
pub fn tick(state: &mut PlatformerState, input: &FrameInput) -> Vec<SimEvent> {
    tick_with_rule(state, input, &DownwardLanding)
}

/// Advance the platformer by one tick
pub fn tick_with_rule(
    state: &mut PlatformerState,
    input: &FrameInput,
    rule: &dyn LandingRule,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    state.time_ticks += 1;

    for event in &input.events {
        match state.phase {
            StagePhase::Draw => handle_draw_event(state, event, &mut events),
            StagePhase::Play => {
                if let InputEvent::KeyDown(Key::Jump) = event {
                    if state.actor.jump(state.settings.jump_impulse) {
                        events.push(SimEvent::Jumped);
                    }
                }
            }
            StagePhase::Result(outcome) => {
                if let InputEvent::KeyDown(Key::Confirm) = event {
                    match outcome {
                        StageOutcome::Cleared => state.next_stage(),
                        StageOutcome::Failed => state.reset_stage(),
                        StageOutcome::Complete => {}
                    }
                }
            }
        }
    }

    if state.phase == StagePhase::Play {
        apply_held_keys(&mut state.actor, input.held, state.settings.move_speed);
        let was_grounded = state.actor.on_ground;
        step_actor(
            &mut state.actor,
            &state.platforms,
            &state.settings,
            state.gravity,
            rule,
        );
        if state.actor.on_ground && !was_grounded {
            events.push(SimEvent::Landed);
        }

        if state.star_reached() {
            let outcome = if state.is_last_stage() {
                events.push(SimEvent::AllStagesComplete);
                StageOutcome::Complete
            } else {
                events.push(SimEvent::StageCleared);
                StageOutcome::Cleared
            };
            log::info!("Stage {} result: {:?}", state.stage_index + 1, outcome);
            state.phase = StagePhase::Result(outcome);
        } else if state.actor.remaining_jumps == 0 && !state.actor.on_ground {
            log::info!("Stage {} failed: out of jumps", state.stage_index + 1);
            events.push(SimEvent::StageFailed);
            state.phase = StagePhase::Result(StageOutcome::Failed);
        }
    }

    events
}

fn handle_draw_event(state: &mut PlatformerState, event: &InputEvent, events: &mut Vec<SimEvent>) {
    match *event {
        InputEvent::PointerDown {
            button: Button::Left,
            pos,
        } => {
            if state.ink_remaining() > 0.0 {
                state.recorder.begin_at(pos);
            }
        }
        InputEvent::PointerMove { pos } => {
            if state.recorder.is_recording() {
                extend_ink(state, pos, events);
            }
        }
        InputEvent::PointerUp {
            button: Button::Left,
            ..
        } => {
            finalize_stroke(state);
        }
        InputEvent::KeyDown(Key::Confirm) => {
            finalize_stroke(state);
            start_play(state, events);
        }
        _ => {}
    }
}

/// Extend the stroke toward `pos`, truncating at the ink budget
fn extend_ink(state: &mut PlatformerState, pos: Vec2, events: &mut Vec<SimEvent>) {
    let Some(last) = state.recorder.last() else {
        return;
    };
    let seg = last.distance(pos);
    let remaining = state.ink_remaining();

    if seg <= remaining {
        if state.recorder.push(pos) {
            state.ink_used += seg;
        }
        return;
    }

    // Only part of this segment fits
    let end = last + (pos - last).normalize_or_zero() * remaining;
    state.recorder.push(end);
    state.ink_used = state.stage().ink_budget;
    log::debug!("Ink budget exhausted at ({:.1}, {:.1})", end.x, end.y);
    events.push(SimEvent::InkExhausted);
    finalize_stroke(state);
    start_play(state, events);
}

/// Turn the recorded stroke into platforms, one per sample pair
fn finalize_stroke(state: &mut PlatformerState) {
    if !state.recorder.is_recording() {
        return;
    }
    let stroke = state.recorder.finish();
    if stroke.len() < 2 {
        return;
    }
    state.platforms.extend(
        stroke
            .points()
            .windows(2)
            .map(|w| Platform::new(w[0], w[1])),
    );
    log::debug!(
        "Stroke added {} platforms ({:.1} ink used)",
        stroke.len() - 1,
        state.ink_used
    );
}

fn start_play(state: &mut PlatformerState, events: &mut Vec<SimEvent>) {
    if state.phase == StagePhase::Draw {
        state.phase = StagePhase::Play;
        events.push(SimEvent::PlayStarted);
        log::info!(
            "Stage {} play started with {} platforms",
            state.stage_index + 1,
            state.platforms.len()
        );
    }
}

/// Held movement keys set horizontal velocity directly
pub fn apply_held_keys(actor: &mut Actor, held: HeldKeys, move_speed: f32) {
    actor.vel.x = if held.left {
        -move_speed
    } else if held.right {
        move_speed
    } else {
        0.0
    };
}

/// One physics step: gravity, integrate, clamp, ground plane, then platforms
pub fn step_actor(
    actor: &mut Actor,
    platforms: &[Platform],
    settings: &PlatformerSettings,
    gravity: f32,
    rule: &dyn LandingRule,
) -> PlatformResolution {
    actor.vel.y += gravity;
    actor.pos += actor.vel;

    // Screen bounds
    let r = actor.radius;
    actor.pos.x = actor.pos.x.clamp(r, (settings.surface_width - r).max(r));
    if actor.pos.y < r {
        actor.pos.y = r;
        actor.vel.y = actor.vel.y.max(0.0);
    }

    // Ground plane first
    let floor = settings.floor_y();
    if actor.pos.y + r > floor {
        actor.land(floor - r);
    } else {
        actor.on_ground = false;
    }

    resolve_platforms(actor, platforms, rule)
}
