//! Crofton Draw entry point
//!
//! Headless runner: plays a scripted drawing tournament and a scripted
//! platformer run, logging what happens. Platformer frames go to an
//! in-memory canvas; windowing belongs to a platform layer this binary does
//! not ship.
//!
//! Usage: `crofton-draw [settings.json] [seed]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crofton_draw::audio::{AudioBackend, AudioManager, LogBackend, SoundEffect};
use crofton_draw::consts::TICK_RATE;
use crofton_draw::game::{DrawingSession, TournamentEvent};
use crofton_draw::input::{Button, FrameInput, HeldKeys, InputEvent, Key};
use crofton_draw::raster::Canvas;
use crofton_draw::sim::{self, PlatformerState, SimEvent, StageOutcome, StagePhase};
use crofton_draw::{PlatformerSettings, Settings, hud};

/// Give up on a scripted run after this many frames
const MAX_FRAMES: u64 = 200_000;
const MAX_STAGE_ATTEMPTS: u32 = 3;
const MAX_PLAY_TICKS: u32 = 900;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Crofton Draw (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    let seed = match args.next() {
        Some(s) => s.parse()?,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    };
    log::info!("Seed: {}", seed);

    run_tournament(settings, seed)?;
    run_platformer(PlatformerSettings::default(), seed)?;
    Ok(())
}

/// A wobbly hand-drawn path of `samples` moves starting near `start`
fn scribble(rng: &mut Pcg32, start: Vec2, samples: usize, bounds: Vec2) -> Vec<Vec2> {
    let mut heading = rng.random_range(0.0..std::f32::consts::TAU);
    let mut pos = start;
    let mut points = vec![pos];
    for _ in 0..samples {
        heading += rng.random_range(-0.35..0.35);
        pos += Vec2::from_angle(heading) * 8.0;
        if pos.x < 10.0 || pos.x > bounds.x - 10.0 || pos.y < 10.0 || pos.y > bounds.y - 10.0 {
            heading += std::f32::consts::PI;
            pos = pos.clamp(Vec2::splat(10.0), bounds - 10.0);
        }
        points.push(pos);
    }
    points
}

fn run_tournament(settings: Settings, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let bounds = Vec2::new(settings.surface_width as f32, settings.surface_height as f32);
    let mut session = DrawingSession::new(settings, seed)?;
    let backend: Box<dyn AudioBackend> = Box::new(LogBackend);
    session.set_audio(AudioManager::new(backend));

    let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);
    let dt = 1.0 / TICK_RATE as f64;
    let mut now = 0.0;
    let mut frames = 0u64;
    let mut script: Vec<InputEvent> = Vec::new();

    while !session.tournament().is_finished() {
        frames += 1;
        if frames > MAX_FRAMES {
            log::warn!("Tournament script gave up after {} frames", MAX_FRAMES);
            break;
        }
        now += dt;

        // Queue the next drawer's stroke, one sample per frame
        if script.is_empty() && session.participant().is_some() {
            let samples = rng.random_range(40..250);
            let start = Vec2::new(
                rng.random_range(50.0..bounds.x - 50.0),
                rng.random_range(50.0..bounds.y - 50.0),
            );
            let points = scribble(&mut rng, start, samples, bounds);
            script.push(InputEvent::PointerUp {
                button: Button::Left,
                pos: points[points.len() - 1],
            });
            script.extend(
                points[1..]
                    .iter()
                    .rev()
                    .map(|&pos| InputEvent::PointerMove { pos }),
            );
            script.push(InputEvent::PointerDown {
                button: Button::Left,
                pos: points[0],
            });
        }

        let events: Vec<InputEvent> = script.pop().into_iter().collect();
        for event in session.update(&FrameInput::with_events(now, events)) {
            match event {
                TournamentEvent::PhaseChanged(_) | TournamentEvent::Eliminated(_) => {
                    for line in session.hud_lines() {
                        log::info!("  | {}", line);
                    }
                }
                TournamentEvent::Finished { winners } => {
                    log::info!(
                        "Tournament finished after {:.1}s: winners {:?}",
                        now,
                        winners.iter().map(|p| p + 1).collect::<Vec<_>>()
                    );
                }
                _ => {}
            }
        }
        // A forfeit or phase change drops whatever was still queued
        if session.participant().is_none() {
            script.clear();
        }
    }
    Ok(())
}

fn react(audio: &mut AudioManager, events: Vec<SimEvent>) {
    for effect in events.into_iter().filter_map(SoundEffect::for_sim_event) {
        audio.play(effect);
    }
}

fn run_platformer(settings: PlatformerSettings, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut canvas = Canvas::new(settings.surface_width as u32, settings.surface_height as u32);
    let mut state = PlatformerState::new(settings, seed)?;
    let mut audio = AudioManager::new(Box::new(LogBackend));
    let dt = 1.0 / TICK_RATE as f64;
    let mut now = 0.0;
    let mut attempts = 0;

    loop {
        match state.phase {
            StagePhase::Draw => {
                attempts += 1;
                // A ramp from just above the actor up to beneath the star
                let from = state.actor.pos + Vec2::new(30.0, -40.0);
                let to = state.star + Vec2::new(0.0, state.actor.radius * 2.0);
                let mut events = vec![InputEvent::PointerDown {
                    button: Button::Left,
                    pos: from,
                }];
                events.extend((1..=40).map(|i| InputEvent::PointerMove {
                    pos: from.lerp(to, i as f32 / 40.0),
                }));
                events.push(InputEvent::PointerUp {
                    button: Button::Left,
                    pos: to,
                });
                events.push(InputEvent::KeyDown(Key::Confirm));
                now += dt;
                react(&mut audio, sim::tick(&mut state, &FrameInput::with_events(now, events)));
                state.render(&mut canvas);
            }
            StagePhase::Play => {
                let mut ticks = 0;
                while state.phase == StagePhase::Play && ticks < MAX_PLAY_TICKS {
                    ticks += 1;
                    now += dt;
                    let dx = state.star.x - state.actor.pos.x;
                    let held = HeldKeys {
                        left: dx < -5.0,
                        right: dx > 5.0,
                    };
                    let mut events = Vec::new();
                    if ticks == 2 {
                        events.push(InputEvent::KeyDown(Key::Jump));
                    }
                    let input = FrameInput {
                        events,
                        held,
                        now,
                    };
                    let events = sim::tick(&mut state, &input);
                    if events.contains(&SimEvent::Jumped) {
                        log::debug!("Jumped, {} left", state.actor.remaining_jumps);
                    }
                    react(&mut audio, events);
                    state.render(&mut canvas);
                }
                if state.phase == StagePhase::Play {
                    log::info!("Stage {} timed out", state.stage_index + 1);
                    break;
                }
            }
            StagePhase::Result(StageOutcome::Complete) => {
                log::info!("All stages complete");
                break;
            }
            StagePhase::Result(outcome) => {
                for line in hud::platformer_lines(&state) {
                    log::info!("  | {}", line);
                }
                if outcome == StageOutcome::Cleared {
                    attempts = 0;
                } else if attempts >= MAX_STAGE_ATTEMPTS {
                    log::info!("Giving up on stage {}", state.stage_index + 1);
                    break;
                }
                now += dt;
                let input = FrameInput::with_events(now, vec![InputEvent::KeyDown(Key::Confirm)]);
                react(&mut audio, sim::tick(&mut state, &input));
                state.render(&mut canvas);
            }
        }
    }
    Ok(())
}
