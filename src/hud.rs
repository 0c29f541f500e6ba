//! HUD text
//!
//! Plain strings; the presentation layer decides fonts and placement.

use crate::game::{Phase, Tournament};
use crate::settings::{GameFormat, Settings};
use crate::sim::{PlatformerState, StageOutcome, StagePhase};

/// Live length feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    TooLong,
    TooShort,
}

impl HintKind {
    /// Compare a preview estimate with the target
    pub fn from_estimate(estimate: f64, target: f64) -> Self {
        if estimate > target {
            HintKind::TooLong
        } else {
            HintKind::TooShort
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            HintKind::TooLong => "Too Long!",
            HintKind::TooShort => "Too Short!",
        }
    }
}

/// A hint on screen until `until`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hint {
    pub kind: HintKind,
    pub estimate: f64,
    pub target: f64,
    pub until: f64,
}

impl Hint {
    pub fn new(estimate: f64, target: f64, until: f64) -> Self {
        Self {
            kind: HintKind::from_estimate(estimate, target),
            estimate,
            target,
            until,
        }
    }

    pub fn is_visible(&self, now: f64) -> bool {
        now < self.until
    }

    pub fn text(&self) -> String {
        format!(
            "Current Length: {:.1}, Target: {:.1}, Diff: {:.1} ({})",
            self.estimate,
            self.target,
            (self.estimate - self.target).abs(),
            self.kind.text()
        )
    }
}

fn names(participants: &[usize]) -> String {
    participants
        .iter()
        .map(|p| format!("P{}", p + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Instruction lines for the drawing games
pub fn tournament_lines(
    t: &Tournament,
    settings: &Settings,
    last_estimate: Option<f64>,
    hint: Option<&Hint>,
    now: f64,
) -> Vec<String> {
    let mut lines = vec![format!("Difficulty: {}", settings.difficulty.as_str())];
    if settings.format == GameFormat::Tournament {
        lines.push(format!(
            "Round {}/{} - {} players left",
            t.round_number(),
            t.round_count(),
            t.active().len()
        ));
    }

    match t.phase() {
        Phase::PreGame | Phase::Game => {
            let heading = if t.phase() == Phase::PreGame {
                "Pre-game: closest draw goes last"
            } else {
                "Game"
            };
            lines.push(heading.to_string());
            if let Some(target) = t.current_target() {
                lines.push(format!("Target length: {:.0}", target));
            }
            if let Some(p) = t.current_participant() {
                match t.time_remaining(now) {
                    Some(left) => lines.push(format!("Player {}'s turn ({:.0}s left)", p + 1, left)),
                    None => lines.push(format!("Player {}'s turn", p + 1)),
                }
            }
            lines.push("Hold left mouse to draw, release to submit, right click to clear".into());
            if t.phase() == Phase::Game {
                lines.push(format!("Player order: {}", names(t.turn_order())));
            }
            if let Some(hint) = hint.filter(|h| h.is_visible(now)) {
                lines.push(hint.text());
            }
        }
        Phase::Elimination { .. } => {
            if let Some(&out) = t.eliminated().last() {
                lines.push(format!(
                    "Player {} eliminated (total off by {:.0})",
                    out + 1,
                    t.totals()[out]
                ));
            }
        }
        Phase::Result => {
            let round = t.current_round();
            for &w in t.winners() {
                let line = match round.main_deviation(w) {
                    Some(diff) => format!("Winner: Player {} (Difference: {:.1})", w + 1, diff),
                    None => format!("Winner: Player {}", w + 1),
                };
                lines.push(line);
            }
            if !t.eliminated().is_empty() {
                lines.push(format!("Eliminated: {}", names(t.eliminated())));
            }
        }
    }

    if let Some(estimate) = last_estimate {
        lines.push(format!("Last length: {:.0}", estimate));
    }
    let achievement = t.achievement();
    if achievement.unlocked {
        lines.push(format!(
            "Achievement unlocked: {} draws within {:.0}",
            achievement.goal, achievement.margin
        ));
    }
    lines
}

/// Instruction lines for the platformer
pub fn platformer_lines(state: &PlatformerState) -> Vec<String> {
    let stage = state.stage();
    let mut lines = vec![
        format!(
            "Stage {}/{}",
            state.stage_index + 1,
            state.settings.stages.len()
        ),
        format!("Ink: {:.0}/{:.0}", state.ink_used, stage.ink_budget),
        format!("Jumps: {}", state.actor.remaining_jumps),
    ];
    let status = match state.phase {
        StagePhase::Draw => "Draw platforms, press Enter to play",
        StagePhase::Play => "Arrows to move, Space to jump, reach the star",
        StagePhase::Result(StageOutcome::Cleared) => "Stage cleared! Press Enter for the next stage",
        StagePhase::Result(StageOutcome::Failed) => "Out of jumps! Press Enter to retry",
        StagePhase::Result(StageOutcome::Complete) => "All stages complete!",
    };
    lines.push(status.to_string());
    lines
}
