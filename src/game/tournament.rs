//! Round and tournament state machine
//!
//! A round is a pre-game (decides drawing order) followed by a scored game.
//! In the tournament format the participant with the largest running total
//! is eliminated after every round until one remains. The ranking format
//! plays a single round and crowns the closest drawers.

use super::policy::{
    DeviationRanking, RankingPolicy, RoundTargets, TargetPolicy, UniformTargets,
    min_deviation_winners,
};
use crate::deviation;
use crate::error::ConfigError;
use crate::settings::{GameFormat, Settings};

/// State machine phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Everyone draws once against the pre target
    PreGame,
    /// Scored drawing in play order against the main target
    Game,
    /// Holding on the elimination notice until `until`
    Elimination { until: f64 },
    /// Terminal
    Result,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreGame => "pre-game",
            Phase::Game => "game",
            Phase::Elimination { .. } => "elimination",
            Phase::Result => "result",
        }
    }

    /// Whether a participant is expected to draw
    pub fn is_drawing(&self) -> bool {
        matches!(self, Phase::PreGame | Phase::Game)
    }
}

/// One participant's draw in one phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub participant: usize,
    pub length: f64,
    pub deviation: f64,
    /// Turn ran out; `length` is recorded as 0
    pub forfeited: bool,
}

/// Everything recorded for one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRecord {
    pub targets: RoundTargets,
    pub pre: Vec<Score>,
    pub main: Vec<Score>,
    /// Pre-game ranking turned into drawing order
    pub play_order: Vec<usize>,
    pub eliminated: Option<usize>,
}

impl RoundRecord {
    fn new(targets: RoundTargets) -> Self {
        Self {
            targets,
            pre: Vec::new(),
            main: Vec::new(),
            play_order: Vec::new(),
            eliminated: None,
        }
    }

    /// Main-round deviation of a participant, if they drew
    pub fn main_deviation(&self, participant: usize) -> Option<f64> {
        self.main
            .iter()
            .find(|s| s.participant == participant)
            .map(|s| s.deviation)
    }
}

/// Session-long close-match counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Achievement {
    pub margin: f64,
    pub goal: u32,
    pub count: u32,
    pub unlocked: bool,
}

impl Achievement {
    pub fn new(margin: f64, goal: u32) -> Self {
        Self {
            margin,
            goal,
            count: 0,
            unlocked: false,
        }
    }

    /// Count a scored deviation. Returns `true` on the unlocking draw only.
    pub fn record(&mut self, deviation: f64) -> bool {
        if deviation > self.margin {
            return false;
        }
        self.count += 1;
        if !self.unlocked && self.count >= self.goal {
            self.unlocked = true;
            return true;
        }
        false
    }
}

/// Something the presentation layer may react to
#[derive(Debug, Clone, PartialEq)]
pub enum TournamentEvent {
    Scored(Score),
    PhaseChanged(Phase),
    Eliminated(usize),
    AchievementUnlocked,
    Finished { winners: Vec<usize> },
}

/// Timing and scoring knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TournamentRules {
    pub format: GameFormat,
    pub participants: usize,
    pub time_limit_secs: Option<f64>,
    pub elimination_hold_secs: f64,
    pub achievement_margin: f64,
    pub achievement_goal: u32,
}

impl TournamentRules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            format: settings.format,
            participants: settings.participants,
            time_limit_secs: settings.time_limit_secs(),
            elimination_hold_secs: settings.elimination_hold_secs,
            achievement_margin: settings.achievement_margin,
            achievement_goal: settings.achievement_goal,
        }
    }
}

/// The round state machine. Owns all scoring state.
pub struct Tournament {
    rules: TournamentRules,
    targets: Box<dyn TargetPolicy>,
    ranking: Box<dyn RankingPolicy>,
    phase: Phase,
    /// Remaining participants in id order
    active: Vec<usize>,
    /// Drawing order for the current phase
    turn_order: Vec<usize>,
    turn: usize,
    turn_started: Option<f64>,
    rounds: Vec<RoundRecord>,
    totals: Vec<f64>,
    eliminated: Vec<usize>,
    winners: Vec<usize>,
    achievement: Achievement,
}

impl std::fmt::Debug for Tournament {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tournament")
            .field("rules", &self.rules)
            .field("phase", &self.phase)
            .field("active", &self.active)
            .field("turn_order", &self.turn_order)
            .field("turn", &self.turn)
            .field("round", &self.rounds.len())
            .field("eliminated", &self.eliminated)
            .finish_non_exhaustive()
    }
}

impl Tournament {
    /// Tournament with uniform seeded targets from the difficulty range
    pub fn new(settings: &Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let targets = UniformTargets::new(settings.difficulty.target_range(), seed)?;
        Self::with_policies(
            TournamentRules::from_settings(settings),
            Box::new(targets),
            Box::new(DeviationRanking),
        )
    }

    pub fn with_policies(
        rules: TournamentRules,
        mut targets: Box<dyn TargetPolicy>,
        ranking: Box<dyn RankingPolicy>,
    ) -> Result<Self, ConfigError> {
        if rules.participants < 2 {
            return Err(ConfigError::TooFewParticipants {
                min: 2,
                got: rules.participants,
            });
        }
        let first = targets.next_targets();
        let active: Vec<usize> = (0..rules.participants).collect();
        log::info!(
            "Round 1: pre target {:.0}, main target {:.0}, {} participants",
            first.pre,
            first.main,
            rules.participants
        );
        Ok(Self {
            rules,
            targets,
            ranking,
            phase: Phase::PreGame,
            turn_order: active.clone(),
            active,
            turn: 0,
            turn_started: None,
            rounds: vec![RoundRecord::new(first)],
            totals: vec![0.0; rules.participants],
            eliminated: Vec::new(),
            winners: Vec::new(),
            achievement: Achievement::new(rules.achievement_margin, rules.achievement_goal),
        })
    }

    // === Accessors ===

    pub fn rules(&self) -> &TournamentRules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Result
    }

    /// Whose turn it is, while a drawing phase runs
    pub fn current_participant(&self) -> Option<usize> {
        if self.phase.is_drawing() {
            self.turn_order.get(self.turn).copied()
        } else {
            None
        }
    }

    /// Target the current drawer aims for
    pub fn current_target(&self) -> Option<f64> {
        let targets = self.current_round().targets;
        match self.phase {
            Phase::PreGame => Some(targets.pre),
            Phase::Game => Some(targets.main),
            _ => None,
        }
    }

    /// 1-based round number
    pub fn round_number(&self) -> usize {
        self.rounds.len()
    }

    /// Rounds a full game can take
    pub fn round_count(&self) -> usize {
        match self.rules.format {
            GameFormat::Ranking => 1,
            GameFormat::Tournament => self.rules.participants - 1,
        }
    }

    pub fn current_round(&self) -> &RoundRecord {
        // Construction pushes round 1 and rounds are never removed
        &self.rounds[self.rounds.len() - 1]
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn active(&self) -> &[usize] {
        &self.active
    }

    pub fn turn_order(&self) -> &[usize] {
        &self.turn_order
    }

    /// Running totals of main-round deviations, indexed by participant
    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    pub fn eliminated(&self) -> &[usize] {
        &self.eliminated
    }

    pub fn winners(&self) -> &[usize] {
        &self.winners
    }

    pub fn achievement(&self) -> &Achievement {
        &self.achievement
    }

    /// Seconds left in the current turn (None when untimed or not started)
    pub fn time_remaining(&self, now: f64) -> Option<f64> {
        let limit = self.rules.time_limit_secs?;
        let started = self.turn_started?;
        Some((limit - (now - started)).max(0.0))
    }

    // === Transitions ===

    /// Record the current drawer's estimated length
    ///
    /// Ignored outside the drawing phases.
    pub fn record_length(&mut self, length: f64, now: f64) -> Vec<TournamentEvent> {
        self.record(length.max(0.0), false, now)
    }

    /// Give up the current turn (recorded as length 0)
    pub fn forfeit(&mut self, now: f64) -> Vec<TournamentEvent> {
        self.record(0.0, true, now)
    }

    /// Poll timers: turn clock, time limit and the elimination hold
    pub fn update(&mut self, now: f64) -> Vec<TournamentEvent> {
        match self.phase {
            Phase::PreGame | Phase::Game => {
                let started = *self.turn_started.get_or_insert(now);
                match self.rules.time_limit_secs {
                    Some(limit) if now - started >= limit => {
                        log::info!(
                            "Participant {} ran out of time",
                            self.turn_order[self.turn] + 1
                        );
                        self.forfeit(now)
                    }
                    _ => Vec::new(),
                }
            }
            Phase::Elimination { until } if now >= until => self.start_next_round(),
            _ => Vec::new(),
        }
    }

    fn record(&mut self, length: f64, forfeited: bool, now: f64) -> Vec<TournamentEvent> {
        let Some(target) = self.current_target() else {
            return Vec::new();
        };
        assert!(
            !self.active.is_empty() && self.turn < self.turn_order.len(),
            "drawing phase without a drawer"
        );

        let participant = self.turn_order[self.turn];
        let score = Score {
            participant,
            length,
            deviation: deviation(length, target),
            forfeited,
        };
        log::debug!(
            "Participant {} drew {:.1} (target {:.0}, off by {:.1}){}",
            participant + 1,
            length,
            target,
            score.deviation,
            if forfeited { " [forfeit]" } else { "" }
        );

        let mut events = vec![TournamentEvent::Scored(score)];
        let in_game = self.phase == Phase::Game;
        let round = self.rounds.len() - 1;
        if in_game {
            self.rounds[round].main.push(score);
            if self.achievement.record(score.deviation) {
                log::info!("Achievement unlocked after {} close draws", self.achievement.count);
                events.push(TournamentEvent::AchievementUnlocked);
            }
        } else {
            self.rounds[round].pre.push(score);
        }

        self.turn += 1;
        self.turn_started = None;
        if self.turn < self.turn_order.len() {
            return events;
        }

        if in_game {
            self.finish_game(now, &mut events);
        } else {
            self.finish_pre_game(&mut events);
        }
        events
    }

    fn finish_pre_game(&mut self, events: &mut Vec<TournamentEvent>) {
        let round = self.rounds.len() - 1;
        let scores: Vec<(usize, f64)> = self.rounds[round]
            .pre
            .iter()
            .map(|s| (s.participant, s.deviation))
            .collect();
        let ranked = self.ranking.rank(&scores);
        let order = self.ranking.play_order(&ranked);
        log::info!(
            "Round {} play order: {:?}",
            round + 1,
            order.iter().map(|p| p + 1).collect::<Vec<_>>()
        );

        self.rounds[round].play_order = order.clone();
        self.turn_order = order;
        self.turn = 0;
        self.set_phase(Phase::Game, events);
    }

    fn finish_game(&mut self, now: f64, events: &mut Vec<TournamentEvent>) {
        let round = self.rounds.len() - 1;
        for score in &self.rounds[round].main {
            self.totals[score.participant] += score.deviation;
        }

        match self.rules.format {
            GameFormat::Ranking => {
                let scores: Vec<(usize, f64)> = self.rounds[round]
                    .main
                    .iter()
                    .map(|s| (s.participant, s.deviation))
                    .collect();
                self.winners = min_deviation_winners(&scores);
                self.finish(events);
            }
            GameFormat::Tournament => {
                let totals: Vec<(usize, f64)> = self
                    .turn_order
                    .iter()
                    .map(|&p| (p, self.totals[p]))
                    .collect();
                let Some(out) = self.ranking.eliminate(&totals) else {
                    panic!("no active participant to eliminate");
                };
                self.active.retain(|&p| p != out);
                self.eliminated.push(out);
                self.rounds[round].eliminated = Some(out);
                log::info!(
                    "Participant {} eliminated (total deviation {:.1}), {} remain",
                    out + 1,
                    self.totals[out],
                    self.active.len()
                );
                events.push(TournamentEvent::Eliminated(out));

                if self.active.len() == 1 {
                    self.winners = self.active.clone();
                    self.finish(events);
                } else {
                    let until = now + self.rules.elimination_hold_secs;
                    self.set_phase(Phase::Elimination { until }, events);
                }
            }
        }
        debug_assert_eq!(
            self.active.len() + self.eliminated.len(),
            self.rules.participants
        );
    }

    fn start_next_round(&mut self) -> Vec<TournamentEvent> {
        let mut events = Vec::new();
        let targets = self.targets.next_targets();
        self.rounds.push(RoundRecord::new(targets));
        self.turn_order = self.active.clone();
        self.turn = 0;
        self.turn_started = None;
        log::info!(
            "Round {}: pre target {:.0}, main target {:.0}, {} participants",
            self.rounds.len(),
            targets.pre,
            targets.main,
            self.active.len()
        );
        self.set_phase(Phase::PreGame, &mut events);
        events
    }

    fn finish(&mut self, events: &mut Vec<TournamentEvent>) {
        log::info!(
            "Game over, winner(s): {:?}",
            self.winners.iter().map(|p| p + 1).collect::<Vec<_>>()
        );
        self.set_phase(Phase::Result, events);
        events.push(TournamentEvent::Finished {
            winners: self.winners.clone(),
        });
    }

    fn set_phase(&mut self, phase: Phase, events: &mut Vec<TournamentEvent>) {
        log::info!("Phase {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        events.push(TournamentEvent::PhaseChanged(phase));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::policy::FixedTargets;
    use crate::settings::Difficulty;

    fn rules(format: GameFormat, participants: usize) -> TournamentRules {
        TournamentRules {
            format,
            participants,
            time_limit_secs: Some(15.0),
            elimination_hold_secs: 2.0,
            achievement_margin: 100.0,
            achievement_goal: 3,
        }
    }

    fn fixed(pre: f64, main: f64, format: GameFormat, participants: usize) -> Tournament {
        Tournament::with_policies(
            rules(format, participants),
            Box::new(FixedTargets(RoundTargets { pre, main })),
            Box::new(DeviationRanking),
        )
        .unwrap()
    }

    fn draw_all(t: &mut Tournament, lengths: &[f64], now: f64) -> Vec<TournamentEvent> {
        lengths
            .iter()
            .flat_map(|&l| t.record_length(l, now))
            .collect()
    }

    #[test]
    fn test_best_pre_game_drawer_plays_last() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Tournament, 3);
        assert_eq!(t.current_target(), Some(2000.0));
        draw_all(&mut t, &[1800.0, 2100.0, 2050.0], 0.0);

        assert_eq!(t.phase(), Phase::Game);
        let devs: Vec<f64> = t.current_round().pre.iter().map(|s| s.deviation).collect();
        assert_eq!(devs, vec![200.0, 100.0, 50.0]);
        assert_eq!(t.turn_order(), &[1, 0, 2]);
        assert_eq!(*t.turn_order().last().unwrap(), 2);
        assert_eq!(t.current_participant(), Some(1));
        assert_eq!(t.current_target(), Some(3000.0));
    }

    #[test]
    fn test_largest_main_deviation_eliminated() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Tournament, 3);
        draw_all(&mut t, &[1800.0, 2100.0, 2050.0], 0.0);
        // Play order is [1, 0, 2]; give participant 1 the 200 miss
        let events = draw_all(&mut t, &[3200.0, 2900.0, 3100.0], 5.0);

        assert!(events.contains(&TournamentEvent::Eliminated(1)));
        assert_eq!(t.eliminated(), &[1]);
        assert_eq!(t.active(), &[0, 2]);
        assert_eq!(t.phase(), Phase::Elimination { until: 7.0 });
        assert_eq!(t.totals(), &[100.0, 200.0, 100.0]);
    }

    #[test]
    fn test_elimination_hold_then_next_round() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Tournament, 3);
        draw_all(&mut t, &[1800.0, 2100.0, 2050.0], 0.0);
        draw_all(&mut t, &[3200.0, 2900.0, 3100.0], 5.0);

        assert!(t.update(6.9).is_empty());
        let events = t.update(7.0);
        assert_eq!(events, vec![TournamentEvent::PhaseChanged(Phase::PreGame)]);
        assert_eq!(t.round_number(), 2);
        assert_eq!(t.turn_order(), &[0, 2]);
        assert_eq!(t.current_participant(), Some(0));
    }

    #[test]
    fn test_record_ignored_outside_drawing() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Tournament, 3);
        draw_all(&mut t, &[1800.0, 2100.0, 2050.0], 0.0);
        draw_all(&mut t, &[3200.0, 2900.0, 3100.0], 5.0);
        assert!(t.record_length(1234.0, 5.5).is_empty());
        assert!(t.forfeit(5.5).is_empty());
        assert_eq!(t.current_round().main.len(), 3);
    }

    #[test]
    fn test_full_tournament_single_winner() {
        let settings = Settings {
            participants: 5,
            ..Settings::from_difficulty(Difficulty::Normal)
        };
        let mut t = Tournament::new(&settings, 1234).unwrap();
        assert_eq!(t.round_count(), 4);

        let mut now = 0.0;
        let mut finished = None;
        for _ in 0..1000 {
            now += 0.5;
            t.update(now);
            if let Some(p) = t.current_participant() {
                // Deterministic but uneven skill
                let target = t.current_target().unwrap();
                let events = t.record_length(target + 37.0 * (p as f64 + 1.0), now);
                for e in events {
                    if let TournamentEvent::Finished { winners } = e {
                        finished = Some(winners);
                    }
                }
            }
            if t.is_finished() {
                break;
            }
        }

        let winners = finished.expect("tournament should finish");
        assert_eq!(winners.len(), 1);
        assert_eq!(t.active().len(), 1);
        assert_eq!(t.eliminated().len(), 4);
        let mut distinct = t.eliminated().to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 4);
        assert!(!t.eliminated().contains(&winners[0]));
        assert_eq!(t.round_number(), 4);
        // Worst drawer leaves first
        assert_eq!(t.eliminated(), &[4, 3, 2, 1]);
        assert_eq!(winners, vec![0]);
    }

    #[test]
    fn test_seeded_targets_identical() {
        let settings = Settings::default();
        let a = Tournament::new(&settings, 77).unwrap();
        let b = Tournament::new(&settings, 77).unwrap();
        assert_eq!(a.current_round().targets, b.current_round().targets);
        let c = Tournament::new(&settings, 78).unwrap();
        assert_ne!(a.current_round().targets, c.current_round().targets);
    }

    #[test]
    fn test_time_limit_forfeits_turn() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Tournament, 3);
        // Clock starts at the first poll of the turn
        assert!(t.update(100.0).is_empty());
        assert_eq!(t.time_remaining(110.0), Some(5.0));
        assert!(t.update(114.9).is_empty());
        let events = t.update(115.0);
        let TournamentEvent::Scored(score) = events[0].clone() else {
            panic!("expected a score, got {:?}", events);
        };
        assert!(score.forfeited);
        assert_eq!(score.length, 0.0);
        assert_eq!(score.deviation, 2000.0);
        assert_eq!(t.current_participant(), Some(1));
        assert_eq!(t.time_remaining(115.0), None);
    }

    #[test]
    fn test_untimed_turns_never_forfeit() {
        let mut r = rules(GameFormat::Tournament, 2);
        r.time_limit_secs = None;
        let mut t = Tournament::with_policies(
            r,
            Box::new(FixedTargets(RoundTargets {
                pre: 1000.0,
                main: 1000.0,
            })),
            Box::new(DeviationRanking),
        )
        .unwrap();
        assert!(t.update(0.0).is_empty());
        assert!(t.update(10_000.0).is_empty());
        assert_eq!(t.current_participant(), Some(0));
    }

    #[test]
    fn test_all_forfeits_still_finish() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Tournament, 2);
        let mut now = 0.0;
        while !t.is_finished() {
            t.update(now);
            now += 1.0;
            assert!(now < 500.0, "tournament stalled in {:?}", t.phase());
        }
        assert_eq!(t.eliminated().len(), 1);
        assert_eq!(t.winners().len(), 1);
    }

    #[test]
    fn test_ranking_format_ties_kept() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Ranking, 3);
        assert_eq!(t.round_count(), 1);
        draw_all(&mut t, &[1800.0, 2100.0, 2050.0], 0.0);
        // Play order [1, 0, 2]
        let events = draw_all(&mut t, &[2900.0, 3200.0, 3100.0], 1.0);
        assert_eq!(t.phase(), Phase::Result);
        assert_eq!(t.winners(), &[1, 2]);
        assert!(t.eliminated().is_empty());
        assert!(events.contains(&TournamentEvent::Finished {
            winners: vec![1, 2]
        }));
    }

    #[test]
    fn test_achievement_unlocks_once() {
        let mut t = fixed(2000.0, 3000.0, GameFormat::Ranking, 4);
        draw_all(&mut t, &[2000.0, 2000.0, 2000.0, 2000.0], 0.0);
        // Pre-game draws never count
        assert_eq!(t.achievement().count, 0);
        let events = draw_all(&mut t, &[3000.0, 3050.0, 2900.0, 3500.0], 1.0);
        let unlocks = events
            .iter()
            .filter(|e| **e == TournamentEvent::AchievementUnlocked)
            .count();
        assert_eq!(unlocks, 1);
        assert_eq!(t.achievement().count, 3);
        assert!(t.achievement().unlocked);
    }

    #[test]
    fn test_too_few_participants() {
        let r = rules(GameFormat::Tournament, 1);
        assert!(matches!(
            Tournament::with_policies(
                r,
                Box::new(FixedTargets(RoundTargets {
                    pre: 1.0,
                    main: 1.0
                })),
                Box::new(DeviationRanking),
            ),
            Err(ConfigError::TooFewParticipants { .. })
        ));
    }
}
