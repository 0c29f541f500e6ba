//! Drawing games: round/tournament state machine and the session driving it

pub mod policy;
pub mod session;
pub mod tournament;

pub use policy::{
    DeviationRanking, FixedTargets, RankingPolicy, RoundTargets, TargetPolicy, UniformTargets,
    min_deviation_winners,
};
pub use session::DrawingSession;
pub use tournament::{
    Achievement, Phase, RoundRecord, Score, Tournament, TournamentEvent, TournamentRules,
};
