//! Deterministic platformer simulation
//!
//! Everything here is pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Platforms resolved in insertion order
//! - No rendering or audio dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{
    Contact, DownwardLanding, LandingRule, Platform, PlatformResolution, circle_platform_contact,
    resolve_platforms,
};
pub use state::{Actor, PlatformerState, SimEvent, StageOutcome, StagePhase};
pub use tick::{apply_held_keys, step_actor, tick, tick_with_rule};
