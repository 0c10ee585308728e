//! The standard pipeline subscribers.

pub mod class;
pub mod debuff;
pub mod flag;
pub mod match_bounds;
pub mod team;


pub use class::ClassTracker;
pub use debuff::DebuffTracker;
pub use flag::FlagTracker;
pub use match_bounds::MatchBoundsCuller;
pub use team::TeamTracker;
