pub mod interval;
pub mod registry;

pub use interval::{TimeInterval, TimeIntervalWithContext};
pub use registry::{FlagCounters, Player, PlayerKey, PlayerRegistry};
