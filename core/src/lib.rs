pub mod config;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod players;
pub mod round;
pub mod stats;
pub mod trackers;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::{ConfigError, default_config_path, load_config, load_config_or_default};
pub use error::{MatchError, ParseError, RoundError, TrackerError};
pub use log::{Event, EventKind, LineParser, decode_log};
pub use pipeline::{EventSubscriber, Phase, RoundProcessor, RoundState};
pub use players::{Player, PlayerKey, PlayerRegistry};
pub use round::{ParsedMatch, ParsedRound, process_match, process_round};
pub use stats::{OutputStats, aggregate};
