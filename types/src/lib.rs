pub mod config;
pub mod formatting;
pub mod vocab;

pub use config::{MapTriggerConfig, MapTriggerKind, MvpWeights, StatsConfig};
pub use vocab::{BuildingKind, PlayerClass, TeamColor, TeamRole, Weapon};
