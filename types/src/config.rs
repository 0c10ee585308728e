//! Stats configuration, loaded from TOML by `tfstats-core`.

use serde::{Deserialize, Serialize};

use crate::vocab::TeamColor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Seconds a conc grenade keeps its victim "conced".
    pub conc_duration_secs: i64,
    /// Medics shake off concs faster: the window is divided by this.
    pub medic_conc_divisor: i64,
    /// Points credited per capture when the log carries no team score.
    pub default_points_per_cap: i64,
    /// Value of a bonus capture relative to a regular one when estimating
    /// points-per-capture from the final score.
    pub bonus_capture_ratio: f64,
    pub mvp: MvpWeights,
    /// Extra map trigger rules, consulted after the built-in table.
    pub map_triggers: Vec<MapTriggerConfig>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            conc_duration_secs: 10,
            medic_conc_divisor: 2,
            default_points_per_cap: 10,
            bonus_capture_ratio: 0.5,
            mvp: MvpWeights::default(),
            map_triggers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MvpWeights {
    pub kill: i64,
    pub sentry_kill: i64,
    pub touch: i64,
    pub initial_touch: i64,
    pub capture_bonus: i64,
    /// Subtracted per team-kill.
    pub team_kill: i64,
}

impl Default for MvpWeights {
    fn default() -> Self {
        Self {
            kill: 1,
            sentry_kill: 2,
            touch: 1,
            initial_touch: 2,
            capture_bonus: 3,
            team_kill: 2,
        }
    }
}

/// What a map-specific trigger string means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapTriggerKind {
    FlagPickup,
    BonusFlagPickup,
    FlagThrow,
    FlagCapture,
    BonusFlagCapture,
    PointCapture,
    FlagReturn,
    /// Known noise; recognized so it is not reported as unknown.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTriggerConfig {
    pub trigger: String,
    pub kind: MapTriggerKind,
    #[serde(default)]
    pub team: Option<TeamColor>,
    /// Match as a prefix instead of the whole trigger string.
    #[serde(default)]
    pub prefix: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: StatsConfig = toml::from_str("").unwrap();
        assert_eq!(config, StatsConfig::default());
        assert_eq!(config.default_points_per_cap, 10);
    }

    #[test]
    fn parse_map_triggers() {
        let toml = r#"
conc_duration_secs = 8

[mvp]
kill = 2

[[map_triggers]]
trigger = "Yellow Flag"
kind = "flag_pickup"

[[map_triggers]]
trigger = "red_det"
kind = "flag_return"
team = "red"
prefix = true
"#;

        let config: StatsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.conc_duration_secs, 8);
        assert_eq!(config.medic_conc_divisor, 2);
        assert_eq!(config.mvp.kill, 2);
        assert_eq!(config.mvp.sentry_kill, 2);
        assert_eq!(config.map_triggers.len(), 2);
        assert_eq!(config.map_triggers[0].kind, MapTriggerKind::FlagPickup);
        assert_eq!(config.map_triggers[0].team, None);
        assert_eq!(config.map_triggers[1].team, Some(TeamColor::Red));
        assert!(config.map_triggers[1].prefix);
    }
}
