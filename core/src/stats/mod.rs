//! Round statistics, derived from the finished event sequence and round state.

pub mod comparison;
pub mod counters;
pub mod facets;
pub mod flag_time;
pub mod teams;
pub mod time_series;

#[cfg(test)]
mod stats_tests;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tfstats_types::{StatsConfig, TeamColor};
use tracing::warn;

use crate::log::{Event, EventKind};
use crate::pipeline::RoundState;
use crate::players::PlayerKey;

pub use comparison::{DefenseDelta, MvpAward, OffenseDelta, RoundComparison, compare_rounds, match_mvp};
pub use counters::{Counter, CounterTable, Credit};
pub use facets::{
    BuildableStats, CounterGroups, DamageStats, DeathStats, Facet, KillStats, ObjectiveStats, Stat, SupportStats,
    WeaponryStats,
};
pub use teams::{ClassUsage, PlayerOutputStatsRound, TeamStats};
pub use time_series::ScoreSample;

/// Flag outcome for one team, whatever its role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamFlagSummary {
    pub captures: u32,
    pub bonus_captures: u32,
    pub touched: bool,
    pub points_per_cap: f64,
    /// True when the score came from a team score line.
    pub score_from_log: bool,
}

/// Everything computed for one round. Maps are keyed by team number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputStats {
    pub map: Option<String>,
    pub server: Option<String>,
    /// `map-yyyymmdd-hhmm`
    pub parse_name: String,
    pub date: Option<NaiveDateTime>,
    pub game_time_secs: i64,
    pub score: BTreeMap<u8, i64>,
    pub flags: BTreeMap<u8, TeamFlagSummary>,
    pub teams: BTreeMap<u8, TeamStats>,
    pub score_timeline: BTreeMap<u8, Vec<ScoreSample>>,
}

fn first_text(events: &[Event], kind: EventKind) -> Option<String> {
    events
        .iter()
        .find(|e| e.kind == kind)
        .and_then(|e| e.data.text.clone())
}

fn parse_name(map: Option<&str>, date: Option<NaiveDateTime>) -> String {
    let slug: String = map
        .unwrap_or("unknown")
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' }
        })
        .collect();
    match date {
        Some(date) => format!("{slug}-{}", date.format("%Y%m%d-%H%M")),
        None => slug,
    }
}

/// Build the round's output from the finished pipeline. Reads `state`, never
/// mutates it, so running it twice yields identical output.
pub fn aggregate(events: &[Event], state: &RoundState, config: &StatsConfig) -> OutputStats {
    let duration = state.round_end();
    let players = &state.players;
    let table = CounterTable::from_events(events, players);
    let carry_times = flag_time::carry_times(events, players, duration);

    for player in players.iter() {
        let derived = carry_times.get(&player.key).copied().unwrap_or(0);
        if derived != player.flag.carry_time_secs {
            warn!(
                player = player.display_name(),
                team = player.team.as_str(),
                tracked = player.flag.carry_time_secs,
                derived,
                "Flag carry time mismatch"
            );
        }
    }

    let mut team_colors: Vec<TeamColor> = state.teams.teams().collect();
    team_colors.extend(state.flags.estimates.keys().copied());
    team_colors.sort();
    team_colors.dedup();

    let mut score = BTreeMap::new();
    let mut flags = BTreeMap::new();
    let mut teams = BTreeMap::new();
    for color in team_colors {
        let Some(number) = color.team_number() else { continue };
        let estimate = state.flags.estimates.get(&color);
        let team_score = estimate.map_or(0, |e| e.score);
        score.insert(number, team_score);

        let flag = state.flags.team(color).copied().unwrap_or_default();
        flags.insert(
            number,
            TeamFlagSummary {
                captures: flag.captures,
                bonus_captures: flag.bonus_captures,
                touched: flag.touched,
                points_per_cap: estimate.map_or(config.default_points_per_cap as f64, |e| e.points_per_cap),
                score_from_log: estimate.is_some_and(|e| e.from_log),
            },
        );

        let mut keys: Vec<PlayerKey> = state.teams.roster(color).to_vec();
        keys.sort_by(|a, b| players.name_of(*a).cmp(players.name_of(*b)).then_with(|| a.cmp(b)));
        let rows = keys
            .into_iter()
            .filter_map(|key| players.get(key))
            .map(|player| {
                let counters = CounterGroups::for_player(&table, player.key, players);
                let flag_time = carry_times.get(&player.key).copied().unwrap_or(0);
                PlayerOutputStatsRound::new(player, counters, flag_time, duration)
            })
            .collect();
        teams.insert(number, TeamStats::from_players(number, color, team_score, rows));
    }

    let score_timeline = time_series::score_timeline(events, players, &state.flags.estimates, config)
        .into_iter()
        .filter_map(|(color, samples)| color.team_number().map(|n| (n, samples)))
        .collect();

    let map = first_text(events, EventKind::MapLoading);
    let date = state.bounds.as_ref().map(|b| b.start_time);

    OutputStats {
        parse_name: parse_name(map.as_deref(), date),
        map,
        server: first_text(events, EventKind::ServerName),
        date,
        game_time_secs: duration,
        score,
        flags,
        teams,
        score_timeline,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn parse_name_slug() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 15)
            .unwrap()
            .and_hms_opt(20, 41, 23)
            .unwrap();
        assert_eq!(parse_name(Some("2Fort"), Some(date)), "2fort-20231015-2041");
        assert_eq!(parse_name(Some("my map"), None), "my_map");
        assert_eq!(parse_name(None, None), "unknown");
    }
}
