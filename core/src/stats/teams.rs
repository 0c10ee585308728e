//! Per-player rows and the per-team aggregates summed from them.

use serde::Serialize;
use tfstats_types::formatting::pct_of;
use tfstats_types::{PlayerClass, TeamColor, TeamRole};

use crate::players::Player;

use super::facets::CounterGroups;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassUsage {
    pub class: PlayerClass,
    pub secs: i64,
}

/// One player's stats for one round, on one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerOutputStatsRound {
    pub name: String,
    pub steam_id: String,
    pub team: TeamColor,
    #[serde(flatten)]
    pub counters: CounterGroups,

    // ─── Flag ───
    pub flag_time_secs: i64,
    pub flag_carries: u32,
    pub flag_throws: u32,
    pub initial_touches: u32,
    pub toss_percent: f64,

    // ─── Time ───
    pub time_on_team_secs: i64,
    /// Seconds per class, longest first.
    pub classes: Vec<ClassUsage>,
}

impl PlayerOutputStatsRound {
    pub fn new(player: &Player, counters: CounterGroups, flag_time_secs: i64, duration: i64) -> Self {
        let mut classes: Vec<ClassUsage> = Vec::new();
        for span in &player.classes {
            let secs = span.interval.clamped_duration(0, duration);
            match classes.iter_mut().find(|c| c.class == span.context) {
                Some(usage) => usage.secs += secs,
                None => classes.push(ClassUsage {
                    class: span.context,
                    secs,
                }),
            }
        }
        classes.retain(|c| c.secs > 0);
        classes.sort_by(|a, b| b.secs.cmp(&a.secs).then_with(|| a.class.cmp(&b.class)));

        let time_on_team_secs = player
            .team_intervals
            .iter()
            .map(|i| i.clamped_duration(0, duration))
            .sum();

        Self {
            name: player.display_name().to_string(),
            steam_id: player.steam_id.clone(),
            team: player.team,
            counters,
            flag_time_secs,
            flag_carries: player.flag.carries,
            flag_throws: player.flag.throws,
            initial_touches: player.flag.initial_touches,
            toss_percent: pct_of(player.flag.throws.into(), player.flag.carries.into()),
            time_on_team_secs,
            classes,
        }
    }
}

/// Team aggregate for one round. Role-specific fields are only present for
/// the role they apply to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStats {
    pub team_number: u8,
    pub color: TeamColor,
    pub role: TeamRole,
    pub score: i64,
    pub frags: u64,
    pub team_kills: u64,
    pub deaths: u64,
    pub suicides: u64,
    pub sentry_kills: u64,
    pub damage_dealt: u64,

    // ─── Offense ───
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captures: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub touches: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toss_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_time_secs: Option<i64>,

    // ─── Defense ───
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airshots: Option<u64>,

    pub players: Vec<PlayerOutputStatsRound>,
}

impl TeamStats {
    pub fn from_players(team_number: u8, color: TeamColor, score: i64, players: Vec<PlayerOutputStatsRound>) -> Self {
        let role = TeamRole::for_team_number(team_number);
        let sum = |f: fn(&PlayerOutputStatsRound) -> u64| players.iter().map(f).sum::<u64>();

        let frags = sum(|p| p.counters.kills.kill.value);
        let team_kills = sum(|p| p.counters.kills.teamkill.value);
        let deaths = sum(|p| p.counters.deaths.death.value);
        let suicides = sum(|p| p.counters.deaths.suicide.value);
        let sentry_kills = sum(|p| p.counters.kills.sentry.value);
        let damage_dealt = sum(|p| p.counters.damage.dealt.value);

        let offense = role == TeamRole::Offense;
        let defense = role == TeamRole::Defense;
        let throws = sum(|p| p.flag_throws.into());
        let carries = sum(|p| p.flag_carries.into());

        Self {
            team_number,
            color,
            role,
            score,
            frags,
            team_kills,
            deaths,
            suicides,
            sentry_kills,
            damage_dealt,
            captures: offense.then(|| sum(|p| p.counters.objectives.flag_capture.value)),
            touches: offense.then(|| sum(|p| p.counters.objectives.flag_touch.value)),
            toss_percent: offense.then(|| pct_of(throws, carries)),
            concs: offense.then(|| sum(|p| p.counters.weaponry.conc.value)),
            flag_time_secs: offense.then(|| players.iter().map(|p| p.flag_time_secs).sum()),
            airshots: defense.then(|| sum(|p| p.counters.weaponry.airshot.value)),
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::{PlayerRegistry, TimeInterval, TimeIntervalWithContext};

    fn new_player(name: &str) -> Player {
        let mut players = PlayerRegistry::new();
        let key = players.observe("0:1", TeamColor::Blue, name, Some(1));
        players.get(key).unwrap().clone()
    }

    fn row(name: &str, kills: u64, captures: u64) -> PlayerOutputStatsRound {
        let player = new_player(name);
        let mut counters = CounterGroups::default();
        counters.kills.kill.value = kills;
        counters.objectives.flag_capture.value = captures;
        PlayerOutputStatsRound::new(&player, counters, 0, 100)
    }

    #[test]
    fn class_usage_is_clamped_and_merged() {
        let mut player = new_player("a");
        player.classes = vec![
            TimeIntervalWithContext {
                interval: TimeInterval::closed(-20, 30),
                context: PlayerClass::Scout,
            },
            TimeIntervalWithContext {
                interval: TimeInterval::closed(30, 40),
                context: PlayerClass::Medic,
            },
            TimeIntervalWithContext::open(40, PlayerClass::Scout),
        ];
        player.team_intervals = vec![TimeInterval::open(-20)];

        let row = PlayerOutputStatsRound::new(&player, CounterGroups::default(), 0, 60);
        assert_eq!(
            row.classes,
            vec![
                ClassUsage {
                    class: PlayerClass::Scout,
                    secs: 50
                },
                ClassUsage {
                    class: PlayerClass::Medic,
                    secs: 10
                },
            ]
        );
        assert_eq!(row.time_on_team_secs, 60);
    }

    #[test]
    fn role_gates_team_fields() {
        let offense = TeamStats::from_players(1, TeamColor::Blue, 20, vec![row("a", 2, 1), row("b", 3, 1)]);
        assert_eq!(offense.frags, 5);
        assert_eq!(offense.captures, Some(2));
        assert_eq!(offense.airshots, None);

        let defense = TeamStats::from_players(2, TeamColor::Red, 0, vec![row("c", 4, 0)]);
        assert_eq!(defense.role, TeamRole::Defense);
        assert_eq!(defense.captures, None);
        assert_eq!(defense.airshots, Some(0));
    }
}
