//! Running score per team, one sample per capture.

use std::collections::BTreeMap;

use serde::Serialize;
use tfstats_types::{StatsConfig, TeamColor};

use crate::log::{Event, EventKind};
use crate::pipeline::TeamScoreEstimate;
use crate::players::PlayerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSample {
    pub game_time: i64,
    pub score: i64,
}

/// Samples start at `(0, 0)` for every team with a score estimate or a capture.
pub fn score_timeline(
    events: &[Event],
    players: &PlayerRegistry,
    estimates: &BTreeMap<TeamColor, TeamScoreEstimate>,
    config: &StatsConfig,
) -> BTreeMap<TeamColor, Vec<ScoreSample>> {
    let mut series: BTreeMap<TeamColor, Vec<ScoreSample>> = estimates
        .keys()
        .map(|&team| (team, vec![ScoreSample { game_time: 0, score: 0 }]))
        .collect();
    let mut weighted: BTreeMap<TeamColor, f64> = BTreeMap::new();

    for event in events.iter().filter(|e| e.kind.is_capture()) {
        let Some(key) = event.actor() else { continue };
        let team = players
            .team_of(key)
            .filter(|t| t.is_playing())
            .or(event.data.team.filter(|t| t.is_playing()));
        let Some(team) = team else { continue };

        let weight = match event.kind {
            EventKind::PlayerCapturedBonusFlag => config.bonus_capture_ratio,
            _ => 1.0,
        };
        let total = weighted.entry(team).or_default();
        *total += weight;

        let points_per_cap = estimates
            .get(&team)
            .map_or(config.default_points_per_cap as f64, |e| e.points_per_cap);
        series
            .entry(team)
            .or_insert_with(|| vec![ScoreSample { game_time: 0, score: 0 }])
            .push(ScoreSample {
                game_time: event.game_time,
                score: (points_per_cap * *total).round() as i64,
            });
    }
    series
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testing::base_time;

    #[test]
    fn samples_follow_captures() {
        let mut players = PlayerRegistry::new();
        let p1 = players.observe("0:1", TeamColor::Blue, "P1", Some(1));
        let capture = |secs: i64, kind| {
            let mut event = Event::new(kind, secs as u64, base_time() + Duration::seconds(secs)).by(p1);
            event.game_time = secs;
            event
        };
        let events = vec![
            capture(30, EventKind::PlayerCapturedFlag),
            capture(90, EventKind::PlayerCapturedBonusFlag),
        ];
        let mut estimates = BTreeMap::new();
        estimates.insert(
            TeamColor::Blue,
            TeamScoreEstimate {
                score: 15,
                points_per_cap: 10.0,
                from_log: true,
            },
        );
        estimates.insert(
            TeamColor::Red,
            TeamScoreEstimate {
                score: 0,
                points_per_cap: 10.0,
                from_log: true,
            },
        );

        let series = score_timeline(&events, &players, &estimates, &StatsConfig::default());
        assert_eq!(
            series[&TeamColor::Blue],
            vec![
                ScoreSample { game_time: 0, score: 0 },
                ScoreSample { game_time: 30, score: 10 },
                ScoreSample { game_time: 90, score: 15 },
            ]
        );
        assert_eq!(series[&TeamColor::Red], vec![ScoreSample { game_time: 0, score: 0 }]);
    }
}
