//! Flag carry time, recomputed from the final event sequence.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use tfstats_types::TeamColor;

use crate::log::{Event, EventKind};
use crate::players::{PlayerKey, PlayerRegistry, TimeInterval};

#[derive(Debug, Default)]
struct Carries {
    open: BTreeMap<TeamColor, (PlayerKey, i64)>,
    totals: HashMap<PlayerKey, i64>,
    duration: i64,
}

impl Carries {
    fn close(&mut self, team: TeamColor, now: i64) {
        if let Some((carrier, since)) = self.open.remove(&team) {
            let held = TimeInterval::closed(since, now).clamped_duration(0, self.duration);
            *self.totals.entry(carrier).or_default() += held;
        }
    }

    fn close_for(&mut self, key: PlayerKey, now: i64) {
        let teams: Vec<TeamColor> = self
            .open
            .iter()
            .filter(|(_, (carrier, _))| *carrier == key)
            .map(|(&team, _)| team)
            .collect();
        for team in teams {
            self.close(team, now);
        }
    }
}

/// Seconds each player carried a flag, clamped to `[0, duration]`.
pub fn carry_times(events: &[Event], players: &PlayerRegistry, duration: i64) -> HashMap<PlayerKey, i64> {
    let mut carries = Carries {
        duration,
        ..Default::default()
    };

    for event in events {
        let now = event.game_time;
        match event.kind {
            EventKind::PlayerPickedUpFlag => {
                let Some(key) = event.actor() else { continue };
                let team = players
                    .team_of(key)
                    .filter(|t| t.is_playing())
                    .or(event.data.team.filter(|t| t.is_playing()));
                let Some(team) = team else { continue };
                if carries.open.get(&team).is_some_and(|(carrier, _)| *carrier == key) {
                    continue;
                }
                carries.close(team, now);
                carries.close_for(key, now);
                carries.open.insert(team, (key, now));
            }
            EventKind::PlayerThrewFlag
            | EventKind::PlayerCapturedFlag
            | EventKind::PlayerCapturedBonusFlag
            | EventKind::PlayerCommitSuicide
            | EventKind::PlayerLeftServer
            | EventKind::PlayerKicked => {
                if let Some(key) = event.actor() {
                    carries.close_for(key, now);
                }
            }
            EventKind::PlayerFraggedPlayer => {
                if let Some(victim) = event.target() {
                    carries.close_for(victim, now);
                }
            }
            EventKind::FlagReturn => match event.data.team {
                Some(owner) => carries.open.retain(|team, _| *team == owner),
                None => carries.open.clear(),
            },
            _ => {}
        }
    }

    let open: Vec<TeamColor> = carries.open.keys().copied().collect();
    for team in open {
        carries.close(team, duration);
    }
    carries.totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::base_time;
    use chrono::Duration;

    fn at(kind: EventKind, secs: i64) -> Event {
        let line = (secs + 100) as u64;
        let mut event = Event::new(kind, line, base_time() + Duration::seconds(secs));
        event.game_time = secs;
        event
    }

    #[test]
    fn carries_end_on_death_and_at_round_end() {
        let mut players = PlayerRegistry::new();
        let a = players.observe("0:1", TeamColor::Red, "A", Some(1));
        let d = players.observe("0:2", TeamColor::Blue, "D", Some(2));
        let events = vec![
            at(EventKind::PlayerPickedUpFlag, 10).by(a),
            at(EventKind::PlayerFraggedPlayer, 25).by(d).against(a),
            at(EventKind::PlayerPickedUpFlag, 40).by(a),
        ];

        let times = carry_times(&events, &players, 50);
        assert_eq!(times[&a], 15 + 10);
        assert!(!times.contains_key(&d));
    }

    #[test]
    fn carries_before_the_start_are_clamped() {
        let mut players = PlayerRegistry::new();
        let a = players.observe("0:1", TeamColor::Red, "A", Some(1));
        let events = vec![
            at(EventKind::PlayerPickedUpFlag, -5).by(a),
            at(EventKind::PlayerCapturedFlag, 5).by(a),
        ];

        let times = carry_times(&events, &players, 30);
        assert_eq!(times[&a], 5);
    }

    #[test]
    fn return_drops_the_carry_uncredited() {
        let mut players = PlayerRegistry::new();
        let a = players.observe("0:1", TeamColor::Red, "A", Some(1));
        let mut ret = at(EventKind::FlagReturn, 10);
        ret.data.team = Some(TeamColor::Blue);
        let events = vec![at(EventKind::PlayerPickedUpFlag, 0).by(a), ret];

        let times = carry_times(&events, &players, 30);
        assert_eq!(times.get(&a).copied().unwrap_or(0), 0);
    }
}
