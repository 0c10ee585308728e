//! Cross-round comparison and the match MVP.

use hashbrown::HashMap;
use serde::Serialize;
use tfstats_types::MvpWeights;

use super::OutputStats;

/// Round 1 minus round 2 for the team attacking first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffenseDelta {
    pub score: i64,
    pub captures: i64,
    pub touches: i64,
    pub toss_percent: f64,
    pub concs: i64,
    pub flag_time_secs: i64,
}

/// Round 2 minus round 1 for team 2, since the sides swap between rounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenseDelta {
    pub frags: i64,
    pub airshots: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundComparison {
    pub offense: OffenseDelta,
    pub defense: DefenseDelta,
}

fn signed(value: Option<u64>) -> i64 {
    value.unwrap_or(0) as i64
}

/// `None` unless both rounds have a team 1 and a team 2.
pub fn compare_rounds(first: &OutputStats, second: &OutputStats) -> Option<RoundComparison> {
    let o1 = first.teams.get(&1)?;
    let o2 = second.teams.get(&1)?;
    let d1 = first.teams.get(&2)?;
    let d2 = second.teams.get(&2)?;

    Some(RoundComparison {
        offense: OffenseDelta {
            score: o1.score - o2.score,
            captures: signed(o1.captures) - signed(o2.captures),
            touches: signed(o1.touches) - signed(o2.touches),
            toss_percent: o1.toss_percent.unwrap_or(0.0) - o2.toss_percent.unwrap_or(0.0),
            concs: signed(o1.concs) - signed(o2.concs),
            flag_time_secs: o1.flag_time_secs.unwrap_or(0) - o2.flag_time_secs.unwrap_or(0),
        },
        defense: DefenseDelta {
            frags: d2.frags as i64 - d1.frags as i64,
            airshots: signed(d2.airshots) - signed(d1.airshots),
        },
    })
}

/// Weighted points for one account, summed over the match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MvpAward {
    pub steam_id: String,
    pub name: String,
    pub points: i64,
    pub kills: u64,
    pub sentry_kills: u64,
    pub touches: u64,
    pub initial_touches: u64,
    pub capture_bonuses: u64,
    pub team_kills: u64,
}

impl MvpAward {
    fn score(&self, weights: &MvpWeights) -> i64 {
        self.kills as i64 * weights.kill
            + self.sentry_kills as i64 * weights.sentry_kill
            + self.touches as i64 * weights.touch
            + self.initial_touches as i64 * weights.initial_touch
            + self.capture_bonuses as i64 * weights.capture_bonus
            - self.team_kills as i64 * weights.team_kill
    }
}

/// Highest-scoring account across `rounds`. Ties go to the account seen first.
pub fn match_mvp(rounds: &[&OutputStats], weights: &MvpWeights) -> Option<MvpAward> {
    let mut awards: Vec<MvpAward> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for round in rounds {
        for team in round.teams.values() {
            for row in &team.players {
                let slot = *index.entry(row.steam_id.as_str()).or_insert_with(|| {
                    awards.push(MvpAward {
                        steam_id: row.steam_id.clone(),
                        ..Default::default()
                    });
                    awards.len() - 1
                });
                let award = &mut awards[slot];
                award.name = row.name.clone();
                award.kills += row.counters.kills.kill.value;
                award.sentry_kills += row.counters.kills.sentry.value;
                award.touches += row.counters.objectives.flag_touch.value;
                award.initial_touches += u64::from(row.initial_touches);
                award.capture_bonuses += row.counters.objectives.flag_capture_bonus.value;
                award.team_kills += row.counters.kills.teamkill.value;
            }
        }
    }

    let mut best: Option<MvpAward> = None;
    for mut award in awards {
        award.points = award.score(weights);
        if best.as_ref().is_none_or(|b| award.points > b.points) {
            best = Some(award);
        }
    }
    best
}
