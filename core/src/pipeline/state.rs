use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use hashbrown::HashMap;
use serde::Serialize;
use tfstats_types::TeamColor;

use crate::error::TrackerError;
use crate::players::{Player, PlayerKey, PlayerRegistry};

/// Shared mutable context for one round, handed to every subscriber call.
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    pub players: PlayerRegistry,
    pub teams: TeamComposition,
    /// Set by the culler at the end of the initial pass.
    pub bounds: Option<MatchBounds>,
    pub flags: FlagStatus,
    pub debuffs: DebuffState,
    /// Game time of the event currently being delivered.
    pub current_game_time: i64,
}

impl RoundState {
    pub fn new(players: PlayerRegistry) -> Self {
        Self {
            players,
            ..Default::default()
        }
    }

    pub fn player(&self, key: PlayerKey) -> Result<&Player, TrackerError> {
        self.players.get(key).ok_or(TrackerError::UnknownPlayer(key))
    }

    pub fn player_mut(&mut self, key: PlayerKey) -> Result<&mut Player, TrackerError> {
        self.players.get_mut(key).ok_or(TrackerError::UnknownPlayer(key))
    }

    pub fn bounds(&self) -> Result<&MatchBounds, TrackerError> {
        self.bounds.as_ref().ok_or(TrackerError::BoundsNotEstablished)
    }

    /// Round end in game seconds.
    pub fn round_end(&self) -> i64 {
        self.bounds.as_ref().map_or(0, |b| b.duration_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchBounds {
    pub start_line: u64,
    pub end_line: u64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_secs: i64,
    /// Start came from a prematch-end trigger rather than the first event.
    pub has_prematch_end: bool,
    /// End came from a team score line rather than the last event.
    pub has_team_score: bool,
}

/// Who has ever been on each team, and who is on it now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamComposition {
    roster: BTreeMap<TeamColor, Vec<PlayerKey>>,
    current: BTreeMap<TeamColor, BTreeSet<PlayerKey>>,
}

impl TeamComposition {
    pub fn join(&mut self, team: TeamColor, key: PlayerKey) {
        let roster = self.roster.entry(team).or_default();
        if !roster.contains(&key) {
            roster.push(key);
        }
        self.current.entry(team).or_default().insert(key);
    }

    pub fn leave(&mut self, key: PlayerKey) {
        for members in self.current.values_mut() {
            members.remove(&key);
        }
    }

    pub fn roster(&self, team: TeamColor) -> &[PlayerKey] {
        self.roster.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_current(&self, team: TeamColor, key: PlayerKey) -> bool {
        self.current.get(&team).is_some_and(|m| m.contains(&key))
    }

    pub fn is_rostered(&self, key: PlayerKey) -> bool {
        self.roster.values().any(|r| r.contains(&key))
    }

    pub fn teams(&self) -> impl Iterator<Item = TeamColor> + '_ {
        self.roster.keys().copied()
    }
}

/// Flag state for the flag carried by one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamFlagState {
    pub carrier: Option<PlayerKey>,
    pub picked_up_at: i64,
    pub bonus_active: bool,
    /// Ever touched this round.
    pub touched: bool,
    /// All captures, bonus ones included.
    pub captures: u32,
    pub bonus_captures: u32,
}

impl TeamFlagState {
    /// Drop the carry. Round counters are kept.
    pub fn reset(&mut self) {
        self.carrier = None;
        self.bonus_active = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamScoreEstimate {
    pub score: i64,
    pub points_per_cap: f64,
    /// Score came from a team score line rather than captures × default.
    pub from_log: bool,
}

/// Keyed by the carrier's team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlagStatus {
    pub teams: BTreeMap<TeamColor, TeamFlagState>,
    /// Last team score line per team.
    pub reported_scores: BTreeMap<TeamColor, i64>,
    /// Filled in at round end.
    pub estimates: BTreeMap<TeamColor, TeamScoreEstimate>,
}

impl FlagStatus {
    pub fn team(&self, team: TeamColor) -> Option<&TeamFlagState> {
        self.teams.get(&team)
    }

    pub fn team_mut(&mut self, team: TeamColor) -> &mut TeamFlagState {
        self.teams.entry(team).or_default()
    }

    /// Team whose flag state names `key` as carrier.
    pub fn carried_by(&self, key: PlayerKey) -> Option<TeamColor> {
        self.teams
            .iter()
            .find(|(_, state)| state.carrier == Some(key))
            .map(|(&team, _)| team)
    }
}

/// Game time of each player's latest conc.
#[derive(Debug, Clone, Default)]
pub struct DebuffState {
    conced_at: HashMap<PlayerKey, i64>,
}

impl DebuffState {
    pub fn apply(&mut self, key: PlayerKey, at: i64) {
        self.conced_at.insert(key, at);
    }

    pub fn clear(&mut self, key: PlayerKey) {
        self.conced_at.remove(&key);
    }

    pub fn since(&self, key: PlayerKey) -> Option<i64> {
        self.conced_at.get(&key).copied()
    }
}
