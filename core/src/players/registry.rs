use std::fmt;

use hashbrown::HashMap;
use serde::Serialize;
use tfstats_types::{PlayerClass, TeamColor};

use super::interval::{TimeInterval, TimeIntervalWithContext};

/// Handle to a [`Player`] in a [`PlayerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerKey(u32);

impl PlayerKey {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Round-scoped flag counters, maintained by the flag tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlagCounters {
    pub carries: u32,
    pub initial_touches: u32,
    pub throws: u32,
    pub carry_time_secs: i64,
}

/// One account on one team.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub key: PlayerKey,
    /// Account part of the identity token (`STEAM_0:1:1234` → `1:1234`).
    pub steam_id: String,
    pub team: TeamColor,
    /// Display names in order seen; the last one wins.
    pub names: Vec<String>,
    /// In-round `<uid>` handles.
    pub user_ids: Vec<u32>,
    /// Game seconds.
    pub team_intervals: Vec<TimeInterval>,
    /// Role intervals in line numbers, used to stamp events with classes.
    pub class_lines: Vec<TimeIntervalWithContext<PlayerClass>>,
    /// The same role intervals in game seconds.
    pub classes: Vec<TimeIntervalWithContext<PlayerClass>>,
    pub flag: FlagCounters,
}

impl Player {
    fn new(key: PlayerKey, steam_id: &str, team: TeamColor) -> Self {
        Self {
            key,
            steam_id: steam_id.to_string(),
            team,
            names: Vec::new(),
            user_ids: Vec::new(),
            team_intervals: Vec::new(),
            class_lines: Vec::new(),
            classes: Vec::new(),
            flag: FlagCounters::default(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.names
            .last()
            .map(String::as_str)
            .unwrap_or(self.steam_id.as_str())
    }

    pub fn add_name(&mut self, name: &str) {
        if !name.is_empty() && self.names.last().map(String::as_str) != Some(name) {
            self.names.push(name.to_string());
        }
    }

    fn add_user_id(&mut self, user_id: u32) {
        if !self.user_ids.contains(&user_id) {
            self.user_ids.push(user_id);
        }
    }

    /// Class from the most recently opened role interval.
    pub fn current_class(&self) -> Option<PlayerClass> {
        self.class_lines.last().map(|c| c.context)
    }

    pub fn has_open_team_interval(&self) -> bool {
        self.team_intervals.last().is_some_and(TimeInterval::is_open)
    }
}

/// All players of one round, keyed by (account, team).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    #[serde(skip)]
    index: HashMap<(String, TeamColor), PlayerKey>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find or create the player for an identity token, recording its name and uid.
    pub fn observe(
        &mut self,
        steam_id: &str,
        team: TeamColor,
        name: &str,
        user_id: Option<u32>,
    ) -> PlayerKey {
        let key = self.get_or_create(steam_id, team);
        let player = &mut self.players[key.index()];
        player.add_name(name);
        if let Some(uid) = user_id {
            player.add_user_id(uid);
        }
        key
    }

    /// Idempotent: the same (account, team) always yields the same key.
    pub fn get_or_create(&mut self, steam_id: &str, team: TeamColor) -> PlayerKey {
        if let Some(&key) = self.index.get(&(steam_id.to_string(), team)) {
            return key;
        }
        let key = PlayerKey(self.players.len() as u32);
        self.players.push(Player::new(key, steam_id, team));
        self.index.insert((steam_id.to_string(), team), key);
        key
    }

    /// The same account as `key`, on `team`. A new entry inherits names and uids.
    pub fn same_account_on(&mut self, key: PlayerKey, team: TeamColor) -> Option<PlayerKey> {
        let source = self.players.get(key.index())?;
        if source.team == team {
            return Some(key);
        }
        let steam_id = source.steam_id.clone();
        let names = source.names.clone();
        let user_ids = source.user_ids.clone();

        let target = self.get_or_create(&steam_id, team);
        let player = &mut self.players[target.index()];
        for name in &names {
            player.add_name(name);
        }
        for uid in user_ids {
            player.add_user_id(uid);
        }
        Some(target)
    }

    /// Every key belonging to the same account as `key`, including `key`.
    pub fn account_keys(&self, key: PlayerKey) -> Vec<PlayerKey> {
        let Some(player) = self.players.get(key.index()) else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|p| p.steam_id == player.steam_id)
            .map(|p| p.key)
            .collect()
    }

    pub fn find(&self, steam_id: &str, team: TeamColor) -> Option<PlayerKey> {
        self.index.get(&(steam_id.to_string(), team)).copied()
    }

    pub fn get(&self, key: PlayerKey) -> Option<&Player> {
        self.players.get(key.index())
    }

    pub fn get_mut(&mut self, key: PlayerKey) -> Option<&mut Player> {
        self.players.get_mut(key.index())
    }

    pub fn team_of(&self, key: PlayerKey) -> Option<TeamColor> {
        self.get(key).map(|p| p.team)
    }

    pub fn name_of(&self, key: PlayerKey) -> &str {
        self.get(key).map(Player::display_name).unwrap_or("?")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
