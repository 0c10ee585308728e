use std::borrow::Cow;

use chrono::NaiveDateTime;
use encoding_rs::WINDOWS_1252;
use memchr::{memchr, memmem, memrchr};
use tfstats_types::{MapTriggerKind, StatsConfig, TeamColor, Weapon};

use crate::config::ConfigError;
use crate::error::ParseError;
use crate::log::triggers::{self, TriggerTable};
use crate::log::vocab::{class_from_name, team_from_name, weapon_from_name};
use crate::log::{Event, EventData, EventKind};
use crate::players::{PlayerKey, PlayerRegistry};

const SENTINEL: &str = "L ";
const TIMESTAMP_LEN: usize = 21;
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y - %H:%M:%S";

/// Decode raw log bytes. Servers write whatever codepage the player names
/// arrive in, so non-UTF-8 input is read as Windows-1252.
pub fn decode_log(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
            if had_errors {
                tracing::warn!("Log contained undecodable bytes");
            }
            text
        }
    }
}

/// `"name<uid><auth><team>"` located inside a line's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlayerToken<'a> {
    name: &'a str,
    user_id: Option<u32>,
    auth: &'a str,
    team: &'a str,
    /// Byte offset of the opening quote.
    start: usize,
    /// Byte offset just past the closing quote.
    end: usize,
}

impl PlayerToken<'_> {
    fn is_hltv(&self) -> bool {
        self.auth.eq_ignore_ascii_case("HLTV")
    }

    /// Persistent account id. `STEAM_0:1:1234` and `STEAM_1:1:1234` are the
    /// same account, so the universe digit is dropped. Ids that are not
    /// per-account (bots, LAN, pending) are qualified with the name.
    fn account_id(&self) -> String {
        let per_account = self
            .auth
            .strip_prefix("STEAM_")
            .or_else(|| self.auth.strip_prefix("VALVE_"))
            .and_then(|rest| rest.split_once(':'))
            .map(|(_, account)| account)
            .filter(|account| !account.is_empty());

        match per_account {
            Some(account) => account.to_string(),
            None => format!("{}:{}", self.auth, self.name),
        }
    }
}

fn find_player_tokens(content: &str) -> Vec<PlayerToken<'_>> {
    let mut tokens = Vec::new();
    let mut floor = 0;
    for close in memmem::find_iter(content.as_bytes(), b">\"") {
        if close < floor {
            continue;
        }
        if let Some(token) = token_ending_at(content, floor, close) {
            floor = token.end;
            tokens.push(token);
        }
    }
    tokens
}

/// Walk backwards from the `>"` at `close` through `<team>`, `<auth>`, `<uid>`
/// and the name to the opening quote. Names may themselves contain `<`.
fn token_ending_at(content: &str, floor: usize, close: usize) -> Option<PlayerToken<'_>> {
    let bytes = content.as_bytes();

    let team_open = floor + memrchr(b'<', &bytes[floor..close])?;
    let auth_close = team_open.checked_sub(1).filter(|&i| i >= floor)?;
    if bytes[auth_close] != b'>' {
        return None;
    }
    let auth_open = floor + memrchr(b'<', &bytes[floor..auth_close])?;
    let uid_close = auth_open.checked_sub(1).filter(|&i| i >= floor)?;
    if bytes[uid_close] != b'>' {
        return None;
    }
    let uid_open = floor + memrchr(b'<', &bytes[floor..uid_close])?;
    let uid: i64 = content[uid_open + 1..uid_close].parse().ok()?;
    let quote = floor + memrchr(b'"', &bytes[floor..uid_open])?;

    Some(PlayerToken {
        name: &content[quote + 1..uid_open],
        user_id: u32::try_from(uid).ok(),
        auth: &content[auth_open + 1..auth_close],
        team: &content[team_open + 1..close],
        start: quote,
        end: close + 2,
    })
}

/// First `"..."` in `s`, and whatever follows its closing quote.
fn first_quoted(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let open = memchr(b'"', bytes)?;
    let close = open + 1 + memchr(b'"', &bytes[open + 1..])?;
    Some((&s[open + 1..close], &s[close + 1..]))
}

/// Everything between the first and the last quote. Chat text may contain quotes.
fn outer_quoted(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let open = memchr(b'"', bytes)?;
    let close = memrchr(b'"', bytes)?;
    (close > open).then(|| &s[open + 1..close])
}

/// Value of a `(key "value")` property.
fn property<'a>(s: &'a str, key: &str) -> Option<&'a str> {
    let marker = format!("({key} \"");
    let start = memmem::find(s.as_bytes(), marker.as_bytes())? + marker.len();
    let len = memchr(b'"', &s.as_bytes()[start..])?;
    Some(&s[start..start + len])
}

/// Argument of a `with "x"` clause.
fn with_clause(s: &str) -> Option<&str> {
    let at = memmem::find(s.as_bytes(), b"with \"")?;
    first_quoted(&s[at..]).map(|(inner, _)| inner)
}

fn split_timestamp(rest: &str) -> Option<(NaiveDateTime, &str)> {
    let stamp = rest.get(..TIMESTAMP_LEN)?;
    let content = rest.get(TIMESTAMP_LEN..)?.strip_prefix(": ")?;
    let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Some((timestamp, content))
}

/// What a line turned out to be, before any player is registered.
#[derive(Debug)]
struct Classified {
    kind: EventKind,
    data: EventData,
    weapon: Option<Weapon>,
}

impl Classified {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            data: EventData::default(),
            weapon: None,
        }
    }

    fn with_data(kind: EventKind, data: EventData) -> Self {
        Self {
            kind,
            data,
            weapon: None,
        }
    }
}

struct Line<'a> {
    number: u64,
    timestamp: NaiveDateTime,
    content: &'a str,
}

impl Line<'_> {
    fn event(&self, classified: Classified) -> Event {
        Event::new(classified.kind, self.number, self.timestamp)
            .with_data(classified.data)
            .with_weapon(classified.weapon)
    }

    fn team(&self, name: &str) -> Result<TeamColor, ParseError> {
        team_from_name(name).ok_or_else(|| ParseError::UnknownTeam {
            line: self.number,
            name: name.to_string(),
        })
    }

    fn weapon(&self, name: &str) -> Result<Weapon, ParseError> {
        weapon_from_name(name).ok_or_else(|| ParseError::UnknownWeapon {
            line: self.number,
            name: name.to_string(),
        })
    }

    fn register(&self, token: &PlayerToken<'_>, players: &mut PlayerRegistry) -> Result<PlayerKey, ParseError> {
        let team = self.team(token.team)?;
        Ok(players.observe(&token.account_id(), team, token.name, token.user_id))
    }
}

/// Turns raw log lines into events.
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    triggers: TriggerTable,
}

impl LineParser {
    pub fn new(triggers: TriggerTable) -> Self {
        Self { triggers }
    }

    pub fn from_config(config: &StatsConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(TriggerTable::with_extras(&config.map_triggers)?))
    }

    /// Parse a whole log. Line numbers start at 1.
    pub fn parse_log(&self, text: &str, players: &mut PlayerRegistry) -> Result<Vec<Event>, ParseError> {
        let mut events = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if let Some(event) = self.parse_line(index as u64 + 1, line, players)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Parse one line. `Ok(None)` means the line carries no event.
    pub fn parse_line(
        &self,
        line_number: u64,
        line: &str,
        players: &mut PlayerRegistry,
    ) -> Result<Option<Event>, ParseError> {
        let raw = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = raw.strip_prefix(SENTINEL) else {
            return Ok(None);
        };
        let Some((timestamp, content)) = split_timestamp(rest) else {
            tracing::debug!(line_number, "Malformed timestamp");
            return Ok(None);
        };

        let tokens = find_player_tokens(content);
        if tokens.iter().any(PlayerToken::is_hltv) {
            return Ok(None);
        }

        let line = Line {
            number: line_number,
            timestamp,
            content,
        };
        let event = match tokens.as_slice() {
            [] => self.classify_world(&line)?.map(|c| line.event(c)),
            [actor] => match self.classify_single(&line, actor)? {
                Some(classified) => Some(self.single_actor_event(&line, actor, classified, players)?),
                None => None,
            },
            [actor, target] => match self.classify_pair(&line, actor, target)? {
                Some(classified) => {
                    let from = line.register(actor, players)?;
                    let to = line.register(target, players)?;
                    Some(line.event(classified).by(from).against(to))
                }
                None => None,
            },
            _ => None,
        };

        if event.is_none() {
            tracing::debug!(line_number, content, "Line yielded no event");
        }
        Ok(event)
    }

    fn single_actor_event(
        &self,
        line: &Line<'_>,
        actor: &PlayerToken<'_>,
        classified: Classified,
        players: &mut PlayerRegistry,
    ) -> Result<Event, ParseError> {
        let key = line.register(actor, players)?;
        if classified.kind == EventKind::PlayerChangedName
            && let Some(new_name) = classified.data.text.as_deref()
            && let Some(player) = players.get_mut(key)
        {
            player.add_name(new_name);
        }
        Ok(line.event(classified).by(key))
    }

    fn classify_world(&self, line: &Line<'_>) -> Result<Option<Classified>, ParseError> {
        let content = line.content;

        if let Some(rest) = content.strip_prefix("Loading map ") {
            return Ok(first_quoted(rest)
                .map(|(map, _)| Classified::with_data(EventKind::MapLoading, EventData::text(map))));
        }
        if let Some(rest) = content.strip_prefix("Server name is ") {
            return Ok(first_quoted(rest)
                .map(|(name, _)| Classified::with_data(EventKind::ServerName, EventData::text(name))));
        }
        if content.starts_with("Server cvars start") {
            return Ok(Some(Classified::new(EventKind::ServerCvarStart)));
        }
        if content.starts_with("Server cvars end") {
            return Ok(Some(Classified::new(EventKind::ServerCvarEnd)));
        }
        if let Some(rest) = content.strip_prefix("Server cvar ") {
            return Ok(cvar(rest));
        }
        if content.starts_with("Bad Rcon") {
            return Ok(None);
        }
        if let Some(rest) = content.strip_prefix("Rcon: ") {
            return Ok(first_quoted(rest)
                .map(|(cmd, _)| Classified::with_data(EventKind::RconCommand, EventData::text(cmd))));
        }
        if let Some(rest) = content.strip_prefix("World triggered ") {
            return Ok(self.classify_world_trigger(rest));
        }
        if let Some(rest) = content.strip_prefix("Team ") {
            return team_score(line, rest);
        }
        if content.starts_with('"') {
            return Ok(cvar(content));
        }
        Ok(None)
    }

    fn classify_world_trigger(&self, rest: &str) -> Option<Classified> {
        let (name, _) = first_quoted(rest)?;
        if triggers::is_prematch_end(name) {
            return Some(Classified::with_data(EventKind::PrematchEnd, EventData::text(name)));
        }
        match self.triggers.lookup(name) {
            Some(rule) if rule.kind == MapTriggerKind::FlagReturn => {
                let data = EventData {
                    team: rule.team,
                    text: Some(name.to_string()),
                    ..Default::default()
                };
                Some(Classified::with_data(EventKind::FlagReturn, data))
            }
            Some(rule) if rule.kind == MapTriggerKind::Ignore => None,
            _ => Some(Classified::with_data(EventKind::WorldTrigger, EventData::text(name))),
        }
    }

    fn classify_single(&self, line: &Line<'_>, actor: &PlayerToken<'_>) -> Result<Option<Classified>, ParseError> {
        let before = line.content[..actor.start].trim();
        let after = line.content[actor.end..].trim_start();

        if !before.is_empty() {
            if before.starts_with("Kick:") && after.starts_with("was kicked") {
                let data = first_quoted(after)
                    .map(|(reason, _)| EventData::text(reason))
                    .unwrap_or_default();
                return Ok(Some(Classified::with_data(EventKind::PlayerKicked, data)));
            }
            return Ok(None);
        }

        if let Some(rest) = after.strip_prefix("connected, address ") {
            let data = first_quoted(rest)
                .map(|(address, _)| EventData::text(address))
                .unwrap_or_default();
            return Ok(Some(Classified::with_data(EventKind::PlayerConnected, data)));
        }
        if after.starts_with("entered the game") {
            return Ok(Some(Classified::new(EventKind::PlayerEnteredGame)));
        }
        if let Some(rest) = after.strip_prefix("joined team ") {
            let Some((name, _)) = first_quoted(rest) else {
                return Ok(None);
            };
            let team = line.team(name)?;
            return Ok(Some(Classified::with_data(EventKind::PlayerJoinTeam, EventData::team(team))));
        }
        if let Some(rest) = after.strip_prefix("changed role to ") {
            let Some((name, _)) = first_quoted(rest) else {
                return Ok(None);
            };
            let class = class_from_name(name).ok_or_else(|| ParseError::UnknownClass {
                line: line.number,
                name: name.to_string(),
            })?;
            let data = EventData {
                class: Some(class),
                ..Default::default()
            };
            return Ok(Some(Classified::with_data(EventKind::PlayerChangeRole, data)));
        }
        if let Some(rest) = after.strip_prefix("changed name to ") {
            return Ok(first_quoted(rest)
                .map(|(name, _)| Classified::with_data(EventKind::PlayerChangedName, EventData::text(name))));
        }
        if let Some(rest) = after.strip_prefix("say_team ") {
            return Ok(outer_quoted(rest)
                .map(|msg| Classified::with_data(EventKind::PlayerSayTeam, EventData::text(msg))));
        }
        if let Some(rest) = after.strip_prefix("say ") {
            return Ok(outer_quoted(rest)
                .map(|msg| Classified::with_data(EventKind::PlayerSay, EventData::text(msg))));
        }
        if after.starts_with("disconnected") {
            return Ok(Some(Classified::new(EventKind::PlayerLeftServer)));
        }
        if let Some(rest) = after.strip_prefix("committed suicide with ") {
            let Some((name, _)) = first_quoted(rest) else {
                return Ok(None);
            };
            let mut classified = Classified::new(EventKind::PlayerCommitSuicide);
            classified.weapon = Some(line.weapon(name)?);
            return Ok(Some(classified));
        }
        if after.starts_with("was kicked") {
            return Ok(Some(Classified::new(EventKind::PlayerKicked)));
        }
        if after.starts_with("STEAM USERID validated") || after.starts_with("Steam USERID validated") {
            return Ok(None);
        }
        if let Some(rest) = after.strip_prefix("triggered ") {
            let team = team_from_name(actor.team).filter(|t| t.is_playing());
            return Ok(self.classify_player_trigger(line, rest, team));
        }
        Ok(None)
    }

    fn classify_player_trigger(
        &self,
        line: &Line<'_>,
        rest: &str,
        actor_team: Option<TeamColor>,
    ) -> Option<Classified> {
        let (name, _) = first_quoted(rest)?;

        if let Some(standard) = triggers::standard_trigger(name) {
            let data = EventData {
                building: standard.building,
                level: standard.level,
                text: Some(name.to_string()),
                ..Default::default()
            };
            return Some(Classified::with_data(standard.kind, data));
        }

        let Some(rule) = self.triggers.lookup(name) else {
            tracing::warn!(line = line.number, trigger = name, "Unrecognized player trigger");
            return None;
        };
        let kind = match rule.kind {
            MapTriggerKind::FlagPickup => EventKind::PlayerPickedUpFlag,
            MapTriggerKind::BonusFlagPickup => EventKind::PlayerPickedUpBonusFlag,
            MapTriggerKind::FlagThrow => EventKind::PlayerThrewFlag,
            MapTriggerKind::FlagCapture => EventKind::PlayerCapturedFlag,
            MapTriggerKind::BonusFlagCapture => EventKind::PlayerCapturedBonusFlag,
            MapTriggerKind::PointCapture => EventKind::PlayerCapturedPoint,
            MapTriggerKind::FlagReturn => EventKind::FlagReturn,
            MapTriggerKind::Ignore => return None,
        };
        let team = if kind == EventKind::FlagReturn {
            rule.team
        } else {
            rule.team.or(actor_team)
        };
        let data = EventData {
            team,
            text: Some(name.to_string()),
            ..Default::default()
        };
        Some(Classified::with_data(kind, data))
    }

    fn classify_pair(
        &self,
        line: &Line<'_>,
        actor: &PlayerToken<'_>,
        target: &PlayerToken<'_>,
    ) -> Result<Option<Classified>, ParseError> {
        let between = line.content[actor.end..target.start].trim();
        let after = &line.content[target.end..];

        if !line.content[..actor.start].trim().is_empty() {
            return Ok(None);
        }

        if between == "killed" {
            let mut classified = Classified::new(EventKind::PlayerFraggedPlayer);
            if let Some(name) = with_clause(after) {
                classified.weapon = Some(line.weapon(name)?);
            }
            return Ok(Some(classified));
        }

        let Some(rest) = between.strip_prefix("triggered ") else {
            return Ok(None);
        };
        let Some((name, tail)) = first_quoted(rest) else {
            return Ok(None);
        };
        if tail.trim() != "against" {
            return Ok(None);
        }

        let effect = triggers::effect_trigger(name).ok_or_else(|| ParseError::UnknownTrigger {
            line: line.number,
            trigger: name.to_string(),
        })?;
        let mut classified = Classified::with_data(
            effect.kind,
            EventData {
                building: effect.building,
                value: property(after, "damage").and_then(|d| d.trim().parse().ok()),
                ..Default::default()
            },
        );
        if let Some(name) = with_clause(after) {
            classified.weapon = Some(line.weapon(name)?);
        }
        Ok(Some(classified))
    }
}

fn cvar(rest: &str) -> Option<Classified> {
    let (key, after) = first_quoted(rest)?;
    let after = after.trim_start().strip_prefix('=')?;
    let (value, _) = first_quoted(after)?;
    Some(Classified::with_data(
        EventKind::ServerCvar,
        EventData::text(format!("{key}={value}")),
    ))
}

/// `"Blue" scored "60" with "5" players`
fn team_score(line: &Line<'_>, rest: &str) -> Result<Option<Classified>, ParseError> {
    let Some((name, after)) = first_quoted(rest) else {
        return Ok(None);
    };
    let Some(after) = after.trim_start().strip_prefix("scored") else {
        return Ok(None);
    };
    let Some(score) = first_quoted(after).and_then(|(s, _)| s.trim().parse::<i64>().ok()) else {
        return Ok(None);
    };
    let team = line.team(name)?;
    let data = EventData {
        team: Some(team),
        value: Some(score),
        ..Default::default()
    };
    Ok(Some(Classified::with_data(EventKind::TeamScore, data)))
}
