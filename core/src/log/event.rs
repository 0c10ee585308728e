use chrono::NaiveDateTime;
use serde::Serialize;
use tfstats_types::{BuildingKind, PlayerClass, TeamColor, Weapon};

use crate::players::PlayerKey;

/// Every kind of event the grammar can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventKind {
    // World / meta
    MapLoading,
    ServerName,
    ServerCvarStart,
    ServerCvarEnd,
    ServerCvar,
    RconCommand,
    WorldTrigger,
    PrematchEnd,
    TeamScore,
    FlagReturn,

    // Single actor
    PlayerConnected,
    PlayerEnteredGame,
    PlayerJoinTeam,
    PlayerChangeRole,
    PlayerChangedName,
    PlayerSay,
    PlayerSayTeam,
    PlayerLeftServer,
    PlayerKicked,
    PlayerCommitSuicide,
    PlayerBuiltSentryGun,
    PlayerUpgradedSentryGun,
    PlayerBuiltDispenser,
    PlayerBuiltTeleporter,
    PlayerDismantledBuilding,
    PlayerDetonatedBuilding,
    PlayerDetpackSet,
    PlayerDetpackExplode,
    PlayerPickedUpFlag,
    PlayerPickedUpBonusFlag,
    PlayerThrewFlag,
    PlayerCapturedFlag,
    PlayerCapturedBonusFlag,
    PlayerCapturedPoint,

    // Two actor
    PlayerFraggedPlayer,
    PlayerFraggedBuilding,
    PlayerHeal,
    PlayerInfected,
    PlayerPassedInfection,
    PlayerCuredInfection,
    PlayerDousedFire,
    PlayerConced,
    PlayerTranqed,
    PlayerHallucinated,
    PlayerCaltroped,
    PlayerRevealedSpy,
    PlayerDetpackDisarm,
    PlayerHitAirshot,
    PlayerDamaged,
}

impl EventKind {
    /// Kinds that survive pre/post-match culling because they carry setup
    /// context (who is on which team, playing what, on which map).
    pub fn survives_culling(self) -> bool {
        matches!(
            self,
            EventKind::MapLoading
                | EventKind::ServerName
                | EventKind::PlayerJoinTeam
                | EventKind::PlayerChangeRole
                | EventKind::PlayerSay
                | EventKind::PlayerSayTeam
                | EventKind::ServerCvarStart
                | EventKind::ServerCvarEnd
                | EventKind::ServerCvar
                | EventKind::PrematchEnd
                | EventKind::TeamScore
        )
    }

    /// A flag capture, bonus or not.
    pub fn is_capture(self) -> bool {
        matches!(
            self,
            EventKind::PlayerCapturedFlag | EventKind::PlayerCapturedBonusFlag
        )
    }
}

/// Small keyed payload. Which fields are set depends on the kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamColor>,
    /// Score, damage amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    /// Map name, chat message, cvar `key=value`, trigger name, new name...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<BuildingKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<PlayerClass>,
    /// Sentry gun level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl EventData {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn team(team: TeamColor) -> Self {
        Self {
            team: Some(team),
            ..Default::default()
        }
    }
}

/// A player taking part in an event, plus their class at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerRef {
    pub player: PlayerKey,
    pub class: Option<PlayerClass>,
}

impl PlayerRef {
    pub fn new(player: PlayerKey) -> Self {
        Self {
            player,
            class: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    /// 1-based line number in the source log. Stable identity of the event.
    pub line_number: u64,
    pub timestamp: NaiveDateTime,
    /// Seconds since match start; negative before it. Zero until the culler runs.
    pub game_time: i64,
    pub data: EventData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<PlayerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<PlayerRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon: Option<Weapon>,
    pub while_conced: bool,
}

impl Event {
    pub fn new(kind: EventKind, line_number: u64, timestamp: NaiveDateTime) -> Self {
        Self {
            kind,
            line_number,
            timestamp,
            game_time: 0,
            data: EventData::default(),
            from: None,
            to: None,
            weapon: None,
            while_conced: false,
        }
    }

    pub fn by(mut self, player: PlayerKey) -> Self {
        self.from = Some(PlayerRef::new(player));
        self
    }

    pub fn against(mut self, player: PlayerKey) -> Self {
        self.to = Some(PlayerRef::new(player));
        self
    }

    pub fn with_weapon(mut self, weapon: Option<Weapon>) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    /// The acting ("from") player.
    pub fn actor(&self) -> Option<PlayerKey> {
        self.from.map(|r| r.player)
    }

    /// The receiving ("to") player.
    pub fn target(&self) -> Option<PlayerKey> {
        self.to.map(|r| r.player)
    }

    pub fn actor_class(&self) -> Option<PlayerClass> {
        self.from.and_then(|r| r.class)
    }
}
