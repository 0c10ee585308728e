//! Closed vocabularies shared by the parser, the pipeline and the stats output.
//!
//! String lookups live in `tfstats-core` (they are dialect concerns); this
//! module only owns the enums and their fixed properties.

use serde::{Deserialize, Serialize};

/// Team colors as they appear in the identity token and in `joined team` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Blue,
    Red,
    Yellow,
    Green,
    Spectator,
    /// Empty team field or `Unassigned`.
    Unassigned,
}

impl TeamColor {
    /// Team number as used by the game: Blue = 1, Red = 2, Yellow = 3, Green = 4.
    pub fn team_number(self) -> Option<u8> {
        match self {
            TeamColor::Blue => Some(1),
            TeamColor::Red => Some(2),
            TeamColor::Yellow => Some(3),
            TeamColor::Green => Some(4),
            TeamColor::Spectator | TeamColor::Unassigned => None,
        }
    }

    /// True for the four playing teams.
    pub fn is_playing(self) -> bool {
        self.team_number().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamColor::Blue => "Blue",
            TeamColor::Red => "Red",
            TeamColor::Yellow => "Yellow",
            TeamColor::Green => "Green",
            TeamColor::Spectator => "Spectator",
            TeamColor::Unassigned => "Unassigned",
        }
    }
}

/// Offense/defense designation. Team 1 attacks, team 2 defends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Offense,
    Defense,
    Neutral,
}

impl TeamRole {
    pub fn for_team_number(number: u8) -> TeamRole {
        match number {
            1 => TeamRole::Offense,
            2 => TeamRole::Defense,
            _ => TeamRole::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerClass {
    Scout,
    Sniper,
    Soldier,
    Demoman,
    Medic,
    HwGuy,
    Pyro,
    Spy,
    Engineer,
    Civilian,
    RandomPc,
}

impl PlayerClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerClass::Scout => "Scout",
            PlayerClass::Sniper => "Sniper",
            PlayerClass::Soldier => "Soldier",
            PlayerClass::Demoman => "Demoman",
            PlayerClass::Medic => "Medic",
            PlayerClass::HwGuy => "HWGuy",
            PlayerClass::Pyro => "Pyro",
            PlayerClass::Spy => "Spy",
            PlayerClass::Engineer => "Engineer",
            PlayerClass::Civilian => "Civilian",
            PlayerClass::RandomPc => "RandomPC",
        }
    }
}

/// Engineer buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    SentryGun,
    Dispenser,
    TeleporterEntrance,
    TeleporterExit,
}

/// Weapons and other causes of damage/death. Log synonyms collapse onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weapon {
    Axe,
    Spanner,
    Medikit,
    Knife,
    Shotgun,
    SuperShotgun,
    NailGun,
    SuperNailGun,
    GrenadeLauncher,
    PipeBomb,
    Rocket,
    IncendiaryCannon,
    Flamethrower,
    AssaultCannon,
    SniperRifle,
    Headshot,
    AutoRifle,
    Tranquilizer,
    Railgun,
    NormalGrenade,
    ConcussionGrenade,
    NailGrenade,
    MirvGrenade,
    NapalmGrenade,
    GasGrenade,
    EmpGrenade,
    Caltrop,
    Detpack,
    SentryGun,
    Dispenser,
    Telefrag,
    Infection,
    Burning,
    World,
}

impl Weapon {
    pub fn as_str(self) -> &'static str {
        match self {
            Weapon::Axe => "axe",
            Weapon::Spanner => "spanner",
            Weapon::Medikit => "medikit",
            Weapon::Knife => "knife",
            Weapon::Shotgun => "shotgun",
            Weapon::SuperShotgun => "supershotgun",
            Weapon::NailGun => "nails",
            Weapon::SuperNailGun => "supernails",
            Weapon::GrenadeLauncher => "gl_grenade",
            Weapon::PipeBomb => "pipebomb",
            Weapon::Rocket => "rocket",
            Weapon::IncendiaryCannon => "incendiary",
            Weapon::Flamethrower => "flames",
            Weapon::AssaultCannon => "ac",
            Weapon::SniperRifle => "sniperrifle",
            Weapon::Headshot => "headshot",
            Weapon::AutoRifle => "autorifle",
            Weapon::Tranquilizer => "tranq",
            Weapon::Railgun => "railgun",
            Weapon::NormalGrenade => "normalgrenade",
            Weapon::ConcussionGrenade => "concussiongrenade",
            Weapon::NailGrenade => "nailgrenade",
            Weapon::MirvGrenade => "mirvgrenade",
            Weapon::NapalmGrenade => "napalmgrenade",
            Weapon::GasGrenade => "gasgrenade",
            Weapon::EmpGrenade => "empgrenade",
            Weapon::Caltrop => "caltrop",
            Weapon::Detpack => "detpack",
            Weapon::SentryGun => "sentrygun",
            Weapon::Dispenser => "dispenser",
            Weapon::Telefrag => "telefrag",
            Weapon::Infection => "infection",
            Weapon::Burning => "fire",
            Weapon::World => "world",
        }
    }
}
