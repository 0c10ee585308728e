//! String → enum lookups over every synonym seen in the wild.
//!
//! Lookups are case-insensitive. An unknown name returns `None`; the parser
//! turns that into a fatal `ParseError`, never a default.

use phf::phf_map;
use tfstats_types::{PlayerClass, TeamColor, Weapon};

// Generated by build.rs from data/weapons.csv
include!(concat!(env!("OUT_DIR"), "/weapon_synonyms.rs"));

static TEAM_NAMES: phf::Map<&'static str, TeamColor> = phf_map! {
    "blue" => TeamColor::Blue,
    "red" => TeamColor::Red,
    "yellow" => TeamColor::Yellow,
    "green" => TeamColor::Green,
    "spectator" => TeamColor::Spectator,
    "spectators" => TeamColor::Spectator,
    "unassigned" => TeamColor::Unassigned,
    "" => TeamColor::Unassigned,
    // Localized team names some maps ship with
    "#dustbowl_team1" => TeamColor::Blue,
    "#dustbowl_team2" => TeamColor::Red,
    "#hunted_team1" => TeamColor::Blue,
    "#hunted_team2" => TeamColor::Red,
    "#hunted_team3" => TeamColor::Yellow,
    "attackers" => TeamColor::Blue,
    "defenders" => TeamColor::Red,
};

static CLASS_NAMES: phf::Map<&'static str, PlayerClass> = phf_map! {
    "scout" => PlayerClass::Scout,
    "sniper" => PlayerClass::Sniper,
    "soldier" => PlayerClass::Soldier,
    "demoman" => PlayerClass::Demoman,
    "medic" => PlayerClass::Medic,
    "hwguy" => PlayerClass::HwGuy,
    "hw guy" => PlayerClass::HwGuy,
    "heavy" => PlayerClass::HwGuy,
    "pyro" => PlayerClass::Pyro,
    "spy" => PlayerClass::Spy,
    "engineer" => PlayerClass::Engineer,
    "civilian" => PlayerClass::Civilian,
    "randompc" => PlayerClass::RandomPc,
    "random" => PlayerClass::RandomPc,
};

pub fn team_from_name(name: &str) -> Option<TeamColor> {
    TEAM_NAMES
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
}

pub fn class_from_name(name: &str) -> Option<PlayerClass> {
    CLASS_NAMES
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
}

pub fn weapon_from_name(name: &str) -> Option<Weapon> {
    WEAPON_SYNONYMS
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_synonyms_collapse() {
        assert_eq!(weapon_from_name("axe"), Some(Weapon::Axe));
        assert_eq!(weapon_from_name("crowbar"), Some(Weapon::Axe));
        assert_eq!(weapon_from_name("ROCKET"), Some(Weapon::Rocket));
        assert_eq!(weapon_from_name("worldspawn"), Some(Weapon::World));
        assert_eq!(weapon_from_name("spoon"), None);
    }

    #[test]
    fn engine_entity_causes_are_mapped() {
        assert_eq!(weapon_from_name("timer"), Some(Weapon::Infection));
        assert_eq!(weapon_from_name("nailgrenade"), Some(Weapon::NailGrenade));
        assert_eq!(weapon_from_name("miniturret"), Some(Weapon::World));
        assert_eq!(weapon_from_name("building_sentrygun"), Some(Weapon::SentryGun));
    }

    #[test]
    fn team_names_are_case_insensitive() {
        assert_eq!(team_from_name("Blue"), Some(TeamColor::Blue));
        assert_eq!(team_from_name("RED"), Some(TeamColor::Red));
        assert_eq!(team_from_name(""), Some(TeamColor::Unassigned));
        assert_eq!(team_from_name("#Dustbowl_team1"), Some(TeamColor::Blue));
        assert_eq!(team_from_name("purple"), None);
    }

    #[test]
    fn class_names() {
        assert_eq!(class_from_name("HWGuy"), Some(PlayerClass::HwGuy));
        assert_eq!(class_from_name("Medic"), Some(PlayerClass::Medic));
        assert_eq!(class_from_name("RandomPC"), Some(PlayerClass::RandomPc));
        assert_eq!(class_from_name("Wizard"), None);
    }

    #[test]
    fn every_weapon_has_its_canonical_name_as_synonym() {
        for (_, weapon) in WEAPON_SYNONYMS.entries() {
            assert_eq!(weapon_from_name(weapon.as_str()), Some(*weapon));
        }
    }
}
