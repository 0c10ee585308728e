//! Trigger name tables.
//!
//! Three tables, consulted in this order for a `triggered "x"` line:
//! the standard single-actor keywords, then the ordered map rule table
//! (built-ins first, configured extras after). Two-actor effect names have
//! their own table and an unknown name there is fatal.

use phf::phf_map;
use tfstats_types::{BuildingKind, MapTriggerConfig, MapTriggerKind, TeamColor};

use crate::config::ConfigError;
use crate::log::EventKind;

/// A standard single-actor trigger keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardTrigger {
    pub kind: EventKind,
    pub building: Option<BuildingKind>,
    pub level: Option<u8>,
}

/// A two-actor `triggered "x" against` effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectTrigger {
    pub kind: EventKind,
    pub building: Option<BuildingKind>,
}

static PLAYER_TRIGGERS: phf::Map<&'static str, StandardTrigger> = phf_map! {
    "sentry_built_level_1" => StandardTrigger { kind: EventKind::PlayerBuiltSentryGun, building: Some(BuildingKind::SentryGun), level: Some(1) },
    "sentry_upgrade_level_2" => StandardTrigger { kind: EventKind::PlayerUpgradedSentryGun, building: Some(BuildingKind::SentryGun), level: Some(2) },
    "sentry_upgrade_level_3" => StandardTrigger { kind: EventKind::PlayerUpgradedSentryGun, building: Some(BuildingKind::SentryGun), level: Some(3) },
    "built_dispenser" => StandardTrigger { kind: EventKind::PlayerBuiltDispenser, building: Some(BuildingKind::Dispenser), level: None },
    "teleporter_entrance_finished" => StandardTrigger { kind: EventKind::PlayerBuiltTeleporter, building: Some(BuildingKind::TeleporterEntrance), level: None },
    "teleporter_exit_finished" => StandardTrigger { kind: EventKind::PlayerBuiltTeleporter, building: Some(BuildingKind::TeleporterExit), level: None },
    "sentry_dismantle" => StandardTrigger { kind: EventKind::PlayerDismantledBuilding, building: Some(BuildingKind::SentryGun), level: None },
    "dispenser_dismantle" => StandardTrigger { kind: EventKind::PlayerDismantledBuilding, building: Some(BuildingKind::Dispenser), level: None },
    "teleporter_entrance_dismantle" => StandardTrigger { kind: EventKind::PlayerDismantledBuilding, building: Some(BuildingKind::TeleporterEntrance), level: None },
    "teleporter_exit_dismantle" => StandardTrigger { kind: EventKind::PlayerDismantledBuilding, building: Some(BuildingKind::TeleporterExit), level: None },
    // Without a victim token these are the engineer blowing up their own building
    "sentry_destroyed" => StandardTrigger { kind: EventKind::PlayerDetonatedBuilding, building: Some(BuildingKind::SentryGun), level: None },
    "dispenser_destroyed" => StandardTrigger { kind: EventKind::PlayerDetonatedBuilding, building: Some(BuildingKind::Dispenser), level: None },
    "teleporter_entrance_destroyed" => StandardTrigger { kind: EventKind::PlayerDetonatedBuilding, building: Some(BuildingKind::TeleporterEntrance), level: None },
    "teleporter_exit_destroyed" => StandardTrigger { kind: EventKind::PlayerDetonatedBuilding, building: Some(BuildingKind::TeleporterExit), level: None },
    "detpack_set" => StandardTrigger { kind: EventKind::PlayerDetpackSet, building: None, level: None },
    "detpack_explode" => StandardTrigger { kind: EventKind::PlayerDetpackExplode, building: None, level: None },
    "flag_thrown" => StandardTrigger { kind: EventKind::PlayerThrewFlag, building: None, level: None },
    "threw_flag" => StandardTrigger { kind: EventKind::PlayerThrewFlag, building: None, level: None },
};

static EFFECT_TRIGGERS: phf::Map<&'static str, EffectTrigger> = phf_map! {
    "sentry_destroyed" => EffectTrigger { kind: EventKind::PlayerFraggedBuilding, building: Some(BuildingKind::SentryGun) },
    "dispenser_destroyed" => EffectTrigger { kind: EventKind::PlayerFraggedBuilding, building: Some(BuildingKind::Dispenser) },
    "teleporter_entrance_destroyed" => EffectTrigger { kind: EventKind::PlayerFraggedBuilding, building: Some(BuildingKind::TeleporterEntrance) },
    "teleporter_exit_destroyed" => EffectTrigger { kind: EventKind::PlayerFraggedBuilding, building: Some(BuildingKind::TeleporterExit) },
    "medic_heal" => EffectTrigger { kind: EventKind::PlayerHeal, building: None },
    "healed" => EffectTrigger { kind: EventKind::PlayerHeal, building: None },
    "medic_infection" => EffectTrigger { kind: EventKind::PlayerInfected, building: None },
    "infected" => EffectTrigger { kind: EventKind::PlayerInfected, building: None },
    "passed_on_infection" => EffectTrigger { kind: EventKind::PlayerPassedInfection, building: None },
    "medic_cured_infection" => EffectTrigger { kind: EventKind::PlayerCuredInfection, building: None },
    "medic_doused_fire" => EffectTrigger { kind: EventKind::PlayerDousedFire, building: None },
    "concussion_grenade" => EffectTrigger { kind: EventKind::PlayerConced, building: None },
    "spy_tranq" => EffectTrigger { kind: EventKind::PlayerTranqed, building: None },
    "tranq" => EffectTrigger { kind: EventKind::PlayerTranqed, building: None },
    "hallucination_grenade" => EffectTrigger { kind: EventKind::PlayerHallucinated, building: None },
    "caltrop_grenade" => EffectTrigger { kind: EventKind::PlayerCaltroped, building: None },
    "discovered_spy" => EffectTrigger { kind: EventKind::PlayerRevealedSpy, building: None },
    "spy_revealed" => EffectTrigger { kind: EventKind::PlayerRevealedSpy, building: None },
    "detpack_disarm" => EffectTrigger { kind: EventKind::PlayerDetpackDisarm, building: None },
    "airshot" => EffectTrigger { kind: EventKind::PlayerHitAirshot, building: None },
    "damage" => EffectTrigger { kind: EventKind::PlayerDamaged, building: None },
};

/// `World triggered` names that end the prematch countdown.
const PREMATCH_END_TRIGGERS: &[&str] = &["match_begins_now", "prematch_end", "round_start"];

/// Built-in map rules: (pattern, prefix, kind, team).
const BUILTIN_MAP_RULES: &[(&str, bool, MapTriggerKind, Option<TeamColor>)] = &[
    // Returns come before pickups so "blue flag returned" never reads as a touch
    ("blue flag returned", false, MapTriggerKind::FlagReturn, Some(TeamColor::Blue)),
    ("red flag returned", false, MapTriggerKind::FlagReturn, Some(TeamColor::Red)),
    ("yellow flag returned", false, MapTriggerKind::FlagReturn, Some(TeamColor::Yellow)),
    ("green flag returned", false, MapTriggerKind::FlagReturn, Some(TeamColor::Green)),
    ("flag_returned", false, MapTriggerKind::FlagReturn, None),
    ("goalitem_return", true, MapTriggerKind::FlagReturn, None),
    // CTF pickups (2fort, well, rock-style naming)
    ("blue flag", false, MapTriggerKind::FlagPickup, None),
    ("red flag", false, MapTriggerKind::FlagPickup, None),
    ("yellow flag", false, MapTriggerKind::FlagPickup, None),
    ("green flag", false, MapTriggerKind::FlagPickup, None),
    ("flag_pickup", false, MapTriggerKind::FlagPickup, None),
    ("goalitem", false, MapTriggerKind::FlagPickup, None),
    // Bonus objectives carried on top of the flag
    ("bonus flag", false, MapTriggerKind::BonusFlagPickup, None),
    ("bonus_pickup", true, MapTriggerKind::BonusFlagPickup, None),
    ("bonus capture", false, MapTriggerKind::BonusFlagCapture, None),
    ("bonus_cap", true, MapTriggerKind::BonusFlagCapture, None),
    // Capture zones
    ("team 1 dropoff", false, MapTriggerKind::FlagCapture, None),
    ("team 2 dropoff", false, MapTriggerKind::FlagCapture, None),
    ("blue cap", false, MapTriggerKind::FlagCapture, None),
    ("red cap", false, MapTriggerKind::FlagCapture, None),
    ("flag_capture", false, MapTriggerKind::FlagCapture, None),
    ("capture_flag", false, MapTriggerKind::FlagCapture, None),
    // Command point maps
    ("command point", true, MapTriggerKind::PointCapture, None),
    ("capture point", true, MapTriggerKind::PointCapture, None),
    ("cp_", true, MapTriggerKind::PointCapture, None),
    // Known noise
    ("resupply", true, MapTriggerKind::Ignore, None),
    ("spawn_", true, MapTriggerKind::Ignore, None),
    ("info_player_teamspawn", false, MapTriggerKind::Ignore, None),
];

pub fn standard_trigger(name: &str) -> Option<StandardTrigger> {
    PLAYER_TRIGGERS.get(name.to_ascii_lowercase().as_str()).copied()
}

pub fn effect_trigger(name: &str) -> Option<EffectTrigger> {
    EFFECT_TRIGGERS.get(name.to_ascii_lowercase().as_str()).copied()
}

pub fn is_prematch_end(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    PREMATCH_END_TRIGGERS.contains(&lowered.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRule {
    /// Lowercased.
    pattern: String,
    prefix: bool,
    pub kind: MapTriggerKind,
    pub team: Option<TeamColor>,
}

impl TriggerRule {
    fn new(pattern: &str, prefix: bool, kind: MapTriggerKind, team: Option<TeamColor>) -> Self {
        Self {
            pattern: pattern.trim().to_ascii_lowercase(),
            prefix,
            kind,
            team,
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        if self.prefix {
            lowered.starts_with(&self.pattern)
        } else {
            lowered == self.pattern
        }
    }
}

/// Ordered map trigger rules. First match wins; extras only ever append.
#[derive(Debug, Clone)]
pub struct TriggerTable {
    rules: Vec<TriggerRule>,
}

impl TriggerTable {
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_MAP_RULES
                .iter()
                .map(|&(pattern, prefix, kind, team)| TriggerRule::new(pattern, prefix, kind, team))
                .collect(),
        }
    }

    /// Built-in rules followed by `extras`.
    pub fn with_extras(extras: &[MapTriggerConfig]) -> Result<Self, ConfigError> {
        let mut table = Self::builtin();
        for (index, extra) in extras.iter().enumerate() {
            if extra.trigger.trim().is_empty() {
                return Err(ConfigError::EmptyTrigger { index });
            }
            table.rules.push(TriggerRule::new(
                &extra.trigger,
                extra.prefix,
                extra.kind,
                extra.team,
            ));
        }
        Ok(table)
    }

    pub fn lookup(&self, trigger: &str) -> Option<&TriggerRule> {
        let lowered = trigger.trim().to_ascii_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lowered))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for TriggerTable {
    fn default() -> Self {
        Self::builtin()
    }
}
