use serde::Serialize;
use tfstats_types::formatting::pct_of;

use crate::players::{PlayerKey, PlayerRegistry};

use super::counters::{Counter, CounterTable};

/// One slice of a stat: an opponent or a weapon, with its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

impl Facet {
    pub fn new(label: String, count: u64, total: u64) -> Self {
        Self {
            label,
            count,
            percent: pct_of(count, total),
        }
    }
}

/// A counter value with its per-opponent and per-weapon breakdowns,
/// each sorted by count (descending) then label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stat {
    pub value: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by_opponent: Vec<Facet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by_weapon: Vec<Facet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KillStats {
    pub kill: Stat,
    pub teamkill: Stat,
    pub sentry: Stat,
    pub dispenser: Stat,
    pub teleporter: Stat,
    pub building_teamkill: Stat,
    pub while_conced: Stat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeathStats {
    pub death: Stat,
    pub by_team: Stat,
    pub by_sentry: Stat,
    pub suicide: Stat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectiveStats {
    pub flag_touch: Stat,
    pub flag_capture: Stat,
    pub flag_capture_bonus: Stat,
    pub flag_throw: Stat,
    pub point_capture: Stat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildableStats {
    pub built_sentry: Stat,
    pub upgraded_sentry: Stat,
    pub built_dispenser: Stat,
    pub built_teleporter: Stat,
    pub dismantled: Stat,
    pub detonated: Stat,
    pub lost_sentry: Stat,
    pub lost_dispenser: Stat,
    pub lost_teleporter: Stat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeaponryStats {
    pub conc: Stat,
    pub tranq: Stat,
    pub hallucinate: Stat,
    pub caltrop: Stat,
    pub infect: Stat,
    pub airshot: Stat,
    pub airshotted: Stat,
    pub revealed_spy: Stat,
    pub detpack_set: Stat,
    pub detpack_disarm: Stat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupportStats {
    pub heal: Stat,
    pub cure: Stat,
    pub douse: Stat,
    pub passed_infection: Stat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DamageStats {
    pub dealt: Stat,
    pub taken: Stat,
}

/// All counter groups of one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CounterGroups {
    pub kills: KillStats,
    pub deaths: DeathStats,
    pub objectives: ObjectiveStats,
    pub buildables: BuildableStats,
    pub weaponry: WeaponryStats,
    pub support: SupportStats,
    pub damage: DamageStats,
}

impl CounterGroups {
    pub fn for_player(table: &CounterTable, key: PlayerKey, players: &PlayerRegistry) -> Self {
        let stat = |counter| table.stat(key, counter, players);
        Self {
            kills: KillStats {
                kill: stat(Counter::Kill),
                teamkill: stat(Counter::TeamKill),
                sentry: stat(Counter::SentryKill),
                dispenser: stat(Counter::DispenserKill),
                teleporter: stat(Counter::TeleporterKill),
                building_teamkill: stat(Counter::BuildingTeamKill),
                while_conced: stat(Counter::KillWhileConced),
            },
            deaths: DeathStats {
                death: stat(Counter::Death),
                by_team: stat(Counter::DeathByTeam),
                by_sentry: stat(Counter::DeathBySentry),
                suicide: stat(Counter::Suicide),
            },
            objectives: ObjectiveStats {
                flag_touch: stat(Counter::FlagTouch),
                flag_capture: stat(Counter::FlagCapture),
                flag_capture_bonus: stat(Counter::FlagCaptureBonus),
                flag_throw: stat(Counter::FlagThrow),
                point_capture: stat(Counter::PointCapture),
            },
            buildables: BuildableStats {
                built_sentry: stat(Counter::BuiltSentry),
                upgraded_sentry: stat(Counter::UpgradedSentry),
                built_dispenser: stat(Counter::BuiltDispenser),
                built_teleporter: stat(Counter::BuiltTeleporter),
                dismantled: stat(Counter::Dismantled),
                detonated: stat(Counter::Detonated),
                lost_sentry: stat(Counter::LostSentry),
                lost_dispenser: stat(Counter::LostDispenser),
                lost_teleporter: stat(Counter::LostTeleporter),
            },
            weaponry: WeaponryStats {
                conc: stat(Counter::Conc),
                tranq: stat(Counter::Tranq),
                hallucinate: stat(Counter::Hallucinate),
                caltrop: stat(Counter::Caltrop),
                infect: stat(Counter::Infect),
                airshot: stat(Counter::Airshot),
                airshotted: stat(Counter::Airshotted),
                revealed_spy: stat(Counter::RevealedSpy),
                detpack_set: stat(Counter::DetpackSet),
                detpack_disarm: stat(Counter::DetpackDisarm),
            },
            support: SupportStats {
                heal: stat(Counter::Heal),
                cure: stat(Counter::Cure),
                douse: stat(Counter::Douse),
                passed_infection: stat(Counter::PassedInfection),
            },
            damage: DamageStats {
                dealt: stat(Counter::DamageDealt),
                taken: stat(Counter::DamageTaken),
            },
        }
    }
}
