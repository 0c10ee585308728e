//! Event → named counter classification.

use hashbrown::HashMap;
use tfstats_types::{BuildingKind, Weapon};

use crate::log::{Event, EventKind};
use crate::players::{PlayerKey, PlayerRegistry};

use super::{Facet, Stat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Counter {
    // Kills
    Kill,
    TeamKill,
    SentryKill,
    DispenserKill,
    TeleporterKill,
    BuildingTeamKill,
    KillWhileConced,
    // Deaths
    Death,
    DeathByTeam,
    DeathBySentry,
    Suicide,
    // Objectives
    FlagTouch,
    FlagCapture,
    FlagCaptureBonus,
    FlagThrow,
    PointCapture,
    // Buildables
    BuiltSentry,
    UpgradedSentry,
    BuiltDispenser,
    BuiltTeleporter,
    Dismantled,
    Detonated,
    LostSentry,
    LostDispenser,
    LostTeleporter,
    // Weaponry
    Conc,
    Tranq,
    Hallucinate,
    Caltrop,
    Infect,
    Airshot,
    Airshotted,
    RevealedSpy,
    DetpackSet,
    DetpackDisarm,
    // Support
    Heal,
    Cure,
    Douse,
    PassedInfection,
    // Damage
    DamageDealt,
    DamageTaken,
}

/// One increment of one counter for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credit {
    pub player: PlayerKey,
    pub counter: Counter,
    pub opponent: Option<PlayerKey>,
    pub weapon: Option<Weapon>,
    pub amount: u64,
}

fn same_team(players: &PlayerRegistry, a: PlayerKey, b: PlayerKey) -> bool {
    match (players.team_of(a), players.team_of(b)) {
        (Some(x), Some(y)) => x == y && x.is_playing(),
        _ => false,
    }
}

/// Every credit an event earns.
pub fn credits(event: &Event, players: &PlayerRegistry) -> Vec<Credit> {
    let mut out = Vec::new();
    let (Some(actor), target) = (event.actor(), event.target()) else {
        return out;
    };
    let weapon = event.weapon;
    let mut credit = |player: PlayerKey, counter: Counter, opponent: Option<PlayerKey>| {
        out.push(Credit {
            player,
            counter,
            opponent,
            weapon,
            amount: 1,
        });
    };

    match event.kind {
        EventKind::MapLoading
        | EventKind::ServerName
        | EventKind::ServerCvarStart
        | EventKind::ServerCvarEnd
        | EventKind::ServerCvar
        | EventKind::RconCommand
        | EventKind::WorldTrigger
        | EventKind::PrematchEnd
        | EventKind::TeamScore
        | EventKind::FlagReturn
        | EventKind::PlayerConnected
        | EventKind::PlayerEnteredGame
        | EventKind::PlayerJoinTeam
        | EventKind::PlayerChangeRole
        | EventKind::PlayerChangedName
        | EventKind::PlayerSay
        | EventKind::PlayerSayTeam
        | EventKind::PlayerLeftServer
        | EventKind::PlayerKicked
        | EventKind::PlayerDetpackExplode
        | EventKind::PlayerPickedUpBonusFlag => {}

        EventKind::PlayerCommitSuicide => credit(actor, Counter::Suicide, None),
        EventKind::PlayerBuiltSentryGun => credit(actor, Counter::BuiltSentry, None),
        EventKind::PlayerUpgradedSentryGun => credit(actor, Counter::UpgradedSentry, None),
        EventKind::PlayerBuiltDispenser => credit(actor, Counter::BuiltDispenser, None),
        EventKind::PlayerBuiltTeleporter => credit(actor, Counter::BuiltTeleporter, None),
        EventKind::PlayerDismantledBuilding => credit(actor, Counter::Dismantled, None),
        EventKind::PlayerDetonatedBuilding => credit(actor, Counter::Detonated, None),
        EventKind::PlayerDetpackSet => credit(actor, Counter::DetpackSet, None),
        EventKind::PlayerPickedUpFlag => credit(actor, Counter::FlagTouch, None),
        EventKind::PlayerThrewFlag => credit(actor, Counter::FlagThrow, None),
        EventKind::PlayerCapturedFlag => credit(actor, Counter::FlagCapture, None),
        EventKind::PlayerCapturedBonusFlag => {
            credit(actor, Counter::FlagCapture, None);
            credit(actor, Counter::FlagCaptureBonus, None);
        }
        EventKind::PlayerCapturedPoint => credit(actor, Counter::PointCapture, None),

        EventKind::PlayerFraggedPlayer => match target {
            Some(victim) if victim == actor => credit(actor, Counter::Suicide, None),
            Some(victim) if same_team(players, actor, victim) => {
                credit(actor, Counter::TeamKill, Some(victim));
                credit(victim, Counter::DeathByTeam, Some(actor));
            }
            Some(victim) => {
                credit(actor, Counter::Kill, Some(victim));
                if event.while_conced {
                    credit(actor, Counter::KillWhileConced, Some(victim));
                }
                credit(victim, Counter::Death, Some(actor));
                if weapon == Some(Weapon::SentryGun) {
                    credit(victim, Counter::DeathBySentry, Some(actor));
                }
            }
            None => {}
        },
        EventKind::PlayerFraggedBuilding => {
            if let Some(owner) = target {
                if same_team(players, actor, owner) {
                    credit(actor, Counter::BuildingTeamKill, Some(owner));
                } else {
                    let (kill, lost) = match event.data.building {
                        Some(BuildingKind::SentryGun) => (Counter::SentryKill, Counter::LostSentry),
                        Some(BuildingKind::Dispenser) => (Counter::DispenserKill, Counter::LostDispenser),
                        Some(BuildingKind::TeleporterEntrance | BuildingKind::TeleporterExit) | None => {
                            (Counter::TeleporterKill, Counter::LostTeleporter)
                        }
                    };
                    credit(actor, kill, Some(owner));
                    credit(owner, lost, Some(actor));
                }
            }
        }
        EventKind::PlayerHeal => credit(actor, Counter::Heal, target),
        EventKind::PlayerInfected => credit(actor, Counter::Infect, target),
        EventKind::PlayerPassedInfection => credit(actor, Counter::PassedInfection, target),
        EventKind::PlayerCuredInfection => credit(actor, Counter::Cure, target),
        EventKind::PlayerDousedFire => credit(actor, Counter::Douse, target),
        EventKind::PlayerConced => credit(actor, Counter::Conc, target),
        EventKind::PlayerTranqed => credit(actor, Counter::Tranq, target),
        EventKind::PlayerHallucinated => credit(actor, Counter::Hallucinate, target),
        EventKind::PlayerCaltroped => credit(actor, Counter::Caltrop, target),
        EventKind::PlayerRevealedSpy => credit(actor, Counter::RevealedSpy, target),
        EventKind::PlayerDetpackDisarm => credit(actor, Counter::DetpackDisarm, target),
        EventKind::PlayerHitAirshot => {
            credit(actor, Counter::Airshot, target);
            if let Some(victim) = target {
                credit(victim, Counter::Airshotted, Some(actor));
            }
        }
        EventKind::PlayerDamaged => {
            let amount = event.data.value.unwrap_or(0).max(0) as u64;
            out.push(Credit {
                player: actor,
                counter: Counter::DamageDealt,
                opponent: target,
                weapon,
                amount,
            });
            if let Some(victim) = target {
                out.push(Credit {
                    player: victim,
                    counter: Counter::DamageTaken,
                    opponent: Some(actor),
                    weapon,
                    amount,
                });
            }
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
struct Tally {
    value: u64,
    by_opponent: HashMap<PlayerKey, u64>,
    by_weapon: HashMap<Weapon, u64>,
}

/// Counter totals with their facets, per player.
#[derive(Debug, Clone, Default)]
pub struct CounterTable {
    tallies: HashMap<(PlayerKey, Counter), Tally>,
}

impl CounterTable {
    pub fn from_events(events: &[Event], players: &PlayerRegistry) -> Self {
        let mut table = Self::default();
        for event in events {
            for credit in credits(event, players) {
                table.add(credit);
            }
        }
        table
    }

    pub fn add(&mut self, credit: Credit) {
        let tally = self.tallies.entry((credit.player, credit.counter)).or_default();
        tally.value += credit.amount;
        if let Some(opponent) = credit.opponent {
            *tally.by_opponent.entry(opponent).or_default() += credit.amount;
        }
        if let Some(weapon) = credit.weapon {
            *tally.by_weapon.entry(weapon).or_default() += credit.amount;
        }
    }

    pub fn value(&self, player: PlayerKey, counter: Counter) -> u64 {
        self.tallies.get(&(player, counter)).map_or(0, |t| t.value)
    }

    pub fn stat(&self, player: PlayerKey, counter: Counter, players: &PlayerRegistry) -> Stat {
        let Some(tally) = self.tallies.get(&(player, counter)) else {
            return Stat::default();
        };

        let mut opponents: Vec<(u64, String, PlayerKey)> = tally
            .by_opponent
            .iter()
            .map(|(&key, &count)| (count, players.name_of(key).to_string(), key))
            .collect();
        opponents.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)).then_with(|| a.2.cmp(&b.2)));

        let mut weapons: Vec<(u64, &'static str)> =
            tally.by_weapon.iter().map(|(w, &count)| (count, w.as_str())).collect();
        weapons.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        Stat {
            value: tally.value,
            by_opponent: opponents
                .into_iter()
                .map(|(count, label, _)| Facet::new(label, count, tally.value))
                .collect(),
            by_weapon: weapons
                .into_iter()
                .map(|(count, label)| Facet::new(label.to_string(), count, tally.value))
                .collect(),
        }
    }
}
