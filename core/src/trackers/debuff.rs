use tfstats_types::{PlayerClass, StatsConfig};

use crate::error::TrackerError;
use crate::log::{Event, EventKind};
use crate::pipeline::{Decision, EventSubscriber, Phase, RoundState};
use crate::players::PlayerKey;

/// Marks events performed while the actor was still conced.
#[derive(Debug)]
pub struct DebuffTracker {
    duration_secs: i64,
    medic_divisor: i64,
}

impl DebuffTracker {
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            duration_secs: config.conc_duration_secs,
            medic_divisor: config.medic_conc_divisor.max(1),
        }
    }

    fn window(&self, class: Option<PlayerClass>) -> i64 {
        match class {
            Some(PlayerClass::Medic) => self.duration_secs / self.medic_divisor,
            _ => self.duration_secs,
        }
    }

    /// A team change ends the debuff on every key of the account that is no
    /// longer on its team.
    fn clear_departed(key: PlayerKey, state: &mut RoundState) {
        for other in state.players.account_keys(key) {
            let on_team = state
                .players
                .team_of(other)
                .is_some_and(|team| state.teams.is_current(team, other));
            if !on_team {
                state.debuffs.clear(other);
            }
        }
    }
}

impl EventSubscriber for DebuffTracker {
    fn name(&self) -> &'static str {
        "debuff-tracker"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::Main]
    }

    fn handle_event(
        &mut self,
        _phase: Phase,
        event: &mut Event,
        state: &mut RoundState,
    ) -> Result<Decision, TrackerError> {
        let now = event.game_time;

        if let Some(actor) = event.actor()
            && let Some(since) = state.debuffs.since(actor)
        {
            let elapsed = now - since;
            if (0..=self.window(event.actor_class())).contains(&elapsed) {
                event.while_conced = true;
            }
        }

        match event.kind {
            EventKind::PlayerConced => {
                let target = event.target().ok_or(TrackerError::MissingPlayer("to"))?;
                state.debuffs.apply(target, now);
            }
            EventKind::PlayerFraggedPlayer => {
                if let Some(victim) = event.target() {
                    state.debuffs.clear(victim);
                }
            }
            EventKind::PlayerCommitSuicide | EventKind::PlayerLeftServer | EventKind::PlayerKicked => {
                if let Some(key) = event.actor() {
                    state.debuffs.clear(key);
                }
            }
            EventKind::PlayerJoinTeam => {
                if let Some(key) = event.actor() {
                    Self::clear_departed(key, state);
                }
            }
            _ => {}
        }
        Ok(Decision::Keep)
    }
}
