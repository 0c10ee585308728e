use crate::error::TrackerError;
use crate::log::{Event, EventKind};
use crate::pipeline::{Decision, EventSubscriber, Phase, RoundState};
use crate::players::{PlayerKey, TimeInterval};

/// Maintains team membership: the all-time roster, who is on each team right
/// now, and every player's team intervals in game seconds.
#[derive(Debug, Default)]
pub struct TeamTracker;

impl TeamTracker {
    pub fn new() -> Self {
        Self
    }

    fn join(event: &Event, state: &mut RoundState) -> Result<(), TrackerError> {
        let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
        let team = event.data.team.ok_or(TrackerError::MissingPayload("team"))?;
        let now = event.game_time;

        // Any other team this account was on ends here
        for other in state.players.account_keys(key) {
            if state.player(other)?.team != team {
                Self::leave(other, now, state)?;
            }
        }

        let member = state
            .players
            .same_account_on(key, team)
            .ok_or(TrackerError::UnknownPlayer(key))?;
        state.teams.join(team, member);
        let player = state.player_mut(member)?;
        if !player.has_open_team_interval() {
            player.team_intervals.push(TimeInterval::open(now));
        }
        Ok(())
    }

    fn leave(key: PlayerKey, now: i64, state: &mut RoundState) -> Result<(), TrackerError> {
        state.teams.leave(key);
        if let Some(interval) = state.player_mut(key)?.team_intervals.last_mut() {
            interval.close(now);
        }
        Ok(())
    }

    /// Players that show up on a team without a logged join (the log started
    /// mid-game) are added the first time they act.
    fn ensure_member(key: PlayerKey, now: i64, state: &mut RoundState) -> Result<(), TrackerError> {
        let team = state.player(key)?.team;
        if !team.is_playing() || state.teams.is_rostered(key) {
            return Ok(());
        }
        tracing::debug!(player = state.players.name_of(key), ?team, "Player active without joining");
        state.teams.join(team, key);
        state.player_mut(key)?.team_intervals.push(TimeInterval::open(now));
        Ok(())
    }
}

impl EventSubscriber for TeamTracker {
    fn name(&self) -> &'static str {
        "team-tracker"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::Main, Phase::PostMain]
    }

    fn handle_event(
        &mut self,
        phase: Phase,
        event: &mut Event,
        state: &mut RoundState,
    ) -> Result<Decision, TrackerError> {
        if phase != Phase::Main {
            return Ok(Decision::Keep);
        }

        match event.kind {
            EventKind::PlayerJoinTeam => Self::join(event, state)?,
            EventKind::PlayerLeftServer | EventKind::PlayerKicked => {
                let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
                for other in state.players.account_keys(key) {
                    Self::leave(other, event.game_time, state)?;
                }
            }
            _ => {
                for key in [event.actor(), event.target()].into_iter().flatten() {
                    Self::ensure_member(key, event.game_time, state)?;
                }
            }
        }
        Ok(Decision::Keep)
    }

    fn phase_start(&mut self, phase: Phase, _events: &[Event], state: &mut RoundState) -> Result<(), TrackerError> {
        if phase == Phase::PostMain {
            let end = state.round_end();
            for player in state.players.iter_mut() {
                if let Some(interval) = player.team_intervals.last_mut() {
                    interval.close(end);
                }
            }
        }
        Ok(())
    }
}
