use tfstats_types::{StatsConfig, TeamColor};

use crate::error::TrackerError;
use crate::log::{Event, EventKind};
use crate::pipeline::{Decision, EventSubscriber, Phase, RoundState, TeamScoreEstimate};
use crate::players::PlayerKey;

/// Follows flag possession per carrying team: carries, first touches,
/// throws, carry time and captures. At round end it credits open carries and
/// estimates each team's score.
#[derive(Debug)]
pub struct FlagTracker {
    default_points_per_cap: i64,
    bonus_capture_ratio: f64,
}

impl FlagTracker {
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            default_points_per_cap: config.default_points_per_cap,
            bonus_capture_ratio: config.bonus_capture_ratio,
        }
    }

    /// Credit the current carry of `team` up to `now` and clear it.
    fn end_carry(team: TeamColor, now: i64, state: &mut RoundState) -> Result<(), TrackerError> {
        let flag = state.flags.team_mut(team);
        let Some(carrier) = flag.carrier else {
            return Ok(());
        };
        let held = (now - flag.picked_up_at).max(0);
        flag.reset();
        state.player_mut(carrier)?.flag.carry_time_secs += held;
        Ok(())
    }

    fn drop_by(key: PlayerKey, now: i64, state: &mut RoundState) -> Result<bool, TrackerError> {
        match state.flags.carried_by(key) {
            Some(team) => {
                Self::end_carry(team, now, state)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn carrier_team(event: &Event, key: PlayerKey, state: &RoundState) -> Result<Option<TeamColor>, TrackerError> {
        let team = state.player(key)?.team;
        if team.is_playing() {
            return Ok(Some(team));
        }
        Ok(event.data.team.filter(|t| t.is_playing()))
    }

    fn pickup(event: &Event, state: &mut RoundState) -> Result<(), TrackerError> {
        let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
        let now = event.game_time;
        let Some(team) = Self::carrier_team(event, key, state)? else {
            tracing::warn!(line = event.line_number, "Flag pickup by a player on no team");
            return Ok(());
        };

        let current = state.flags.team_mut(team).carrier;
        match current {
            Some(carrier) if carrier == key => return Ok(()),
            Some(carrier) => {
                tracing::warn!(
                    line = event.line_number,
                    previous = state.players.name_of(carrier),
                    "Flag picked up while another carry was open"
                );
                Self::end_carry(team, now, state)?;
            }
            None => {}
        }
        // One player carrying for two teams is not possible
        Self::drop_by(key, now, state)?;

        let flag = state.flags.team_mut(team);
        let first_touch = !flag.touched;
        flag.carrier = Some(key);
        flag.picked_up_at = now;
        flag.bonus_active = false;
        flag.touched = true;

        let player = state.player_mut(key)?;
        player.flag.carries += 1;
        if first_touch {
            player.flag.initial_touches += 1;
        }
        Ok(())
    }

    fn bonus_pickup(event: &Event, state: &mut RoundState) -> Result<(), TrackerError> {
        let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
        let Some(team) = Self::carrier_team(event, key, state)? else {
            return Ok(());
        };
        let flag = state.flags.team_mut(team);
        if flag.carrier != Some(key) {
            tracing::warn!(line = event.line_number, "Bonus picked up by someone not carrying the flag");
        }
        flag.bonus_active = true;
        Ok(())
    }

    fn flag_return(event: &Event, state: &mut RoundState) {
        match event.data.team {
            // The returned flag belongs to `owner`; every other team was carrying it
            Some(owner) => {
                for (team, flag) in state.flags.teams.iter_mut() {
                    if *team != owner {
                        flag.reset();
                    }
                }
            }
            None => state.flags.teams.values_mut().for_each(|f| f.reset()),
        }
    }

    fn capture(event: &mut Event, state: &mut RoundState) -> Result<(), TrackerError> {
        let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
        let now = event.game_time;

        let team = match state.flags.carried_by(key) {
            Some(team) => {
                if state.flags.team_mut(team).bonus_active {
                    event.kind = EventKind::PlayerCapturedBonusFlag;
                }
                Self::end_carry(team, now, state)?;
                team
            }
            None => {
                tracing::warn!(
                    line = event.line_number,
                    player = state.players.name_of(key),
                    "Capture without a tracked carry"
                );
                match Self::carrier_team(event, key, state)? {
                    Some(team) => team,
                    None => return Ok(()),
                }
            }
        };

        let flag = state.flags.team_mut(team);
        flag.captures += 1;
        if event.kind == EventKind::PlayerCapturedBonusFlag {
            flag.bonus_captures += 1;
        }
        Ok(())
    }

    fn estimate_scores(&self, state: &mut RoundState) {
        let mut teams: Vec<TeamColor> = state.flags.teams.keys().copied().collect();
        teams.extend(state.flags.reported_scores.keys().copied());
        teams.sort();
        teams.dedup();

        for team in teams {
            let (captures, bonus) = state
                .flags
                .team(team)
                .map_or((0, 0), |f| (f.captures, f.bonus_captures));
            let weighted = (captures - bonus) as f64 + bonus as f64 * self.bonus_capture_ratio;

            let estimate = match state.flags.reported_scores.get(&team) {
                Some(&score) => TeamScoreEstimate {
                    score,
                    points_per_cap: if weighted > 0.0 {
                        score as f64 / weighted
                    } else {
                        self.default_points_per_cap as f64
                    },
                    from_log: true,
                },
                None => {
                    let points_per_cap = self.default_points_per_cap as f64;
                    TeamScoreEstimate {
                        score: (points_per_cap * weighted).round() as i64,
                        points_per_cap,
                        from_log: false,
                    }
                }
            };
            state.flags.estimates.insert(team, estimate);
        }
    }
}

impl EventSubscriber for FlagTracker {
    fn name(&self) -> &'static str {
        "flag-tracker"
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

        let now = event.game_time;
        match event.kind {
            EventKind::PlayerPickedUpFlag => Self::pickup(event, state)?,
            EventKind::PlayerPickedUpBonusFlag => Self::bonus_pickup(event, state)?,
            EventKind::FlagReturn => Self::flag_return(event, state),
            EventKind::PlayerCapturedFlag | EventKind::PlayerCapturedBonusFlag => Self::capture(event, state)?,
            EventKind::PlayerThrewFlag => {
                let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
                if Self::drop_by(key, now, state)? {
                    state.player_mut(key)?.flag.throws += 1;
                }
            }
            EventKind::PlayerFraggedPlayer => {
                if let Some(victim) = event.target() {
                    Self::drop_by(victim, now, state)?;
                }
            }
            EventKind::PlayerCommitSuicide | EventKind::PlayerLeftServer | EventKind::PlayerKicked => {
                if let Some(key) = event.actor() {
                    Self::drop_by(key, now, state)?;
                }
            }
            EventKind::TeamScore => {
                if let (Some(team), Some(score)) = (event.data.team, event.data.value) {
                    state.flags.reported_scores.insert(team, score);
                }
            }
            _ => {}
        }
        Ok(Decision::Keep)
    }

    fn phase_start(&mut self, phase: Phase, _events: &[Event], state: &mut RoundState) -> Result<(), TrackerError> {
        if phase == Phase::PostMain {
            let end = state.round_end();
            let carrying: Vec<TeamColor> = state
                .flags
                .teams
                .iter()
                .filter(|(_, f)| f.carrier.is_some())
                .map(|(&team, _)| team)
                .collect();
            for team in carrying {
                Self::end_carry(team, end, state)?;
            }
            self.estimate_scores(state);
        }
        Ok(())
    }
}
