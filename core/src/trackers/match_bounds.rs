use chrono::NaiveDateTime;

use crate::error::TrackerError;
use crate::log::{Event, EventKind};
use crate::pipeline::{Decision, EventSubscriber, MatchBounds, Phase, RoundState};

/// Finds the match window, stamps game time and culls events outside it.
///
/// Start is the first prematch-end trigger (else the first event). End is the
/// first team score at or after the start (else the last event). Both bounds
/// are inclusive by line number.
#[derive(Debug, Default)]
pub struct MatchBoundsCuller {
    first: Option<(u64, NaiveDateTime)>,
    last: Option<(u64, NaiveDateTime)>,
    prematch_end: Option<(u64, NaiveDateTime)>,
    team_scores: Vec<(u64, NaiveDateTime)>,
    culled: usize,
}

impl MatchBoundsCuller {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self) -> Option<MatchBounds> {
        let (start_line, start_time) = self.prematch_end.or(self.first)?;
        let score = self
            .team_scores
            .iter()
            .find(|(line, _)| *line >= start_line)
            .copied();
        let (end_line, end_time) = score.or(self.last)?;

        Some(MatchBounds {
            start_line,
            end_line,
            start_time,
            end_time,
            duration_secs: (end_time - start_time).num_seconds().max(0),
            has_prematch_end: self.prematch_end.is_some(),
            has_team_score: score.is_some(),
        })
    }
}

impl EventSubscriber for MatchBoundsCuller {
    fn name(&self) -> &'static str {
        "match-bounds-culler"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::Initial, Phase::EarlyFixups]
    }

    fn handle_event(
        &mut self,
        phase: Phase,
        event: &mut Event,
        state: &mut RoundState,
    ) -> Result<Decision, TrackerError> {
        match phase {
            Phase::Initial => {
                let mark = (event.line_number, event.timestamp);
                if self.first.is_none() {
                    self.first = Some(mark);
                }
                self.last = Some(mark);
                match event.kind {
                    EventKind::PrematchEnd if self.prematch_end.is_none() => self.prematch_end = Some(mark),
                    EventKind::TeamScore => self.team_scores.push(mark),
                    _ => {}
                }
                Ok(Decision::Keep)
            }
            Phase::EarlyFixups => {
                let bounds = state.bounds()?;
                event.game_time = (event.timestamp - bounds.start_time).num_seconds();

                let inside = (bounds.start_line..=bounds.end_line).contains(&event.line_number);
                if inside || event.kind.survives_culling() {
                    Ok(Decision::Keep)
                } else {
                    self.culled += 1;
                    Ok(Decision::Drop)
                }
            }
            _ => Ok(Decision::Keep),
        }
    }

    fn phase_end(&mut self, phase: Phase, _events: &[Event], state: &mut RoundState) -> Result<(), TrackerError> {
        match phase {
            Phase::Initial => {
                state.bounds = self.resolve();
                if let Some(bounds) = &state.bounds {
                    tracing::debug!(
                        start_line = bounds.start_line,
                        end_line = bounds.end_line,
                        duration_secs = bounds.duration_secs,
                        "Match bounds"
                    );
                }
            }
            Phase::EarlyFixups if self.culled > 0 => {
                tracing::debug!(culled = self.culled, "Culled events outside the match");
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RoundProcessor;
    use crate::testing::base_time;
    use chrono::Duration;

    fn event(kind: EventKind, line: u64, secs: i64) -> Event {
        Event::new(kind, line, base_time() + Duration::seconds(secs))
    }

    fn run(events: Vec<Event>) -> (Vec<Event>, RoundState) {
        let mut processor = RoundProcessor::new();
        processor.add_subscriber(Box::new(MatchBoundsCuller::new()));
        let mut state = RoundState::default();
        let events = processor.run(events, &mut state).unwrap();
        (events, state)
    }

    #[test]
    fn start_line_is_kept_and_the_line_before_dropped() {
        let (events, state) = run(vec![
            event(EventKind::PlayerEnteredGame, 1, 0),
            event(EventKind::WorldTrigger, 2, 5),
            event(EventKind::PrematchEnd, 3, 10),
            event(EventKind::PlayerFraggedPlayer, 4, 20),
            event(EventKind::TeamScore, 5, 70),
            event(EventKind::PlayerSay, 6, 75),
            event(EventKind::PlayerFraggedPlayer, 7, 80),
        ]);

        let lines: Vec<u64> = events.iter().map(|e| e.line_number).collect();
        // chat after the end is allow-listed, the late frag is not
        assert_eq!(lines, vec![3, 4, 5, 6]);

        let bounds = state.bounds.unwrap();
        assert_eq!((bounds.start_line, bounds.end_line), (3, 5));
        assert_eq!(bounds.duration_secs, 60);
        assert!(bounds.has_prematch_end && bounds.has_team_score);
        assert_eq!(events[0].game_time, 0);
        assert_eq!(events[1].game_time, 10);
    }

    #[test]
    fn allow_listed_setup_survives_before_start() {
        let (events, _) = run(vec![
            event(EventKind::MapLoading, 1, 0),
            event(EventKind::PlayerJoinTeam, 2, 1),
            event(EventKind::PlayerChangeRole, 3, 2),
            event(EventKind::PrematchEnd, 4, 30),
        ]);
        assert_eq!(events.len(), 4);
        assert_eq!(events[1].game_time, -29);
    }

    #[test]
    fn no_markers_keeps_everything() {
        let (events, state) = run(vec![
            event(EventKind::PlayerEnteredGame, 1, 0),
            event(EventKind::PlayerFraggedPlayer, 2, 40),
        ]);
        assert_eq!(events.len(), 2);
        let bounds = state.bounds.unwrap();
        assert!(!bounds.has_prematch_end);
        assert_eq!(bounds.duration_secs, 40);
    }

    #[test]
    fn score_before_start_is_not_the_end() {
        let (_, state) = run(vec![
            event(EventKind::TeamScore, 1, 0),
            event(EventKind::PrematchEnd, 2, 10),
            event(EventKind::PlayerEnteredGame, 3, 50),
        ]);
        let bounds = state.bounds.unwrap();
        assert_eq!(bounds.end_line, 3);
        assert!(!bounds.has_team_score);
    }
}
