use crate::error::TrackerError;
use crate::log::{Event, EventKind, PlayerRef};
use crate::pipeline::{Decision, EventSubscriber, Phase, RoundState};
use crate::players::TimeIntervalWithContext;

/// Tracks each player's class over time and stamps it onto events.
///
/// The initial pass works in line numbers, so classes are known before game
/// time exists. Once it does, the same intervals are recorded in game seconds.
#[derive(Debug, Default)]
pub struct ClassTracker;

impl ClassTracker {
    pub fn new() -> Self {
        Self
    }

    fn open_line_interval(event: &Event, state: &mut RoundState) -> Result<(), TrackerError> {
        let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
        let class = event.data.class.ok_or(TrackerError::MissingPayload("class"))?;
        let line = event.line_number as i64;

        let player = state.player_mut(key)?;
        if let Some(last) = player.class_lines.last_mut() {
            last.interval.close(line - 1);
        }
        player.class_lines.push(TimeIntervalWithContext::open(line, class));
        Ok(())
    }

    fn open_time_interval(event: &Event, state: &mut RoundState) -> Result<(), TrackerError> {
        let key = event.actor().ok_or(TrackerError::MissingPlayer("from"))?;
        let class = event.data.class.ok_or(TrackerError::MissingPayload("class"))?;

        let player = state.player_mut(key)?;
        if let Some(last) = player.classes.last_mut() {
            last.interval.close(event.game_time);
        }
        player.classes.push(TimeIntervalWithContext::open(event.game_time, class));
        Ok(())
    }

    fn stamp(slot: &mut Option<PlayerRef>, state: &RoundState) -> Result<(), TrackerError> {
        if let Some(player_ref) = slot.as_mut() {
            player_ref.class = state.player(player_ref.player)?.current_class();
        }
        Ok(())
    }
}

impl EventSubscriber for ClassTracker {
    fn name(&self) -> &'static str {
        "class-tracker"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::Initial, Phase::AfterGameTimeEpochEstablished]
    }

    fn handle_event(
        &mut self,
        phase: Phase,
        event: &mut Event,
        state: &mut RoundState,
    ) -> Result<Decision, TrackerError> {
        let is_role_change = event.kind == EventKind::PlayerChangeRole;
        match phase {
            Phase::Initial => {
                if is_role_change {
                    Self::open_line_interval(event, state)?;
                }
                Self::stamp(&mut event.from, state)?;
                Self::stamp(&mut event.to, state)?;
            }
            Phase::AfterGameTimeEpochEstablished if is_role_change => {
                Self::open_time_interval(event, state)?;
            }
            _ => {}
        }
        Ok(Decision::Keep)
    }
}

#[cfg(test)]
mod tests {
    use tfstats_types::{PlayerClass, TeamColor};

    use super::*;
    use crate::log::EventData;
    use crate::pipeline::RoundProcessor;
    use crate::players::PlayerKey;
    use crate::testing::base_time;

    fn role(key: PlayerKey, line: u64, class: PlayerClass) -> Event {
        Event::new(EventKind::PlayerChangeRole, line, base_time())
            .by(key)
            .with_data(EventData {
                class: Some(class),
                ..Default::default()
            })
    }

    #[test]
    fn intervals_are_disjoint_and_the_last_is_open() {
        let mut state = RoundState::default();
        let p1 = state.players.observe("0:1", TeamColor::Blue, "P1", Some(1));
        let p2 = state.players.observe("0:2", TeamColor::Red, "P2", Some(2));

        let events = vec![
            role(p1, 1, PlayerClass::Scout),
            role(p2, 2, PlayerClass::Soldier),
            Event::new(EventKind::PlayerFraggedPlayer, 3, base_time()).by(p1).against(p2),
            role(p1, 4, PlayerClass::Medic),
            role(p1, 5, PlayerClass::Spy),
            Event::new(EventKind::PlayerSay, 6, base_time()).by(p1),
        ];

        let mut processor = RoundProcessor::new();
        processor.add_subscriber(Box::new(ClassTracker::new()));
        let events = processor.run(events, &mut state).unwrap();

        let classes = &state.players.get(p1).unwrap().class_lines;
        assert_eq!(classes.len(), 3);
        for pair in classes.windows(2) {
            let end = pair[0].interval.end.unwrap();
            assert!(end <= pair[1].interval.start);
        }
        assert!(classes.last().unwrap().interval.is_open());
        assert_eq!(classes[0].interval.end, Some(3));

        assert_eq!(events[2].actor_class(), Some(PlayerClass::Scout));
        assert_eq!(events[2].to.unwrap().class, Some(PlayerClass::Soldier));
        assert_eq!(events[3].actor_class(), Some(PlayerClass::Medic));
        assert_eq!(events[5].actor_class(), Some(PlayerClass::Spy));
    }

    #[test]
    fn unclassed_players_stay_unstamped() {
        let mut state = RoundState::default();
        let p1 = state.players.observe("0:1", TeamColor::Blue, "P1", Some(1));
        let mut processor = RoundProcessor::new();
        processor.add_subscriber(Box::new(ClassTracker::new()));
        let events = processor
            .run(vec![Event::new(EventKind::PlayerSay, 1, base_time()).by(p1)], &mut state)
            .unwrap();
        assert_eq!(events[0].actor_class(), None);
    }
}
