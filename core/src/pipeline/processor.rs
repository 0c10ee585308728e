use tfstats_types::StatsConfig;

use super::{Decision, EventSubscriber, Phase, RoundState};
use crate::error::{RoundError, TrackerError};
use crate::log::Event;
use crate::trackers::{ClassTracker, DebuffTracker, FlagTracker, MatchBoundsCuller, TeamTracker};

/// Runs the phases over one round's events.
#[derive(Default)]
pub struct RoundProcessor {
    subscribers: Vec<Box<dyn EventSubscriber + Send>>,
}

impl RoundProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Culler, class, team, flag and debuff trackers, in that order.
    pub fn standard(config: &StatsConfig) -> Self {
        let mut processor = Self::new();
        processor.add_subscriber(Box::new(MatchBoundsCuller::new()));
        processor.add_subscriber(Box::new(ClassTracker::new()));
        processor.add_subscriber(Box::new(TeamTracker::new()));
        processor.add_subscriber(Box::new(FlagTracker::new(config)));
        processor.add_subscriber(Box::new(DebuffTracker::new(config)));
        processor
    }

    /// Register a subscriber. Registration order is delivery order.
    pub fn add_subscriber(&mut self, subscriber: Box<dyn EventSubscriber + Send>) {
        self.subscribers.push(subscriber);
    }

    /// Run every phase in order. Returns the events that survived all drops.
    pub fn run(&mut self, mut events: Vec<Event>, state: &mut RoundState) -> Result<Vec<Event>, RoundError> {
        for phase in Phase::ALL {
            let active: Vec<usize> = self
                .subscribers
                .iter()
                .enumerate()
                .filter(|(_, s)| s.phases().contains(&phase))
                .map(|(i, _)| i)
                .collect();
            if active.is_empty() {
                continue;
            }

            for &i in &active {
                let subscriber = &mut self.subscribers[i];
                subscriber
                    .phase_start(phase, &events, state)
                    .map_err(|e| wrap(subscriber.name(), phase, None, e))?;
            }

            let before = events.len();
            let mut kept = Vec::with_capacity(before);
            for mut event in events {
                state.current_game_time = event.game_time;
                let mut decision = Decision::Keep;
                for &i in &active {
                    let subscriber = &mut self.subscribers[i];
                    let d = subscriber
                        .handle_event(phase, &mut event, state)
                        .map_err(|e| wrap(subscriber.name(), phase, Some(event.line_number), e))?;
                    if d == Decision::Drop {
                        decision = Decision::Drop;
                    }
                }
                if decision == Decision::Keep {
                    kept.push(event);
                }
            }
            events = kept;

            for &i in &active {
                let subscriber = &mut self.subscribers[i];
                subscriber
                    .phase_end(phase, &events, state)
                    .map_err(|e| wrap(subscriber.name(), phase, None, e))?;
            }

            tracing::debug!(?phase, kept = events.len(), dropped = before - events.len(), "Phase complete");
        }
        Ok(events)
    }
}

fn wrap(subscriber: &'static str, phase: Phase, line: Option<u64>, source: TrackerError) -> RoundError {
    RoundError::Subscriber {
        subscriber,
        phase,
        line,
        source,
    }
}
