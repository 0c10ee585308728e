//! Phased delivery of a round's events to stateful subscribers.
//!
//! Every phase is one full pass over the surviving event sequence. Within a
//! pass, each event is shown to every subscriber registered for the phase
//! before the next event; drops take effect once all of them have seen it.

pub mod processor;
pub mod state;

#[cfg(test)]
mod processor_tests;

use serde::Serialize;

use crate::error::TrackerError;
use crate::log::Event;

pub use processor::RoundProcessor;
pub use state::{DebuffState, FlagStatus, MatchBounds, RoundState, TeamComposition, TeamFlagState, TeamScoreEstimate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Phase {
    /// Raw events, no game time yet.
    Initial,
    /// Match bounds are known; game time gets stamped and out-of-match events culled.
    EarlyFixups,
    AfterGameTimeEpochEstablished,
    Main,
    PostMain,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Initial,
        Phase::EarlyFixups,
        Phase::AfterGameTimeEpochEstablished,
        Phase::Main,
        Phase::PostMain,
    ];
}

/// Whether an event stays in the sequence for later phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Drop,
}

/// A stateful consumer of the event sequence.
///
/// `handle_event` may annotate the event in place. Returning an error
/// aborts the round.
pub trait EventSubscriber {
    fn name(&self) -> &'static str;

    fn phases(&self) -> &'static [Phase];

    fn phase_start(&mut self, _phase: Phase, _events: &[Event], _state: &mut RoundState) -> Result<(), TrackerError> {
        Ok(())
    }

    fn handle_event(
        &mut self,
        phase: Phase,
        event: &mut Event,
        state: &mut RoundState,
    ) -> Result<Decision, TrackerError>;

    fn phase_end(&mut self, _phase: Phase, _events: &[Event], _state: &mut RoundState) -> Result<(), TrackerError> {
        Ok(())
    }
}
