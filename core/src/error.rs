use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::Phase;
use crate::players::PlayerKey;

/// Fatal grammar failures. Unparseable lines are not errors; they yield no event.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unknown team name {name:?}")]
    UnknownTeam { line: u64, name: String },

    #[error("line {line}: unknown class name {name:?}")]
    UnknownClass { line: u64, name: String },

    #[error("line {line}: unknown weapon {name:?}")]
    UnknownWeapon { line: u64, name: String },

    #[error("line {line}: unknown two-player trigger {trigger:?}")]
    UnknownTrigger { line: u64, trigger: String },
}

/// Invariant violations raised by pipeline subscribers.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("event has no {0} player")]
    MissingPlayer(&'static str),

    #[error("event payload is missing {0}")]
    MissingPayload(&'static str),

    #[error("player handle {0} is not registered")]
    UnknownPlayer(PlayerKey),

    #[error("match bounds were not established before game time was needed")]
    BoundsNotEstablished,
}

#[derive(Debug, Error)]
pub enum RoundError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{subscriber} failed during {phase:?}{}: {source}", at_line(.line))]
    Subscriber {
        subscriber: &'static str,
        phase: Phase,
        line: Option<u64>,
        #[source]
        source: TrackerError,
    },

    #[error("log contains no parseable events")]
    NoEvents,
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("a match has one or two rounds, got {0}")]
    RoundCount(usize),

    #[error("round {round}: {source}")]
    Round {
        round: usize,
        #[source]
        source: RoundError,
    },
}

fn at_line(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}
