//! Round and match entry points: parse, run the pipeline, aggregate.

use rayon::prelude::*;
use serde::Serialize;
use tfstats_types::StatsConfig;
use tracing::info;

use crate::error::{MatchError, RoundError};
use crate::log::{Event, LineParser};
use crate::pipeline::{MatchBounds, RoundProcessor, RoundState, TeamComposition};
use crate::players::PlayerRegistry;
use crate::stats::{self, MvpAward, OutputStats, RoundComparison};

/// Result of one round: the annotated events and everything derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedRound {
    pub stats: OutputStats,
    pub teams: TeamComposition,
    pub bounds: Option<MatchBounds>,
    pub players: PlayerRegistry,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedMatch {
    pub rounds: Vec<ParsedRound>,
    /// Only for two-round matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<RoundComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mvp: Option<MvpAward>,
}

impl ParsedMatch {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Parse one round's log text and compute its stats.
pub fn process_round(text: &str, config: &StatsConfig) -> Result<ParsedRound, RoundError> {
    let parser = LineParser::from_config(config)?;
    let mut players = PlayerRegistry::new();
    let events = parser.parse_log(text, &mut players)?;
    if events.is_empty() {
        return Err(RoundError::NoEvents);
    }
    let parsed = events.len();

    let mut state = RoundState::new(players);
    let events = RoundProcessor::standard(config).run(events, &mut state)?;
    let stats = stats::aggregate(&events, &state, config);

    info!(
        map = stats.map.as_deref().unwrap_or("?"),
        parsed,
        kept = events.len(),
        players = state.players.len(),
        duration_secs = stats.game_time_secs,
        "Round processed"
    );

    let RoundState {
        players, teams, bounds, ..
    } = state;
    Ok(ParsedRound {
        stats,
        teams,
        bounds,
        players,
        events,
    })
}

/// Process one or two rounds in parallel. Two rounds also get a comparison
/// and an MVP.
pub fn process_match(texts: &[&str], config: &StatsConfig) -> Result<ParsedMatch, MatchError> {
    if texts.is_empty() || texts.len() > 2 {
        return Err(MatchError::RoundCount(texts.len()));
    }

    let rounds = texts
        .par_iter()
        .enumerate()
        .map(|(i, text)| process_round(text, config).map_err(|source| MatchError::Round { round: i + 1, source }))
        .collect::<Result<Vec<_>, _>>()?;

    let comparison = match rounds.as_slice() {
        [first, second] => stats::compare_rounds(&first.stats, &second.stats),
        _ => None,
    };
    let all: Vec<&OutputStats> = rounds.iter().map(|r| &r.stats).collect();
    let mvp = stats::match_mvp(&all, &config.mvp);

    if let Some(mvp) = &mvp {
        info!(name = %mvp.name, points = mvp.points, "Match MVP");
    }
    Ok(ParsedMatch {
        rounds,
        comparison,
        mvp,
    })
}
