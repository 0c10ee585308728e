//! Aggregator scenarios, driven from rendered logs through the full round.

use tfstats_types::{PlayerClass, StatsConfig, TeamRole};

use super::*;
use crate::log::LineParser;
use crate::pipeline::RoundProcessor;
use crate::players::PlayerRegistry;
use crate::round::{ParsedRound, process_round};
use crate::testing::{LogBuilder, player};

fn run(text: &str) -> ParsedRound {
    process_round(text, &StatsConfig::default()).unwrap()
}

fn row<'a>(round: &'a ParsedRound, team: u8, name: &str) -> &'a PlayerOutputStatsRound {
    round.stats.teams[&team]
        .players
        .iter()
        .find(|p| p.name == name)
        .unwrap()
}

fn blue(name: &str, account: u32) -> String {
    player(name, account, account, "Blue")
}

fn red(name: &str, account: u32) -> String {
    player(name, account, account, "Red")
}

fn teams_joined() -> LogBuilder {
    LogBuilder::new()
        .at(0, format!("{} joined team \"Blue\"", player("P1", 1, 1, "")))
        .at(0, format!("{} joined team \"Red\"", player("P2", 2, 2, "")))
}

#[test]
fn cross_team_frag() {
    let text = teams_joined()
        .at(10, format!("{} killed {} with \"rocket\"", blue("P1", 1), red("P2", 2)))
        .at(20, "Team \"Blue\" scored \"10\" with \"1\" players")
        .build();
    let round = run(&text);

    let p1 = row(&round, 1, "P1");
    let p2 = row(&round, 2, "P2");
    assert_eq!(p1.counters.kills.kill.value, 1);
    assert_eq!(p1.counters.kills.kill.by_weapon[0].label, "rocket");
    assert_eq!(p1.counters.kills.kill.by_opponent[0].label, "P2");
    assert_eq!(p1.counters.kills.kill.by_opponent[0].percent, 100.0);
    assert_eq!(p2.counters.deaths.death.value, 1);
    assert_eq!(round.stats.teams[&1].frags, 1);
    assert_eq!(round.stats.score[&1], 10);
}

#[test]
fn same_team_frag() {
    let text = teams_joined()
        .at(1, format!("{} joined team \"Blue\"", player("P3", 3, 3, "")))
        .at(10, format!("{} killed {} with \"rocket\"", blue("P1", 1), blue("P3", 3)))
        .at(20, "World triggered \"Round_Over\"")
        .build();
    let round = run(&text);

    let p1 = row(&round, 1, "P1");
    let p3 = row(&round, 1, "P3");
    assert_eq!(p1.counters.kills.teamkill.value, 1);
    assert_eq!(p1.counters.kills.kill.value, 0);
    assert_eq!(p3.counters.deaths.by_team.value, 1);
    assert_eq!(p3.counters.deaths.death.value, 0);
    assert_eq!(round.stats.teams[&1].team_kills, 1);
}

#[test]
fn self_frag_is_a_suicide() {
    let text = teams_joined()
        .at(10, format!("{} killed {} with \"gl_grenade\"", blue("P1", 1), blue("P1", 1)))
        .at(11, format!("{} committed suicide with \"world\"", blue("P1", 1)))
        .build();
    let round = run(&text);

    let p1 = row(&round, 1, "P1");
    assert_eq!(p1.counters.deaths.suicide.value, 2);
    assert_eq!(p1.counters.kills.kill.value, 0);
}

#[test]
fn flag_cycle_without_score() {
    let text = LogBuilder::new()
        .at(0, format!("{} joined team \"Red\"", player("P1", 1, 1, "")))
        .at(5, format!("{} triggered \"Blue Flag\"", red("P1", 1)))
        .at(35, format!("{} triggered \"Team 2 dropoff\"", red("P1", 1)))
        .at(40, "World triggered \"Round_Over\"")
        .build();
    let round = run(&text);

    let p1 = row(&round, 2, "P1");
    assert_eq!(p1.flag_time_secs, 30);
    assert_eq!(p1.counters.objectives.flag_capture.value, 1);
    assert_eq!(p1.initial_touches, 1);
    assert_eq!(round.stats.flags[&2].captures, 1);
    assert_eq!(round.stats.score[&2], 10);
    assert!(!round.stats.flags[&2].score_from_log);

    // Red defends, so its offense fields stay empty
    let red_team = &round.stats.teams[&2];
    assert_eq!(red_team.role, TeamRole::Defense);
    assert_eq!(red_team.captures, None);

    let timeline = &round.stats.score_timeline[&2];
    assert_eq!(timeline.first(), Some(&ScoreSample { game_time: 0, score: 0 }));
    assert_eq!(timeline.last(), Some(&ScoreSample { game_time: 35, score: 10 }));
}

#[test]
fn offense_aggregates_toss_and_flag_time() {
    let text = teams_joined()
        .at(1, format!("{} joined team \"Blue\"", player("P3", 3, 3, "")))
        .at(10, format!("{} triggered \"Red Flag\"", blue("P1", 1)))
        .at(20, format!("{} triggered \"Flag_Thrown\"", blue("P1", 1)))
        .at(25, format!("{} triggered \"Red Flag\"", blue("P3", 3)))
        .at(45, format!("{} triggered \"Team 1 dropoff\"", blue("P3", 3)))
        .at(50, "Team \"Blue\" scored \"10\" with \"2\" players")
        .build();
    let round = run(&text);

    let offense = &round.stats.teams[&1];
    assert_eq!(offense.captures, Some(1));
    assert_eq!(offense.touches, Some(2));
    assert_eq!(offense.toss_percent, Some(50.0));
    assert_eq!(offense.flag_time_secs, Some(10 + 20));
    assert_eq!(row(&round, 1, "P1").toss_percent, 100.0);
    assert_eq!(round.stats.flags[&1].points_per_cap, 10.0);
}

#[test]
fn conc_window_marks_kills() {
    let text = teams_joined()
        .at(0, format!("{} changed role to \"Soldier\"", blue("P1", 1)))
        .at(1, "World triggered \"Match_Begins_Now\"")
        .at(1, format!("{} triggered \"Concussion_Grenade\" against {}", red("P2", 2), blue("P1", 1)))
        .at(8, format!("{} killed {} with \"rocket\"", blue("P1", 1), red("P2", 2)))
        .at(9, format!("{} triggered \"Concussion_Grenade\" against {}", red("P2", 2), blue("P1", 1)))
        .at(20, format!("{} killed {} with \"rocket\"", blue("P1", 1), red("P2", 2)))
        .at(30, "World triggered \"Round_Over\"")
        .build();
    let round = run(&text);

    let p1 = row(&round, 1, "P1");
    assert_eq!(p1.counters.kills.kill.value, 2);
    assert_eq!(p1.counters.kills.while_conced.value, 1);
    assert_eq!(row(&round, 2, "P2").counters.weaponry.conc.value, 2);
}

#[test]
fn class_usage_and_time_on_team() {
    let text = teams_joined()
        .at(0, format!("{} changed role to \"Scout\"", blue("P1", 1)))
        .at(2, "World triggered \"Match_Begins_Now\"")
        .at(32, format!("{} changed role to \"Medic\"", blue("P1", 1)))
        .at(62, "Team \"Blue\" scored \"0\" with \"1\" players")
        .build();
    let round = run(&text);

    let p1 = row(&round, 1, "P1");
    assert_eq!(round.stats.game_time_secs, 60);
    assert_eq!(p1.time_on_team_secs, 60);
    assert_eq!(
        p1.classes,
        vec![
            ClassUsage {
                class: PlayerClass::Scout,
                secs: 30
            },
            ClassUsage {
                class: PlayerClass::Medic,
                secs: 30
            },
        ]
    );
}

#[test]
fn buildings_and_damage() {
    let text = teams_joined()
        .at(5, format!("{} triggered \"Sentry_Built_Level_1\"", red("P2", 2)))
        .at(
            6,
            format!("{} triggered \"Sentry_Destroyed\" against {} with \"rocket\"", blue("P1", 1), red("P2", 2)),
        )
        .at(
            7,
            format!("{} triggered \"Damage\" against {} (damage \"45\")", blue("P1", 1), red("P2", 2)),
        )
        .at(
            8,
            format!("{} triggered \"Damage\" against {} (damage \"30\")", blue("P1", 1), red("P2", 2)),
        )
        .at(20, "World triggered \"Round_Over\"")
        .build();
    let round = run(&text);

    let p1 = row(&round, 1, "P1");
    let p2 = row(&round, 2, "P2");
    assert_eq!(p2.counters.buildables.built_sentry.value, 1);
    assert_eq!(p2.counters.buildables.lost_sentry.value, 1);
    assert_eq!(p1.counters.kills.sentry.value, 1);
    assert_eq!(p1.counters.damage.dealt.value, 75);
    assert_eq!(p2.counters.damage.taken.value, 75);
    assert_eq!(round.stats.teams[&1].sentry_kills, 1);
}

#[test]
fn players_are_sorted_by_name() {
    let text = LogBuilder::new()
        .at(0, format!("{} joined team \"Blue\"", player("zed", 1, 1, "")))
        .at(0, format!("{} joined team \"Blue\"", player("Amy", 2, 2, "")))
        .at(0, format!("{} joined team \"Blue\"", player("bob", 3, 3, "")))
        .at(10, "World triggered \"Round_Over\"")
        .build();
    let round = run(&text);

    let names: Vec<&str> = round.stats.teams[&1].players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Amy", "bob", "zed"]);
}

#[test]
fn aggregation_is_repeatable() {
    let text = teams_joined()
        .at(3, "Loading map \"2fort\"")
        .at(10, format!("{} killed {} with \"rocket\"", blue("P1", 1), red("P2", 2)))
        .at(12, format!("{} killed {} with \"supershotgun\"", blue("P1", 1), red("P2", 2)))
        .at(15, format!("{} triggered \"Medic_Heal\" against {}", blue("P1", 1), blue("P1", 1)))
        .at(20, "Team \"Blue\" scored \"10\" with \"1\" players")
        .build();
    let config = StatsConfig::default();
    let parser = LineParser::from_config(&config).unwrap();
    let mut players = PlayerRegistry::new();
    let events = parser.parse_log(&text, &mut players).unwrap();
    let mut state = RoundState::new(players);
    let events = RoundProcessor::standard(&config).run(events, &mut state).unwrap();

    let first = serde_json::to_string(&aggregate(&events, &state, &config)).unwrap();
    let second = serde_json::to_string(&aggregate(&events, &state, &config)).unwrap();
    assert_eq!(first, second);
}
