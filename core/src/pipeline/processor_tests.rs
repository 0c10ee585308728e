//! Tests for phase delivery order, drops and error context.

use std::sync::{Arc, Mutex};

use super::{Decision, EventSubscriber, Phase, RoundProcessor, RoundState};
use crate::error::{RoundError, TrackerError};
use crate::log::{Event, EventKind};
use crate::testing::base_time;

type Journal = Arc<Mutex<Vec<String>>>;

struct Recorder {
    name: &'static str,
    phases: &'static [Phase],
    journal: Journal,
    drop_line: Option<u64>,
    fail_line: Option<u64>,
}

impl Recorder {
    fn new(name: &'static str, phases: &'static [Phase], journal: &Journal) -> Self {
        Self {
            name,
            phases,
            journal: journal.clone(),
            drop_line: None,
            fail_line: None,
        }
    }

    fn log(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

impl EventSubscriber for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn phases(&self) -> &'static [Phase] {
        self.phases
    }

    fn phase_start(&mut self, phase: Phase, events: &[Event], _state: &mut RoundState) -> Result<(), TrackerError> {
        self.log(format!("{} start {:?} {}", self.name, phase, events.len()));
        Ok(())
    }

    fn handle_event(&mut self, phase: Phase, event: &mut Event, _state: &mut RoundState) -> Result<Decision, TrackerError> {
        if self.fail_line == Some(event.line_number) {
            return Err(TrackerError::MissingPayload("test"));
        }
        self.log(format!("{} {:?} {}", self.name, phase, event.line_number));
        if phase == Phase::Initial && self.drop_line == Some(event.line_number) {
            return Ok(Decision::Drop);
        }
        Ok(Decision::Keep)
    }

    fn phase_end(&mut self, phase: Phase, events: &[Event], _state: &mut RoundState) -> Result<(), TrackerError> {
        self.log(format!("{} end {:?} {}", self.name, phase, events.len()));
        Ok(())
    }
}

fn events(lines: &[u64]) -> Vec<Event> {
    lines
        .iter()
        .map(|&l| Event::new(EventKind::WorldTrigger, l, base_time()))
        .collect()
}

#[test]
fn each_event_visits_every_subscriber_before_the_next() {
    let journal = Journal::default();
    let mut processor = RoundProcessor::new();
    processor.add_subscriber(Box::new(Recorder::new("a", &[Phase::Main], &journal)));
    processor.add_subscriber(Box::new(Recorder::new("b", &[Phase::Main], &journal)));

    let mut state = RoundState::default();
    processor.run(events(&[1, 2]), &mut state).unwrap();

    let journal = journal.lock().unwrap();
    assert_eq!(
        *journal,
        vec![
            "a start Main 2",
            "b start Main 2",
            "a Main 1",
            "b Main 1",
            "a Main 2",
            "b Main 2",
            "a end Main 2",
            "b end Main 2",
        ]
    );
}

#[test]
fn drops_apply_after_all_subscribers_saw_the_event() {
    let journal = Journal::default();
    let mut dropper = Recorder::new("dropper", &[Phase::Initial, Phase::Main], &journal);
    dropper.drop_line = Some(2);
    let watcher = Recorder::new("watcher", &[Phase::Initial, Phase::Main], &journal);

    let mut processor = RoundProcessor::new();
    processor.add_subscriber(Box::new(dropper));
    processor.add_subscriber(Box::new(watcher));

    let mut state = RoundState::default();
    let survivors = processor.run(events(&[1, 2, 3]), &mut state).unwrap();

    assert_eq!(survivors.iter().map(|e| e.line_number).collect::<Vec<_>>(), vec![1, 3]);
    let journal = journal.lock().unwrap();
    assert!(journal.contains(&"watcher Initial 2".to_string()));
    assert!(!journal.contains(&"watcher Main 2".to_string()));
    assert!(journal.contains(&"watcher end Initial 2".to_string()));
}

#[test]
fn phases_run_in_order() {
    let journal = Journal::default();
    let mut processor = RoundProcessor::new();
    processor.add_subscriber(Box::new(Recorder::new("r", &Phase::ALL, &journal)));

    let mut state = RoundState::default();
    processor.run(events(&[1]), &mut state).unwrap();

    let starts: Vec<String> = journal
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.contains("start"))
        .cloned()
        .collect();
    assert_eq!(
        starts,
        vec![
            "r start Initial 1",
            "r start EarlyFixups 1",
            "r start AfterGameTimeEpochEstablished 1",
            "r start Main 1",
            "r start PostMain 1",
        ]
    );
}

#[test]
fn failure_names_subscriber_phase_and_line() {
    let journal = Journal::default();
    let mut failing = Recorder::new("failing", &[Phase::Main], &journal);
    failing.fail_line = Some(9);

    let mut processor = RoundProcessor::new();
    processor.add_subscriber(Box::new(failing));

    let mut state = RoundState::default();
    let err = processor.run(events(&[3, 9, 12]), &mut state).unwrap_err();
    match &err {
        RoundError::Subscriber {
            subscriber,
            phase,
            line,
            ..
        } => {
            assert_eq!(*subscriber, "failing");
            assert_eq!(*phase, Phase::Main);
            assert_eq!(*line, Some(9));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("at line 9"));
}
