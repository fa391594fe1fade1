//! BDD step definitions for the simulator feature

use chrono::{DateTime, Local, TimeZone};
use cucumber::{given, then, when};

use traffic_shield::model::{LightStatus, Severity};
use traffic_shield::simulator::SimulatorState;
use traffic_shield::source::{RandomSource, StdRandomSource};

use crate::world::{ScriptedSource, TrafficShieldWorld};

fn tick_time(tick: usize) -> DateTime<Local> {
    Local
        .timestamp_millis_opt(1_700_000_000_000 + tick as i64 * 3000)
        .unwrap()
}

pub fn run_tick(world: &mut TrafficShieldWorld, source: &mut dyn RandomSource) {
    let now = tick_time(world.outcomes.len());
    let state = world.simulator.take().expect("simulator not set");
    let (next, outcome) = state.tick("TL-001", &now, source);
    world.simulator = Some(next);
    world.outcomes.push(outcome);
}

fn parse_severity(s: &str) -> Severity {
    match s {
        "HIGH" => Severity::High,
        "MEDIUM" => Severity::Medium,
        "LOW" => Severity::Low,
        other => panic!("Unknown severity: {}", other),
    }
}

#[given("a fresh simulator")]
fn fresh_simulator(world: &mut TrafficShieldWorld) {
    world.simulator = Some(SimulatorState::default());
    world.outcomes.clear();
}

#[when(expr = "a tick runs with anomaly score {float}")]
fn tick_with_score(world: &mut TrafficShieldWorld, score: f64) {
    run_tick(world, &mut ScriptedSource::with_score(score));
}

#[when(expr = "{int} ticks produce ledger records")]
fn ticks_with_ledger(world: &mut TrafficShieldWorld, count: usize) {
    for _ in 0..count {
        run_tick(world, &mut ScriptedSource::with_ledger_record());
    }
}

#[when(expr = "{int} random ticks run with seed {int}")]
fn random_ticks(world: &mut TrafficShieldWorld, count: usize, seed: u64) {
    let mut source = StdRandomSource::seeded(seed);
    for _ in 0..count {
        run_tick(world, &mut source);
    }
}

#[then(expr = "exactly {int} alert(s) is/are held")]
fn alert_count(world: &mut TrafficShieldWorld, expected: usize) {
    assert_eq!(world.simulator().alerts.len(), expected);
}

#[then(expr = "the latest alert has severity {string}")]
fn latest_alert_severity(world: &mut TrafficShieldWorld, severity: String) {
    let alert = world.simulator().alerts.latest().expect("no alert held");
    assert_eq!(alert.severity, parse_severity(&severity));
    assert_eq!(alert.alert_type, "ANOMALY");
    assert!(!alert.resolved);
}

#[then(expr = "the ledger holds {int} records")]
fn ledger_count(world: &mut TrafficShieldWorld, expected: usize) {
    assert_eq!(world.simulator().ledger.len(), expected);
}

#[then("the oldest ledger record was evicted")]
fn oldest_ledger_evicted(world: &mut TrafficShieldWorld) {
    let first = world.outcomes[0].ledger_id.expect("first tick made no record");
    let held: Vec<u64> = world.simulator().ledger.iter().map(|r| r.id).collect();
    assert!(!held.contains(&first), "record {} still held", first);

    let expected: Vec<u64> = world
        .outcomes
        .iter()
        .rev()
        .filter_map(|o| o.ledger_id)
        .take(held.len())
        .collect();
    assert_eq!(held, expected);
}

#[then(expr = "the readings window holds the last {int} readings newest first")]
fn readings_newest_first(world: &mut TrafficShieldWorld, expected: usize) {
    let held: Vec<u64> = world.simulator().readings.iter().map(|r| r.id).collect();
    let generated: Vec<u64> = world
        .outcomes
        .iter()
        .rev()
        .map(|o| o.reading_id)
        .take(expected)
        .collect();
    assert_eq!(held, generated);
}

#[then("every reading is within its value ranges")]
fn readings_in_range(world: &mut TrafficShieldWorld) {
    for reading in world.simulator().readings.iter() {
        assert!((10..=59).contains(&reading.vehicle_count));
        assert!((25..=54).contains(&reading.avg_speed));
        assert!(LightStatus::ALL.contains(&reading.light_status));
        assert!((0.0..100.0).contains(&reading.anomaly_score));
    }
}
