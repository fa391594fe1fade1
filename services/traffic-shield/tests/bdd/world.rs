//! BDD test world for traffic-shield service

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use cucumber::World;
use traffic_shield::engine::Engine;
use traffic_shield::model::Alert;
use traffic_shield::simulator::{SimulatorState, TickOutcome};
use traffic_shield::source::RandomSource;

#[derive(Debug, Default, World)]
pub struct TrafficShieldWorld {
    // Pure simulator testing
    pub simulator: Option<SimulatorState>,
    pub outcomes: Vec<TickOutcome>,
    pub alerts_before: Option<Vec<Alert>>,

    // Engine lifecycle testing
    pub engine: Option<Arc<Engine>>,
    pub ids_before_switch: Option<HashSet<u64>>,
    pub ticks_before_idle: Option<usize>,
    pub last_error: Option<String>,
}

impl TrafficShieldWorld {
    pub fn simulator(&self) -> &SimulatorState {
        self.simulator.as_ref().expect("simulator not set")
    }

    pub fn engine(&self) -> &Arc<Engine> {
        self.engine.as_ref().expect("engine not set")
    }
}

/// Replays scripted draws, then falls back to 0.0
#[derive(Debug, Default)]
pub struct ScriptedSource(VecDeque<f64>);

impl ScriptedSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self(draws.into())
    }

    /// Draws for one tick with the given anomaly score and no ledger record
    pub fn with_score(score: f64) -> Self {
        Self::new(vec![0.5, 0.5, 0.5, score / 100.0, 0.0])
    }

    /// Draws for one tick that produces a ledger record and no alert
    pub fn with_ledger_record() -> Self {
        let mut draws = vec![0.5, 0.5, 0.5, 0.1, 0.9];
        draws.extend(std::iter::repeat(0.4).take(24));
        Self::new(draws)
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        self.0.pop_front().unwrap_or(0.0)
    }
}
