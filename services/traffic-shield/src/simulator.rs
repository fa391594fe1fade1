//! Pure tick transition for the traffic simulator
//!
//! A [`SimulatorState`] owns the three rolling windows. [`SimulatorState::tick`]
//! consumes the current state and returns the next one. It draws from the
//! injected [`RandomSource`] in a fixed order: vehicle count, average speed,
//! light status, anomaly score, ledger draw, then the two ledger hashes when a
//! record is produced.

use chrono::{DateTime, Local};

use crate::config::SimulatorConfig;
use crate::model::{Alert, LedgerRecord, LightStatus, Reading, Severity, ANOMALY_ALERT_TYPE};
use crate::source::{format_time_of_day, IdGenerator, RandomSource};
use crate::window::RollingWindow;

const BLOCK_HASH_DIGITS: usize = 8;
const DATA_HASH_DIGITS: usize = 16;

/// Generation thresholds applied on each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub ledger: f64,
    pub alert: f64,
    pub high_severity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&SimulatorConfig::default())
    }
}

impl From<&SimulatorConfig> for Thresholds {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            ledger: config.ledger_threshold,
            alert: config.alert_threshold,
            high_severity: config.high_severity_threshold,
        }
    }
}

/// What a single tick added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub reading_id: u64,
    pub ledger_id: Option<u64>,
    pub alert_id: Option<u64>,
}

/// Readings, ledger records and alerts for the simulated device stream
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorState {
    pub readings: RollingWindow<Reading>,
    pub ledger: RollingWindow<LedgerRecord>,
    pub alerts: RollingWindow<Alert>,
    thresholds: Thresholds,
    ids: IdGenerator,
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self::new(&SimulatorConfig::default())
    }
}

impl SimulatorState {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            readings: RollingWindow::new(config.readings_capacity),
            ledger: RollingWindow::new(config.ledger_capacity),
            alerts: RollingWindow::new(config.alerts_capacity),
            thresholds: Thresholds::from(config),
            ids: IdGenerator::new(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Generate one reading for `device_id` and whatever it triggers
    pub fn tick(
        mut self,
        device_id: &str,
        now: &DateTime<Local>,
        source: &mut dyn RandomSource,
    ) -> (Self, TickOutcome) {
        let timestamp = format_time_of_day(now);

        let reading = Reading {
            id: self.ids.next_id(now),
            device_id: device_id.to_string(),
            timestamp: timestamp.clone(),
            vehicle_count: source.uniform_int(10, 50),
            avg_speed: source.uniform_int(25, 30),
            light_status: LightStatus::ALL[source.uniform_int(0, 3) as usize],
            anomaly_score: source.next_f64() * 100.0,
        };
        let mut outcome = TickOutcome {
            reading_id: reading.id,
            ..TickOutcome::default()
        };
        let anomaly_score = reading.anomaly_score;
        self.readings.push(reading);

        if source.next_f64() > self.thresholds.ledger {
            let record = LedgerRecord {
                id: self.ids.next_id(now),
                block_hash: format!("0x{}", source.hex_string(BLOCK_HASH_DIGITS)),
                timestamp: timestamp.clone(),
                device_id: device_id.to_string(),
                data_hash: format!("0x{}", source.hex_string(DATA_HASH_DIGITS)),
                verified: true,
            };
            outcome.ledger_id = Some(record.id);
            self.ledger.push(record);
        }

        if let Some(severity) = self.thresholds.severity_for(anomaly_score) {
            let alert = Alert {
                id: self.ids.next_id(now),
                alert_type: ANOMALY_ALERT_TYPE.to_string(),
                severity,
                message: format!("Unusual traffic pattern detected at {}", device_id),
                timestamp,
                resolved: false,
            };
            outcome.alert_id = Some(alert.id);
            self.alerts.push(alert);
        }

        (self, outcome)
    }

    /// Mark the alert with `alert_id` resolved. Returns false if it is not held.
    pub fn resolve_alert(&mut self, alert_id: u64) -> bool {
        match self.alerts.find_mut(|a| a.id == alert_id) {
            Some(alert) => {
                alert.resolved = true;
                true
            }
            None => false,
        }
    }

    pub fn unresolved_alerts(&self) -> usize {
        self.alerts.iter().filter(|a| !a.resolved).count()
    }

    pub fn anomaly_alerts(&self) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.alert_type == ANOMALY_ALERT_TYPE)
            .count()
    }
}

impl Thresholds {
    /// Alert severity for a score, or None when no alert is warranted
    pub fn severity_for(&self, anomaly_score: f64) -> Option<Severity> {
        if anomaly_score <= self.alert {
            None
        } else if anomaly_score > self.high_severity {
            Some(Severity::High)
        } else {
            Some(Severity::Medium)
        }
    }
}
