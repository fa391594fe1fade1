//! Shared state for the simulated streams, device selection and display flags

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::SimulatorConfig;
use crate::devices::DeviceRegistry;
use crate::model::Reading;
use crate::simulator::{SimulatorState, TickOutcome};
use crate::source::RandomSource;

/// Per-reading payload marker on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataVisibility {
    Encrypted,
    Raw,
}

/// A reading as the dashboard may show it
///
/// The table fields are always present. The raw record is attached only
/// while privacy mode is off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingView {
    #[serde(flatten)]
    pub reading: Reading,
    pub data: DataVisibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Counters shown on the dashboard summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub active_devices: usize,
    pub ledger_records: usize,
    pub unresolved_alerts: usize,
    pub anomaly_alerts: usize,
}

/// Shared state accessible by the simulator runtime and the dashboard
#[derive(Debug)]
pub struct SharedState {
    pub simulator: SimulatorState,
    pub devices: DeviceRegistry,
    pub selected_device: Option<String>,
    pub connected: bool,
    pub privacy_mode: bool,
    pub ticks: u64,
    pub started_at: Instant,
    generation: u64,
}

impl SharedState {
    pub fn new(config: &SimulatorConfig, devices: DeviceRegistry, privacy_mode: bool) -> Self {
        Self {
            simulator: SimulatorState::new(config),
            devices,
            selected_device: None,
            connected: false,
            privacy_mode,
            ticks: 0,
            started_at: Instant::now(),
            generation: 0,
        }
    }

    /// Point the stream at a new device. Returns the generation that owns it.
    pub fn begin_session(&mut self, device_id: &str) -> u64 {
        self.generation += 1;
        self.selected_device = Some(device_id.to_string());
        self.connected = true;
        self.generation
    }

    /// Drop the current selection so no ticker may write anymore
    pub fn end_session(&mut self) {
        self.generation += 1;
        self.selected_device = None;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run one tick on behalf of `generation`
    ///
    /// Returns None without touching the streams when `generation` is no
    /// longer current. The simulator value is replaced as a whole.
    pub fn apply_tick(
        &mut self,
        generation: u64,
        now: &DateTime<Local>,
        source: &mut dyn RandomSource,
    ) -> Option<TickOutcome> {
        if generation != self.generation {
            return None;
        }
        let device_id = self.selected_device.clone()?;
        let (next, outcome) = self.simulator.clone().tick(&device_id, now, source);
        self.simulator = next;
        self.ticks += 1;
        Some(outcome)
    }

    pub fn resolve_alert(&mut self, alert_id: u64) -> bool {
        self.simulator.resolve_alert(alert_id)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            active_devices: self.devices.active_count(),
            ledger_records: self.simulator.ledger.len(),
            unresolved_alerts: self.simulator.unresolved_alerts(),
            anomaly_alerts: self.simulator.anomaly_alerts(),
        }
    }

    /// Readings window with the privacy marker applied, newest first
    pub fn readings_view(&self) -> Vec<ReadingView> {
        self.simulator
            .readings
            .iter()
            .map(|reading| {
                let (data, raw) = if self.privacy_mode {
                    (DataVisibility::Encrypted, None)
                } else {
                    (DataVisibility::Raw, serde_json::to_string(reading).ok())
                };
                ReadingView {
                    reading: reading.clone(),
                    data,
                    raw,
                }
            })
            .collect()
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(
    config: &SimulatorConfig,
    devices: DeviceRegistry,
    privacy_mode: bool,
) -> StateHandle {
    Arc::new(RwLock::new(SharedState::new(config, devices, privacy_mode)))
}
