//! Configuration types for the traffic-shield service

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::model::{Device, DeviceStatus};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default = "default_devices")]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            devices: default_devices(),
            dashboard: DashboardConfig::default(),
        }
    }
}

/// Tick cadence, window capacities and generation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_readings_capacity")]
    pub readings_capacity: usize,
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,
    #[serde(default = "default_alerts_capacity")]
    pub alerts_capacity: usize,
    /// A ledger record is produced when a uniform draw exceeds this value
    #[serde(default = "default_ledger_threshold")]
    pub ledger_threshold: f64,
    /// Readings scoring strictly above this raise an alert
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
    /// Alerts for readings scoring strictly above this are HIGH
    #[serde(default = "default_high_severity_threshold")]
    pub high_severity_threshold: f64,
    #[serde(default = "default_initial_device")]
    pub initial_device: String,
}

impl SimulatorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            readings_capacity: default_readings_capacity(),
            ledger_capacity: default_ledger_capacity(),
            alerts_capacity: default_alerts_capacity(),
            ledger_threshold: default_ledger_threshold(),
            alert_threshold: default_alert_threshold(),
            high_severity_threshold: default_high_severity_threshold(),
            initial_device: default_initial_device(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub privacy_mode: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            privacy_mode: true,
        }
    }
}

impl Config {
    /// Check the configuration for values the simulator cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let sim = &self.simulator;
        if sim.tick_interval_ms == 0 {
            return Err(config_error("tick_interval_ms must be greater than 0"));
        }
        if sim.readings_capacity == 0 || sim.ledger_capacity == 0 || sim.alerts_capacity == 0 {
            return Err(config_error("window capacities must be greater than 0"));
        }
        if !(0.0..1.0).contains(&sim.ledger_threshold) {
            return Err(config_error("ledger_threshold must be in [0, 1)"));
        }
        for (name, value) in [
            ("alert_threshold", sim.alert_threshold),
            ("high_severity_threshold", sim.high_severity_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(config_error(&format!("{} must be in [0, 100]", name)));
            }
        }

        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.id.is_empty() {
                return Err(config_error("device id must not be empty"));
            }
            if !seen.insert(device.id.as_str()) {
                return Err(config_error(&format!("duplicate device id '{}'", device.id)));
            }
        }

        if !sim.initial_device.is_empty() && !seen.contains(sim.initial_device.as_str()) {
            return Err(config_error(&format!(
                "initial_device '{}' is not a configured device",
                sim.initial_device
            )));
        }

        Ok(())
    }
}

fn config_error(msg: &str) -> crate::TrafficShieldError {
    crate::TrafficShieldError::Config(msg.to_string())
}

pub fn default_devices() -> Vec<Device> {
    vec![
        Device::new("TL-001", "Main St & 1st Ave", DeviceStatus::Active),
        Device::new("TL-002", "Oak St & 2nd Ave", DeviceStatus::Active),
        Device::new("TL-003", "Pine St & 3rd Ave", DeviceStatus::Maintenance),
        Device::new("TL-004", "Elm St & 4th Ave", DeviceStatus::Active),
    ]
}

fn default_tick_interval_ms() -> u64 {
    3000
}

fn default_readings_capacity() -> usize {
    10
}

fn default_ledger_capacity() -> usize {
    5
}

fn default_alerts_capacity() -> usize {
    5
}

fn default_ledger_threshold() -> f64 {
    0.7
}

fn default_alert_threshold() -> f64 {
    85.0
}

fn default_high_severity_threshold() -> f64 {
    95.0
}

fn default_initial_device() -> String {
    "TL-001".to_string()
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11120
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::TrafficShieldError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
