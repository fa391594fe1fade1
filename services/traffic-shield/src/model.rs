//! Record types produced by the simulator and the static device list

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert type produced for anomalous readings
pub const ANOMALY_ALERT_TYPE: &str = "ANOMALY";

/// Traffic light phase reported with a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightStatus {
    Red,
    Yellow,
    Green,
}

impl LightStatus {
    pub const ALL: [LightStatus; 3] = [LightStatus::Red, LightStatus::Yellow, LightStatus::Green];
}

impl fmt::Display for LightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightStatus::Red => write!(f, "RED"),
            LightStatus::Yellow => write!(f, "YELLOW"),
            LightStatus::Green => write!(f, "GREEN"),
        }
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
        }
    }
}

/// Operational status of a traffic-light device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Active,
    Maintenance,
    Inactive,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Active => write!(f, "active"),
            DeviceStatus::Maintenance => write!(f, "maintenance"),
            DeviceStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// One simulated traffic-sensor sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: u64,
    pub device_id: String,
    pub timestamp: String,
    pub vehicle_count: u32,
    pub avg_speed: u32,
    pub light_status: LightStatus,
    pub anomaly_score: f64,
}

/// One simulated ledger confirmation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: u64,
    pub block_hash: String,
    pub timestamp: String,
    pub device_id: String,
    pub data_hash: String,
    pub verified: bool,
}

/// A notification derived from an anomalous reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: Severity,
    pub message: String,
    pub timestamp: String,
    pub resolved: bool,
}

/// A monitored traffic-light device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub status: DeviceStatus,
}

impl Device {
    pub fn new(id: &str, name: &str, status: DeviceStatus) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status,
        }
    }
}
