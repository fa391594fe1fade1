//! Static registry of traffic-light devices

use crate::model::{Device, DeviceStatus};

/// The fixed set of devices the simulator may be pointed at
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn find(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn all(&self) -> &[Device] {
        &self.devices
    }

    /// Number of devices currently in service
    pub fn active_count(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| d.status == DeviceStatus::Active)
            .count()
    }
}
