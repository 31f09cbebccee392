use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::intent::DeviceAction;
use crate::{Error, Result};

/// Device-control collaborator. Returns the confirmation sentence to speak.
#[async_trait]
pub trait DeviceController: Send + Sync {
    async fn control_device(&self, device: &str, action: DeviceAction) -> Result<String>;
}

/// In-process stand-in for a relay board: remembers the last action per device.
#[derive(Debug, Default)]
pub struct SimulatedDevices {
    states: Mutex<HashMap<String, DeviceAction>>,
}

impl SimulatedDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, device: &str) -> Option<DeviceAction> {
        self.states
            .lock()
            .ok()
            .and_then(|states| states.get(&device.to_lowercase()).copied())
    }
}

#[async_trait]
impl DeviceController for SimulatedDevices {
    async fn control_device(&self, device: &str, action: DeviceAction) -> Result<String> {
        let mut states = self
            .states
            .lock()
            .map_err(|_| Error::Device("device state lock poisoned".to_string()))?;
        states.insert(device.to_lowercase(), action);
        info!(device, action = %action, "device switched");
        Ok(format!("Turning {action} the {device}."))
    }
}
