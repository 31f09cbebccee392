use std::path::PathBuf;

use crate::{Error, Result};

/// A source of temperature readings, polled from the monitor thread.
pub trait TemperatureSensor: Send {
    fn read(&mut self) -> Result<f64>;
}

/// Reads the latest value (degrees, plain text) from a file another process
/// keeps up to date.
#[derive(Debug, Clone)]
pub struct FileSensor {
    path: PathBuf,
}

impl FileSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemperatureSensor for FileSensor {
    fn read(&mut self) -> Result<f64> {
        let raw = std::fs::read_to_string(&self.path)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|e| Error::Device(format!("bad reading {:?} in {}: {e}", raw.trim(), self.path.display())))
    }
}
