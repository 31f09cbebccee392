use std::thread::JoinHandle;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::types::TemperatureSensor;
use crate::kernel::relay::{AlertKind, AlertSender};

/// Edge-triggered threshold watcher. Emits `High` when a reading rises above
/// the threshold and `Normal` when it falls back; steady readings emit nothing.
#[derive(Debug, Clone)]
pub struct TemperatureMonitor {
    threshold: f64,
    above: bool,
}

impl TemperatureMonitor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, above: false }
    }

    pub fn observe(&mut self, reading: f64) -> Option<AlertKind> {
        if reading.is_nan() {
            return None;
        }
        let above = reading > self.threshold;
        if above == self.above {
            return None;
        }
        self.above = above;
        Some(if above { AlertKind::High } else { AlertKind::Normal })
    }

    /// Poll `sensor` on a dedicated thread until `token` is cancelled.
    /// The thread only ever talks to `alerts`.
    pub fn spawn<S>(
        mut self,
        mut sensor: S,
        alerts: AlertSender,
        poll: Duration,
        token: CancellationToken,
    ) -> std::io::Result<JoinHandle<()>>
    where
        S: TemperatureSensor + 'static,
    {
        std::thread::Builder::new()
            .name("temperature-monitor".to_string())
            .spawn(move || {
                info!(threshold = self.threshold, ?poll, "temperature monitor started");
                while !token.is_cancelled() {
                    match sensor.read() {
                        Ok(reading) => {
                            if let Some(kind) = self.observe(reading) {
                                if !alerts.enqueue(kind) {
                                    break;
                                }
                            }
                        }
                        Err(e) => debug!(error = %e, "sensor read failed"),
                    }
                    sleep_unless_cancelled(poll, &token);
                }
                info!("temperature monitor stopped");
            })
    }
}

fn sleep_unless_cancelled(total: Duration, token: &CancellationToken) {
    let step = Duration::from_millis(50);
    let mut waited = Duration::ZERO;
    while waited < total && !token.is_cancelled() {
        let nap = step.min(total - waited);
        std::thread::sleep(nap);
        waited += nap;
    }
}
