//! Alert hand-off from background monitors to the main loop.
//!
//! Producers only ever hold an [`AlertSender`]; it can enqueue text and
//! nothing else. The single [`AlertRelay`] receiver lives with the main loop,
//! which is the only place alerts are spoken.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{Error, Result};

pub const HIGH_TEMPERATURE_ALERT: &str = "Alert! The temperature is over 40 degrees!";
pub const NORMAL_TEMPERATURE_ALERT: &str = "The temperature has returned to normal.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertKind {
    High,
    Normal,
}

impl AlertKind {
    pub fn code(&self) -> &'static str {
        match self {
            AlertKind::High => "HIGH",
            AlertKind::Normal => "NORMAL",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AlertKind::High => HIGH_TEMPERATURE_ALERT,
            AlertKind::Normal => NORMAL_TEMPERATURE_ALERT,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Exact code match, as sent by the alert source.
impl FromStr for AlertKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HIGH" => Ok(AlertKind::High),
            "NORMAL" => Ok(AlertKind::Normal),
            other => Err(Error::Device(format!("unrecognized alert code: {other}"))),
        }
    }
}

/// Producer half. Cheap to clone, safe to use from any thread.
#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: mpsc::UnboundedSender<String>,
}

impl AlertSender {
    /// Queue the sentence for `kind`. Returns false once the main loop is gone.
    pub fn enqueue(&self, kind: AlertKind) -> bool {
        info!(alert = %kind, "queuing alert");
        self.tx.send(kind.message().to_string()).is_ok()
    }

    /// Entry point for raw callback codes. Unrecognized codes are dropped.
    pub fn enqueue_code(&self, code: &str) -> bool {
        match code.parse::<AlertKind>() {
            Ok(kind) => self.enqueue(kind),
            Err(_) => {
                debug!(code, "ignoring unrecognized alert code");
                false
            }
        }
    }
}

/// Consumer half, owned by the main loop.
#[derive(Debug)]
pub struct AlertRelay {
    rx: mpsc::UnboundedReceiver<String>,
}

impl AlertRelay {
    pub fn channel() -> (AlertSender, AlertRelay) {
        let (tx, rx) = mpsc::unbounded_channel();
        (AlertSender { tx }, AlertRelay { rx })
    }

    /// Take the oldest pending alert, if any. Never blocks.
    pub fn drain_one(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
