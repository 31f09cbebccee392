use std::sync::Arc;

use tracing::{debug, warn};

use super::actions::BuiltinActions;
use crate::intent::{apply_disambiguation, DeviceAction, Intent, IntentRecord};
use crate::services::DeviceController;

pub const FAREWELL: &str = "Goodbye! Have a great day.";
pub const GENERIC_ACK: &str = "I processed your question.";
pub const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand that.";
pub const UNKNOWN_DEVICE: &str = "unknown device";

/// The handler stage that answered an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Builtin,
    Device,
    Exit,
    GeneralQuestion,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// The interactive loop should stop. Single-turn callers ignore it.
    Exit,
}

/// Outcome of one dispatch: exactly one tier, exactly one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub tier: Tier,
    pub reply: String,
    pub control: Control,
}

impl Dispatch {
    fn reply(tier: Tier, reply: impl Into<String>) -> Self {
        Self {
            tier,
            reply: reply.into(),
            control: Control::Continue,
        }
    }
}

/// Ordered handler chain. Stateless; the first tier that answers wins.
pub struct Dispatcher {
    actions: BuiltinActions,
    devices: Arc<dyn DeviceController>,
}

impl Dispatcher {
    pub fn new(actions: BuiltinActions, devices: Arc<dyn DeviceController>) -> Self {
        Self { actions, devices }
    }

    pub async fn dispatch(&self, record: &IntentRecord, utterance: &str) -> Dispatch {
        let mut record = record.clone();
        apply_disambiguation(&mut record);

        // === 1. BUILT-IN ACTIONS ===
        if let Some(reply) = self.actions.respond(&record, utterance) {
            debug!(intent = %record.intent, "handled by built-in action");
            return Dispatch::reply(Tier::Builtin, reply);
        }

        match record.intent {
            // === 2. DEVICE CONTROL ===
            Intent::ControlIot => {
                let device = record.device.as_deref().unwrap_or(UNKNOWN_DEVICE);
                let action = record.action.unwrap_or(DeviceAction::Off);
                let reply = match self.devices.control_device(device, action).await {
                    Ok(confirmation) => confirmation,
                    Err(e) => {
                        warn!(error = %e, device, action = %action, "device control failed");
                        format!("Sorry, I couldn't turn {action} the {device}.")
                    }
                };
                Dispatch::reply(Tier::Device, reply)
            }
            // === 3. EXIT ===
            Intent::Exit => Dispatch {
                tier: Tier::Exit,
                reply: FAREWELL.to_string(),
                control: Control::Exit,
            },
            // === 4. GENERAL QUESTION ===
            Intent::GeneralQuestion => Dispatch::reply(
                Tier::GeneralQuestion,
                record.llm_reply.unwrap_or_else(|| GENERIC_ACK.to_string()),
            ),
            // === 5. FALLBACK ===
            _ => Dispatch::reply(Tier::Fallback, NOT_UNDERSTOOD),
        }
    }
}
