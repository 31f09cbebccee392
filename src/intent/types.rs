use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// The closed set of intents the classifier may return.
/// Any other name normalizes to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ControlIot,
    PerformSearch,
    OpenGoogle,
    OpenYoutube,
    PlayMusic,
    GetTime,
    GeneralQuestion,
    Exit,
    #[serde(other)]
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::ControlIot,
        Intent::PerformSearch,
        Intent::OpenGoogle,
        Intent::OpenYoutube,
        Intent::PlayMusic,
        Intent::GetTime,
        Intent::GeneralQuestion,
        Intent::Exit,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ControlIot => "control_iot",
            Intent::PerformSearch => "perform_search",
            Intent::OpenGoogle => "open_google",
            Intent::OpenYoutube => "open_youtube",
            Intent::PlayMusic => "play_music",
            Intent::GetTime => "get_time",
            Intent::GeneralQuestion => "general_question",
            Intent::Exit => "exit",
            Intent::Unknown => "unknown",
        }
    }

    /// Lenient name lookup: trims and ignores case, unknown names map to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(name))
            .unwrap_or(Intent::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceAction {
    On,
    Off,
}

impl DeviceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceAction::On => "on",
            DeviceAction::Off => "off",
        }
    }
}

impl fmt::Display for DeviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(DeviceAction::On),
            "off" => Ok(DeviceAction::Off),
            other => Err(Error::Reasoning(format!("unsupported device action: {other}"))),
        }
    }
}

/// A classified utterance. Validated once at the classifier boundary, so
/// every optional field is either absent or a non-empty, trimmed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRecord {
    pub intent: Intent,
    pub device: Option<String>,
    pub action: Option<DeviceAction>,
    pub query: Option<String>,
    pub llm_reply: Option<String>,
}

impl IntentRecord {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            device: None,
            action: None,
            query: None,
            llm_reply: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(Intent::Unknown)
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = non_empty(device.into());
        self
    }

    pub fn with_action(mut self, action: DeviceAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = non_empty(query.into());
        self
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.llm_reply = non_empty(reply.into());
        self
    }

    /// Parse the classifier's JSON object.
    ///
    /// Only a non-object payload is an error. Inside the object every field
    /// is optional: a missing or unrecognized intent becomes `Unknown`, null
    /// or blank strings become `None`, and an action other than on/off is
    /// dropped.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(fields) = value else {
            return Err(Error::Reasoning("intent payload is not a JSON object".to_string()));
        };

        let intent = fields
            .get("intent")
            .and_then(Value::as_str)
            .map(Intent::from_name)
            .unwrap_or(Intent::Unknown);

        let text = |key: &str| fields.get(key).and_then(value_text);

        Ok(Self {
            intent,
            device: text("device"),
            action: text("action").and_then(|a| a.parse().ok()),
            query: text("query"),
            llm_reply: text("llm_reply"),
        })
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
