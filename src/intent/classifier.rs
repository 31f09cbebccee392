use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::intent::types::{Intent, IntentRecord};
use crate::memory::{Role, Turn};
use crate::services::llm::ReasoningService;
use crate::Error;

/// Spoken when the reasoning service cannot be reached or returns garbage.
pub const THINKING_APOLOGY: &str = "Sorry, I'm having trouble thinking right now.";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Instruction sent with every classification request.
pub const SYSTEM_PROMPT: &str = r#"You are a voice assistant's brain. You will receive a user's spoken text.
Your job is to understand the user's intent and extract key entities.
You must respond in JSON format ONLY. Do not write any other text.

Your possible intents are:
- 'control_iot': For turning devices on or off.
- 'perform_search': For any request to find information or search the web.
- 'open_google': For opening the Google homepage.
- 'open_youtube': For opening the YouTube homepage.
- 'play_music': For playing music.
- 'get_time': For asking the current time.
- 'general_question': For conversational chat or questions where the answer should be spoken.
- 'exit': For stopping the assistant.
- 'unknown': If you cannot understand the intent.

JSON format:
{
  "intent": "intent_name",
  "device": "device_name (e.g., 'light', 'heater', or null)",
  "action": "'on', 'off', or null",
  "query": "the search query (or null)",
  "llm_reply": "A helpful, conversational reply for a 'general_question' intent (or null)"
}

Examples:
User: "Turn on the light"
{"intent": "control_iot", "device": "light", "action": "on", "query": null, "llm_reply": null}

User: "Search for the weather in London"
{"intent": "perform_search", "query": "weather in London", "device": null, "action": null, "llm_reply": null}

User: "Open YouTube"
{"intent": "open_youtube", "device": null, "action": null, "query": null, "llm_reply": null}

User: "What time is it?"
{"intent": "get_time", "device": null, "action": null, "query": null, "llm_reply": null}

User: "How are you?"
{"intent": "general_question", "device": null, "action": null, "query": null, "llm_reply": "I'm doing well, thank you for asking!"}

User: "Goodbye"
{"intent": "exit", "device": null, "action": null, "query": null, "llm_reply": null}
"#;

/// Output of `infer`. `reply` is the conversational text the classifier
/// produced (or the apology on the degraded path); it may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub record: IntentRecord,
    pub reply: Option<String>,
    pub degraded: bool,
}

impl Classification {
    pub fn fallback() -> Self {
        Self {
            record: IntentRecord::unknown(),
            reply: Some(THINKING_APOLOGY.to_string()),
            degraded: true,
        }
    }
}

/// Wraps the reasoning service. Never fails: every error path degrades to
/// `Classification::fallback()`.
pub struct IntentClassifier {
    service: Arc<dyn ReasoningService>,
    timeout: Duration,
    history_turns: usize,
}

impl IntentClassifier {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self {
            service,
            timeout: DEFAULT_TIMEOUT,
            history_turns: 6,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Classify `text`. `conversation` is the full in-memory history, whose
    /// last entry is normally the user turn for `text` itself.
    pub async fn infer(&self, text: &str, conversation: &[Turn]) -> Classification {
        let prompt = build_prompt(text, conversation, self.history_turns);

        let raw = match tokio::time::timeout(self.timeout, self.service.complete(SYSTEM_PROMPT, &prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(Error::Http(e))) if e.is_connect() => {
                warn!(error = %e, "reasoning service unreachable, is Ollama running?");
                return Classification::fallback();
            }
            Ok(Err(e)) => {
                warn!(error = %e, "reasoning service failed");
                return Classification::fallback();
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "reasoning service timed out");
                return Classification::fallback();
            }
        };

        let mut record = match IntentRecord::from_json(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "unparseable intent payload");
                return Classification::fallback();
            }
        };

        apply_disambiguation(&mut record);
        info!(intent = %record.intent, device = ?record.device, action = ?record.action, query = ?record.query, "understood intent");

        let reply = record.llm_reply.clone();
        Classification { record, reply, degraded: false }
    }
}

/// `open_google` with a dictated query is really a search.
pub fn apply_disambiguation(record: &mut IntentRecord) {
    if record.intent == Intent::OpenGoogle && record.query.is_some() {
        info!("demoting open_google with query to perform_search");
        record.intent = Intent::PerformSearch;
    }
}

/// Prior turns (up to `history_turns`) followed by the current utterance.
pub fn build_prompt(text: &str, conversation: &[Turn], history_turns: usize) -> String {
    // The current utterance is already the last turn; don't repeat it as context.
    let prior = match conversation.last() {
        Some(last) if last.role() == Role::User && last.content() == text => {
            &conversation[..conversation.len() - 1]
        }
        _ => conversation,
    };
    let start = prior.len().saturating_sub(history_turns);

    let mut prompt = String::new();
    for turn in &prior[start..] {
        let speaker = match turn.role() {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        prompt.push_str(&format!("{speaker}: \"{}\"\n", turn.content()));
    }
    prompt.push_str(&format!("User: \"{text}\""));
    prompt
}
