use std::sync::Arc;

use chrono::{Local, NaiveTime};
use tracing::{info, warn};

use crate::intent::{Intent, IntentRecord};
use crate::services::{Launcher, PhraseTable};

pub const GOOGLE_HOME: &str = "https://www.google.com";
pub const YOUTUBE_HOME: &str = "https://www.youtube.com";
pub const YOUTUBE_MUSIC_HOME: &str = "https://music.youtube.com";

/// First dispatcher tier: intents answered directly, plus the static
/// response table.
pub struct BuiltinActions {
    launcher: Arc<dyn Launcher>,
    phrases: PhraseTable,
}

impl BuiltinActions {
    pub fn new(launcher: Arc<dyn Launcher>, phrases: PhraseTable) -> Self {
        Self { launcher, phrases }
    }

    /// A direct response for `record`, or `None` to decline.
    ///
    /// The phrase table is never consulted for `control_iot` or `exit`, so
    /// a canned phrase cannot swallow a device command or a request to stop.
    pub fn respond(&self, record: &IntentRecord, utterance: &str) -> Option<String> {
        if let Some(reply) = self.respond_to_intent(record) {
            return Some(reply);
        }

        match record.intent {
            Intent::ControlIot | Intent::Exit => None,
            _ => self.phrases.lookup(utterance).map(str::to_string),
        }
    }

    fn respond_to_intent(&self, record: &IntentRecord) -> Option<String> {
        match record.intent {
            Intent::PerformSearch => {
                let query = record.query.as_deref()?;
                self.open(&search_url(query));
                Some(format!("Searching Google for {query}."))
            }
            Intent::OpenGoogle => match record.query.as_deref() {
                // Normally rewritten upstream; handle it the same way regardless.
                Some(query) => {
                    self.open(&search_url(query));
                    Some(format!("Searching Google for {query}."))
                }
                None => {
                    self.open(GOOGLE_HOME);
                    Some("Opening Google.".to_string())
                }
            },
            Intent::OpenYoutube => {
                self.open(YOUTUBE_HOME);
                Some("Opening YouTube.".to_string())
            }
            Intent::PlayMusic => match record.query.as_deref() {
                Some(query) => {
                    self.open(&format!(
                        "{YOUTUBE_HOME}/results?search_query={}",
                        urlencoding::encode(query)
                    ));
                    Some(format!("Playing {query} on YouTube."))
                }
                None => {
                    self.open(YOUTUBE_MUSIC_HOME);
                    Some("Playing music on YouTube.".to_string())
                }
            },
            Intent::GetTime => Some(format_time(Local::now().time())),
            _ => None,
        }
    }

    // Launch failures are logged; the spoken reply still goes out.
    fn open(&self, url: &str) {
        info!(url, "opening");
        if let Err(e) = self.launcher.open(url) {
            warn!(error = %e, url, "failed to open url");
        }
    }
}

pub fn search_url(query: &str) -> String {
    format!("{GOOGLE_HOME}/search?q={}", urlencoding::encode(query))
}

pub fn format_time(time: NaiveTime) -> String {
    format!("The time is {}.", time.format("%-I:%M %p"))
}
