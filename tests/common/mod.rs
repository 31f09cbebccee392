#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use herald::config::PacingConfig;
use herald::intent::{DeviceAction, IntentClassifier};
use herald::kernel::{AlertRelay, AlertSender, BuiltinActions, Dispatcher, EventLog, Reactor, ResponseSink, SpeechMode};
use herald::memory::ConversationStore;
use herald::services::{DeviceController, Launcher, PhraseTable, ReasoningService, Speaker, Transcriber};
use herald::{Error, Result};

/// Records everything it is asked to say, after `delay` of playback.
#[derive(Clone, Default)]
pub struct RecordingSpeaker {
    pub spoken: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
    pub delay: Duration,
}

impl RecordingSpeaker {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay, ..Self::default() }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Speech("no audio device".to_string()));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Plays back a fixed script of transcriptions, then listens to a quiet room.
pub struct ScriptedTranscriber {
    script: VecDeque<Result<String>>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedTranscriber {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            script: lines.iter().map(|l| Ok(l.to_string())).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_results(results: Vec<Result<String>>) -> Self {
        Self {
            script: results.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&mut self, duration: Duration) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(result) => result,
            None => {
                tokio::time::sleep(duration).await;
                Ok(String::new())
            }
        }
    }
}

/// Answers with a canned JSON payload per utterance; unknown utterances
/// get `{"intent": "unknown"}`.
#[derive(Default)]
pub struct CannedService {
    replies: HashMap<String, String>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl CannedService {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            replies: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            prompts: Arc::default(),
        }
    }
}

#[async_trait]
impl ReasoningService for CannedService {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        for (utterance, reply) in &self.replies {
            if prompt.ends_with(&format!("User: \"{utterance}\"")) {
                return Ok(reply.clone());
            }
        }
        Ok(r#"{"intent": "unknown"}"#.to_string())
    }
}

/// Always fails.
pub struct BrokenService;

#[async_trait]
impl ReasoningService for BrokenService {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        Err(Error::Reasoning("connection refused".to_string()))
    }
}

/// Never answers within any reasonable timeout.
pub struct HangingService;

#[async_trait]
impl ReasoningService for HangingService {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(r#"{"intent": "get_time"}"#.to_string())
    }
}

#[derive(Clone, Default)]
pub struct RecordingLauncher {
    pub opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingLauncher {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingDevices {
    pub calls: Arc<Mutex<Vec<(String, DeviceAction)>>>,
}

impl RecordingDevices {
    pub fn calls(&self) -> Vec<(String, DeviceAction)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceController for RecordingDevices {
    async fn control_device(&self, device: &str, action: DeviceAction) -> Result<String> {
        self.calls.lock().unwrap().push((device.to_string(), action));
        Ok(format!("Turning {action} the {device}."))
    }
}

pub fn dispatcher(launcher: &RecordingLauncher, devices: &RecordingDevices, phrases: PhraseTable) -> Dispatcher {
    Dispatcher::new(
        BuiltinActions::new(Arc::new(launcher.clone()), phrases),
        Arc::new(devices.clone()),
    )
}

pub fn sink(speaker: &RecordingSpeaker, log: &Path, mode: SpeechMode) -> ResponseSink {
    ResponseSink::new(Arc::new(speaker.clone()), EventLog::new(log), mode, PacingConfig::immediate())
}

/// A fully wired reactor over fakes, rooted in `dir`.
pub struct Harness {
    pub reactor: Reactor,
    pub alerts: AlertSender,
    pub speaker: RecordingSpeaker,
    pub devices: RecordingDevices,
    pub launcher: RecordingLauncher,
    pub transcriber_calls: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(dir: &Path, transcriber: ScriptedTranscriber, service: impl ReasoningService + 'static) -> Self {
        Self::with_classifier(dir, transcriber, IntentClassifier::new(Arc::new(service)))
    }

    pub fn with_classifier(dir: &Path, transcriber: ScriptedTranscriber, classifier: IntentClassifier) -> Self {
        Self::with_parts(dir, transcriber, classifier, RecordingSpeaker::default())
    }

    pub fn with_speaker(
        dir: &Path,
        transcriber: ScriptedTranscriber,
        service: impl ReasoningService + 'static,
        speaker: RecordingSpeaker,
    ) -> Self {
        Self::with_parts(dir, transcriber, IntentClassifier::new(Arc::new(service)), speaker)
    }

    fn with_parts(
        dir: &Path,
        transcriber: ScriptedTranscriber,
        classifier: IntentClassifier,
        speaker: RecordingSpeaker,
    ) -> Self {
        let devices = RecordingDevices::default();
        let launcher = RecordingLauncher::default();
        let transcriber_calls = Arc::clone(&transcriber.calls);
        let (alerts, relay) = AlertRelay::channel();

        let reactor = Reactor::new(
            Box::new(transcriber),
            classifier,
            dispatcher(&launcher, &devices, PhraseTable::default()),
            sink(&speaker, &dir.join("assistant.log"), SpeechMode::Blocking),
            ConversationStore::load(dir.join("conversation.json"), 50),
            relay,
        )
        .with_listen_duration(Duration::from_millis(10))
        .with_error_pause(Duration::ZERO);

        Self {
            reactor,
            alerts,
            speaker,
            devices,
            launcher,
            transcriber_calls,
        }
    }

    pub fn transcriptions(&self) -> usize {
        self.transcriber_calls.load(Ordering::SeqCst)
    }
}
