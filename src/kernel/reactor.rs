use std::future::Future;
use std::time::Duration;

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::dispatcher::{Control, Dispatch, Dispatcher, Tier};
use super::relay::AlertRelay;
use super::sink::ResponseSink;
use crate::intent::IntentClassifier;
use crate::memory::{ConversationStore, Turn};
use crate::services::{is_silence, Transcriber};
use crate::Result;

pub const GREETING: &str = "Hello! I am your Smart Voice Assistant. How can I help you?";
pub const INTERRUPT_FAREWELL: &str = "Goodbye!";
pub const LOOP_APOLOGY: &str = "Something went wrong. Let's try again.";

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A queued alert was spoken; no capture happened.
    Alert,
    /// Nothing was heard.
    Silence,
    Handled(Tier),
    Exit,
}

/// The main loop. Sole owner of the response sink and the conversation,
/// so every emission happens here, in processing order.
pub struct Reactor {
    transcriber: Box<dyn Transcriber>,
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
    sink: ResponseSink,
    memory: ConversationStore,
    alerts: AlertRelay,
    listen_for: Duration,
    error_pause: Duration,
}

impl Reactor {
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        classifier: IntentClassifier,
        dispatcher: Dispatcher,
        sink: ResponseSink,
        memory: ConversationStore,
        alerts: AlertRelay,
    ) -> Self {
        Self {
            transcriber,
            classifier,
            dispatcher,
            sink,
            memory,
            alerts,
            listen_for: Duration::from_secs(4),
            error_pause: Duration::from_secs(1),
        }
    }

    pub fn with_listen_duration(mut self, duration: Duration) -> Self {
        self.listen_for = duration;
        self
    }

    pub fn with_error_pause(mut self, pause: Duration) -> Self {
        self.error_pause = pause;
        self
    }

    pub fn memory(&self) -> &ConversationStore {
        &self.memory
    }

    pub fn sink_mut(&mut self) -> &mut ResponseSink {
        &mut self.sink
    }

    /// Speak through the sink, remembering the line unless `remember` is false.
    pub async fn say(&mut self, text: &str, remember: bool) -> bool {
        let memory = if remember { Some(&mut self.memory) } else { None };
        self.sink.emit(text, memory).await
    }

    /// One iteration: alerts first, otherwise listen and handle what was heard.
    pub async fn step(&mut self) -> Result<StepOutcome> {
        if self.speak_pending_alert().await {
            return Ok(StepOutcome::Alert);
        }
        match self.listen().await? {
            Some(text) => Ok(self.handle_heard(&text).await),
            None => Ok(StepOutcome::Silence),
        }
    }

    // === 0. ALERTS (never remembered) ===
    async fn speak_pending_alert(&mut self) -> bool {
        match self.alerts.drain_one() {
            Some(alert) => {
                info!("speaking queued alert");
                self.sink.emit(&alert, None).await;
                true
            }
            None => false,
        }
    }

    // === 1. LISTEN === `None` means silence.
    async fn listen(&mut self) -> Result<Option<String>> {
        println!("Listening for your command...");
        let text = self.transcriber.transcribe(self.listen_for).await?;
        if is_silence(&text) {
            println!("... (Silence detected) ...");
            return Ok(None);
        }
        Ok(Some(text))
    }

    async fn handle_heard(&mut self, text: &str) -> StepOutcome {
        let span = info_span!("utterance", id = %Uuid::new_v4());
        let dispatch = self.handle_utterance(text).instrument(span).await;
        match (dispatch.control, dispatch.tier) {
            (Control::Exit, _) => StepOutcome::Exit,
            (Control::Continue, tier) => StepOutcome::Handled(tier),
        }
    }

    /// Remember, classify, dispatch and answer one utterance.
    pub async fn handle_utterance(&mut self, text: &str) -> Dispatch {
        let text = text.trim();
        println!("You said: {text}");
        self.memory.append(Turn::user(text));

        // === 2. CLASSIFY ===
        let classification = self.classifier.infer(text, self.memory.turns()).await;

        // === 3. DISPATCH & RESPOND ===
        let dispatch = self.dispatcher.dispatch(&classification.record, text).await;
        info!(intent = %classification.record.intent, tier = ?dispatch.tier, "dispatched");
        self.sink.emit(&dispatch.reply, Some(&mut self.memory)).await;
        dispatch
    }

    /// Single-turn surface: one utterance in, one answer out. An `exit`
    /// intent only produces the farewell.
    pub async fn respond_once(&mut self, text: &str) -> Option<Dispatch> {
        if is_silence(text) {
            return None;
        }
        Some(self.handle_utterance(text).await)
    }

    /// Greet, then loop until `exit` or Ctrl-C.
    pub async fn run(&mut self) {
        self.run_until(ctrl_c_signal()).await;
    }

    /// Greet, then loop until `exit` or until `shutdown` resolves. Iteration
    /// errors are apologized for and never end the loop.
    ///
    /// `shutdown` only interrupts the wait for speech. An utterance that is
    /// already being handled (or an alert being spoken) runs to completion
    /// first; the farewell follows it.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Voice loop started");
        self.say(GREETING, true).await;

        tokio::pin!(shutdown);

        loop {
            let interrupted = tokio::select! {
                biased;
                _ = &mut shutdown => true,
                _ = std::future::ready(()) => false,
            };
            if interrupted {
                self.say_interrupted().await;
                break;
            }

            if self.speak_pending_alert().await {
                continue;
            }

            let heard = tokio::select! {
                _ = &mut shutdown => None,
                heard = self.listen() => Some(heard),
            };

            let outcome = match heard {
                None => {
                    self.say_interrupted().await;
                    break;
                }
                Some(Ok(Some(text))) => Ok(self.handle_heard(&text).await),
                Some(Ok(None)) => Ok(StepOutcome::Silence),
                Some(Err(e)) => Err(e),
            };

            match outcome {
                Ok(StepOutcome::Exit) => break,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "main loop error");
                    self.say(LOOP_APOLOGY, true).await;
                    tokio::time::sleep(self.error_pause).await;
                }
            }
        }

        self.sink.wait_idle().await;
        info!("Voice loop stopped");
    }

    async fn say_interrupted(&mut self) {
        info!("interrupted");
        self.say(INTERRUPT_FAREWELL, true).await;
    }
}

async fn ctrl_c_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
