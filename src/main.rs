use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use herald::config::{Config, TranscriberKind};
use herald::intent::IntentClassifier;
use herald::kernel::{AlertRelay, BuiltinActions, Dispatcher, EventLog, Reactor, ResponseSink, SpeechMode};
use herald::memory::ConversationStore;
use herald::monitor::{FileSensor, TemperatureMonitor};
use herald::services::{
    CommandSpeaker, ConsoleTranscriber, MutedSpeaker, OllamaClient, PhraseTable, SimulatedDevices, Speaker,
    SystemLauncher, Transcriber,
};

#[derive(Parser, Debug)]
#[command(name = "herald", about = "Voice command router")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    /// Handle a single utterance and exit instead of running the voice loop
    #[arg(long)]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    tracing::info!("Starting Smart Voice Assistant...");

    // 2. Collaborators
    let speaker: Arc<dyn Speaker> = if config.speech.enabled {
        Arc::new(CommandSpeaker::from_config(&config.speech))
    } else {
        Arc::new(MutedSpeaker)
    };
    let classifier = IntentClassifier::new(Arc::new(OllamaClient::from_config(&config.reasoning)))
        .with_timeout(config.reasoning.timeout())
        .with_history_turns(config.reasoning.history_turns);
    let dispatcher = Dispatcher::new(
        BuiltinActions::new(Arc::new(SystemLauncher::new()), PhraseTable::new(&config.phrases)),
        Arc::new(SimulatedDevices::new()),
    );
    let memory = ConversationStore::load(&config.memory.path, config.memory.max_turns);
    let (alert_tx, alerts) = AlertRelay::channel();

    let mode = if cli.once.is_some() { SpeechMode::Detached } else { SpeechMode::Blocking };
    let sink = ResponseSink::new(speaker, EventLog::new(&config.log.path), mode, config.pacing.clone());

    let mut reactor = Reactor::new(build_transcriber(&config)?, classifier, dispatcher, sink, memory, alerts)
        .with_listen_duration(Duration::from_secs(config.listen.duration_secs))
        .with_error_pause(config.pacing.error_pause());

    // 3. Single-turn surface
    if let Some(text) = cli.once {
        reactor.respond_once(&text).await;
        reactor.sink_mut().wait_idle().await;
        return Ok(());
    }

    // 4. Background monitor (talks only to the relay)
    let token = CancellationToken::new();
    let monitor = match &config.monitor.sensor_path {
        Some(path) => Some(
            TemperatureMonitor::new(config.monitor.threshold)
                .spawn(
                    FileSensor::new(path),
                    alert_tx.clone(),
                    Duration::from_secs(config.monitor.poll_secs.max(1)),
                    token.clone(),
                )
                .context("spawning temperature monitor")?,
        ),
        None => None,
    };

    // 5. Run the voice loop
    reactor.run().await;

    token.cancel();
    drop(alert_tx);
    if let Some(handle) = monitor {
        if handle.join().is_err() {
            tracing::warn!("temperature monitor panicked");
        }
    }
    Ok(())
}

fn build_transcriber(config: &Config) -> anyhow::Result<Box<dyn Transcriber>> {
    match config.listen.transcriber {
        TranscriberKind::Console => Ok(Box::new(ConsoleTranscriber::new())),
        #[cfg(feature = "microphone")]
        TranscriberKind::Whisper => Ok(Box::new(herald::services::stt::WhisperTranscriber::new(
            &config.listen.whisper_url,
            &config.listen.whisper_model,
        ))),
        #[cfg(not(feature = "microphone"))]
        TranscriberKind::Whisper => {
            anyhow::bail!("the whisper transcriber needs the `microphone` feature")
        }
    }
}
