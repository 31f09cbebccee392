pub mod devices;
pub mod launcher;
pub mod llm;
pub mod phrases;
pub mod speech;
pub mod stt;

pub use devices::{DeviceController, SimulatedDevices};
pub use launcher::{Launcher, SystemLauncher};
pub use llm::{OllamaClient, ReasoningService};
pub use phrases::PhraseTable;
pub use speech::{CommandSpeaker, MutedSpeaker, Speaker};
pub use stt::{is_silence, ConsoleTranscriber, Transcriber};
