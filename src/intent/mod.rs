pub mod types;
pub mod classifier;

pub use types::*;
pub use classifier::{apply_disambiguation, Classification, IntentClassifier, THINKING_APOLOGY};
