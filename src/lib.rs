pub mod config;
pub mod error;
pub mod intent;
pub mod kernel;
pub mod memory;
pub mod monitor;
pub mod services;

#[cfg(feature = "microphone")]
pub mod audio;

pub use config::Config;
pub use error::{Error, Result};
pub use kernel::reactor::Reactor;
