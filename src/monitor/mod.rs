pub mod types;
pub mod monitor;

pub use types::*;
pub use monitor::*;
