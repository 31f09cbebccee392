pub mod actions;
pub mod dispatcher;
pub mod reactor;
pub mod relay;
pub mod sink;

pub use actions::BuiltinActions;
pub use dispatcher::{Control, Dispatch, Dispatcher, Tier};
pub use reactor::{Reactor, StepOutcome};
pub use relay::{AlertKind, AlertRelay, AlertSender};
pub use sink::{EventLog, ResponseSink, SpeechMode};
