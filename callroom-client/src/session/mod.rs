mod call_handle;
mod call_session;
mod command;
mod state_machine;
mod summary;

pub use call_handle::CallHandle;
pub use call_session::{CallDeps, CallSession};
pub use command::CallCommand;
pub use state_machine::{CallState, CallStateMachine, Effect, Trigger};
pub use summary::CallSummary;
