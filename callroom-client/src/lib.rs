mod config;
mod error;
pub mod media;
pub mod negotiation;
pub mod record;
pub mod session;
pub mod signaling;

pub use config::ClientConfig;
pub use error::{CallError, NegotiationError, RecordError, SetupError, SignalingError};
pub use media::{LocalMedia, MediaSource, SyntheticMedia};
pub use negotiation::{CandidateQueue, ConnectionState, NegotiationEngine, NegotiationEvent};
pub use record::{CallRecordApi, HttpCallRecordClient, PendingReport, ReportOutbox, send_review};
pub use session::{
    CallCommand, CallDeps, CallHandle, CallSession, CallState, CallStateMachine, CallSummary,
    Effect, Trigger,
};
pub use signaling::{SignalingConnection, SignalingConnector, SignalingLink, WsConnector};
