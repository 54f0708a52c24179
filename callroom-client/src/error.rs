use callroom_core::Role;
use thiserror::Error;

/// Local camera or microphone could not be acquired. Fatal before any join.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("media permission denied: {0}")]
    PermissionDenied(String),
    #[error("media device unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("{operation} is not valid for role {role:?}")]
    WrongRole {
        role: Option<Role>,
        operation: &'static str,
    },
    #[error("answer received before an offer was sent")]
    AnswerBeforeOffer,
    #[error("malformed session description: {0}")]
    MalformedSdp(String),
    #[error("malformed ice candidate: {0}")]
    MalformedCandidate(String),
    #[error("peer connection error: {0}")]
    PeerConnection(#[from] webrtc::Error),
    #[error(transparent)]
    Signaling(#[from] SignalingError),
}

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("signaling connect failed: {0}")]
    Connect(String),
    #[error("signaling connection closed")]
    Closed,
    #[error("failed to encode signal: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error("session full")]
    RoomFull,
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    #[error(transparent)]
    Signaling(#[from] SignalingError),
    #[error("call record unavailable: {0}")]
    Record(#[from] RecordError),
    #[error("call task aborted: {0}")]
    Aborted(String),
}

impl CallError {
    /// Errors raised before the call could start; the UI shows a "go back" screen.
    pub fn is_pre_call(&self) -> bool {
        !matches!(self, CallError::Aborted(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            CallError::Setup(_) => "camera or microphone unavailable".into(),
            CallError::RoomFull => "session full".into(),
            CallError::Negotiation(_) | CallError::Signaling(_) => {
                "could not connect the call".into()
            }
            CallError::Record(_) => "call details unavailable".into(),
            CallError::Aborted(_) => "call ended unexpectedly".into(),
        }
    }
}
