use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct CallId(pub String);

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for CallId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Negotiation role. The participant that arrives second in a room is the offerer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Offerer,
    Answerer,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    Connecting,
    Waiting,
    Negotiating,
    Ongoing,
    Ended,
}

impl CallStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CallStatus::Ended)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// Local user hung up.
    HangUp,
    /// The other participant left or its transport dropped.
    PeerLeft,
    /// The room already had two occupants.
    RoomFull,
    /// Negotiation or ICE failure, or the signaling connection was lost.
    Network,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndReason::HangUp => "hang-up",
            EndReason::PeerLeft => "peer-left",
            EndReason::RoomFull => "room-full",
            EndReason::Network => "network",
        };
        f.write_str(s)
    }
}
