use crate::model::call::Role;
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Opaque negotiation payload, shaped like the browser's `RTCSessionDescriptionInit`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
    #[serde(default)]
    pub username_fragment: Option<String>,
}

/// Events a participant sends to the signaling channel.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientSignal {
    JoinCall {
        room_id: RoomId,
    },
    CallOffer {
        room_id: RoomId,
        offer: SessionDescription,
    },
    CallAnswer {
        room_id: RoomId,
        answer: SessionDescription,
    },
    IceCandidate {
        room_id: RoomId,
        candidate: IceCandidate,
    },
    LeaveCall {
        room_id: RoomId,
    },
}

impl ClientSignal {
    pub fn room_id(&self) -> &RoomId {
        match self {
            ClientSignal::JoinCall { room_id }
            | ClientSignal::CallOffer { room_id, .. }
            | ClientSignal::CallAnswer { room_id, .. }
            | ClientSignal::IceCandidate { room_id, .. }
            | ClientSignal::LeaveCall { room_id } => room_id,
        }
    }
}

/// Events the signaling channel delivers to a participant.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerSignal {
    Welcome { peer_id: PeerId },
    RoomCreated { room_id: RoomId },
    RoomReady { room_id: RoomId, role: Role },
    RoomFull { room_id: RoomId },
    CallOffer { offer: SessionDescription },
    CallAnswer { answer: SessionDescription },
    IceCandidate { candidate: IceCandidate },
    PeerLeft { room_id: RoomId },
}
