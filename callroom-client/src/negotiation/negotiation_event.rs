use crate::negotiation::ConnectionState;
use callroom_core::IceCandidate;

/// Events the peer connection produces for the owning call session.
#[derive(Debug, Clone)]
pub enum NegotiationEvent {
    StateChanged(ConnectionState),

    /// Remote media started arriving on a track.
    RemoteTrack { kind: String, id: String },

    /// A local ICE candidate was gathered and must be sent to the other participant.
    CandidateGenerated(IceCandidate),
}
