use callroom_core::{CallStatus, EndReason, Role};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Connecting,
    /// Alone in the room.
    Waiting,
    Negotiating { role: Role },
    /// Remote media is flowing.
    Ongoing { role: Role },
    Ended { reason: EndReason },
}

impl CallState {
    pub fn status(&self) -> CallStatus {
        match self {
            CallState::Connecting => CallStatus::Connecting,
            CallState::Waiting => CallStatus::Waiting,
            CallState::Negotiating { .. } => CallStatus::Negotiating,
            CallState::Ongoing { .. } => CallStatus::Ongoing,
            CallState::Ended { .. } => CallStatus::Ended,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    RoomCreated,
    RoomReady(Role),
    RoomFull,
    RemoteTrack,
    /// Peer connection went `failed` or `disconnected`.
    ConnectionLost,
    PeerLeft,
    HangUp,
    NegotiationFailed,
    SignalingLost,
}

impl Trigger {
    fn end_reason(self) -> Option<EndReason> {
        match self {
            Trigger::HangUp => Some(EndReason::HangUp),
            Trigger::PeerLeft => Some(EndReason::PeerLeft),
            Trigger::RoomFull => Some(EndReason::RoomFull),
            Trigger::ConnectionLost | Trigger::NegotiationFailed | Trigger::SignalingLost => {
                Some(EndReason::Network)
            }
            Trigger::RoomCreated | Trigger::RoomReady(_) | Trigger::RemoteTrack => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    AssignRole(Role),
    CreateOffer,
    StartMetering,
    NotifyStarted,
    Finalize(EndReason),
}

/// Transition function of a single call. Effects are returned, never performed.
#[derive(Debug, Clone)]
pub struct CallStateMachine {
    state: CallState,
}

impl Default for CallStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStateMachine {
    pub fn new() -> Self {
        Self {
            state: CallState::Connecting,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn status(&self) -> CallStatus {
        self.state.status()
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, CallState::Ended { .. })
    }

    pub fn apply(&mut self, trigger: Trigger) -> Vec<Effect> {
        if self.is_ended() {
            debug!("Ignoring {:?} after call ended", trigger);
            return Vec::new();
        }

        if let Some(reason) = trigger.end_reason() {
            info!("Call {:?} -> ended ({})", self.state.status(), reason);
            self.state = CallState::Ended { reason };
            return vec![Effect::Finalize(reason)];
        }

        let (next, effects) = match (self.state, trigger) {
            (CallState::Connecting, Trigger::RoomCreated) => (CallState::Waiting, vec![]),

            (CallState::Connecting | CallState::Waiting, Trigger::RoomReady(role)) => {
                let mut effects = vec![Effect::AssignRole(role)];
                if role == Role::Offerer {
                    effects.push(Effect::CreateOffer);
                }
                (CallState::Negotiating { role }, effects)
            }

            (CallState::Negotiating { role }, Trigger::RemoteTrack) => (
                CallState::Ongoing { role },
                vec![Effect::StartMetering, Effect::NotifyStarted],
            ),

            (state, trigger) => {
                debug!("No transition from {:?} on {:?}", state, trigger);
                return Vec::new();
            }
        };

        info!("Call {:?} -> {:?}", self.state.status(), next.status());
        self.state = next;
        effects
    }
}
