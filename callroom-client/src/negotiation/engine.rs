use crate::error::NegotiationError;
use crate::negotiation::{CandidateQueue, ConnectionState, NegotiationEvent};
use crate::signaling::SignalingLink;
use callroom_core::{ClientSignal, IceCandidate, Role, RoomId, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// One participant's side of the offer/answer exchange.
///
/// Owned by a single call session; all negotiation calls are made from that
/// session's event loop, so the candidate queue needs no locking.
pub struct NegotiationEngine {
    room_id: RoomId,
    role: Option<Role>,
    peer_connection: Arc<RTCPeerConnection>,
    link: Arc<dyn SignalingLink>,
    candidates: CandidateQueue,
    offer_sent: bool,
}

impl NegotiationEngine {
    /// Builds the peer connection, attaches local tracks and wires callbacks.
    /// `event_tx` receives state changes, remote tracks and local candidates.
    pub async fn new(
        room_id: RoomId,
        ice_servers: &[String],
        tracks: &[Arc<dyn TrackLocal + Send + Sync>],
        link: Arc<dyn SignalingLink>,
        event_tx: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Self, NegotiationError> {
        // 1. Codecs and default interceptors (RTCP reports, NACK)
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        // 2. STUN only, no TURN relay
        let ice_servers = if ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: ice_servers.to_vec(),
                ..Default::default()
            }]
        };
        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        for track in tracks {
            peer_connection.add_track(Arc::clone(track)).await?;
        }

        let state_tx = event_tx.clone();
        let room_state = room_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let room = room_state.clone();

                Box::pin(async move {
                    info!("Peer connection state in room {}: {:?}", room, s);
                    let _ = tx.send(NegotiationEvent::StateChanged(s.into())).await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(NegotiationEvent::CandidateGenerated(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                        username_fragment: init.username_fragment,
                    }))
                    .await;
            })
        }));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    let kind = track.kind().to_string();
                    let id = track.id();
                    debug!("Remote {} track {} started", kind, id);

                    // Drain RTP so receive buffers never stall the transport.
                    let reader = Arc::clone(&track);
                    tokio::spawn(async move { while reader.read_rtp().await.is_ok() {} });

                    let _ = tx.send(NegotiationEvent::RemoteTrack { kind, id }).await;
                })
            },
        ));

        Ok(Self {
            room_id,
            role: None,
            peer_connection,
            link,
            candidates: CandidateQueue::new(),
            offer_sent: false,
        })
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = Some(role);
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn pending_candidates(&self) -> usize {
        self.candidates.pending_len()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.peer_connection.connection_state().into()
    }

    /// Offerer only: create and apply a local offer, then send it.
    pub async fn create_offer(&mut self) -> Result<(), NegotiationError> {
        self.require_role(Role::Offerer, "create_offer")?;

        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        self.offer_sent = true;

        info!("Sending offer in room {}", self.room_id);
        self.link
            .send(ClientSignal::CallOffer {
                room_id: self.room_id.clone(),
                offer: SessionDescription::offer(offer.sdp),
            })
            .await?;
        Ok(())
    }

    /// Answerer only: apply the remote offer, then create, apply and send an answer.
    pub async fn handle_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.require_role(Role::Answerer, "handle_offer")?;
        if offer.kind != SdpKind::Offer {
            return Err(NegotiationError::MalformedSdp(
                "expected an offer description".into(),
            ));
        }

        let desc = RTCSessionDescription::offer(offer.sdp)
            .map_err(|e| NegotiationError::MalformedSdp(e.to_string()))?;
        self.apply_remote_description(desc).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;

        info!("Sending answer in room {}", self.room_id);
        self.link
            .send(ClientSignal::CallAnswer {
                room_id: self.room_id.clone(),
                answer: SessionDescription::answer(answer.sdp),
            })
            .await?;
        Ok(())
    }

    /// Offerer only, after `create_offer`: apply the remote answer.
    pub async fn handle_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.require_role(Role::Offerer, "handle_answer")?;
        if !self.offer_sent {
            return Err(NegotiationError::AnswerBeforeOffer);
        }
        if answer.kind != SdpKind::Answer {
            return Err(NegotiationError::MalformedSdp(
                "expected an answer description".into(),
            ));
        }

        let desc = RTCSessionDescription::answer(answer.sdp)
            .map_err(|e| NegotiationError::MalformedSdp(e.to_string()))?;
        self.apply_remote_description(desc).await
    }

    /// Applies the candidate now, or queues it until the remote description is set.
    pub async fn handle_remote_ice_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        match self.candidates.accept(candidate) {
            Some(candidate) => self.add_candidate(candidate).await,
            None => {
                debug!(
                    "Queued early ICE candidate ({} pending)",
                    self.candidates.pending_len()
                );
                Ok(())
            }
        }
    }

    pub async fn close(&self) -> Result<(), NegotiationError> {
        self.peer_connection.close().await?;
        Ok(())
    }

    async fn apply_remote_description(
        &mut self,
        desc: RTCSessionDescription,
    ) -> Result<(), NegotiationError> {
        self.peer_connection.set_remote_description(desc).await?;

        let queued = self.candidates.mark_remote_description_set();
        if !queued.is_empty() {
            debug!("Flushing {} queued ICE candidates", queued.len());
        }
        for candidate in queued {
            if let Err(e) = self.add_candidate(candidate).await {
                warn!("Failed to apply queued ICE candidate: {}", e);
            }
        }
        Ok(())
    }

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        if candidate.candidate.trim().is_empty() {
            return Err(NegotiationError::MalformedCandidate(
                "empty candidate line".into(),
            ));
        }
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    fn require_role(
        &self,
        expected: Role,
        operation: &'static str,
    ) -> Result<(), NegotiationError> {
        if self.role == Some(expected) {
            return Ok(());
        }
        Err(NegotiationError::WrongRole {
            role: self.role,
            operation,
        })
    }
}
