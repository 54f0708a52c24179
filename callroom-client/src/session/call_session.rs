use crate::config::ClientConfig;
use crate::error::CallError;
use crate::media::{LocalMedia, MediaSource};
use crate::negotiation::{NegotiationEngine, NegotiationEvent};
use crate::record::{CallRecordApi, HttpCallRecordClient, ReportOutbox};
use crate::session::call_handle::CallHandle;
use crate::session::command::CallCommand;
use crate::session::state_machine::{CallStateMachine, Effect, Trigger};
use crate::session::summary::CallSummary;
use crate::signaling::{SignalingConnector, SignalingLink, WsConnector};
use callroom_core::{
    BillingSnapshot, CallId, CallRecord, CallStatus, ClientSignal, EndReason, Meter, ServerSignal,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Collaborators a call session talks to.
#[derive(Clone)]
pub struct CallDeps {
    pub records: Arc<dyn CallRecordApi>,
    pub outbox: Arc<ReportOutbox>,
    pub media: Arc<dyn MediaSource>,
    pub signaling: Arc<dyn SignalingConnector>,
}

impl CallDeps {
    /// HTTP record API and websocket signaling as described by `config`.
    pub fn from_config(
        config: &ClientConfig,
        media: Arc<dyn MediaSource>,
    ) -> Result<Self, CallError> {
        let records: Arc<dyn CallRecordApi> = Arc::new(HttpCallRecordClient::new(
            config.api_base_url.clone(),
            config.auth_token.clone(),
        )?);
        Ok(Self {
            outbox: Arc::new(ReportOutbox::new(Arc::clone(&records))),
            records,
            media,
            signaling: Arc::new(WsConnector::new(config.signaling_url.clone())),
        })
    }
}

/// Event loop owning one call from join to finalization.
pub struct CallSession {
    call_id: CallId,
    record: CallRecord,
    machine: CallStateMachine,
    meter: Meter,
    media: LocalMedia,
    engine: NegotiationEngine,
    link: Arc<dyn SignalingLink>,
    records: Arc<dyn CallRecordApi>,
    outbox: Arc<ReportOutbox>,
    signal_rx: mpsc::UnboundedReceiver<ServerSignal>,
    event_rx: mpsc::Receiver<NegotiationEvent>,
    command_rx: mpsc::UnboundedReceiver<CallCommand>,
    ticker: Option<Interval>,
    tick_interval: Duration,
    start_marker: Option<JoinHandle<()>>,
    status_tx: watch::Sender<CallStatus>,
    billing_tx: watch::Sender<BillingSnapshot>,
    left: bool,
    reached_media: bool,
    summary: Option<CallSummary>,
}

impl CallSession {
    /// Fetches the call, acquires local media, connects and joins the call's room.
    ///
    /// Media is acquired before any signaling connection is made, so a denied
    /// camera or microphone never reaches the room.
    pub async fn start(
        call_id: CallId,
        config: &ClientConfig,
        deps: CallDeps,
    ) -> Result<CallHandle, CallError> {
        let (handle, _events) = Self::launch(call_id, config, deps).await?;
        Ok(handle)
    }

    /// Same as [`CallSession::start`], also returning a sender into the
    /// session's negotiation event queue.
    pub(crate) async fn launch(
        call_id: CallId,
        config: &ClientConfig,
        deps: CallDeps,
    ) -> Result<(CallHandle, mpsc::Sender<NegotiationEvent>), CallError> {
        let record = deps.records.get_call(&call_id).await?;
        info!(
            "Starting call {} in room {} at {}/min",
            call_id, record.room_id, record.rate_per_minute
        );

        let media = deps.media.acquire().await.map_err(|e| {
            error!("Local media unavailable for call {}: {}", call_id, e);
            CallError::Setup(e)
        })?;

        let connection = match deps.signaling.connect().await {
            Ok(c) => c,
            Err(e) => {
                media.stop();
                return Err(e.into());
            }
        };

        let (event_tx, event_rx) = mpsc::channel(256);
        let events = event_tx.clone();
        let engine = match NegotiationEngine::new(
            record.room_id.clone(),
            &config.ice_servers,
            media.tracks(),
            Arc::clone(&connection.link),
            event_tx,
        )
        .await
        {
            Ok(engine) => engine,
            Err(e) => {
                media.stop();
                return Err(e.into());
            }
        };

        let join = ClientSignal::JoinCall {
            room_id: record.room_id.clone(),
        };
        if let Err(e) = connection.link.send(join).await {
            media.stop();
            let _ = engine.close().await;
            return Err(e.into());
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(CallStatus::Connecting);
        let (billing_tx, billing_rx) = watch::channel(BillingSnapshot::default());

        let session = CallSession {
            call_id: call_id.clone(),
            record: record.clone(),
            machine: CallStateMachine::new(),
            meter: Meter::new(record.rate_per_minute),
            media,
            engine,
            link: connection.link,
            records: deps.records,
            outbox: deps.outbox,
            signal_rx: connection.events,
            event_rx,
            command_rx,
            ticker: None,
            tick_interval: config.tick_interval,
            start_marker: None,
            status_tx,
            billing_tx,
            left: false,
            reached_media: false,
            summary: None,
        };

        let task = tokio::spawn(session.run());

        let handle = CallHandle::new(call_id, record, command_tx, status_rx, billing_rx, task);
        Ok((handle, events))
    }

    pub async fn run(mut self) -> CallSummary {
        info!("Call {} event loop started", self.call_id);

        loop {
            if let Some(summary) = self.summary.take() {
                info!("Call {} event loop finished", self.call_id);
                return summary;
            }

            tokio::select! {
                signal = self.signal_rx.recv() => {
                    match signal {
                        Some(s) => self.handle_signal(s).await,
                        None => {
                            warn!("Signaling connection lost for call {}", self.call_id);
                            self.apply(Trigger::SignalingLost).await;
                        }
                    }
                }

                Some(evt) = self.event_rx.recv() => {
                    self.handle_negotiation_event(evt).await;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CallCommand::SetMuted(muted)) => self.media.set_muted(muted),
                        Some(CallCommand::HangUp) | None => self.apply(Trigger::HangUp).await,
                    }
                }

                _ = next_tick(&mut self.ticker) => self.on_tick(),
            }
        }
    }

    async fn handle_signal(&mut self, signal: ServerSignal) {
        match signal {
            ServerSignal::Welcome { peer_id } => debug!("Late welcome as {}", peer_id),

            ServerSignal::RoomCreated { room_id } => {
                info!("Waiting for the other participant in room {}", room_id);
                self.apply(Trigger::RoomCreated).await;
            }

            ServerSignal::RoomReady { room_id, role } => {
                info!("Room {} ready, negotiating as {:?}", room_id, role);
                self.apply(Trigger::RoomReady(role)).await;
            }

            ServerSignal::RoomFull { room_id } => {
                warn!("Room {} is full", room_id);
                self.apply(Trigger::RoomFull).await;
            }

            ServerSignal::CallOffer { offer } => {
                if let Err(e) = self.engine.handle_offer(offer).await {
                    error!("Failed to answer offer in call {}: {}", self.call_id, e);
                    self.apply(Trigger::NegotiationFailed).await;
                }
            }

            ServerSignal::CallAnswer { answer } => {
                if let Err(e) = self.engine.handle_answer(answer).await {
                    error!("Failed to apply answer in call {}: {}", self.call_id, e);
                    self.apply(Trigger::NegotiationFailed).await;
                }
            }

            ServerSignal::IceCandidate { candidate } => {
                let Err(e) = self.engine.handle_remote_ice_candidate(candidate).await else {
                    return;
                };
                warn!("Failed to add ICE candidate in call {}: {}", self.call_id, e);
            }

            ServerSignal::PeerLeft { room_id } => {
                info!("Other participant left room {}", room_id);
                self.apply(Trigger::PeerLeft).await;
            }
        }
    }

    async fn handle_negotiation_event(&mut self, event: NegotiationEvent) {
        match event {
            NegotiationEvent::StateChanged(state) => {
                if state.is_lost() {
                    warn!("Peer connection {:?} in call {}", state, self.call_id);
                    self.apply(Trigger::ConnectionLost).await;
                }
            }

            NegotiationEvent::RemoteTrack { kind, id } => {
                info!("Receiving remote {} ({}) in call {}", kind, id, self.call_id);
                self.apply(Trigger::RemoteTrack).await;
            }

            NegotiationEvent::CandidateGenerated(candidate) => {
                if self.machine.is_ended() {
                    return;
                }
                let signal = ClientSignal::IceCandidate {
                    room_id: self.record.room_id.clone(),
                    candidate,
                };
                if let Err(e) = self.link.send(signal).await {
                    warn!("Failed to send ICE candidate: {}", e);
                }
            }
        }
    }

    /// Runs a trigger and every follow-up trigger its effects produce.
    async fn apply(&mut self, trigger: Trigger) {
        let mut queue = VecDeque::from([trigger]);

        while let Some(trigger) = queue.pop_front() {
            let effects = self.machine.apply(trigger);
            self.status_tx.send_replace(self.machine.status());

            for effect in effects {
                if let Some(next) = self.execute(effect).await {
                    queue.push_back(next);
                }
            }
        }
    }

    async fn execute(&mut self, effect: Effect) -> Option<Trigger> {
        match effect {
            Effect::AssignRole(role) => {
                self.engine.set_role(role);
                None
            }

            Effect::CreateOffer => match self.engine.create_offer().await {
                Ok(()) => None,
                Err(e) => {
                    error!("Failed to create offer in call {}: {}", self.call_id, e);
                    Some(Trigger::NegotiationFailed)
                }
            },

            Effect::StartMetering => {
                self.start_metering();
                None
            }

            Effect::NotifyStarted => {
                let records = Arc::clone(&self.records);
                let call_id = self.call_id.clone();
                self.start_marker = Some(tokio::spawn(async move {
                    if let Err(e) = records.mark_started(&call_id).await {
                        warn!("Failed to mark call {} started: {}", call_id, e);
                    }
                }));
                None
            }

            Effect::Finalize(reason) => {
                self.finalize(reason).await;
                None
            }
        }
    }

    fn start_metering(&mut self) {
        if !self.meter.start(now()) {
            return;
        }
        self.reached_media = true;

        let start = tokio::time::Instant::now() + self.tick_interval;
        let mut ticker = tokio::time::interval_at(start, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);

        if let Some(snapshot) = self.meter.tick(now()) {
            self.billing_tx.send_replace(snapshot);
        }
        info!(
            "Metering call {} at {}/min",
            self.call_id,
            self.meter.rate_per_minute()
        );
    }

    fn on_tick(&mut self) {
        if let Some(snapshot) = self.meter.tick(now()) {
            self.billing_tx.send_replace(snapshot);
        }
    }

    /// Each step runs regardless of whether the previous one failed.
    async fn finalize(&mut self, reason: EndReason) {
        let snapshot = self.meter.finalize(now());
        self.billing_tx.send_replace(snapshot);

        self.media.stop();

        if let Err(e) = self.engine.close().await {
            warn!("Failed to close peer connection: {}", e);
        }

        self.ticker = None;

        if !self.left {
            self.left = true;
            let leave = ClientSignal::LeaveCall {
                room_id: self.record.room_id.clone(),
            };
            if let Err(e) = self.link.send(leave).await {
                warn!("Failed to send leave for call {}: {}", self.call_id, e);
            }
        }

        // The end report must not overtake the start marker.
        if let Some(marker) = self.start_marker.take() {
            let _ = marker.await;
        }

        let persisted = if self.reached_media {
            self.outbox.submit_end(&self.call_id, snapshot.into()).await
        } else {
            false
        };

        info!(
            "Call {} ended ({}): {}s, cost {}",
            self.call_id, reason, snapshot.duration_secs, snapshot.cost
        );

        self.summary = Some(CallSummary {
            call_id: self.call_id.clone(),
            reason,
            snapshot,
            reached_media: self.reached_media,
            persisted,
        });
    }
}

fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
