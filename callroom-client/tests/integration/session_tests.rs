use std::sync::Arc;
use std::time::Duration;

use callroom_client::{CallError, CallSession, SyntheticMedia};
use callroom_core::{
    BillingSnapshot, CallId, CallStatus, ClientSignal, EndReason, Role, RoomId, ServerSignal,
};

use crate::integration::{init_tracing, mock_deps, test_config, wait_for_status};
use crate::utils::{DeniedMedia, MockConnector, MockRecordApi};

const ROOM: &str = "room-1";

fn room() -> RoomId {
    RoomId::from(ROOM)
}

struct Fixture {
    api: Arc<MockRecordApi>,
    connector: Arc<MockConnector>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            api: Arc::new(MockRecordApi::new(ROOM, 5)),
            connector: Arc::new(MockConnector::default()),
        }
    }

    async fn start(&self) -> callroom_client::CallHandle {
        CallSession::start(
            CallId::from("call-1"),
            &test_config("ws://unused", "http://unused"),
            mock_deps(
                self.api.clone(),
                self.connector.clone(),
                Arc::new(SyntheticMedia::new()),
            ),
        )
        .await
        .expect("Failed to start call")
    }
}

#[tokio::test]
async fn denied_media_never_touches_signaling() {
    init_tracing();
    let api = Arc::new(MockRecordApi::new(ROOM, 5));
    let connector = Arc::new(MockConnector::default());
    let media = Arc::new(DeniedMedia::default());

    let result = CallSession::start(
        CallId::from("call-1"),
        &test_config("ws://unused", "http://unused"),
        mock_deps(api.clone(), connector.clone(), media.clone()),
    )
    .await;

    let err = result.err().expect("Start should fail");
    assert!(matches!(err, CallError::Setup(_)));
    assert!(err.is_pre_call());
    assert_eq!(media.attempts(), 1);
    assert_eq!(connector.connects(), 0);
    assert!(connector.link.sent().is_empty());
}

#[tokio::test]
async fn joins_the_records_room() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;

    assert_eq!(
        fx.connector.link.sent().first(),
        Some(&ClientSignal::JoinCall { room_id: room() })
    );
    assert_eq!(handle.status(), CallStatus::Connecting);

    handle.hang_up();
    handle.finished().await.expect("Call task failed");
}

#[tokio::test]
async fn lone_participant_keeps_waiting() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;

    fx.connector.inject(ServerSignal::RoomCreated { room_id: room() });
    assert!(wait_for_status(&handle, CallStatus::Waiting, 2000).await);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.status(), CallStatus::Waiting);
    assert_eq!(handle.billing(), BillingSnapshot::default());

    handle.hang_up();
    let summary = handle.finished().await.expect("Call task failed");

    assert_eq!(summary.reason, EndReason::HangUp);
    assert!(!summary.reached_media);
    assert_eq!(summary.snapshot, BillingSnapshot::default());
    assert_eq!(fx.api.started(), 0);
    assert!(fx.api.ended().is_empty());
}

#[tokio::test]
async fn room_full_reports_session_full() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;

    fx.connector.inject(ServerSignal::RoomFull { room_id: room() });
    let summary = handle.finished().await.expect("Call task failed");

    assert_eq!(summary.reason, EndReason::RoomFull);
    let err = summary.error().expect("Room full should surface an error");
    assert!(matches!(err, CallError::RoomFull));
    assert_eq!(err.user_message(), "session full");
    assert_eq!(fx.api.started(), 0);
}

#[tokio::test]
async fn answerer_does_not_offer() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;

    fx.connector.inject(ServerSignal::RoomReady {
        room_id: room(),
        role: Role::Answerer,
    });
    assert!(wait_for_status(&handle, CallStatus::Negotiating, 2000).await);

    let offers = fx
        .connector
        .link
        .count(|s| matches!(s, ClientSignal::CallOffer { .. }));
    assert_eq!(offers, 0);

    handle.hang_up();
    handle.finished().await.expect("Call task failed");
}

#[tokio::test]
async fn offerer_sends_offer_on_room_ready() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;

    fx.connector.inject(ServerSignal::RoomCreated { room_id: room() });
    fx.connector.inject(ServerSignal::RoomReady {
        room_id: room(),
        role: Role::Offerer,
    });
    assert!(wait_for_status(&handle, CallStatus::Negotiating, 2000).await);

    let mut offered = false;
    for _ in 0..50 {
        if fx
            .connector
            .link
            .count(|s| matches!(s, ClientSignal::CallOffer { .. }))
            == 1
        {
            offered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(offered, "Offerer should send exactly one offer");

    handle.hang_up();
    handle.finished().await.expect("Call task failed");
}

#[tokio::test]
async fn hang_up_racing_peer_left_finalizes_once() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;

    fx.connector.inject(ServerSignal::RoomReady {
        room_id: room(),
        role: Role::Answerer,
    });
    assert!(wait_for_status(&handle, CallStatus::Negotiating, 2000).await);

    fx.connector.inject(ServerSignal::PeerLeft { room_id: room() });
    handle.hang_up();
    handle.hang_up();

    let summary = handle.finished().await.expect("Call task failed");

    assert!(matches!(
        summary.reason,
        EndReason::PeerLeft | EndReason::HangUp
    ));
    assert_eq!(fx.connector.leave_count(), 1);
    assert!(fx.api.ended().is_empty());
    assert_eq!(summary.snapshot, BillingSnapshot::default());
}

#[tokio::test]
async fn lost_signaling_ends_the_call() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;

    fx.connector.inject(ServerSignal::RoomCreated { room_id: room() });
    assert!(wait_for_status(&handle, CallStatus::Waiting, 2000).await);

    fx.connector.disconnect();
    let summary = handle.finished().await.expect("Call task failed");

    assert_eq!(summary.reason, EndReason::Network);
    assert_eq!(fx.connector.leave_count(), 1);
}

#[tokio::test]
async fn dropping_the_handle_hangs_up() {
    init_tracing();
    let fx = Fixture::new();
    let handle = fx.start().await;
    let mut status = handle.watch_status();

    drop(handle);

    let ended = tokio::time::timeout(
        Duration::from_secs(2),
        status.wait_for(|s| s.is_terminal()),
    )
    .await;
    assert!(matches!(ended, Ok(Ok(_))));
}
