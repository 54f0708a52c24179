use callroom_core::{
    ClientSignal, IceCandidate, PeerId, RoomId, ServerSignal, SessionDescription,
};

use crate::integration::{create_test_channel, init_tracing};

fn candidate(n: u32) -> IceCandidate {
    IceCandidate {
        candidate: format!("candidate:{} 1 udp 2130706431 10.0.0.1 5000{} typ host", n, n),
        sdp_mid: Some("0".into()),
        sdp_m_line_index: Some(0),
        username_fragment: None,
    }
}

#[tokio::test]
async fn test_offer_reaches_only_the_other_occupant() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let room = RoomId::from("room-1");
    let answerer = PeerId::new();
    let offerer = PeerId::new();
    channel.join(room.clone(), answerer.clone()).await;
    channel.join(room.clone(), offerer.clone()).await;
    let offerer_before = signaling.signals_for(&offerer).await.len();

    let offer = SessionDescription::offer("v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n");
    channel
        .handle(
            offerer.clone(),
            ClientSignal::CallOffer {
                room_id: room.clone(),
                offer: offer.clone(),
            },
        )
        .await;

    assert_eq!(
        signaling.signals_for(&answerer).await.last(),
        Some(&ServerSignal::CallOffer { offer })
    );
    assert_eq!(signaling.signals_for(&offerer).await.len(), offerer_before);
}

#[tokio::test]
async fn test_candidates_keep_sender_order() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let room = RoomId::from("room-1");
    let a = PeerId::new();
    let b = PeerId::new();
    channel.join(room.clone(), a.clone()).await;
    channel.join(room.clone(), b.clone()).await;

    for n in 0..20 {
        channel
            .handle(
                b.clone(),
                ClientSignal::IceCandidate {
                    room_id: room.clone(),
                    candidate: candidate(n),
                },
            )
            .await;
    }

    let received: Vec<IceCandidate> = signaling
        .signals_for(&a)
        .await
        .into_iter()
        .filter_map(|s| match s {
            ServerSignal::IceCandidate { candidate } => Some(candidate),
            _ => None,
        })
        .collect();
    let expected: Vec<IceCandidate> = (0..20).map(candidate).collect();
    assert_eq!(received, expected);
}

#[tokio::test]
async fn test_relay_without_counterpart_is_dropped() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let room = RoomId::from("room-1");
    let alone = PeerId::new();
    channel.join(room.clone(), alone.clone()).await;
    let before = signaling.count().await;

    channel
        .handle(
            alone.clone(),
            ClientSignal::CallAnswer {
                room_id: room,
                answer: SessionDescription::answer("v=0"),
            },
        )
        .await;

    assert_eq!(signaling.count().await, before);
}

#[tokio::test]
async fn test_rejected_peer_cannot_inject_into_full_room() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let room = RoomId::from("room-1");
    let a = PeerId::new();
    let b = PeerId::new();
    let intruder = PeerId::new();
    channel.join(room.clone(), a.clone()).await;
    channel.join(room.clone(), b.clone()).await;
    channel.join(room.clone(), intruder.clone()).await;
    let before = signaling.count().await;

    channel
        .handle(
            intruder,
            ClientSignal::CallOffer {
                room_id: room,
                offer: SessionDescription::offer("v=0"),
            },
        )
        .await;

    assert_eq!(signaling.count().await, before);
}
