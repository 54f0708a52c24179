use std::sync::Arc;

use callroom_core::{PeerId, Role, RoomId, ServerSignal};
use tokio::sync::Barrier;

use crate::integration::{create_test_channel, init_tracing};

#[tokio::test]
async fn test_first_join_waits() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let room = RoomId::from("room-1");
    let peer = PeerId::new();

    channel.join(room.clone(), peer.clone()).await;

    assert_eq!(
        signaling.signals_for(&peer).await,
        vec![ServerSignal::RoomCreated {
            room_id: room.clone()
        }]
    );
    assert_eq!(channel.rooms().occupancy(&room), 1);
}

#[tokio::test]
async fn test_second_join_makes_arrival_offerer() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let room = RoomId::from("room-1");
    let waiting = PeerId::new();
    let arrival = PeerId::new();

    channel.join(room.clone(), waiting.clone()).await;
    channel.join(room.clone(), arrival.clone()).await;

    assert_eq!(
        signaling.signals_for(&waiting).await.last(),
        Some(&ServerSignal::RoomReady {
            room_id: room.clone(),
            role: Role::Answerer,
        })
    );
    assert_eq!(
        signaling.signals_for(&arrival).await,
        vec![ServerSignal::RoomReady {
            room_id: room.clone(),
            role: Role::Offerer,
        }]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_three_concurrent_joins_admit_exactly_two() {
    init_tracing();

    for round in 0..50 {
        let (channel, signaling) = create_test_channel();
        let room = RoomId(format!("race-{}", round));
        let peers: Vec<PeerId> = (0..3).map(|_| PeerId::new()).collect();
        let barrier = Arc::new(Barrier::new(peers.len()));

        let mut handles = Vec::new();
        for peer in peers.clone() {
            let channel = channel.clone();
            let room = room.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                channel.join(room, peer).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut full = 0;
        let mut admitted = 0;
        for peer in &peers {
            let signals = signaling.signals_for(peer).await;
            if signals
                .iter()
                .any(|s| matches!(s, ServerSignal::RoomFull { .. }))
            {
                full += 1;
            } else {
                admitted += 1;
            }
        }

        assert_eq!(full, 1, "round {}", round);
        assert_eq!(admitted, 2, "round {}", round);
        assert_eq!(channel.rooms().occupancy(&room), 2);
    }
}

#[tokio::test]
async fn test_room_full_only_notifies_rejected_peer() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let room = RoomId::from("room-1");
    let a = PeerId::new();
    let b = PeerId::new();
    let c = PeerId::new();

    channel.join(room.clone(), a.clone()).await;
    channel.join(room.clone(), b.clone()).await;
    let before = signaling.count().await;

    channel.join(room.clone(), c.clone()).await;

    assert_eq!(signaling.count().await, before + 1);
    assert_eq!(
        signaling.signals_for(&c).await,
        vec![ServerSignal::RoomFull {
            room_id: room.clone()
        }]
    );
    assert_eq!(channel.room_of(&c), None);
}

#[tokio::test]
async fn test_joining_another_room_leaves_the_first() {
    init_tracing();
    let (channel, signaling) = create_test_channel();
    let first = RoomId::from("first");
    let second = RoomId::from("second");
    let peer = PeerId::new();
    let partner = PeerId::new();

    channel.join(first.clone(), partner.clone()).await;
    channel.join(first.clone(), peer.clone()).await;
    channel.join(second.clone(), peer.clone()).await;

    assert_eq!(channel.rooms().occupancy(&first), 1);
    assert_eq!(channel.room_of(&peer), Some(second));
    assert_eq!(
        signaling.signals_for(&partner).await.last(),
        Some(&ServerSignal::PeerLeft { room_id: first })
    );
}
