use callroom_core::{ClientSignal, Role, RoomId, ServerSignal, SessionDescription};

use crate::integration::{init_tracing, spawn_server};
use crate::utils::WsTestClient;

#[tokio::test]
async fn test_two_clients_pair_and_relay_over_websocket() {
    init_tracing();
    let addr = spawn_server(None).await;
    let room = RoomId::from("ws-room");

    let mut answerer = WsTestClient::connect(addr).await.unwrap();
    let mut offerer = WsTestClient::connect(addr).await.unwrap();
    assert_ne!(answerer.peer_id, offerer.peer_id);

    answerer
        .send(&ClientSignal::JoinCall {
            room_id: room.clone(),
        })
        .await
        .unwrap();
    assert_eq!(
        answerer.recv().await.unwrap(),
        ServerSignal::RoomCreated {
            room_id: room.clone()
        }
    );

    offerer
        .send(&ClientSignal::JoinCall {
            room_id: room.clone(),
        })
        .await
        .unwrap();
    assert_eq!(
        offerer.recv().await.unwrap(),
        ServerSignal::RoomReady {
            room_id: room.clone(),
            role: Role::Offerer,
        }
    );
    assert_eq!(
        answerer.recv().await.unwrap(),
        ServerSignal::RoomReady {
            room_id: room.clone(),
            role: Role::Answerer,
        }
    );

    let offer = SessionDescription::offer("v=0\r\n");
    offerer
        .send(&ClientSignal::CallOffer {
            room_id: room.clone(),
            offer: offer.clone(),
        })
        .await
        .unwrap();
    assert_eq!(
        answerer.recv().await.unwrap(),
        ServerSignal::CallOffer { offer }
    );

    offerer.close().await.unwrap();
    assert_eq!(
        answerer.recv().await.unwrap(),
        ServerSignal::PeerLeft { room_id: room }
    );
}

#[tokio::test]
async fn test_third_websocket_client_gets_room_full() {
    init_tracing();
    let addr = spawn_server(None).await;
    let room = RoomId::from("crowded");

    let mut a = WsTestClient::connect(addr).await.unwrap();
    let mut b = WsTestClient::connect(addr).await.unwrap();
    let mut c = WsTestClient::connect(addr).await.unwrap();

    for client in [&mut a, &mut b] {
        client
            .send(&ClientSignal::JoinCall {
                room_id: room.clone(),
            })
            .await
            .unwrap();
        client.recv().await.unwrap();
    }
    c.send(&ClientSignal::JoinCall {
        room_id: room.clone(),
    })
    .await
    .unwrap();

    assert_eq!(
        c.recv().await.unwrap(),
        ServerSignal::RoomFull { room_id: room }
    );
}
