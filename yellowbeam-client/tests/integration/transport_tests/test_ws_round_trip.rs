use std::sync::Arc;
use yellowbeam_client::{CallState, ClientConfig, RegistrationState, SignalingClient};

use crate::integration::init_tracing;
use crate::utils::{MockPeerConnector, MockServer, PeerCall, SIGNAL_TIMEOUT_MS, TestObserver};

#[tokio::test]
async fn test_call_over_websocket() {
    init_tracing();

    let server = MockServer::spawn().await.expect("Failed to start server");
    let config = ClientConfig::new(&server.url).expect("valid server URL");
    let connector = MockPeerConnector::new();

    let (client, handle) = SignalingClient::connect(
        config,
        Arc::new(connector.clone()),
        Arc::new(TestObserver::accepting()),
    )
    .await
    .expect("Failed to connect");
    let client_task = tokio::spawn(client.run());

    let timeout = std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS);

    handle.register("alice").await.expect("Register refused");
    tokio::time::timeout(
        timeout,
        handle.wait_for(|s| s.registration == RegistrationState::Registered),
    )
    .await
    .expect("Timeout waiting for registration")
    .expect("Client stopped");

    handle.call("bob").await.expect("Call refused");
    tokio::time::timeout(timeout, handle.wait_for(|s| s.call == CallState::InCall))
        .await
        .expect("Timeout waiting for call")
        .expect("Client stopped");

    assert!(
        connector
            .wait_for_call(
                |c| *c == PeerCall::ProcessAnswer("answer-to-offer-1".into()),
                SIGNAL_TIMEOUT_MS,
            )
            .await
    );

    let received = server.received().await;
    let call = received
        .iter()
        .find(|v| v["id"] == "call")
        .expect("server never saw the call");
    assert_eq!(call["from"], "alice");
    assert_eq!(call["to"], "bob");
    assert_eq!(call["sdpOffer"], "offer-1");

    handle.shutdown().await;
    tokio::time::timeout(timeout, client_task)
        .await
        .expect("Client loop did not exit")
        .expect("Client task panicked");

    let start = std::time::Instant::now();
    while start.elapsed() < timeout && !server.received_ids().await.contains(&"stop".to_string()) {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let ids = server.received_ids().await;
    assert_eq!(ids.first().map(String::as_str), Some("register"));
    assert!(ids.contains(&"onIceCandidate".to_string()));
    assert!(ids.contains(&"stop".to_string()), "hangup should reach the server: {ids:?}");
}
