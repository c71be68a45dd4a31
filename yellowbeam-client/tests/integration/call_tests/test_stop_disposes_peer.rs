use serde_json::json;
use yellowbeam_client::CallState;
use yellowbeam_core::SignalMessage;

use crate::integration::{create_test_client, init_tracing};
use crate::utils::{MockPeerConnector, PeerCall, SIGNAL_TIMEOUT_MS, TestObserver};

#[tokio::test]
async fn test_stop_disposes_peer_and_notifies_server_once() {
    init_tracing();

    let client = create_test_client(TestObserver::accepting(), MockPeerConnector::new());
    client
        .establish_call("bob")
        .await
        .expect("Call setup failed");

    client.handle.stop().await.expect("Stop refused");
    assert_eq!(client.handle.snapshot().call, CallState::NoCall);
    assert!(
        client
            .connector
            .wait_for_call(|c| *c == PeerCall::Dispose, SIGNAL_TIMEOUT_MS)
            .await,
        "peer should be disposed"
    );

    client.handle.stop().await.expect("Second stop refused");
    assert_eq!(
        client
            .transport
            .count_sent(|m| *m == SignalMessage::Stop)
            .await,
        1
    );
}

#[tokio::test]
async fn test_remote_hangup_sends_nothing() {
    init_tracing();

    let client = create_test_client(TestObserver::accepting(), MockPeerConnector::new());
    client
        .establish_call("bob")
        .await
        .expect("Call setup failed");

    client
        .server_sends(json!({ "id": "stopCommunication" }))
        .await
        .unwrap();
    client
        .wait_for(|s| s.call == CallState::NoCall && s.negotiation.is_none())
        .await
        .expect("Remote hangup not applied");

    assert!(
        client
            .connector
            .wait_for_call(|c| *c == PeerCall::Dispose, SIGNAL_TIMEOUT_MS)
            .await
    );
    assert_eq!(
        client
            .transport
            .count_sent(|m| *m == SignalMessage::Stop)
            .await,
        0
    );
}
