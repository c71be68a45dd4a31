use yellowbeam_client::{ClientError, RegistrationState};
use yellowbeam_core::SignalMessage;

use crate::integration::{create_test_client, init_tracing};
use crate::utils::{MockPeerConnector, PeerCall, SIGNAL_TIMEOUT_MS, TestClient, TestObserver};

#[tokio::test]
async fn test_lost_connection_tears_down_the_call() {
    init_tracing();

    let client = create_test_client(TestObserver::accepting(), MockPeerConnector::new());
    client
        .establish_call("bob")
        .await
        .expect("Call setup failed");

    let TestClient {
        handle,
        server_tx,
        transport,
        connector,
        ..
    } = client;
    drop(server_tx);

    assert!(
        connector
            .wait_for_call(|c| *c == PeerCall::Dispose, SIGNAL_TIMEOUT_MS)
            .await,
        "peer should be disposed when signaling is lost"
    );
    let snapshot = tokio::time::timeout(
        std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS),
        handle.wait_for(|s| s.registration == RegistrationState::NotRegistered),
    )
    .await
    .expect("Timeout waiting for reset")
    .expect("Final snapshot not published");
    assert!(snapshot.negotiation.is_none());

    assert_eq!(transport.count_sent(|m| *m == SignalMessage::Stop).await, 0);
    assert!(matches!(
        handle.register("alice").await,
        Err(ClientError::Closed)
    ));
}
