use serde_json::json;
use yellowbeam_client::CallState;
use yellowbeam_core::utils::BUSY_REASON;
use yellowbeam_core::{CallDecision, SignalMessage};

use crate::integration::{create_test_client, init_tracing};
use crate::utils::{MockPeerConnector, PeerCall, TestObserver};

#[tokio::test]
async fn test_busy_incoming_call_is_rejected() {
    init_tracing();

    let client = create_test_client(TestObserver::accepting(), MockPeerConnector::new());
    client
        .establish_call("bob")
        .await
        .expect("Call setup failed");

    client
        .server_sends(json!({ "id": "incomingCall", "from": "carol" }))
        .await
        .unwrap();

    let busy = SignalMessage::IncomingCallResponse {
        from: "carol".into(),
        call_response: CallDecision::Reject,
        message: Some(BUSY_REASON.into()),
        sdp_offer: None,
    };
    client
        .wait_for_sent(|m| *m == busy)
        .await
        .expect("Busy rejection not sent");

    assert!(client.observer.prompts().is_empty(), "busy callee must not be prompted");
    let snapshot = client.handle.snapshot();
    assert_eq!(snapshot.call, CallState::InCall);
    assert_eq!(snapshot.remote_peer.as_deref(), Some("bob"));
    assert_eq!(
        client
            .connector
            .count(|c| matches!(c, PeerCall::Create(_)))
            .await,
        1
    );
}
