use yellowbeam_client::{CallState, NegotiationRole, Notice};
use yellowbeam_core::SignalMessage;

use crate::integration::{create_test_client, init_tracing};
use crate::utils::{MockPeerConnector, PeerCall, SIGNAL_TIMEOUT_MS, TestObserver};

#[tokio::test]
async fn test_viewer_offer_failure_reports_error_then_stops() {
    init_tracing();

    let connector = MockPeerConnector::new().failing_offers();
    let client = create_test_client(TestObserver::accepting(), connector);
    client
        .handle
        .enter_stream("stream3")
        .await
        .expect("Enter refused");

    assert!(
        client
            .observer
            .wait_for_notice(
                |n| matches!(
                    n,
                    Notice::NegotiationFailed {
                        role: NegotiationRole::Viewer,
                        ..
                    }
                ),
                SIGNAL_TIMEOUT_MS,
            )
            .await,
        "failure should be reported"
    );

    let sent = client.transport.sent_messages().await;
    let [SignalMessage::Error { message }, SignalMessage::StopViewing] = sent.as_slice() else {
        panic!("expected ERROR then STOP, got {sent:?}");
    };
    assert!(message.contains("mock offer failure"));

    client
        .wait_for(|s| s.negotiation.is_none() && s.call == CallState::NoCall)
        .await
        .expect("Session not reset");
    assert!(
        client
            .connector
            .wait_for_call(|c| *c == PeerCall::Dispose, SIGNAL_TIMEOUT_MS)
            .await
    );
}
