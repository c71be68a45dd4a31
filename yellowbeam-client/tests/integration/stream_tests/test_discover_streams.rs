use serde_json::json;
use yellowbeam_client::{MediaDirection, NegotiationRole, Notice};
use yellowbeam_core::SignalMessage;

use crate::integration::{create_test_client, init_tracing};
use crate::utils::{MockPeerConnector, PeerCall, SIGNAL_TIMEOUT_MS, TestObserver};

#[tokio::test]
async fn test_discovery_requests_every_video_with_one_offer() {
    init_tracing();

    let client = create_test_client(TestObserver::accepting(), MockPeerConnector::new());
    client
        .handle
        .discover_streams("s")
        .await
        .expect("Discovery refused");

    client
        .server_sends(json!({
            "id": "discoverStreamResponse",
            "response": "accepted",
            "videos": ["callerVid", "calleeVid"],
        }))
        .await
        .unwrap();

    assert!(
        client
            .transport
            .wait_for_sent(|m| matches!(m, SignalMessage::StreamRequest { .. }), 2, SIGNAL_TIMEOUT_MS)
            .await,
        "expected one streamRequest per video"
    );

    let requests: Vec<_> = client
        .transport
        .sent_messages()
        .await
        .into_iter()
        .filter(|m| matches!(m, SignalMessage::StreamRequest { .. }))
        .collect();
    assert_eq!(
        requests,
        vec![
            SignalMessage::StreamRequest {
                stream: "s".into(),
                video: "callerVid".into(),
                sdp_offer: "offer-1".into(),
            },
            SignalMessage::StreamRequest {
                stream: "s".into(),
                video: "calleeVid".into(),
                sdp_offer: "offer-1".into(),
            },
        ]
    );

    let calls = client.connector.calls().await;
    let creates: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            PeerCall::Create(config) => Some(config),
            _ => None,
        })
        .collect();
    assert_eq!(creates.len(), 1, "one negotiation serves all videos");
    assert_eq!(creates[0].direction, MediaDirection::RecvOnly);
    assert_eq!(creates[0].video_sinks, 2);
    assert!(client.observer.notices().contains(&Notice::StreamsDiscovered {
        stream: "s".into(),
        videos: vec!["callerVid".into(), "calleeVid".into()],
    }));

    client
        .server_sends(json!({ "id": "streamResponse", "sdpAnswer": "A5" }))
        .await
        .unwrap();
    client
        .server_sends(json!({ "id": "streamResponse", "sdpAnswer": "A6" }))
        .await
        .unwrap();
    assert!(
        client
            .connector
            .wait_for_call(|c| *c == PeerCall::ProcessAnswer("A5".into()), SIGNAL_TIMEOUT_MS)
            .await
    );

    client.handle.stop().await.unwrap();
    assert_eq!(
        client
            .connector
            .count(|c| matches!(c, PeerCall::ProcessAnswer(_)))
            .await,
        1
    );
    assert_eq!(
        client
            .transport
            .count_sent(|m| *m == SignalMessage::StopViewing)
            .await,
        1
    );
}

#[tokio::test]
async fn test_plural_discovery_reply() {
    init_tracing();

    let client = create_test_client(TestObserver::accepting(), MockPeerConnector::new());
    client.handle.discover_streams("s").await.unwrap();
    client
        .server_sends(json!({
            "id": "discoverStreamsResponse",
            "response": "accepted",
            "videos": ["v1"],
        }))
        .await
        .unwrap();

    client
        .wait_for(|s| s.negotiation == Some(NegotiationRole::Viewer))
        .await
        .expect("Viewer negotiation not started");
}

#[tokio::test]
async fn test_unknown_stream_is_reported() {
    init_tracing();

    let client = create_test_client(TestObserver::accepting(), MockPeerConnector::new());
    client.handle.discover_streams("nope").await.unwrap();
    client
        .server_sends(json!({
            "id": "discoverStreamResponse",
            "response": "rejected",
            "message": "Unkown Stream Identifier",
        }))
        .await
        .unwrap();

    assert!(
        client
            .observer
            .wait_for_notice(
                |n| matches!(n, Notice::DiscoveryRejected { stream, .. } if stream == "nope"),
                SIGNAL_TIMEOUT_MS,
            )
            .await
    );
    assert!(client.connector.calls().await.is_empty());
}
