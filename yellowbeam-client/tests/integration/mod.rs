pub mod call_tests;
pub mod stream_tests;
pub mod transport_tests;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use yellowbeam_client::{ClientConfig, SignalingClient};

use crate::utils::{MockPeerConnector, MockTransport, TestClient, TestObserver};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_client(observer: TestObserver, connector: MockPeerConnector) -> TestClient {
    let (server_tx, inbound_rx) = mpsc::channel::<String>(100);
    let transport = MockTransport::new();
    let config = ClientConfig::new("ws://127.0.0.1:1/call").expect("valid test URL");

    let (client, handle) = SignalingClient::new(
        config,
        Arc::new(transport.clone()),
        inbound_rx,
        Arc::new(connector.clone()),
        Arc::new(observer.clone()),
    );

    tokio::spawn(async move {
        client.run().await;
    });

    TestClient {
        handle,
        server_tx,
        transport,
        connector,
        observer,
    }
}
