use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use yellowbeam_client::{CallState, ClientHandle, RegistrationState, SessionSnapshot};
use yellowbeam_core::SignalMessage;

use super::mock_observer::TestObserver;
use super::mock_peer::MockPeerConnector;
use super::mock_transport::MockTransport;

/// Timeout for a state change or an outbound frame (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// A running client wired to mocks, plus the server side of its transport.
pub struct TestClient {
    pub handle: ClientHandle,
    pub server_tx: mpsc::Sender<String>,
    pub transport: MockTransport,
    pub connector: MockPeerConnector,
    pub observer: TestObserver,
}

impl TestClient {
    /// Deliver a frame as if the signaling server had sent it.
    pub async fn server_sends(&self, frame: Value) -> Result<()> {
        self.server_sends_raw(&frame.to_string()).await
    }

    pub async fn server_sends_raw(&self, text: &str) -> Result<()> {
        self.server_tx
            .send(text.to_owned())
            .await
            .context("Client stopped reading frames")
    }

    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let snapshot = tokio::time::timeout(
            std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS),
            self.handle.wait_for(predicate),
        )
        .await
        .context("Timeout waiting for session state")??;
        Ok(snapshot)
    }

    pub async fn wait_for_sent(&self, pred: impl Fn(&SignalMessage) -> bool) -> Result<()> {
        if self.transport.wait_for_sent(pred, 1, SIGNAL_TIMEOUT_MS).await {
            Ok(())
        } else {
            anyhow::bail!("Timeout waiting for outbound frame")
        }
    }

    pub async fn register_as(&self, name: &str) -> Result<()> {
        self.handle.register(name).await?;
        self.server_sends(json!({ "id": "registerResponse", "response": "accepted" }))
            .await?;
        self.wait_for(|s| s.registration == RegistrationState::Registered)
            .await
            .context("Registration not applied")?;
        Ok(())
    }

    /// Register as `alice` and complete an outgoing call to `peer`.
    pub async fn establish_call(&self, peer: &str) -> Result<()> {
        self.register_as("alice").await?;
        self.handle.call(peer).await?;
        self.wait_for_sent(|m| matches!(m, SignalMessage::Call { .. }))
            .await
            .context("Call was never offered")?;

        self.server_sends(json!({
            "id": "callResponse",
            "response": "accepted",
            "sdpAnswer": "A1",
        }))
        .await?;
        self.wait_for(|s| s.call == CallState::InCall)
            .await
            .context("Call not established")?;
        Ok(())
    }
}
