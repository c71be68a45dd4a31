use crate::client::{ClientCommand, SessionRequest};
use crate::session::{SessionError, SessionSnapshot};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("signaling client has stopped")]
    Closed,
}

/// Cloneable handle to a running [`SignalingClient`](crate::SignalingClient).
///
/// Requests resolve once the session has applied them and their effects have
/// been dispatched.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    command_tx: mpsc::Sender<ClientCommand>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl ClientHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<ClientCommand>,
        snapshot_rx: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self {
            command_tx,
            snapshot_rx,
        }
    }

    pub async fn register(&self, name: impl Into<String>) -> Result<(), ClientError> {
        self.request(SessionRequest::Register(name.into())).await
    }

    pub async fn call(&self, peer: impl Into<String>) -> Result<(), ClientError> {
        self.request(SessionRequest::Call(peer.into())).await
    }

    pub async fn accept_incoming_call(&self) -> Result<(), ClientError> {
        self.request(SessionRequest::AcceptIncomingCall).await
    }

    pub async fn reject_incoming_call(&self, reason: Option<String>) -> Result<(), ClientError> {
        self.request(SessionRequest::RejectIncomingCall(reason)).await
    }

    pub async fn stop(&self) -> Result<(), ClientError> {
        self.request(SessionRequest::Stop).await
    }

    pub async fn start_streaming(&self, stream: impl Into<String>) -> Result<(), ClientError> {
        self.request(SessionRequest::StartStreaming(stream.into()))
            .await
    }

    pub async fn stop_streaming(&self) -> Result<(), ClientError> {
        self.request(SessionRequest::StopStreaming).await
    }

    pub async fn discover_streams(&self, stream: impl Into<String>) -> Result<(), ClientError> {
        self.request(SessionRequest::DiscoverStreams(stream.into()))
            .await
    }

    pub async fn enter_stream(&self, stream: impl Into<String>) -> Result<(), ClientError> {
        self.request(SessionRequest::EnterStream(stream.into()))
            .await
    }

    /// Asks the client loop to hang up, close the transport and exit.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(ClientCommand::Shutdown).await;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Waits until the published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot, ClientError> {
        let mut rx = self.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| ClientError::Closed)?;
        Ok(snapshot.clone())
    }

    async fn request(&self, request: SessionRequest) -> Result<(), ClientError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command_tx
            .send(ClientCommand::Request { request, reply })
            .await
            .map_err(|_| ClientError::Closed)?;
        reply_rx.await.map_err(|_| ClientError::Closed)??;
        Ok(())
    }
}
