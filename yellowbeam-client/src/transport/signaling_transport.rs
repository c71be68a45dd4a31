use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("signaling connection is not open")]
    NotOpen,

    #[error("failed to send frame: {0}")]
    Send(String),
}

/// Outbound half of the signaling channel. Inbound frames arrive on the
/// receiver handed out when the transport is opened.
#[async_trait]
pub trait SignalingTransport: Send + Sync + 'static {
    /// Writes one text frame. Fails with [`TransportError::NotOpen`] once the
    /// connection is gone; callers drop the frame.
    async fn send_text(&self, text: String) -> Result<(), TransportError>;

    fn is_open(&self) -> bool;

    async fn close(&self);
}
