use crate::peer::{NegotiationError, PeerEvent};
use crate::session::{Generation, NegotiationRole};
use async_trait::async_trait;
use tokio::sync::mpsc;
use yellowbeam_core::IceCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
}

/// How a peer connection should be built for one negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    pub role: NegotiationRole,
    pub direction: MediaDirection,
    pub audio: bool,
    /// Number of video transceivers; a viewer gets one per published video.
    pub video_sinks: usize,
}

/// Channel through which a live peer reports things it noticed on its own,
/// tagged with the generation it belongs to.
#[derive(Debug, Clone)]
pub struct PeerEventSink {
    generation: Generation,
    tx: mpsc::UnboundedSender<PeerEvent>,
}

impl PeerEventSink {
    pub fn new(generation: Generation, tx: mpsc::UnboundedSender<PeerEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// A local ICE candidate was gathered.
    pub fn candidate(&self, candidate: IceCandidate) {
        let _ = self.tx.send(PeerEvent::LocalCandidate {
            generation: self.generation,
            candidate,
        });
    }

    /// The connection failed after negotiation started.
    pub fn failed(&self, error: NegotiationError) {
        let _ = self.tx.send(PeerEvent::Failed {
            generation: self.generation,
            error,
        });
    }
}

/// Builds peer connections. One call per negotiation.
#[async_trait]
pub trait PeerConnector: Send + Sync + 'static {
    async fn create(
        &self,
        config: PeerConfig,
        sink: PeerEventSink,
    ) -> Result<Box<dyn PeerNegotiator>, NegotiationError>;
}

/// One live peer connection, driven through offer/answer.
///
/// Remote candidates may arrive before the remote description is set;
/// implementations hold them until it is.
#[async_trait]
pub trait PeerNegotiator: Send + Sync {
    async fn generate_offer(&self) -> Result<String, NegotiationError>;

    async fn process_answer(&self, sdp_answer: String) -> Result<(), NegotiationError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError>;

    /// Releases the connection. Safe to call more than once.
    async fn dispose(&self);
}
