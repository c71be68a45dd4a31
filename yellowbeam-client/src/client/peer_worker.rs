use crate::peer::{PeerConfig, PeerConnector, PeerEvent, PeerEventSink};
use crate::session::Generation;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use yellowbeam_core::IceCandidate;

#[derive(Debug)]
pub(crate) enum PeerOp {
    GenerateOffer,
    ProcessAnswer(String),
    AddIceCandidate(IceCandidate),
    Dispose,
}

/// Task owning the peer of one negotiation. Operations run one at a time in
/// submission order, and each completion is reported back as a [`PeerEvent`].
#[derive(Debug)]
pub(crate) struct PeerWorker {
    generation: Generation,
    ops_tx: mpsc::UnboundedSender<PeerOp>,
}

impl PeerWorker {
    pub(crate) fn spawn(
        generation: Generation,
        config: PeerConfig,
        connector: Arc<dyn PeerConnector>,
        events: mpsc::UnboundedSender<PeerEvent>,
    ) -> Self {
        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(generation, config, connector, events, ops_rx));
        Self { generation, ops_tx }
    }

    pub(crate) fn generation(&self) -> Generation {
        self.generation
    }

    pub(crate) fn submit(&self, op: PeerOp) {
        if self.ops_tx.send(op).is_err() {
            warn!(generation = %self.generation, "Peer worker already stopped");
        }
    }

    /// Queues disposal behind anything already submitted.
    pub(crate) fn dispose(self) {
        let _ = self.ops_tx.send(PeerOp::Dispose);
    }
}

async fn run_worker(
    generation: Generation,
    config: PeerConfig,
    connector: Arc<dyn PeerConnector>,
    events: mpsc::UnboundedSender<PeerEvent>,
    mut ops_rx: mpsc::UnboundedReceiver<PeerOp>,
) {
    let sink = PeerEventSink::new(generation, events.clone());
    let peer = match connector.create(config, sink).await {
        Ok(peer) => {
            let _ = events.send(PeerEvent::Created {
                generation,
                result: Ok(()),
            });
            peer
        }
        Err(e) => {
            let _ = events.send(PeerEvent::Created {
                generation,
                result: Err(e),
            });
            return;
        }
    };

    while let Some(op) = ops_rx.recv().await {
        let event = match op {
            PeerOp::GenerateOffer => PeerEvent::OfferGenerated {
                generation,
                result: peer.generate_offer().await,
            },
            PeerOp::ProcessAnswer(sdp_answer) => PeerEvent::AnswerProcessed {
                generation,
                result: peer.process_answer(sdp_answer).await,
            },
            PeerOp::AddIceCandidate(candidate) => PeerEvent::CandidateAdded {
                generation,
                result: peer.add_ice_candidate(candidate).await,
            },
            PeerOp::Dispose => break,
        };
        if events.send(event).is_err() {
            break;
        }
    }

    peer.dispose().await;
    debug!(%generation, "Peer worker finished");
}
