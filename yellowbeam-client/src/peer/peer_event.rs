use crate::peer::NegotiationError;
use crate::session::Generation;
use yellowbeam_core::IceCandidate;

/// Completion of a peer operation, or something the peer noticed on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Created {
        generation: Generation,
        result: Result<(), NegotiationError>,
    },
    OfferGenerated {
        generation: Generation,
        result: Result<String, NegotiationError>,
    },
    AnswerProcessed {
        generation: Generation,
        result: Result<(), NegotiationError>,
    },
    CandidateAdded {
        generation: Generation,
        result: Result<(), NegotiationError>,
    },
    LocalCandidate {
        generation: Generation,
        candidate: IceCandidate,
    },
    Failed {
        generation: Generation,
        error: NegotiationError,
    },
}

impl PeerEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Created { generation, .. }
            | Self::OfferGenerated { generation, .. }
            | Self::AnswerProcessed { generation, .. }
            | Self::CandidateAdded { generation, .. }
            | Self::LocalCandidate { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}
