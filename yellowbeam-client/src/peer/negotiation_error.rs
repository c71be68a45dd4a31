use thiserror::Error;

/// Failure of one step of a peer negotiation.
///
/// Carries rendered messages so it can travel inside peer events and be
/// compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("failed to create peer connection: {0}")]
    Create(String),

    #[error("failed to generate offer: {0}")]
    Offer(String),

    #[error("failed to process answer: {0}")]
    Answer(String),

    #[error("failed to add ICE candidate: {0}")]
    Candidate(String),

    #[error("answer accepted without an SDP payload")]
    MissingAnswer,

    #[error("peer connection {0}")]
    Connection(String),
}
