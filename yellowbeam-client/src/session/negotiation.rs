use crate::peer::{MediaDirection, PeerConfig};
use std::fmt;
use yellowbeam_core::{IceCandidate, SignalMessage};

/// Identifies one peer negotiation. Events carrying an older generation
/// belong to a disposed peer and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    /// Outgoing call.
    Caller,
    /// Accepted incoming call.
    Callee,
    /// Receive-only view of a published stream.
    Viewer,
    /// Send-only leg serving one viewer of our stream.
    Broadcaster,
}

impl NegotiationRole {
    pub fn direction(self) -> MediaDirection {
        match self {
            Self::Caller | Self::Callee => MediaDirection::SendRecv,
            Self::Viewer => MediaDirection::RecvOnly,
            Self::Broadcaster => MediaDirection::SendOnly,
        }
    }

    /// Frame that tells the server this negotiation is over.
    pub fn stop_message(self) -> SignalMessage {
        match self {
            Self::Viewer => SignalMessage::StopViewing,
            Self::Caller | Self::Callee | Self::Broadcaster => SignalMessage::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    /// Peer connection is being built.
    Creating,
    /// Local offer is being generated.
    Offering,
    /// Offer sent, waiting for the remote answer.
    AwaitingAnswer,
    /// Remote answer received and handed to the peer.
    Answered,
}

/// What the negotiation is for, and who is on the other end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationPurpose {
    OutgoingCall { to: String },
    IncomingCall { from: String },
    ViewStream { stream: String, videos: Vec<String> },
    EnterStream { stream: String },
    ServeViewer { viewer: String },
}

impl NegotiationPurpose {
    pub fn role(&self) -> NegotiationRole {
        match self {
            Self::OutgoingCall { .. } => NegotiationRole::Caller,
            Self::IncomingCall { .. } => NegotiationRole::Callee,
            Self::ViewStream { .. } | Self::EnterStream { .. } => NegotiationRole::Viewer,
            Self::ServeViewer { .. } => NegotiationRole::Broadcaster,
        }
    }

    pub(crate) fn peer_config(&self) -> PeerConfig {
        let video_sinks = match self {
            Self::ViewStream { videos, .. } => videos.len().max(1),
            _ => 1,
        };
        PeerConfig {
            role: self.role(),
            direction: self.role().direction(),
            audio: true,
            video_sinks,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Negotiation {
    generation: Generation,
    purpose: NegotiationPurpose,
    phase: NegotiationPhase,
    local_sdp: Option<String>,
    remote_sdp: Option<String>,
    pending_candidates: Vec<IceCandidate>,
}

impl Negotiation {
    pub(crate) fn new(generation: Generation, purpose: NegotiationPurpose) -> Self {
        Self {
            generation,
            purpose,
            phase: NegotiationPhase::Creating,
            local_sdp: None,
            remote_sdp: None,
            pending_candidates: Vec::new(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn role(&self) -> NegotiationRole {
        self.purpose.role()
    }

    pub fn purpose(&self) -> &NegotiationPurpose {
        &self.purpose
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn local_sdp(&self) -> Option<&str> {
        self.local_sdp.as_deref()
    }

    pub fn remote_sdp(&self) -> Option<&str> {
        self.remote_sdp.as_deref()
    }

    pub fn pending_candidates(&self) -> &[IceCandidate] {
        &self.pending_candidates
    }

    pub(crate) fn peer_created(&mut self) -> Vec<IceCandidate> {
        self.phase = NegotiationPhase::Offering;
        std::mem::take(&mut self.pending_candidates)
    }

    pub(crate) fn offer_generated(&mut self, sdp: String) {
        self.local_sdp = Some(sdp);
        self.phase = NegotiationPhase::AwaitingAnswer;
    }

    pub(crate) fn answer_received(&mut self, sdp: String) {
        self.remote_sdp = Some(sdp);
        self.phase = NegotiationPhase::Answered;
    }

    pub(crate) fn queue_candidate(&mut self, candidate: IceCandidate) {
        self.pending_candidates.push(candidate);
    }
}
