use crate::peer::{NegotiationError, PeerConfig};
use crate::session::{Controls, Generation, NegotiationRole};
use yellowbeam_core::{IceCandidate, SignalMessage};

/// Output of the session state machine, drained in order by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// Frame to write to the signaling transport.
    Send(SignalMessage),
    Peer(PeerCommand),
    /// Available actions changed.
    Controls(Controls),
    /// Ask the user whether to accept a call. The answer comes back through
    /// `accept_incoming_call` or `reject_incoming_call`.
    PromptIncomingCall { from: String },
    Notice(Notice),
}

/// Work for the peer worker of one negotiation.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerCommand {
    Create {
        generation: Generation,
        config: PeerConfig,
    },
    GenerateOffer {
        generation: Generation,
    },
    ProcessAnswer {
        generation: Generation,
        sdp_answer: String,
    },
    AddIceCandidate {
        generation: Generation,
        candidate: IceCandidate,
    },
    Dispose {
        generation: Generation,
    },
}

impl PeerCommand {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Create { generation, .. }
            | Self::GenerateOffer { generation }
            | Self::ProcessAnswer { generation, .. }
            | Self::AddIceCandidate { generation, .. }
            | Self::Dispose { generation } => *generation,
        }
    }
}

/// Things the user should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    RegistrationRejected { reason: String },
    CallRejected { reason: String },
    RemoteHangup,
    StreamingRejected { reason: String },
    StreamsDiscovered { stream: String, videos: Vec<String> },
    DiscoveryRejected { stream: String, reason: String },
    StreamRejected { reason: String },
    NegotiationFailed {
        role: NegotiationRole,
        error: NegotiationError,
    },
}
