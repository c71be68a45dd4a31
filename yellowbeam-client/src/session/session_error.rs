use thiserror::Error;

/// Reasons a user request is refused before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("you must insert your user name")]
    EmptyName,

    #[error("you must specify the peer name")]
    EmptyPeerName,

    #[error("you must insert the stream name")]
    EmptyStreamName,

    #[error("already registered or registration in progress")]
    AlreadyRegistered,

    #[error("register before placing a call")]
    NotRegistered,

    #[error("a call or stream negotiation is already in progress")]
    Busy,

    #[error("no incoming call is waiting for an answer")]
    NoIncomingCall,

    #[error("streaming has already been started")]
    StreamingInProgress,

    #[error("not streaming")]
    NotStreaming,
}
