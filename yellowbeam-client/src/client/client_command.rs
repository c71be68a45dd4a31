use crate::session::SessionError;
use tokio::sync::oneshot;

/// A user request, applied to the session inside the client loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    Register(String),
    Call(String),
    AcceptIncomingCall,
    /// `None` sends the configured decline message.
    RejectIncomingCall(Option<String>),
    Stop,
    StartStreaming(String),
    StopStreaming,
    DiscoverStreams(String),
    EnterStream(String),
}

#[derive(Debug)]
pub enum ClientCommand {
    Request {
        request: SessionRequest,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    /// Answer from the incoming-call prompt. Ignored unless `from` is still
    /// the pending caller.
    AnswerIncomingCall { from: String, accept: bool },
    Shutdown,
}
