use crate::model::ice::IceCandidate;
use crate::model::response::{CallDecision, ResponseStatus};
use serde::{Deserialize, Serialize};

/// Every control frame exchanged with the signaling server over `/call`.
///
/// One JSON object per WebSocket text frame, discriminated by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SignalMessage {
    Register {
        name: String,
    },
    RegisterResponse {
        response: ResponseStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Call {
        from: String,
        to: String,
        sdp_offer: String,
    },
    CallResponse {
        response: ResponseStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sdp_answer: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    IncomingCall {
        from: String,
    },
    IncomingCallResponse {
        from: String,
        call_response: CallDecision,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sdp_offer: Option<String>,
    },
    StartCommunication {
        sdp_answer: String,
    },
    StopCommunication,
    Stop,
    DiscoverStreams {
        stream: String,
    },
    /// Discovery reply as sent by the deployed server.
    DiscoverStreamResponse {
        response: ResponseStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        videos: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Plural spelling of the discovery reply. Kept as its own variant so the
    /// dialect a server speaks stays visible after decoding.
    DiscoverStreamsResponse {
        response: ResponseStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        videos: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    InitStream {
        stream: String,
    },
    InitStreamResponse {
        response: ResponseStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    StopStream,
    ViewerRequest {
        from: String,
    },
    ViewerResponse {
        call_response: CallDecision,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sdp_offer: Option<String>,
    },
    IceCandidate {
        candidate: IceCandidate,
    },
    OnIceCandidate {
        candidate: IceCandidate,
    },
    EnterStream {
        stream: String,
        sdp_offer: String,
    },
    StreamRequest {
        stream: String,
        video: String,
        sdp_offer: String,
    },
    StreamResponse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response: Option<ResponseStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sdp_answer: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename = "ERROR")]
    Error {
        message: String,
    },
    #[serde(rename = "STOP")]
    StopViewing,
}

impl SignalMessage {
    /// Every discriminant the codec recognises.
    pub const KNOWN_IDS: [&'static str; 24] = [
        "register",
        "registerResponse",
        "call",
        "callResponse",
        "incomingCall",
        "incomingCallResponse",
        "startCommunication",
        "stopCommunication",
        "stop",
        "discoverStreams",
        "discoverStreamResponse",
        "discoverStreamsResponse",
        "initStream",
        "initStreamResponse",
        "stopStream",
        "viewerRequest",
        "viewerResponse",
        "iceCandidate",
        "onIceCandidate",
        "enterStream",
        "streamRequest",
        "streamResponse",
        "ERROR",
        "STOP",
    ];

    /// Wire discriminant of this message.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::RegisterResponse { .. } => "registerResponse",
            Self::Call { .. } => "call",
            Self::CallResponse { .. } => "callResponse",
            Self::IncomingCall { .. } => "incomingCall",
            Self::IncomingCallResponse { .. } => "incomingCallResponse",
            Self::StartCommunication { .. } => "startCommunication",
            Self::StopCommunication => "stopCommunication",
            Self::Stop => "stop",
            Self::DiscoverStreams { .. } => "discoverStreams",
            Self::DiscoverStreamResponse { .. } => "discoverStreamResponse",
            Self::DiscoverStreamsResponse { .. } => "discoverStreamsResponse",
            Self::InitStream { .. } => "initStream",
            Self::InitStreamResponse { .. } => "initStreamResponse",
            Self::StopStream => "stopStream",
            Self::ViewerRequest { .. } => "viewerRequest",
            Self::ViewerResponse { .. } => "viewerResponse",
            Self::IceCandidate { .. } => "iceCandidate",
            Self::OnIceCandidate { .. } => "onIceCandidate",
            Self::EnterStream { .. } => "enterStream",
            Self::StreamRequest { .. } => "streamRequest",
            Self::StreamResponse { .. } => "streamResponse",
            Self::Error { .. } => "ERROR",
            Self::StopViewing => "STOP",
        }
    }
}
