use crate::model::SignalMessage;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not valid JSON.
    #[error("malformed signaling frame: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("signaling frame is not a JSON object")]
    NotAnObject,

    #[error("signaling frame has no string `id` field")]
    MissingId,

    /// Well-formed frame with a discriminant this client does not know.
    #[error("unrecognized message id `{0}`")]
    UnknownId(String),

    #[error("invalid payload for `{id}`: {source}")]
    InvalidPayload {
        id: String,
        source: serde_json::Error,
    },

    #[error("failed to encode `{id}`: {source}")]
    Encode {
        id: &'static str,
        source: serde_json::Error,
    },
}

impl CodecError {
    /// True when the frame should be dropped as a newer protocol message
    /// rather than treated as a broken frame.
    pub fn is_forward_compatible(&self) -> bool {
        matches!(self, Self::UnknownId(_))
    }
}

pub fn encode(msg: &SignalMessage) -> Result<String, CodecError> {
    serde_json::to_string(msg).map_err(|source| CodecError::Encode {
        id: msg.id(),
        source,
    })
}

pub fn decode(text: &str) -> Result<SignalMessage, CodecError> {
    let value: Value = serde_json::from_str(text).map_err(CodecError::Malformed)?;

    let Value::Object(fields) = &value else {
        return Err(CodecError::NotAnObject);
    };
    let Some(id) = fields.get("id").and_then(Value::as_str) else {
        return Err(CodecError::MissingId);
    };
    if !SignalMessage::KNOWN_IDS.contains(&id) {
        return Err(CodecError::UnknownId(id.to_owned()));
    }

    let id = id.to_owned();
    serde_json::from_value(value).map_err(|source| CodecError::InvalidPayload { id, source })
}
