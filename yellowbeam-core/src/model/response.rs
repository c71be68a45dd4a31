use serde::{Deserialize, Serialize};
use std::fmt;

const ACCEPTED: &str = "accepted";
const REJECTED: &str = "rejected";
const REJECTED_PREFIX: &str = "rejected: ";

/// Outcome carried in the `response` field of server replies.
///
/// The server writes rejections either as a bare `"rejected"` or with an
/// inline reason (`"rejected: user 'bob' is not registered"`). Any other
/// string is kept verbatim as the rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseStatus {
    Accepted,
    Rejected { reason: Option<String> },
}

impl ResponseStatus {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: Some(reason.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Accepted => None,
            Self::Rejected { reason } => reason.as_deref(),
        }
    }
}

impl From<String> for ResponseStatus {
    fn from(raw: String) -> Self {
        if raw == ACCEPTED {
            return Self::Accepted;
        }
        if raw == REJECTED {
            return Self::Rejected { reason: None };
        }
        match raw.strip_prefix(REJECTED_PREFIX) {
            Some(reason) => Self::rejected(reason),
            None => Self::Rejected { reason: Some(raw) },
        }
    }
}

impl From<ResponseStatus> for String {
    fn from(status: ResponseStatus) -> Self {
        match status {
            ResponseStatus::Accepted => ACCEPTED.to_owned(),
            ResponseStatus::Rejected { reason: None } => REJECTED.to_owned(),
            ResponseStatus::Rejected {
                reason: Some(reason),
            } => format!("{REJECTED_PREFIX}{reason}"),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str(ACCEPTED),
            Self::Rejected { reason: None } => f.write_str(REJECTED),
            Self::Rejected {
                reason: Some(reason),
            } => write!(f, "{REJECTED_PREFIX}{reason}"),
        }
    }
}

/// Answer to an incoming call or a viewer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDecision {
    Accept,
    Reject,
}
