mod ice;
mod response;
mod signaling;

pub use ice::{IceCandidate, IceServerConfig};
pub use response::{CallDecision, ResponseStatus};
pub use signaling::SignalMessage;
