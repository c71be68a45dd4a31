mod negotiation_error;
mod peer_adapter;
mod peer_event;
mod webrtc_peer;

pub use negotiation_error::*;
pub use peer_adapter::*;
pub use peer_event::*;
pub use webrtc_peer::*;
