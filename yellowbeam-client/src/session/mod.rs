mod negotiation;
mod session;
mod session_effect;
mod session_error;
mod session_state;

pub use negotiation::*;
pub use session::*;
pub use session_effect::*;
pub use session_error::*;
pub use session_state::*;
