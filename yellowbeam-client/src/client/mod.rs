mod client_command;
mod client_config;
mod client_handle;
mod peer_worker;
mod session_observer;
mod signaling_client;

pub use client_command::*;
pub use client_config::*;
pub use client_handle::*;
pub use session_observer::*;
pub use signaling_client::*;
