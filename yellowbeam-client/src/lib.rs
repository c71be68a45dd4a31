mod client;
mod peer;
mod session;
mod transport;

pub use client::*;
pub use peer::*;
pub use session::*;
pub use transport::*;
