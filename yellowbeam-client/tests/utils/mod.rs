pub mod mock_server;
pub mod mock_transport;
pub mod signal_helpers;

pub use mock_observer::*;
pub use mock_peer::*;
pub use mock_server::*;
pub use mock_transport::*;
pub use signal_helpers::*;
