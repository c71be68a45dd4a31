pub use yellowbeam_core::{SignalMessage, decode, encode};

pub mod model {
    pub use yellowbeam_core::model::*;
}

pub mod utils {
    pub use yellowbeam_core::utils::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use yellowbeam_client::*;
}
