use crate::model::IceServerConfig;

/// Conventional path of the signaling endpoint.
pub const SIGNALING_PATH: &str = "/call";

/// Reason sent when an incoming call is auto-rejected. The spelling is what
/// deployed servers and peers expect.
pub const BUSY_REASON: &str = "bussy";

/// Reason sent when the user declines an incoming call.
pub const DECLINED_REASON: &str = "user declined";

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_3: &str = "stun:stun2.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_4: &str = "stun:stun3.l.google.com:19302";

/// Public STUN servers used when no ICE servers are configured.
pub fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![IceServerConfig {
        urls: vec![
            DEFAULT_STUN_ADDR.to_owned(),
            DEFAULT_STUN_ADDR_2.to_owned(),
            DEFAULT_STUN_ADDR_3.to_owned(),
            DEFAULT_STUN_ADDR_4.to_owned(),
        ],
        username: None,
        credential: None,
    }]
}
