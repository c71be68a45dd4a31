use thiserror::Error;
use url::Url;
use yellowbeam_core::IceServerConfig;
use yellowbeam_core::utils::{DECLINED_REASON, SIGNALING_PATH, default_ice_servers};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid signaling URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("unsupported signaling URL scheme `{0}`, expected ws or wss")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: Url,
    pub ice_servers: Vec<IceServerConfig>,
    /// Reason sent when the user declines an incoming call.
    pub decline_message: String,
}

impl ClientConfig {
    /// Validates `server_url`. A URL without a path gets the conventional
    /// `/call` endpoint.
    pub fn new(server_url: &str) -> Result<Self, ConfigError> {
        let mut url = Url::parse(server_url).map_err(|source| ConfigError::InvalidUrl {
            url: server_url.to_owned(),
            source,
        })?;

        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
        }
        if url.path().is_empty() || url.path() == "/" {
            url.set_path(SIGNALING_PATH);
        }

        Ok(Self {
            server_url: url,
            ice_servers: default_ice_servers(),
            decline_message: DECLINED_REASON.to_owned(),
        })
    }

    /// `wss://<host>/call`, the endpoint a page served from `host` would use.
    pub fn for_host(host: &str) -> Result<Self, ConfigError> {
        Self::new(&format!("wss://{host}{SIGNALING_PATH}"))
    }

    /// Replaces the default STUN servers. An empty list keeps the defaults.
    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        if !ice_servers.is_empty() {
            self.ice_servers = ice_servers;
        }
        self
    }

    pub fn with_decline_message(mut self, message: impl Into<String>) -> Self {
        self.decline_message = message.into();
        self
    }
}
