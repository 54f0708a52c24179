use callroom_core::utils::default_stun_servers;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Websocket endpoint of the signaling channel, e.g. `ws://host:8080/ws`.
    pub signaling_url: String,
    /// Base url of the call record API, e.g. `https://api.example.com`.
    pub api_base_url: String,
    /// Opaque bearer credential supplied by the authentication layer.
    pub auth_token: String,
    pub ice_servers: Vec<String>,
    /// Billing tick resolution.
    pub tick_interval: Duration,
}

impl ClientConfig {
    pub fn new(
        signaling_url: impl Into<String>,
        api_base_url: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            signaling_url: signaling_url.into(),
            api_base_url: api_base_url.into(),
            auth_token: auth_token.into(),
            ice_servers: default_stun_servers(),
            tick_interval: Duration::from_secs(1),
        }
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<String>) -> Self {
        self.ice_servers = ice_servers;
        self
    }
}
