use std::time::Duration;

/// WebRTC settings for the single peer connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<String>,
    /// Offer loopback host candidates; needed when both peers share a host
    /// without another usable interface.
    pub include_loopback: bool,
    /// Bound on ICE gathering before a description is sent.
    pub gather_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
            include_loopback: false,
            gather_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Host-only configuration for peers on the same machine.
    pub fn local() -> Self {
        Self {
            ice_servers: vec![],
            include_loopback: true,
            gather_timeout: Duration::from_secs(5),
        }
    }
}
