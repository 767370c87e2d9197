use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Failures that end a session.
///
/// Everything here is fatal once it reaches the orchestrator; malformed
/// data-channel messages and estimation misses never become a `SessionError`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("signaling endpoint {addr} is unreachable")]
    Unreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("signaling channel dropped: {0}")]
    Disconnected(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(#[from] webrtc::Error),

    #[error("media error: {0}")]
    Media(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Signaling endpoint unreachable or dropped.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            SessionError::Unreachable { .. } | SessionError::Disconnected(_)
        )
    }
}
