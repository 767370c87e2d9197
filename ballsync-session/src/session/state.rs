use crate::error::{Result, SessionError};
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    SignalingConnected,
    DescriptionsExchanged,
    Streaming,
    Closing,
    Closed,
}

impl SessionState {
    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Every live state may fall into `Closing`; `Closed` is final.
    pub fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, SignalingConnected)
                | (SignalingConnected, DescriptionsExchanged)
                | (DescriptionsExchanged, Streaming)
                | (Idle | SignalingConnected | DescriptionsExchanged | Streaming, Closing)
                | (Closing, Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == SessionState::Closed
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::SignalingConnected => "signaling-connected",
            SessionState::DescriptionsExchanged => "descriptions-exchanged",
            SessionState::Streaming => "streaming",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Owner of the session state; observers subscribe through `watch`.
#[derive(Debug)]
pub struct SessionStateMachine {
    tx: watch::Sender<SessionState>,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::Idle);
        Self { tx }
    }

    pub fn current(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn advance(&self, next: SessionState) -> Result<()> {
        let current = self.current();
        if !current.can_advance_to(next) {
            return Err(SessionError::InvalidState(format!(
                "illegal transition {current} -> {next}"
            )));
        }

        debug!("Session state {} -> {}", current, next);
        self.tx.send_replace(next);
        Ok(())
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
