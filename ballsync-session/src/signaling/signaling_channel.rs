use crate::error::Result;
use async_trait::async_trait;
use ballsync_core::SessionDescription;

/// Out-of-band channel carrying the offer and the answer.
///
/// Implemented over TCP for real sessions; tests plug in in-memory pairs.
#[async_trait]
pub trait SignalingChannel: Send {
    /// Establishes the channel. An unreachable peer is terminal.
    async fn connect(&mut self) -> Result<()>;

    async fn send(&mut self, desc: &SessionDescription) -> Result<()>;

    /// Suspends until the peer's description arrives.
    async fn receive(&mut self) -> Result<SessionDescription>;

    /// Releases the channel. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;
}
