use async_trait::async_trait;
use ballsync_session::{
    DATA_CHANNEL_LABEL, PeerTransport, Result, SessionBehavior, SessionContext,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::Mutex;
use webrtc::data_channel::RTCDataChannel;
use webrtc::track::track_remote::TrackRemote;

/// Offer-side behavior that asks for coordinates on every channel as soon as
/// it opens and records the replies.
#[derive(Clone, Default)]
pub struct PingBehavior {
    replies: Arc<Mutex<Vec<String>>>,
}

impl PingBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the replies Arc for verification.
    pub fn replies(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.replies)
    }
}

#[async_trait]
impl SessionBehavior for PingBehavior {
    async fn prepare(&mut self, transport: &PeerTransport) -> Result<()> {
        transport.create_data_channel(DATA_CHANNEL_LABEL).await?;
        Ok(())
    }

    async fn on_negotiated(&mut self, _ctx: &mut SessionContext<'_>) -> Result<()> {
        Ok(())
    }

    async fn on_track(
        &mut self,
        _track: Arc<TrackRemote>,
        _ctx: &mut SessionContext<'_>,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_channel_open(&mut self, channel: Arc<RTCDataChannel>) -> Result<()> {
        tracing::debug!("[PingBehavior] asking on '{}'", channel.label());
        channel.send_text("where".to_owned()).await?;
        Ok(())
    }

    async fn on_message(&mut self, _channel: Arc<RTCDataChannel>, data: Bytes) -> Result<()> {
        let reply = String::from_utf8_lossy(&data).into_owned();
        tracing::debug!("[PingBehavior] reply {}", reply);
        self.replies.lock().await.push(reply);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
