use crate::error::Result;
use crate::transport::{PeerTransport, TransportEvent};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use webrtc::data_channel::RTCDataChannel;
use webrtc::track::track_remote::TrackRemote;

/// Label of the data channel both sides open.
pub const DATA_CHANNEL_LABEL: &str = "data";

/// What a running session lends to its behavior while handling an event.
pub struct SessionContext<'a> {
    pub transport: &'a PeerTransport,
    /// Media tasks; aborted during teardown, a failure closes the session.
    pub tasks: &'a mut JoinSet<Result<()>>,
    /// For media loops reporting `MediaFlowing`.
    pub events: mpsc::Sender<TransportEvent>,
}

/// Role-specific half of a session.
///
/// The orchestrator owns the lifecycle and calls into the behavior at each
/// step; behaviors never register WebRTC callbacks themselves.
#[async_trait]
pub trait SessionBehavior: Send {
    /// Attaches channels and tracks. Runs before any description exists.
    async fn prepare(&mut self, transport: &PeerTransport) -> Result<()>;

    /// Both descriptions are applied; start media loops here.
    async fn on_negotiated(&mut self, ctx: &mut SessionContext<'_>) -> Result<()>;

    async fn on_track(&mut self, track: Arc<TrackRemote>, ctx: &mut SessionContext<'_>)
    -> Result<()>;

    async fn on_channel_open(&mut self, channel: Arc<RTCDataChannel>) -> Result<()>;

    async fn on_message(&mut self, channel: Arc<RTCDataChannel>, data: Bytes) -> Result<()>;

    /// Releases owned resources. Called once, after media tasks are gone.
    async fn shutdown(&mut self) -> Result<()>;
}
