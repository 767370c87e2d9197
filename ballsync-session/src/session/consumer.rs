use crate::config::MediaConfig;
use crate::error::{Result, SessionError};
use crate::media::{
    self, CoordinateCell, CoordinateEstimator, EstimatorStats, EstimatorWorker, FrameSink,
};
use crate::session::behavior::{DATA_CHANNEL_LABEL, SessionBehavior, SessionContext};
use crate::transport::{PeerTransport, TransportEvent, VideoReceiver};
use async_trait::async_trait;
use ballsync_core::CoordinatePair;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_remote::TrackRemote;

/// Answerer side: estimates the ball position and reports it back.
///
/// Frames go from the video task into a drop-oldest queue drained by the
/// estimator thread; the latest estimate lives in a [`CoordinateCell`].
pub struct ConsumerBehavior {
    sink: Option<FrameSink>,
    worker: Option<EstimatorWorker>,
    coordinates: CoordinateCell,
    channel: Option<Arc<RTCDataChannel>>,
    estimator_stats: Option<EstimatorStats>,
}

impl ConsumerBehavior {
    /// Starts the estimator thread right away so that no frame waits on it.
    pub fn new(config: &MediaConfig) -> Result<Self> {
        let (sink, stream) = media::frame_queue(config.queue_capacity);
        let coordinates = CoordinateCell::default();
        let worker = EstimatorWorker::spawn(
            CoordinateEstimator::new(config.threshold),
            stream,
            coordinates.clone(),
        )?;

        Ok(Self {
            sink: Some(sink),
            worker: Some(worker),
            coordinates,
            channel: None,
            estimator_stats: None,
        })
    }

    /// Handle on the latest estimate.
    pub fn coordinates(&self) -> CoordinateCell {
        self.coordinates.clone()
    }

    /// Available after `shutdown`.
    pub fn estimator_stats(&self) -> Option<EstimatorStats> {
        self.estimator_stats
    }
}

#[async_trait]
impl SessionBehavior for ConsumerBehavior {
    async fn prepare(&mut self, transport: &PeerTransport) -> Result<()> {
        self.channel = Some(transport.create_data_channel(DATA_CHANNEL_LABEL).await?);
        Ok(())
    }

    async fn on_negotiated(&mut self, _ctx: &mut SessionContext<'_>) -> Result<()> {
        info!("Waiting for the video track");
        Ok(())
    }

    async fn on_track(
        &mut self,
        track: Arc<TrackRemote>,
        ctx: &mut SessionContext<'_>,
    ) -> Result<()> {
        if track.kind() != RTPCodecType::Video {
            debug!("Ignoring remote {} track", track.kind());
            return Ok(());
        }
        let Some(sink) = self.sink.take() else {
            warn!("Ignoring additional video track");
            return Ok(());
        };

        let mut receiver = VideoReceiver::new(track);
        let coordinates = self.coordinates.clone();
        let channel = self.channel.clone();
        let events = ctx.events.clone();

        ctx.tasks.spawn(async move {
            let mut received: u64 = 0;
            while let Some(frame) = receiver.next_frame().await {
                if sink.push(frame).is_some() {
                    debug!(
                        "Estimator is behind ({}/{} queued), dropped the oldest frame",
                        sink.len(),
                        sink.capacity()
                    );
                }

                received += 1;
                if received == 1 {
                    let _ = events.send(TransportEvent::MediaFlowing).await;
                }

                if let Some(channel) = &channel {
                    report(channel, coordinates.load()).await;
                }
            }
            info!("Video stream ended after {} frames", received);
            Ok(())
        });
        Ok(())
    }

    async fn on_channel_open(&mut self, channel: Arc<RTCDataChannel>) -> Result<()> {
        debug!("Channel '{}' ready for coordinate reports", channel.label());
        Ok(())
    }

    async fn on_message(&mut self, channel: Arc<RTCDataChannel>, data: Bytes) -> Result<()> {
        debug!("Peer asked for coordinates ({} bytes)", data.len());
        report(&channel, self.coordinates.load()).await;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        // The worker drains until every sink is gone.
        self.sink = None;
        if let Some(worker) = self.worker.take() {
            let stats = tokio::task::spawn_blocking(move || worker.join())
                .await
                .map_err(|e| SessionError::Media(format!("estimator join failed: {e}")))??;
            self.estimator_stats = Some(stats);
        }
        Ok(())
    }
}

/// Sends `"x,y"`; skipped while the channel is not open.
async fn report(channel: &RTCDataChannel, coordinates: CoordinatePair) {
    if channel.ready_state() != RTCDataChannelState::Open {
        return;
    }
    if let Err(e) = channel.send_text(coordinates.to_string()).await {
        debug!("Coordinate report not sent: {}", e);
    }
}
