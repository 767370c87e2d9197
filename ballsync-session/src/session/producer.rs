use crate::config::MediaConfig;
use crate::error::{Result, SessionError};
use crate::media::{BallGenerator, CoordinateCell};
use crate::session::behavior::{DATA_CHANNEL_LABEL, SessionBehavior, SessionContext};
use crate::transport::{PeerTransport, TransportEvent, VideoSender};
use async_trait::async_trait;
use ballsync_core::CoordinatePair;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::track::track_remote::TrackRemote;

/// Counters for the coordinates reported back by the consumer.
#[derive(Debug, Default)]
pub struct ProducerStats {
    frames_sent: AtomicU64,
    reports: AtomicU64,
    malformed: AtomicU64,
    total_error: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerSnapshot {
    pub frames_sent: u64,
    pub reports: u64,
    pub malformed: u64,
    /// Sum over all reports of the per-axis distance to the true position.
    pub total_error: u64,
}

impl ProducerStats {
    pub fn snapshot(&self) -> ProducerSnapshot {
        ProducerSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            reports: self.reports.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            total_error: self.total_error.load(Ordering::Relaxed),
        }
    }

    fn record_report(&self, error: (u32, u32)) {
        self.reports.fetch_add(1, Ordering::Relaxed);
        self.total_error
            .fetch_add(u64::from(error.0) + u64::from(error.1), Ordering::Relaxed);
    }
}

/// Offerer side: renders the ball, streams it, checks what comes back.
pub struct ProducerBehavior {
    media: MediaConfig,
    video: Option<VideoSender>,
    truth: CoordinateCell,
    stats: Arc<ProducerStats>,
}

impl ProducerBehavior {
    pub fn new(media: MediaConfig) -> Self {
        let truth = CoordinateCell::new(media.start);
        Self {
            media,
            video: None,
            truth,
            stats: Arc::new(ProducerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<ProducerStats> {
        Arc::clone(&self.stats)
    }

    /// Position of the ball in the most recently sent frame.
    pub fn true_position(&self) -> CoordinatePair {
        self.truth.load()
    }

    /// Malformed reports are counted and dropped.
    fn handle_report(&self, data: &[u8]) -> Option<CoordinatePair> {
        let reported = match CoordinatePair::try_from(data) {
            Ok(pair) => pair,
            Err(e) => {
                self.stats.malformed.fetch_add(1, Ordering::Relaxed);
                warn!("Dropping coordinate report: {}", e);
                return None;
            }
        };

        let actual = self.truth.load();
        let error = reported.abs_diff(actual);
        self.stats.record_report(error);
        info!(
            "Received coordinates {} (actual {}, error {},{})",
            reported, actual, error.0, error.1
        );
        Some(reported)
    }
}

#[async_trait]
impl SessionBehavior for ProducerBehavior {
    async fn prepare(&mut self, transport: &PeerTransport) -> Result<()> {
        transport.create_data_channel(DATA_CHANNEL_LABEL).await?;

        let video = VideoSender::new(&format!("ballsync-{}", transport.session_id));
        transport.add_video_track(&video).await?;
        self.video = Some(video);
        Ok(())
    }

    async fn on_negotiated(&mut self, ctx: &mut SessionContext<'_>) -> Result<()> {
        let video = self
            .video
            .take()
            .ok_or_else(|| SessionError::InvalidState("video track was never attached".to_owned()))?;

        let mut ball = BallGenerator::new(&self.media);
        let frame_interval = self.media.frame_interval();
        let truth = self.truth.clone();
        let stats = Arc::clone(&self.stats);
        let events = ctx.events.clone();

        ctx.tasks.spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("Streaming ball frames every {:?}", frame_interval);
            loop {
                ticker.tick().await;

                let frame = ball.next_frame();
                truth.store(ball.position());
                video.send_frame(&frame, frame_interval).await?;

                if stats.frames_sent.fetch_add(1, Ordering::Relaxed) == 0 {
                    let _ = events.send(TransportEvent::MediaFlowing).await;
                }
            }
        });
        Ok(())
    }

    async fn on_track(
        &mut self,
        track: Arc<TrackRemote>,
        _ctx: &mut SessionContext<'_>,
    ) -> Result<()> {
        debug!("Ignoring remote {} track", track.kind());
        Ok(())
    }

    async fn on_channel_open(&mut self, channel: Arc<RTCDataChannel>) -> Result<()> {
        debug!("Channel '{}' ready for coordinate reports", channel.label());
        Ok(())
    }

    async fn on_message(&mut self, _channel: Arc<RTCDataChannel>, data: Bytes) -> Result<()> {
        self.handle_report(&data);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        let stats = self.stats.snapshot();
        info!(
            "Producer sent {} frames, received {} reports ({} malformed)",
            stats.frames_sent, stats.reports, stats.malformed
        );
        Ok(())
    }
}
