use crate::error::{Result, SessionError};
use crate::transport::frame_codec::{decode_frame, encode_frame};
use ballsync_core::Frame;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::media::Sample;
use webrtc::media::io::sample_builder::SampleBuilder;
use webrtc::rtp::codecs::vp8::Vp8Packet;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

pub const VIDEO_CLOCK_RATE: u32 = 90_000;

/// How far (in packets) reassembly waits for a late packet before giving up
/// on a frame.
const MAX_LATE_PACKETS: u16 = 256;

/// Outbound video: frames in, RTP samples out.
///
/// The track is VP8-typed so the stock payloader fragments samples; the
/// payload itself is a `frame_codec` sample, not a VP8 bitstream.
pub struct VideoSender {
    track: Arc<TrackLocalStaticSample>,
}

impl VideoSender {
    pub fn new(stream_id: &str) -> Self {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: VIDEO_CLOCK_RATE,
                ..Default::default()
            },
            "video".to_owned(),
            stream_id.to_owned(),
        ));
        Self { track }
    }

    pub fn track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    pub async fn send_frame(&self, frame: &Frame, duration: Duration) -> Result<()> {
        let data = encode_frame(frame).map_err(|e| SessionError::Media(e.to_string()))?;
        self.track
            .write_sample(&Sample {
                data,
                duration,
                ..Default::default()
            })
            .await?;
        Ok(())
    }
}

/// Inbound video: RTP packets in, frames out.
pub struct VideoReceiver {
    track: Arc<TrackRemote>,
    builder: SampleBuilder<Vp8Packet>,
}

impl VideoReceiver {
    pub fn new(track: Arc<TrackRemote>) -> Self {
        Self {
            track,
            builder: SampleBuilder::new(MAX_LATE_PACKETS, Vp8Packet::default(), VIDEO_CLOCK_RATE),
        }
    }

    /// Suspends until the next complete frame arrives.
    ///
    /// Returns `None` once the track has ended.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            while let Some(sample) = self.builder.pop() {
                match decode_frame(sample.data) {
                    Ok(frame) => return Some(frame),
                    Err(e) => warn!("Dropping undecodable video sample: {}", e),
                }
            }

            match self.track.read_rtp().await {
                Ok((packet, _)) => self.builder.push(packet),
                Err(e) => {
                    debug!("Video track ended: {}", e);
                    return None;
                }
            }
        }
    }
}
