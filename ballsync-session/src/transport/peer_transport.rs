use crate::error::{Result, SessionError};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use crate::transport::video_track::VideoSender;
use ballsync_core::{SdpKind, SessionDescription, SessionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// The single peer connection of a session.
///
/// Every WebRTC callback is turned into a [`TransportEvent`] on `event_tx`;
/// nothing else in the crate registers callbacks on the connection.
pub struct PeerTransport {
    pub session_id: SessionId,
    peer_connection: Arc<RTCPeerConnection>,
    event_tx: mpsc::Sender<TransportEvent>,
    gather_timeout: Duration,
    described: AtomicBool,
}

impl PeerTransport {
    pub async fn new(
        session_id: SessionId,
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let mut settings = SettingEngine::default();
        settings.set_include_loopback_candidate(config.include_loopback);

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .with_setting_engine(settings)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers,
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed for session {}: {}", session_id, s);
                    match s {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(TransportEvent::ConnectionClosed(s)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        // Channels created by the peer.
        let dc_tx = event_tx.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();

            Box::pin(async move {
                debug!("Remote data channel '{}' announced", dc.label());
                wire_channel(&dc, tx);
            })
        }));

        let track_tx = event_tx.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let tx = track_tx.clone();

            Box::pin(async move {
                info!("Receiving {} track", track.kind());
                let _ = tx.send(TransportEvent::TrackAdded(track)).await;
            })
        }));

        Ok(Self {
            session_id,
            peer_connection,
            event_tx,
            gather_timeout: config.gather_timeout,
            described: AtomicBool::new(false),
        })
    }

    /// Creates a reliable, ordered channel. Must precede the local description.
    pub async fn create_data_channel(&self, label: &str) -> Result<Arc<RTCDataChannel>> {
        self.ensure_not_described("data channel")?;

        let dc = self.peer_connection.create_data_channel(label, None).await?;
        wire_channel(&dc, self.event_tx.clone());
        info!("Data channel '{}' is created", label);
        Ok(dc)
    }

    /// Attaches the outbound video track. Must precede the local description.
    pub async fn add_video_track(&self, sender: &VideoSender) -> Result<()> {
        self.ensure_not_described("video track")?;

        let track: Arc<dyn TrackLocal + Send + Sync> = sender.track();
        let rtp_sender = self.peer_connection.add_track(track).await?;

        // RTCP has to be read for the interceptors to run; the loop ends when
        // the sender is closed.
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while let Ok((_, _)) = rtp_sender.read(&mut rtcp_buf).await {}
        });

        info!("Video track is attached");
        Ok(())
    }

    /// Creates the offer and returns it once ICE gathering is done.
    pub async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.set_local(offer).await
    }

    /// Creates the answer to an already applied remote offer.
    pub async fn create_answer(&self) -> Result<SessionDescription> {
        if self.peer_connection.remote_description().await.is_none() {
            return Err(SessionError::InvalidState(
                "answer requested before a remote offer was applied".to_owned(),
            ));
        }
        let answer = self.peer_connection.create_answer(None).await?;
        self.set_local(answer).await
    }

    pub async fn apply_remote(&self, desc: &SessionDescription) -> Result<()> {
        let malformed =
            |e: webrtc::Error| SessionError::Protocol(format!("malformed {} sdp: {e}", desc.kind));

        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp.clone()).map_err(malformed)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp.clone()).map_err(malformed)?,
        };

        self.peer_connection
            .set_remote_description(rtc)
            .await
            .map_err(|e| SessionError::Protocol(format!("remote {} rejected: {e}", desc.kind)))
    }

    pub fn connection_state(&self) -> RTCPeerConnectionState {
        self.peer_connection.connection_state()
    }

    pub async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }

    async fn set_local(&self, desc: RTCSessionDescription) -> Result<SessionDescription> {
        let mut gathering = self.peer_connection.gathering_complete_promise().await;
        self.peer_connection.set_local_description(desc).await?;
        self.described.store(true, Ordering::Release);

        // Descriptions travel in a single signaling message, so candidates
        // must be part of the SDP.
        if tokio::time::timeout(self.gather_timeout, gathering.recv())
            .await
            .is_err()
        {
            warn!(
                "ICE gathering did not finish within {:?}; sending what was gathered",
                self.gather_timeout
            );
        }

        let local = self
            .peer_connection
            .local_description()
            .await
            .ok_or_else(|| SessionError::InvalidState("local description vanished".to_owned()))?;

        match local.sdp_type {
            RTCSdpType::Offer => Ok(SessionDescription::offer(local.sdp)),
            RTCSdpType::Answer => Ok(SessionDescription::answer(local.sdp)),
            other => Err(SessionError::Protocol(format!(
                "unexpected local description type {other}"
            ))),
        }
    }

    fn ensure_not_described(&self, what: &str) -> Result<()> {
        if self.described.load(Ordering::Acquire) {
            return Err(SessionError::InvalidState(format!(
                "{what} attached after the local description was created"
            )));
        }
        Ok(())
    }
}

/// Routes a channel's open and message callbacks into the event stream.
fn wire_channel(dc: &Arc<RTCDataChannel>, tx: mpsc::Sender<TransportEvent>) {
    let open_tx = tx.clone();
    let weak: Weak<RTCDataChannel> = Arc::downgrade(dc);
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let channel = weak.upgrade();

        Box::pin(async move {
            let Some(channel) = channel else { return };
            info!("Data channel '{}' is established", channel.label());
            let _ = tx.send(TransportEvent::DataChannelOpened(channel)).await;
        })
    }));

    let weak = Arc::downgrade(dc);
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx.clone();
        let channel = weak.upgrade();

        Box::pin(async move {
            let Some(channel) = channel else { return };
            let _ = tx
                .send(TransportEvent::MessageReceived(channel, msg.data))
                .await;
        })
    }));
}
