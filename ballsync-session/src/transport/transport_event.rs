use bytes::Bytes;
use std::sync::Arc;
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::track::track_remote::TrackRemote;

/// Events the transport produces for the session loop.
pub enum TransportEvent {
    /// The peer's media track was negotiated and is ready to be read.
    TrackAdded(Arc<TrackRemote>),

    /// A data channel (local or remote) opened and can be written to.
    DataChannelOpened(Arc<RTCDataChannel>),

    /// A message arrived on the given channel.
    MessageReceived(Arc<RTCDataChannel>, Bytes),

    /// The first frame went out or came in.
    MediaFlowing,

    /// The peer connection failed, disconnected or closed.
    ConnectionClosed(RTCPeerConnectionState),
}

impl std::fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportEvent::TrackAdded(track) => write!(f, "TrackAdded({})", track.kind()),
            TransportEvent::DataChannelOpened(dc) => write!(f, "DataChannelOpened({})", dc.label()),
            TransportEvent::MessageReceived(dc, data) => {
                write!(f, "MessageReceived({}, {} bytes)", dc.label(), data.len())
            }
            TransportEvent::MediaFlowing => f.write_str("MediaFlowing"),
            TransportEvent::ConnectionClosed(state) => write!(f, "ConnectionClosed({state})"),
        }
    }
}
