mod frame_codec;
mod peer_transport;
mod transport_config;
mod transport_event;
mod video_track;

pub use frame_codec::*;
pub use peer_transport::*;
pub use transport_config::*;
pub use transport_event::*;
pub use video_track::*;
