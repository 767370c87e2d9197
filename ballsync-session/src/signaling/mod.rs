mod handshake;
mod signaling_channel;
mod tcp_signaling;

pub use handshake::*;
pub use signaling_channel::*;
pub use tcp_signaling::*;
