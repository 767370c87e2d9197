mod coordinates;
mod frame;
mod session;
mod signaling;

pub use coordinates::{CoordinatePair, CoordinateParseError};
pub use frame::{BYTES_PER_PIXEL, Frame};
pub use session::{Role, SessionId};
pub use signaling::{SdpKind, SessionDescription, SignalMessage};
