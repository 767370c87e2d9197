pub mod ping_behavior;
pub mod session_helpers;

pub use memory_signaling::*;
pub use ping_behavior::*;
pub use scripted_signaling::*;
pub use session_helpers::*;
