mod behavior;
mod consumer;
mod producer;
#[allow(clippy::module_inception)]
mod session;
mod state;

pub use behavior::*;
pub use consumer::*;
pub use producer::*;
pub use session::*;
pub use state::*;
