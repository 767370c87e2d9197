mod ball;
mod coordinate_cell;
mod estimator;
mod estimator_worker;
mod frame_queue;

pub use ball::*;
pub use coordinate_cell::*;
pub use estimator::*;
pub use estimator_worker::*;
pub use frame_queue::*;
