use crate::error::{Result, SessionError};
use crate::media::coordinate_cell::CoordinateCell;
use crate::media::estimator::CoordinateEstimator;
use crate::media::frame_queue::FrameStream;
use std::thread;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimatorStats {
    pub frames: u64,
    pub misses: u64,
}

/// Dedicated thread running the estimator off the async runtime.
///
/// The thread drains the queue until every sink has been dropped, so
/// teardown is: drop the sink, then `join`.
pub struct EstimatorWorker {
    handle: thread::JoinHandle<EstimatorStats>,
}

impl EstimatorWorker {
    pub fn spawn(
        estimator: CoordinateEstimator,
        frames: FrameStream,
        coordinates: CoordinateCell,
    ) -> Result<Self> {
        let handle = thread::Builder::new()
            .name("coordinate-estimator".to_owned())
            .spawn(move || {
                let mut stats = EstimatorStats::default();
                while let Ok(frame) = frames.recv() {
                    stats.frames += 1;
                    match estimator.estimate_into(&frame, &coordinates) {
                        Some(found) => debug!("Coordinates computed: {}", found),
                        None => {
                            stats.misses += 1;
                            debug!("No ball found in frame {}", stats.frames);
                        }
                    }
                }
                info!(
                    "Estimator stopped after {} frames ({} misses)",
                    stats.frames, stats.misses
                );
                stats
            })?;

        Ok(Self { handle })
    }

    pub fn join(self) -> Result<EstimatorStats> {
        self.handle
            .join()
            .map_err(|_| SessionError::Media("estimator thread panicked".to_owned()))
    }
}
