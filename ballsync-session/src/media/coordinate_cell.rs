use ballsync_core::CoordinatePair;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Latest coordinate estimate, shared between the estimator thread and the
/// async side.
///
/// Both components live in one `AtomicU64`, so a reader always sees a pair
/// that was written as a whole.
#[derive(Debug, Clone)]
pub struct CoordinateCell {
    bits: Arc<AtomicU64>,
}

impl CoordinateCell {
    pub fn new(initial: CoordinatePair) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(pack(initial))),
        }
    }

    pub fn load(&self) -> CoordinatePair {
        unpack(self.bits.load(Ordering::Acquire))
    }

    pub fn store(&self, pair: CoordinatePair) {
        self.bits.store(pack(pair), Ordering::Release);
    }
}

impl Default for CoordinateCell {
    fn default() -> Self {
        Self::new(CoordinatePair::default())
    }
}

fn pack(pair: CoordinatePair) -> u64 {
    (u64::from(pair.x as u32) << 32) | u64::from(pair.y as u32)
}

fn unpack(bits: u64) -> CoordinatePair {
    CoordinatePair::new((bits >> 32) as u32 as i32, bits as u32 as i32)
}
