use ballsync_core::Frame;
use crossbeam_channel::{Receiver, RecvError, Sender, TryRecvError, TrySendError, bounded};

/// Bounded frame handoff with drop-oldest overflow.
///
/// Returns the producing half (used on the receive path, never blocks) and
/// the consuming half (owned by the estimator thread). Dropping the sink
/// disconnects the stream once it has been drained.
pub fn frame_queue(capacity: usize) -> (FrameSink, FrameStream) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        FrameSink {
            tx,
            evict: rx.clone(),
        },
        FrameStream { rx },
    )
}

pub struct FrameSink {
    tx: Sender<Frame>,
    evict: Receiver<Frame>,
}

impl FrameSink {
    /// Enqueues `frame`, evicting the oldest queued frame when full.
    ///
    /// Returns the evicted frame, if any.
    pub fn push(&self, frame: Frame) -> Option<Frame> {
        let mut pending = frame;
        let mut evicted = None;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return evicted,
                Err(TrySendError::Full(back)) => {
                    pending = back;
                    // The consumer may have drained the slot in between.
                    if let Ok(old) = self.evict.try_recv() {
                        evicted = Some(old);
                    }
                }
                // The sink owns a receiver, so the channel cannot disconnect.
                Err(TrySendError::Disconnected(back)) => return Some(back),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }
}

pub struct FrameStream {
    rx: Receiver<Frame>,
}

impl FrameStream {
    /// Blocks until a frame is available or the sink is gone.
    pub fn recv(&self) -> Result<Frame, RecvError> {
        self.rx.recv()
    }

    pub fn try_recv(&self) -> Result<Frame, TryRecvError> {
        self.rx.try_recv()
    }
}
