//! CPU/GPU handoff for a single command allocator.
//!
//! The CPU records a frame, the queue signals the fence with the next counter
//! value once that work retires, and the CPU blocks on the fence before the
//! allocator is reset again. Recording of frame N+1 is therefore serialized
//! behind GPU completion of frame N.

use crate::demo_error::DemoResult;
use crate::demo_error::FrameSyncError;

/// A monotonically increasing completion marker written by the GPU.
pub trait CompletionFence {
    /// Last value the GPU has written.
    fn completed_value(&self) -> u64;

    /// Blocks the calling thread, without timeout, until the GPU has written
    /// at least `value`.
    fn wait_for_value(&self, value: u64) -> DemoResult<()>;
}

pub struct FrameSync<F> {
    fence: F,
    fence_value: u64,
}

impl<F: CompletionFence> FrameSync<F> {
    pub fn new(fence: F) -> Self {
        Self {
            fence,
            fence_value: 0,
        }
    }

    pub fn fence(&self) -> &F {
        &self.fence
    }

    /// Value of the most recent successful signal.
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }

    /// Asks `signal` to make the queue write the next counter value once all
    /// prior work finishes. The counter only moves if that succeeded.
    pub fn signal_with<S>(&mut self, signal: S) -> DemoResult<u64>
    where
        S: FnOnce(&F, u64) -> DemoResult<()>,
    {
        let next = self.fence_value + 1;
        signal(&self.fence, next)?;
        self.fence_value = next;
        Ok(next)
    }

    pub fn is_gpu_idle(&self) -> bool {
        self.fence.completed_value() >= self.fence_value
    }

    pub fn wait_for_gpu(&self) -> DemoResult<()> {
        if !self.is_gpu_idle() {
            self.fence.wait_for_value(self.fence_value)?;
        }
        Ok(())
    }

    /// Errors if command memory handed to the GPU may still be read.
    pub fn ensure_reusable(&self) -> Result<(), FrameSyncError> {
        let completed = self.fence.completed_value();
        if completed < self.fence_value {
            return Err(FrameSyncError::InFlight {
                completed,
                required: self.fence_value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::cell::RefCell;

    /// GPU that only retires work when someone waits on it.
    #[derive(Default)]
    struct LazyFence {
        completed: Cell<u64>,
        waits: RefCell<Vec<u64>>,
    }

    impl CompletionFence for LazyFence {
        fn completed_value(&self) -> u64 {
            self.completed.get()
        }

        fn wait_for_value(&self, value: u64) -> DemoResult<()> {
            self.waits.borrow_mut().push(value);
            self.completed.set(value);
            Ok(())
        }
    }

    #[test]
    fn fresh_sync_is_idle() {
        let sync = FrameSync::new(LazyFence::default());
        assert!(sync.is_gpu_idle());
        assert_eq!(sync.ensure_reusable(), Ok(()));
        sync.wait_for_gpu().unwrap();
        assert!(sync.fence().waits.borrow().is_empty());
    }

    #[test]
    fn signaled_work_blocks_reuse_until_waited() {
        let mut sync = FrameSync::new(LazyFence::default());
        let value = sync.signal_with(|_, _| Ok(())).unwrap();
        assert_eq!(value, 1);
        assert!(!sync.is_gpu_idle());
        assert_eq!(
            sync.ensure_reusable(),
            Err(FrameSyncError::InFlight {
                completed: 0,
                required: 1
            })
        );

        sync.wait_for_gpu().unwrap();
        assert_eq!(*sync.fence().waits.borrow(), vec![1]);
        assert_eq!(sync.ensure_reusable(), Ok(()));

        // Already complete: no second block.
        sync.wait_for_gpu().unwrap();
        assert_eq!(sync.fence().waits.borrow().len(), 1);
    }

    #[test]
    fn counter_is_monotonic_and_skips_failed_signals() {
        let mut sync = FrameSync::new(LazyFence::default());
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(sync.signal_with(|_, _| Ok(())).unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);

        let failed = sync.signal_with(|_, _| Err(eyre::eyre!("queue rejected signal").into()));
        assert!(failed.is_err());
        assert_eq!(sync.fence_value(), 3);
        let next = sync
            .signal_with(|_, value| {
                assert_eq!(value, 4);
                Ok(())
            })
            .unwrap();
        assert_eq!(next, 4);
    }
}
