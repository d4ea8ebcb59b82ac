use crate::demo_error::DemoResult;
use crate::frame_sync::CompletionFence;
use crate::frame_sync::FrameSync;

/// The queue side of a frame: one allocator and list, a swap chain, and a
/// queue that can signal a fence.
pub trait FrameBackend {
    type Fence: CompletionFence;

    fn back_buffer_index(&self) -> usize;

    /// Resets the allocator and reopens the command list.
    fn reset_commands(&mut self) -> DemoResult<()>;

    /// Closes the command list and hands it to the queue.
    fn submit_commands(&mut self) -> DemoResult<()>;

    fn present(&mut self) -> DemoResult<()>;

    fn signal(&self, fence: &Self::Fence, value: u64) -> DemoResult<()>;
}

/// Runs one single-buffered frame and returns once the GPU has finished it.
///
/// `record` receives the backend and the back buffer index of this frame.
pub fn run_frame<B, R>(backend: &mut B, sync: &mut FrameSync<B::Fence>, record: R) -> DemoResult<()>
where
    B: FrameBackend,
    R: FnOnce(&mut B, usize) -> DemoResult<()>,
{
    sync.ensure_reusable()?;
    backend.reset_commands()?;

    let back_buffer = backend.back_buffer_index();
    record(backend, back_buffer)?;

    backend.submit_commands()?;
    let presented = backend.present();
    // The list is on the queue now, so fence it even if present failed.
    sync.signal_with(|fence, value| backend.signal(fence, value))?;
    presented?;
    sync.wait_for_gpu()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_error::FrameSyncError;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingFence {
        completed: Cell<u64>,
        signaled: Cell<u64>,
    }

    impl CompletionFence for CountingFence {
        fn completed_value(&self) -> u64 {
            self.completed.get()
        }

        fn wait_for_value(&self, value: u64) -> DemoResult<()> {
            assert!(value <= self.signaled.get(), "waiting on a value never signaled");
            self.completed.set(value);
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedBackend {
        calls: Vec<&'static str>,
        frame: usize,
        fail_present: bool,
    }

    impl FrameBackend for ScriptedBackend {
        type Fence = CountingFence;

        fn back_buffer_index(&self) -> usize {
            self.frame % 2
        }

        fn reset_commands(&mut self) -> DemoResult<()> {
            self.calls.push("reset");
            Ok(())
        }

        fn submit_commands(&mut self) -> DemoResult<()> {
            self.calls.push("submit");
            Ok(())
        }

        fn present(&mut self) -> DemoResult<()> {
            self.calls.push("present");
            if self.fail_present {
                return Err(eyre::eyre!("present failed").into());
            }
            self.frame += 1;
            Ok(())
        }

        fn signal(&self, fence: &CountingFence, value: u64) -> DemoResult<()> {
            fence.signaled.set(value);
            Ok(())
        }
    }

    impl ScriptedBackend {
        fn failing_present() -> Self {
            Self {
                fail_present: true,
                ..Self::default()
            }
        }
    }

    #[test]
    fn frame_steps_run_in_order_and_end_idle() {
        let mut backend = ScriptedBackend::default();
        let mut sync = FrameSync::new(CountingFence::default());
        let mut back_buffers = Vec::new();

        for _ in 0..3 {
            run_frame(&mut backend, &mut sync, |backend, back_buffer| {
                backend.calls.push("record");
                back_buffers.push(back_buffer);
                Ok(())
            })
            .unwrap();
            assert!(sync.is_gpu_idle());
        }

        assert_eq!(back_buffers, vec![0, 1, 0]);
        assert_eq!(sync.fence_value(), 3);
        assert_eq!(
            &backend.calls[..4],
            &["reset", "record", "submit", "present"]
        );
    }

    #[test]
    fn in_flight_work_refuses_a_reset() {
        let mut backend = ScriptedBackend::default();
        let mut sync = FrameSync::new(CountingFence::default());
        sync.signal_with(|fence, value| backend.signal(fence, value)).unwrap();

        let error = run_frame(&mut backend, &mut sync, |_, _| Ok(())).unwrap_err();
        assert_eq!(
            error.downcast_ref::<FrameSyncError>(),
            Some(&FrameSyncError::InFlight {
                completed: 0,
                required: 1
            })
        );
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn failed_recording_submits_nothing() {
        let mut backend = ScriptedBackend::default();
        let mut sync = FrameSync::new(CountingFence::default());
        let result = run_frame(&mut backend, &mut sync, |_, _| {
            Err(eyre::eyre!("record failed").into())
        });
        assert!(result.is_err());
        assert_eq!(backend.calls, vec!["reset"]);
        assert_eq!(sync.fence_value(), 0);
    }

    #[test]
    fn failed_present_still_fences_the_submitted_list() {
        let mut backend = ScriptedBackend::failing_present();
        let mut sync = FrameSync::new(CountingFence::default());

        let result = run_frame(&mut backend, &mut sync, |_, _| Ok(()));
        assert!(result.is_err());
        assert_eq!(backend.calls, vec!["reset", "submit", "present"]);
        assert_eq!(sync.fence_value(), 1);
        assert_eq!(sync.fence().signaled.get(), 1);
        assert!(!sync.is_gpu_idle());

        sync.wait_for_gpu().unwrap();
        assert!(sync.is_gpu_idle());
    }
}
