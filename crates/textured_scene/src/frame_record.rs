use crate::demo_error::DemoResult;
use crate::demo_error::FrameSyncError;

pub const FRAME_COUNT: usize = 2;

/// States a swap-chain image moves through within one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceState {
    Present,
    RenderTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub back_buffer: usize,
    pub before: ResourceState,
    pub after: ResourceState,
}

/// Tracks the state of each swap-chain image as recorded into the command
/// list. Every image starts out owned by the presentation engine.
#[derive(Debug)]
pub struct BackBufferStates {
    states: [ResourceState; FRAME_COUNT],
}

impl Default for BackBufferStates {
    fn default() -> Self {
        Self {
            states: [ResourceState::Present; FRAME_COUNT],
        }
    }
}

impl BackBufferStates {
    pub fn state(&self, back_buffer: usize) -> Option<ResourceState> {
        self.states.get(back_buffer).copied()
    }

    /// Records a move from `before` to `after`, refusing if the image is not
    /// actually in `before`.
    pub fn transition(
        &mut self,
        back_buffer: usize,
        before: ResourceState,
        after: ResourceState,
    ) -> Result<Transition, FrameSyncError> {
        let state = self
            .states
            .get_mut(back_buffer)
            .ok_or(FrameSyncError::BackBufferOutOfRange {
                index: back_buffer,
                count: FRAME_COUNT,
            })?;
        if *state != before {
            return Err(FrameSyncError::BarrierMismatch {
                back_buffer,
                expected: before,
                actual: *state,
            });
        }
        *state = after;
        Ok(Transition {
            back_buffer,
            before,
            after,
        })
    }
}

/// Commands one frame records, in the order `record_frame` issues them.
pub trait FrameCommands {
    fn resource_barrier(&mut self, transition: Transition);
    fn clear_render_target(&mut self, back_buffer: usize, color: [f32; 4]);
    fn clear_depth(&mut self, depth: f32);
    fn draw_model(&mut self);
    fn draw_sprite(&mut self);
    fn draw_overlay(&mut self) -> DemoResult<()>;
}

/// Records one frame into `commands`, bracketed by the barriers that hand
/// `back_buffer` from the presentation engine to the draw path and back.
pub fn record_frame<C: FrameCommands>(
    commands: &mut C,
    states: &mut BackBufferStates,
    back_buffer: usize,
    clear_color: [f32; 4],
) -> DemoResult<()> {
    let acquire = states.transition(
        back_buffer,
        ResourceState::Present,
        ResourceState::RenderTarget,
    )?;
    commands.resource_barrier(acquire);

    commands.clear_render_target(back_buffer, clear_color);
    commands.clear_depth(1.0);
    commands.draw_model();
    commands.draw_sprite();
    let overlay = commands.draw_overlay();

    // The image goes back to the presentation engine even when the overlay
    // failed, so the list stays valid to close.
    let release = states.transition(
        back_buffer,
        ResourceState::RenderTarget,
        ResourceState::Present,
    )?;
    commands.resource_barrier(release);
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    enum Recorded {
        Barrier(Transition),
        Clear(usize),
        ClearDepth,
        Model,
        Sprite,
        Overlay,
    }

    #[derive(Default)]
    struct Recorder {
        commands: Vec<Recorded>,
        fail_overlay: bool,
    }

    impl FrameCommands for Recorder {
        fn resource_barrier(&mut self, transition: Transition) {
            self.commands.push(Recorded::Barrier(transition));
        }
        fn clear_render_target(&mut self, back_buffer: usize, _color: [f32; 4]) {
            self.commands.push(Recorded::Clear(back_buffer));
        }
        fn clear_depth(&mut self, _depth: f32) {
            self.commands.push(Recorded::ClearDepth);
        }
        fn draw_model(&mut self) {
            self.commands.push(Recorded::Model);
        }
        fn draw_sprite(&mut self) {
            self.commands.push(Recorded::Sprite);
        }
        fn draw_overlay(&mut self) -> DemoResult<()> {
            self.commands.push(Recorded::Overlay);
            match self.fail_overlay {
                true => Err(eyre::eyre!("overlay upload failed").into()),
                false => Ok(()),
            }
        }
    }

    #[test]
    fn draws_are_bracketed_by_exactly_one_barrier_each_way() {
        let mut recorder = Recorder::default();
        let mut states = BackBufferStates::default();
        record_frame(&mut recorder, &mut states, 1, [0.0; 4]).unwrap();

        assert_eq!(
            recorder.commands,
            vec![
                Recorded::Barrier(Transition {
                    back_buffer: 1,
                    before: ResourceState::Present,
                    after: ResourceState::RenderTarget,
                }),
                Recorded::Clear(1),
                Recorded::ClearDepth,
                Recorded::Model,
                Recorded::Sprite,
                Recorded::Overlay,
                Recorded::Barrier(Transition {
                    back_buffer: 1,
                    before: ResourceState::RenderTarget,
                    after: ResourceState::Present,
                }),
            ]
        );
        assert_eq!(states.state(0), Some(ResourceState::Present));
        assert_eq!(states.state(1), Some(ResourceState::Present));
    }

    #[test]
    fn alternating_back_buffers_always_return_to_present() {
        let mut states = BackBufferStates::default();
        for frame in 0..6 {
            let mut recorder = Recorder::default();
            record_frame(&mut recorder, &mut states, frame % FRAME_COUNT, [0.0; 4]).unwrap();
            let barriers = recorder
                .commands
                .iter()
                .filter(|c| matches!(c, Recorded::Barrier(_)))
                .count();
            assert_eq!(barriers, 2);
        }
        assert!((0..FRAME_COUNT).all(|i| states.state(i) == Some(ResourceState::Present)));
    }

    #[test]
    fn double_acquire_is_rejected() {
        let mut states = BackBufferStates::default();
        states
            .transition(0, ResourceState::Present, ResourceState::RenderTarget)
            .unwrap();
        assert_eq!(
            states.transition(0, ResourceState::Present, ResourceState::RenderTarget),
            Err(FrameSyncError::BarrierMismatch {
                back_buffer: 0,
                expected: ResourceState::Present,
                actual: ResourceState::RenderTarget,
            })
        );
    }

    #[test]
    fn unknown_back_buffer_is_rejected_before_recording() {
        let mut recorder = Recorder::default();
        let mut states = BackBufferStates::default();
        assert!(record_frame(&mut recorder, &mut states, 2, [0.0; 4]).is_err());
        assert!(recorder.commands.is_empty());
    }

    #[test]
    fn failed_overlay_still_releases_the_back_buffer() {
        let mut recorder = Recorder {
            fail_overlay: true,
            ..Default::default()
        };
        let mut states = BackBufferStates::default();
        assert!(record_frame(&mut recorder, &mut states, 0, [0.0; 4]).is_err());
        assert_eq!(states.state(0), Some(ResourceState::Present));
        assert!(matches!(recorder.commands.last(), Some(Recorded::Barrier(_))));
    }
}
