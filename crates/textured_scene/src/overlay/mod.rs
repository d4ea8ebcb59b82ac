//! Immediate-mode debug UI drawn on top of the scene.
//!
//! The window procedure feeds an [`OverlayInput`], [`Overlay::run`] turns it
//! into the frame's packed geometry, and the renderer uploads the
//! [`OverlayAtlas`] whenever it reports a change.

mod atlas;
mod draw_list;
mod input;
mod settings;

use std::time::Instant;

pub use atlas::OverlayAtlas;
pub use draw_list::OverlayDraw;
pub use draw_list::OverlayDrawList;
pub use draw_list::OverlayVertex;
pub use draw_list::ScissorRect;
pub use input::key_from_virtual_key;
pub use input::OverlayInput;
pub use settings::settings_window;
pub use settings::SceneSettings;

pub struct Overlay {
    context: egui::Context,
    atlas: OverlayAtlas,
    started: Instant,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            context: egui::Context::default(),
            atlas: OverlayAtlas::default(),
            started: Instant::now(),
        }
    }
}

impl Overlay {
    pub fn atlas_mut(&mut self) -> &mut OverlayAtlas {
        &mut self.atlas
    }

    pub fn wants_pointer_input(&self) -> bool {
        self.context.wants_pointer_input()
    }

    pub fn wants_keyboard_input(&self) -> bool {
        self.context.wants_keyboard_input()
    }

    /// Runs one UI pass over `settings` with everything `input` collected
    /// since the last pass, and returns what to draw.
    pub fn run(
        &mut self,
        input: &mut OverlayInput,
        screen: [u32; 2],
        settings: &mut SceneSettings,
    ) -> OverlayDrawList {
        let time = self.started.elapsed().as_secs_f64();
        let raw_input = input.take_raw_input(screen[0], screen[1], time);
        let output = self.context.run(raw_input, |ctx| settings_window(ctx, settings));

        self.atlas.apply(&output.textures_delta);
        let primitives = self.context.tessellate(output.shapes, output.pixels_per_point);
        OverlayDrawList::build(&primitives, output.pixels_per_point, screen)
    }
}
