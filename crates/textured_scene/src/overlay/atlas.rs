use egui::ImageData;
use egui::TextureId;
use egui::TexturesDelta;
use tracing::debug;
use tracing::warn;

/// CPU copy of the UI font atlas, premultiplied sRGBA8.
#[derive(Default)]
pub struct OverlayAtlas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    dirty: bool,
}

impl OverlayAtlas {
    pub const TEXTURE_ID: TextureId = TextureId::Managed(0);

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn row_pitch(&self) -> usize {
        self.width * 4
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// True once per change; the caller re-uploads when it sees it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn apply(&mut self, delta: &TexturesDelta) {
        for (id, image_delta) in &delta.set {
            if *id != Self::TEXTURE_ID {
                debug!(?id, "ignoring user texture");
                continue;
            }
            let (size, texels) = flatten(&image_delta.image);
            match image_delta.pos {
                None => self.replace(size, texels),
                Some(origin) => self.patch(origin, size, &texels),
            }
        }
        if delta.free.contains(&Self::TEXTURE_ID) {
            *self = Self::default();
        }
    }

    fn replace(&mut self, [width, height]: [usize; 2], texels: Vec<u8>) {
        self.width = width;
        self.height = height;
        self.pixels = texels;
        self.dirty = true;
    }

    fn patch(&mut self, [x, y]: [usize; 2], [width, height]: [usize; 2], texels: &[u8]) {
        if x + width > self.width || y + height > self.height {
            warn!(
                x,
                y,
                width,
                height,
                atlas_width = self.width,
                atlas_height = self.height,
                "font atlas patch outside the atlas"
            );
            return;
        }
        let row_bytes = width * 4;
        let row_pitch = self.row_pitch();
        for (row, source) in texels.chunks_exact(row_bytes).enumerate() {
            let start = (y + row) * row_pitch + x * 4;
            self.pixels[start..start + row_bytes].copy_from_slice(source);
        }
        self.dirty = true;
    }
}

fn flatten(image: &ImageData) -> ([usize; 2], Vec<u8>) {
    match image {
        ImageData::Color(color) => (
            color.size,
            color.pixels.iter().flat_map(|c| c.to_array()).collect(),
        ),
        ImageData::Font(font) => (
            font.size,
            font.srgba_pixels(None).flat_map(|c| c.to_array()).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;
    use egui::ColorImage;
    use egui::epaint::ImageDelta;
    use egui::TextureOptions;
    use pretty_assertions::assert_eq;

    fn solid(size: [usize; 2], color: Color32) -> ImageData {
        ImageData::Color(std::sync::Arc::new(ColorImage::new(size, color)))
    }

    fn delta_for(id: TextureId, delta: ImageDelta) -> TexturesDelta {
        TexturesDelta {
            set: vec![(id, delta)],
            free: Vec::new(),
        }
    }

    #[test]
    fn full_then_partial_update() {
        let mut atlas = OverlayAtlas::default();
        atlas.apply(&delta_for(
            OverlayAtlas::TEXTURE_ID,
            ImageDelta::full(solid([4, 2], Color32::BLACK), TextureOptions::LINEAR),
        ));
        assert!(atlas.take_dirty());
        assert!(!atlas.take_dirty());
        assert_eq!((atlas.width(), atlas.height()), (4, 2));

        atlas.apply(&delta_for(
            OverlayAtlas::TEXTURE_ID,
            ImageDelta::partial([1, 1], solid([2, 1], Color32::WHITE), TextureOptions::LINEAR),
        ));
        assert!(atlas.take_dirty());
        let row1 = &atlas.pixels()[atlas.row_pitch()..];
        assert_eq!(&row1[..4], &[0, 0, 0, 255]);
        assert_eq!(&row1[4..12], &[255; 8]);
        assert_eq!(&row1[12..], &[0, 0, 0, 255]);
    }

    #[test]
    fn out_of_bounds_patch_is_dropped() {
        let mut atlas = OverlayAtlas::default();
        atlas.apply(&delta_for(
            OverlayAtlas::TEXTURE_ID,
            ImageDelta::full(solid([2, 2], Color32::BLACK), TextureOptions::LINEAR),
        ));
        atlas.take_dirty();
        atlas.apply(&delta_for(
            OverlayAtlas::TEXTURE_ID,
            ImageDelta::partial([1, 1], solid([2, 2], Color32::WHITE), TextureOptions::LINEAR),
        ));
        assert!(!atlas.take_dirty());
        assert!(atlas.pixels().chunks(4).all(|texel| texel == [0, 0, 0, 255]));
    }

    #[test]
    fn user_textures_are_ignored() {
        let mut atlas = OverlayAtlas::default();
        atlas.apply(&delta_for(
            TextureId::User(7),
            ImageDelta::full(solid([2, 2], Color32::WHITE), TextureOptions::LINEAR),
        ));
        assert!(atlas.is_empty());
        assert!(!atlas.take_dirty());
    }

    #[test]
    fn first_ui_frame_produces_a_font_atlas() {
        let context = egui::Context::default();
        let output = context.run(egui::RawInput::default(), |ctx| {
            egui::Window::new("probe").show(ctx, |ui| ui.label("text"));
        });
        let mut atlas = OverlayAtlas::default();
        atlas.apply(&output.textures_delta);
        assert!(atlas.take_dirty());
        assert_eq!(atlas.pixels().len(), atlas.width() * atlas.height() * 4);
    }
}
