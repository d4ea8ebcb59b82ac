use egui::epaint::Primitive;
use egui::ClippedPrimitive;
use tracing::debug;

use super::atlas::OverlayAtlas;

/// `POSITION` float2, `TEXCOORD` float2, `COLOR` unorm4 (premultiplied sRGB).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

/// Scissor in physical pixels; `left < right`, `top < bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScissorRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayDraw {
    pub scissor: ScissorRect,
    pub first_index: u32,
    pub index_count: u32,
    pub base_vertex: i32,
}

/// All overlay meshes of one frame packed into a single vertex and index
/// stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayDrawList {
    pub vertices: Vec<OverlayVertex>,
    pub indices: Vec<u32>,
    pub draws: Vec<OverlayDraw>,
}

impl OverlayDrawList {
    pub fn build(primitives: &[ClippedPrimitive], pixels_per_point: f32, screen: [u32; 2]) -> Self {
        let mut list = Self::default();
        for ClippedPrimitive {
            clip_rect,
            primitive,
        } in primitives
        {
            let mesh = match primitive {
                Primitive::Mesh(mesh) => mesh,
                Primitive::Callback(_) => {
                    debug!("skipping paint callback");
                    continue;
                }
            };
            if mesh.texture_id != OverlayAtlas::TEXTURE_ID {
                debug!(texture_id = ?mesh.texture_id, "skipping mesh with unknown texture");
                continue;
            }
            if mesh.indices.is_empty() {
                continue;
            }

            let to_pixels = |value: f32, limit: u32| {
                (value * pixels_per_point).round().clamp(0.0, limit as f32) as u32
            };
            let scissor = ScissorRect {
                left: to_pixels(clip_rect.min.x, screen[0]),
                top: to_pixels(clip_rect.min.y, screen[1]),
                right: to_pixels(clip_rect.max.x, screen[0]),
                bottom: to_pixels(clip_rect.max.y, screen[1]),
            };
            if scissor.left >= scissor.right || scissor.top >= scissor.bottom {
                continue;
            }

            list.draws.push(OverlayDraw {
                scissor,
                first_index: list.indices.len() as u32,
                index_count: mesh.indices.len() as u32,
                base_vertex: list.vertices.len() as i32,
            });
            list.indices.extend_from_slice(&mesh.indices);
            list.vertices.extend(mesh.vertices.iter().map(|vertex| OverlayVertex {
                position: [vertex.pos.x * pixels_per_point, vertex.pos.y * pixels_per_point],
                uv: [vertex.uv.x, vertex.uv.y],
                color: vertex.color.to_array(),
            }));
        }
        list
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::epaint::Mesh;
    use egui::epaint::Vertex;
    use egui::epaint::WHITE_UV;
    use egui::Color32;
    use egui::Pos2;
    use egui::Rect;
    use egui::TextureId;
    use pretty_assertions::assert_eq;

    // `Mesh::colored_vertex` only accepts the default texture, so vertices
    // are pushed directly.
    fn triangle(texture_id: TextureId) -> Mesh {
        let mut mesh = Mesh::with_texture(texture_id);
        for pos in [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0), Pos2::new(0.0, 10.0)] {
            mesh.vertices.push(Vertex {
                pos,
                uv: WHITE_UV,
                color: Color32::WHITE,
            });
        }
        mesh.add_triangle(0, 1, 2);
        mesh
    }

    fn clipped(rect: Rect, mesh: Mesh) -> ClippedPrimitive {
        ClippedPrimitive {
            clip_rect: rect,
            primitive: Primitive::Mesh(mesh),
        }
    }

    #[test]
    fn meshes_are_packed_with_offsets() {
        let screen = Rect::from_min_max(Pos2::ZERO, Pos2::new(100.0, 100.0));
        let list = OverlayDrawList::build(
            &[
                clipped(screen, triangle(OverlayAtlas::TEXTURE_ID)),
                clipped(screen, triangle(OverlayAtlas::TEXTURE_ID)),
            ],
            1.0,
            [100, 100],
        );
        assert_eq!(list.vertices.len(), 6);
        assert_eq!(list.indices, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(
            list.draws.iter().map(|d| (d.first_index, d.base_vertex)).collect::<Vec<_>>(),
            vec![(0, 0), (3, 3)]
        );
    }

    #[test]
    fn clip_rects_are_scaled_and_clamped() {
        let rect = Rect::from_min_max(Pos2::new(-5.0, 2.0), Pos2::new(400.0, 30.0));
        let list = OverlayDrawList::build(
            &[clipped(rect, triangle(OverlayAtlas::TEXTURE_ID))],
            2.0,
            [640, 480],
        );
        assert_eq!(
            list.draws[0].scissor,
            ScissorRect {
                left: 0,
                top: 4,
                right: 640,
                bottom: 60
            }
        );
        assert_eq!(list.vertices[1].position, [20.0, 0.0]);
    }

    #[test]
    fn empty_clips_and_foreign_textures_are_skipped() {
        let offscreen = Rect::from_min_max(Pos2::new(200.0, 0.0), Pos2::new(300.0, 10.0));
        let screen = Rect::from_min_max(Pos2::ZERO, Pos2::new(100.0, 100.0));
        let list = OverlayDrawList::build(
            &[
                clipped(offscreen, triangle(OverlayAtlas::TEXTURE_ID)),
                clipped(screen, triangle(TextureId::User(3))),
            ],
            1.0,
            [100, 100],
        );
        assert!(list.is_empty());
        assert!(list.vertices.is_empty());
    }
}
