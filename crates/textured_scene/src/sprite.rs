use crate::model::VertexData;

/// Top-left anchored 640×360 quad in pixel space.
pub const SPRITE_VERTICES: [VertexData; 4] = [
    VertexData {
        position: [0.0, 360.0, 0.0, 1.0],
        texcoord: [0.0, 1.0],
    },
    VertexData {
        position: [0.0, 0.0, 0.0, 1.0],
        texcoord: [0.0, 0.0],
    },
    VertexData {
        position: [640.0, 360.0, 0.0, 1.0],
        texcoord: [1.0, 1.0],
    },
    VertexData {
        position: [640.0, 0.0, 0.0, 1.0],
        texcoord: [1.0, 0.0],
    },
];

pub const SPRITE_INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::SceneCamera;
    use crate::math::Transform;
    use bevy_math::Vec2;
    use bevy_math::Vec3;
    use bevy_math::Vec4;

    fn clip_xy(index: u32) -> Vec2 {
        let camera = SceneCamera::new(1280, 720);
        let wvp = camera.sprite_wvp(&Transform::default());
        let clip = wvp * Vec4::from_array(SPRITE_VERTICES[index as usize].position);
        clip.truncate().truncate()
    }

    #[test]
    fn triangles_are_clockwise_on_screen() {
        for triangle in SPRITE_INDICES.chunks(3) {
            let [a, b, c] = [clip_xy(triangle[0]), clip_xy(triangle[1]), clip_xy(triangle[2])];
            // Negative signed area in a Y-up space is clockwise.
            assert!((b - a).perp_dot(c - a) < 0.0, "{triangle:?}");
        }
    }

    #[test]
    fn quad_covers_the_top_left_quarter() {
        let corners: Vec<Vec3> = (0..4).map(|i| clip_xy(i).extend(0.0)).collect();
        for expected in [Vec3::new(-1.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0)] {
            assert!(
                corners.iter().any(|corner| corner.abs_diff_eq(expected, 1e-5)),
                "{expected} not in {corners:?}"
            );
        }
    }
}
