use bevy_math::EulerRot;
use bevy_math::Mat4;
use bevy_math::Quat;
use bevy_math::Vec3;

/// Scale, per-axis rotation in radians, and translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    pub rotate: Vec3,
    pub translate: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotate: Vec3::ZERO,
            translate: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn from_translation(translate: Vec3) -> Self {
        Self {
            translate,
            ..Default::default()
        }
    }

    /// Scale first, then rotate about X, Y and Z in that order, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::ZYX, self.rotate.z, self.rotate.y, self.rotate.x);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translate)
    }
}

/// Left-handed perspective projection, depth mapped to `0..=1`.
pub fn perspective_fov(fov_y: f32, aspect_ratio: f32, near_clip: f32, far_clip: f32) -> Mat4 {
    Mat4::perspective_lh(fov_y, aspect_ratio, near_clip, far_clip)
}

/// Left-handed off-center orthographic projection in pixel space with the
/// origin at the top-left corner.
pub fn orthographic(
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    near_clip: f32,
    far_clip: f32,
) -> Mat4 {
    Mat4::orthographic_lh(left, right, bottom, top, near_clip, far_clip)
}

/// `world`, then `view`, then `projection`.
pub fn world_view_projection(world: Mat4, view: Mat4, projection: Mat4) -> Mat4 {
    projection * view * world
}

/// Camera and projections shared by the model and sprite passes.
#[derive(Clone, Copy, Debug)]
pub struct SceneCamera {
    pub transform: Transform,
    pub fov_y: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl SceneCamera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            transform: Transform::from_translation(Vec3::new(0.0, 0.0, -5.0)),
            fov_y: 0.45,
            viewport_width: viewport_width as f32,
            viewport_height: viewport_height as f32,
        }
    }

    pub fn view(&self) -> Mat4 {
        self.transform.to_matrix().inverse()
    }

    pub fn projection(&self) -> Mat4 {
        perspective_fov(
            self.fov_y,
            self.viewport_width / self.viewport_height,
            0.1,
            100.0,
        )
    }

    pub fn sprite_projection(&self) -> Mat4 {
        orthographic(0.0, 0.0, self.viewport_width, self.viewport_height, 0.0, 100.0)
    }

    pub fn model_wvp(&self, model: &Transform) -> Mat4 {
        world_view_projection(model.to_matrix(), self.view(), self.projection())
    }

    pub fn sprite_wvp(&self, sprite: &Transform) -> Mat4 {
        world_view_projection(sprite.to_matrix(), Mat4::IDENTITY, self.sprite_projection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_math::Vec4;

    #[test]
    fn identity_wvp_keeps_positions() {
        let wvp = world_view_projection(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        for position in [
            Vec4::new(-1.0, 1.0, 0.0, 1.0),
            Vec4::new(0.25, -3.5, 7.0, 1.0),
        ] {
            assert_eq!(wvp * position, position);
        }
        assert_eq!(Transform::default().to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn affine_scales_before_translating() {
        let transform = Transform {
            scale: Vec3::splat(2.0),
            rotate: Vec3::ZERO,
            translate: Vec3::new(1.0, 0.0, 0.0),
        };
        let moved = transform.to_matrix().transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!(moved.abs_diff_eq(Vec3::new(3.0, 2.0, 2.0), 1e-6));
    }

    #[test]
    fn rotation_applies_x_before_y() {
        let transform = Transform {
            rotate: Vec3::new(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2, 0.0),
            ..Default::default()
        };
        // +Y goes to +Z about X, then +Z goes to +X about Y.
        let rotated = transform.to_matrix().transform_vector3(Vec3::Y);
        assert!(rotated.abs_diff_eq(Vec3::X, 1e-6), "{rotated}");
    }

    #[test]
    fn camera_looks_down_positive_z() {
        let camera = SceneCamera::new(1280, 720);
        let clip = camera.model_wvp(&Transform::default()) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn sprite_projection_maps_pixels_to_clip_space() {
        let camera = SceneCamera::new(1280, 720);
        let wvp = camera.sprite_wvp(&Transform::default());
        let top_left = wvp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = wvp * Vec4::new(1280.0, 720.0, 0.0, 1.0);
        assert!(top_left.truncate().abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-6));
        assert!(bottom_right.truncate().abs_diff_eq(Vec3::new(1.0, -1.0, 0.0), 1e-6));
    }
}
