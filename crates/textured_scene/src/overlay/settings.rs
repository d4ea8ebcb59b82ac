use bevy_math::Vec3;
use egui::DragValue;

use crate::math::Transform;

/// Everything the debug UI is allowed to change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSettings {
    pub material_color: [f32; 4],
    pub model: Transform,
    pub sprite: Transform,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            material_color: [1.0, 1.0, 1.0, 1.0],
            model: Transform::default(),
            sprite: Transform::default(),
        }
    }
}

pub fn settings_window(ctx: &egui::Context, settings: &mut SceneSettings) {
    egui::Window::new("Settings").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label("color");
            ui.color_edit_button_rgba_unmultiplied(&mut settings.material_color);
        });
        ui.horizontal(|ui| {
            ui.label("rotate.y");
            ui.add(DragValue::new(&mut settings.model.rotate.y).speed(0.1));
        });
        ui.horizontal(|ui| {
            ui.label("translate");
            drag_vec3(ui, &mut settings.model.translate, 0.1);
        });
        ui.horizontal(|ui| {
            ui.label("sprite");
            ui.add(DragValue::new(&mut settings.sprite.translate.x).speed(1.0));
            ui.add(DragValue::new(&mut settings.sprite.translate.y).speed(1.0));
        });
    });
}

fn drag_vec3(ui: &mut egui::Ui, value: &mut Vec3, speed: f64) {
    ui.add(DragValue::new(&mut value.x).speed(speed));
    ui.add(DragValue::new(&mut value.y).speed(speed));
    ui.add(DragValue::new(&mut value.z).speed(speed));
}
