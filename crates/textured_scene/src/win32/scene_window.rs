use egui::PointerButton;
use windows::Win32::Foundation::*;
use windows::Win32::UI::Input::KeyboardAndMouse::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use super::window_class::WindowClass;
use crate::overlay::OverlayInput;

/// Window data of the demo window: input collected for the overlay, and
/// whether the overlay claimed pointer or keyboard input last frame.
#[derive(Default)]
pub struct SceneWindowData {
    pub input: OverlayInput,
    pub overlay_wants_pointer: bool,
    pub overlay_wants_keyboard: bool,
    tracking_mouse_leave: bool,
}

pub struct SceneWindow;

impl WindowClass for SceneWindow {
    type WindowData = SceneWindowData;

    fn handle(
        data: &mut SceneWindowData,
        window: HWND,
        message: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> bool {
        match message {
            WM_MOUSEMOVE => {
                if !data.tracking_mouse_leave {
                    let mut track = TRACKMOUSEEVENT {
                        cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
                        dwFlags: TME_LEAVE,
                        hwndTrack: window,
                        dwHoverTime: 0,
                    };
                    data.tracking_mouse_leave = unsafe { TrackMouseEvent(&mut track) }.is_ok();
                }
                let (x, y) = cursor_position(lparam);
                data.input.pointer_moved(x, y);
                data.overlay_wants_pointer
            }
            WM_MOUSELEAVE => {
                data.tracking_mouse_leave = false;
                data.input.pointer_left();
                false
            }
            WM_LBUTTONDOWN | WM_LBUTTONUP => {
                button(data, PointerButton::Primary, message == WM_LBUTTONDOWN)
            }
            WM_RBUTTONDOWN | WM_RBUTTONUP => {
                button(data, PointerButton::Secondary, message == WM_RBUTTONDOWN)
            }
            WM_MBUTTONDOWN | WM_MBUTTONUP => {
                button(data, PointerButton::Middle, message == WM_MBUTTONDOWN)
            }
            WM_MOUSEWHEEL | WM_MOUSEHWHEEL => {
                let delta = (wparam.0 >> 16) as u16 as i16;
                data.input
                    .wheel(delta as f32 / WHEEL_DELTA as f32, message == WM_MOUSEHWHEEL);
                data.overlay_wants_pointer
            }
            WM_CHAR => {
                data.input.utf16_unit(wparam.0 as u16);
                data.overlay_wants_keyboard
            }
            WM_KEYDOWN | WM_KEYUP => {
                let repeat = lparam.0 & (1 << 30) != 0;
                data.input
                    .virtual_key(wparam.0 as u16, message == WM_KEYDOWN, repeat);
                data.overlay_wants_keyboard
            }
            // Always fall through so Alt+F4 and the system menu keep working.
            WM_SYSKEYDOWN | WM_SYSKEYUP => {
                data.input
                    .virtual_key(wparam.0 as u16, message == WM_SYSKEYDOWN, false);
                false
            }
            _ => false,
        }
    }
}

fn button(data: &mut SceneWindowData, button: PointerButton, pressed: bool) -> bool {
    data.input.pointer_button(button, pressed);
    data.overlay_wants_pointer
}

/// Signed client coordinates packed into the low and high words.
fn cursor_position(lparam: LPARAM) -> (f32, f32) {
    let x = (lparam.0 & 0xFFFF) as u16 as i16;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16;
    (x as f32, y as f32)
}
