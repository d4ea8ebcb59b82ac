use windows::Win32::UI::Input::KeyboardAndMouse::GetKeyboardState;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::demo_error::DemoResult;
use crate::keyboard::KeyboardState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpResult {
    Continue,
    Quit,
}

/// Dispatches every pending message for this thread without blocking.
pub fn pump_messages() -> PumpResult {
    let mut message = MSG::default();
    let mut result = PumpResult::Continue;
    while unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) }.as_bool() {
        if message.message == WM_QUIT {
            result = PumpResult::Quit;
        }
        unsafe {
            _ = TranslateMessage(&message);
            DispatchMessageW(&message);
        }
    }
    result
}

/// Takes this frame's snapshot of all virtual keys.
pub fn poll_keyboard(keyboard: &mut KeyboardState) -> DemoResult<()> {
    let mut raw = [0u8; 256];
    unsafe { GetKeyboardState(&mut raw)? };
    keyboard.update(&raw);
    Ok(())
}
