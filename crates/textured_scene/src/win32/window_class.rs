use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::demo_error::DemoResult;

/// Routes the messages of one window class to a data block owned by the
/// window.
pub trait WindowClass {
    type WindowData;

    /// Returns true when the message was consumed and must not reach
    /// `DefWindowProcW`.
    fn handle(
        data: &mut Self::WindowData,
        window: HWND,
        message: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> bool;
}

pub fn create_window_class_struct<W: WindowClass>(
    instance: HMODULE,
    class_name: PCWSTR,
) -> DemoResult<WNDCLASSEXW> {
    // WNDCLASSEXW - https://learn.microsoft.com/en-us/windows/win32/api/winuser/ns-winuser-wndclassexw
    Ok(WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc::<W>),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
        lpszClassName: class_name,
        ..Default::default()
    })
}

extern "system" fn wndproc<W: WindowClass>(
    window: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match message {
        WM_CREATE => {
            unsafe {
                let create_struct: &CREATESTRUCTW = &*(lparam.0 as *const CREATESTRUCTW);
                SetWindowLongPtrW(window, GWLP_USERDATA, create_struct.lpCreateParams as _);
            }
            return LRESULT(0);
        }
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            return LRESULT(0);
        }
        WM_NCDESTROY => {
            unsafe { SetWindowLongPtrW(window, GWLP_USERDATA, 0) };
        }
        _ => {}
    }

    let user_data = unsafe { GetWindowLongPtrW(window, GWLP_USERDATA) };
    // Messages can arrive before WM_CREATE and after WM_NCDESTROY.
    let handled = match std::ptr::NonNull::<W::WindowData>::new(user_data as *mut W::WindowData) {
        Some(mut data) => W::handle(unsafe { data.as_mut() }, window, message, wparam, lparam),
        None => false,
    };

    if handled {
        LRESULT(0)
    } else {
        unsafe { DefWindowProcW(window, message, wparam, lparam) }
    }
}
