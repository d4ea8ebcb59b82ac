use std::ptr::NonNull;

use tracing::warn;
use windows::core::HSTRING;
use windows::Win32::Foundation::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use super::window_class::WindowClass;
use super::window_class_id::ClassIdAtom;
use crate::demo_error::DemoResult;

/// A top-level window and the data block its window procedure writes into.
///
/// The window is destroyed before the data is freed, so the procedure never
/// sees a dangling pointer.
pub struct OwnedWindow<W: WindowClass> {
    hwnd: HWND,
    data: NonNull<W::WindowData>,
}

impl<W: WindowClass> OwnedWindow<W> {
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Only call between message dispatches; the window procedure borrows
    /// the same data while a message is being handled.
    pub fn data_mut(&mut self) -> &mut W::WindowData {
        unsafe { self.data.as_mut() }
    }

    pub fn show(&self) {
        unsafe { _ = ShowWindow(self.hwnd, SW_SHOW) };
    }
}

impl<W: WindowClass> Drop for OwnedWindow<W> {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(Some(self.hwnd)).as_bool() {
                if let Err(error) = DestroyWindow(self.hwnd) {
                    warn!("DestroyWindow failed: {error}");
                }
            }
            drop(Box::from_raw(self.data.as_ptr()));
        }
    }
}

/// Creates an overlapped window whose client area is `client_width` by
/// `client_height`.
pub fn create_window<W: WindowClass>(
    our_module: HMODULE,
    class: &ClassIdAtom,
    title: &HSTRING,
    client_width: u32,
    client_height: u32,
    window_data: W::WindowData,
) -> DemoResult<OwnedWindow<W>> {
    let mut window_rect = RECT {
        left: 0,
        top: 0,
        right: client_width as i32,
        bottom: client_height as i32,
    };
    unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false)? };

    let data = NonNull::from(Box::leak(Box::new(window_data)));
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class,
            title,
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            window_rect.right - window_rect.left,
            window_rect.bottom - window_rect.top,
            None,
            None,
            Some(our_module.into()),
            Some(data.as_ptr() as _),
        )
    };
    match hwnd {
        Ok(hwnd) => Ok(OwnedWindow { hwnd, data }),
        Err(error) => {
            drop(unsafe { Box::from_raw(data.as_ptr()) });
            Err(error.into())
        }
    }
}
