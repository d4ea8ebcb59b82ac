use windows::core::Param;
use windows::core::ParamValue;
use windows::core::PCWSTR;
use windows::Win32::UI::WindowsAndMessaging::RegisterClassExW;
use windows::Win32::UI::WindowsAndMessaging::WNDCLASSEXW;

use crate::demo_error::DemoResult;

/// Equivalent to the MAKEINTATOM macro: the atom in the low word of a
/// class-name pointer.
///
/// https://learn.microsoft.com/en-us/windows/win32/api/winbase/nf-winbase-makeintatom
#[allow(non_snake_case)]
pub fn MAKEINTOATOM(atom: u16) -> PCWSTR {
    PCWSTR(atom as usize as *const u16)
}

/// A registered window class, usable wherever a class name is expected.
pub struct ClassIdAtom(u16);

impl Param<PCWSTR> for &ClassIdAtom {
    unsafe fn param(self) -> ParamValue<PCWSTR> {
        ParamValue::Owned(MAKEINTOATOM(self.0))
    }
}

pub fn register_window_class(class: &WNDCLASSEXW) -> DemoResult<ClassIdAtom> {
    let atom = unsafe { RegisterClassExW(class) };
    if atom == 0 {
        return Err(windows::core::Error::from_win32().into());
    }
    Ok(ClassIdAtom(atom))
}
