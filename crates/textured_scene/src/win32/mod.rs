mod create_window;
mod message_pump;
mod scene_window;
mod window_class;
mod window_class_id;

pub use create_window::create_window;
pub use create_window::OwnedWindow;
pub use message_pump::poll_keyboard;
pub use message_pump::pump_messages;
pub use message_pump::PumpResult;
pub use scene_window::SceneWindow;
pub use scene_window::SceneWindowData;
pub use window_class::create_window_class_struct;
pub use window_class::WindowClass;
pub use window_class_id::register_window_class;
pub use window_class_id::ClassIdAtom;

use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::GetModuleHandleExW;

use crate::demo_error::DemoResult;

pub fn get_handle_to_file_used_to_create_the_calling_process() -> DemoResult<HMODULE> {
    let mut out = Default::default();
    unsafe { GetModuleHandleExW(Default::default(), None, &mut out)? };
    Ok(out)
}
