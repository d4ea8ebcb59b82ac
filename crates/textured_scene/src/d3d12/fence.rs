use tracing::warn;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::*;

use crate::demo_error::DemoResult;
use crate::frame_sync::CompletionFence;

/// Auto-reset Win32 event the fence fires when it reaches a value.
struct FenceEvent(HANDLE);

impl FenceEvent {
    fn new() -> DemoResult<Self> {
        let event = unsafe { CreateEventW(None, false, false, None)? };
        if event.is_invalid() {
            return Err(windows::core::Error::from_win32().into());
        }
        Ok(Self(event))
    }
}

impl Drop for FenceEvent {
    fn drop(&mut self) {
        if let Err(error) = unsafe { CloseHandle(self.0) } {
            warn!("CloseHandle on fence event failed: {error}");
        }
    }
}

pub struct D3D12Fence {
    fence: ID3D12Fence,
    event: FenceEvent,
}

impl D3D12Fence {
    pub fn new(device: &ID3D12Device) -> DemoResult<Self> {
        let fence: ID3D12Fence = unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE)? };
        Ok(Self {
            fence,
            event: FenceEvent::new()?,
        })
    }

    pub fn fence(&self) -> &ID3D12Fence {
        &self.fence
    }
}

impl CompletionFence for D3D12Fence {
    fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    fn wait_for_value(&self, value: u64) -> DemoResult<()> {
        unsafe {
            self.fence.SetEventOnCompletion(value, self.event.0)?;
            if WaitForSingleObject(self.event.0, INFINITE) == WAIT_FAILED {
                return Err(windows::core::Error::from_win32().into());
            }
        }
        Ok(())
    }
}
