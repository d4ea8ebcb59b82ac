use tracing::info;
use tracing::warn;
use windows::core::Interface;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use super::descriptor_heap::DescriptorHeap;
use super::device::GpuDevice;
use super::fence::D3D12Fence;
use super::pipeline::RENDER_TARGET_FORMAT;
use super::upload::create_depth_buffer;
use crate::config::DemoConfig;
use crate::demo_error::is_device_lost_code;
use crate::demo_error::DemoResult;
use crate::demo_error::DeviceError;
use crate::frame::FrameBackend;
use crate::frame_record::FRAME_COUNT;

pub const SRV_HEAP_CAPACITY: u32 = 128;

/// Everything the frame loop records into and submits through: one queue,
/// one allocator and list, the swap chain and its views, and the depth
/// buffer.
pub struct RenderContext {
    pub device: ID3D12Device,
    pub command_queue: ID3D12CommandQueue,
    pub command_allocator: ID3D12CommandAllocator,
    pub command_list: ID3D12GraphicsCommandList,
    pub swap_chain: IDXGISwapChain3,
    pub render_targets: Vec<ID3D12Resource>,
    pub rtv_heap: DescriptorHeap,
    pub srv_heap: DescriptorHeap,
    pub dsv_heap: DescriptorHeap,
    pub depth_buffer: ID3D12Resource,
    pub viewport: D3D12_VIEWPORT,
    pub scissor_rect: RECT,
    sync_interval: u32,
}

impl RenderContext {
    pub fn bind_to_window(gpu: &GpuDevice, hwnd: HWND, config: &DemoConfig) -> DemoResult<Self> {
        let device = gpu.device.clone();
        let (width, height) = (config.client_width, config.client_height);

        let command_queue: ID3D12CommandQueue = unsafe {
            device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                ..Default::default()
            })?
        };
        let command_allocator: ID3D12CommandAllocator =
            unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)? };
        let command_list: ID3D12GraphicsCommandList = unsafe {
            device.CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &command_allocator, None)?
        };
        // The frame loop expects a closed list it can reset.
        unsafe { command_list.Close()? };

        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
            BufferCount: FRAME_COUNT as u32,
            Width: width,
            Height: height,
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let swap_chain: IDXGISwapChain3 = unsafe {
            gpu.factory
                .CreateSwapChainForHwnd(&command_queue, hwnd, &swap_chain_desc, None, None)?
        }
        .cast()?;
        unsafe { gpu.factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER)? };

        let rtv_heap = DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
            FRAME_COUNT as u32,
            false,
        )?;
        let srv_heap = DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            SRV_HEAP_CAPACITY,
            true,
        )?;
        let dsv_heap = DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_DSV, 1, false)?;

        // The swap chain stores UNORM; the views write sRGB-encoded values.
        let rtv_desc = D3D12_RENDER_TARGET_VIEW_DESC {
            Format: RENDER_TARGET_FORMAT,
            ViewDimension: D3D12_RTV_DIMENSION_TEXTURE2D,
            ..Default::default()
        };
        let mut render_targets = Vec::with_capacity(FRAME_COUNT);
        for i in 0..FRAME_COUNT {
            let resource: ID3D12Resource = unsafe { swap_chain.GetBuffer(i as u32)? };
            let handle = rtv_heap.cpu_handle(i as u32);
            unsafe { device.CreateRenderTargetView(&resource, Some(&rtv_desc), handle) };
            render_targets.push(resource);
        }

        let depth_buffer = create_depth_buffer(&device, width, height, dsv_heap.cpu_handle(0))?;

        let viewport = D3D12_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: width as f32,
            Height: height as f32,
            MinDepth: D3D12_MIN_DEPTH,
            MaxDepth: D3D12_MAX_DEPTH,
        };
        let scissor_rect = RECT {
            left: 0,
            top: 0,
            right: width as i32,
            bottom: height as i32,
        };

        info!(width, height, "render context bound to window");
        Ok(Self {
            device,
            command_queue,
            command_allocator,
            command_list,
            swap_chain,
            render_targets,
            rtv_heap,
            srv_heap,
            dsv_heap,
            depth_buffer,
            viewport,
            scissor_rect,
            sync_interval: config.sync_interval,
        })
    }

    pub fn create_fence(&self) -> DemoResult<D3D12Fence> {
        D3D12Fence::new(&self.device)
    }

    pub fn rtv_handle(&self, back_buffer: usize) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        self.rtv_heap.cpu_handle(back_buffer as u32)
    }

    pub fn dsv_handle(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        self.dsv_heap.cpu_handle(0)
    }

    /// Turns a device-removed HRESULT into `DeviceError::Lost` carrying the
    /// reason the device reports; other errors pass through.
    fn check(&self, result: windows::core::Result<()>) -> DemoResult<()> {
        let Err(error) = result else {
            return Ok(());
        };
        let hresult = error.code().0 as u32;
        if !is_device_lost_code(hresult) {
            return Err(error.into());
        }
        let reason = match unsafe { self.device.GetDeviceRemovedReason() } {
            Ok(()) => error.message(),
            Err(reason) => format!("{} ({:#010x})", reason.message(), reason.code().0 as u32),
        };
        warn!(%reason, "device removed");
        Err(DeviceError::Lost { hresult, reason }.into())
    }
}

impl FrameBackend for RenderContext {
    type Fence = D3D12Fence;

    fn back_buffer_index(&self) -> usize {
        unsafe { self.swap_chain.GetCurrentBackBufferIndex() as usize }
    }

    fn reset_commands(&mut self) -> DemoResult<()> {
        self.check(unsafe { self.command_allocator.Reset() })?;
        self.check(unsafe { self.command_list.Reset(&self.command_allocator, None) })
    }

    fn submit_commands(&mut self) -> DemoResult<()> {
        self.check(unsafe { self.command_list.Close() })?;
        let command_list: ID3D12CommandList = self.command_list.cast()?;
        unsafe { self.command_queue.ExecuteCommandLists(&[Some(command_list)]) };
        Ok(())
    }

    fn present(&mut self) -> DemoResult<()> {
        self.check(unsafe { self.swap_chain.Present(self.sync_interval, DXGI_PRESENT(0)) }.ok())
    }

    fn signal(&self, fence: &D3D12Fence, value: u64) -> DemoResult<()> {
        self.check(unsafe { self.command_queue.Signal(fence.fence(), value) })
    }
}
