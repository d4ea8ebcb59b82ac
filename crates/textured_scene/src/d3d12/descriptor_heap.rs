use windows::Win32::Graphics::Direct3D12::*;

use crate::demo_error::DemoResult;

/// A fixed-capacity descriptor heap addressed by slot index.
pub struct DescriptorHeap {
    heap: ID3D12DescriptorHeap,
    increment: u32,
    capacity: u32,
    shader_visible: bool,
}

impl DescriptorHeap {
    pub fn new(
        device: &ID3D12Device,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
        capacity: u32,
        shader_visible: bool,
    ) -> DemoResult<Self> {
        let heap: ID3D12DescriptorHeap = unsafe {
            device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                Type: heap_type,
                NumDescriptors: capacity,
                Flags: if shader_visible {
                    D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE
                } else {
                    D3D12_DESCRIPTOR_HEAP_FLAG_NONE
                },
                NodeMask: 0,
            })?
        };
        let increment = unsafe { device.GetDescriptorHandleIncrementSize(heap_type) };
        Ok(Self {
            heap,
            increment,
            capacity,
            shader_visible,
        })
    }

    pub fn heap(&self) -> &ID3D12DescriptorHeap {
        &self.heap
    }

    pub fn cpu_handle(&self, index: u32) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        debug_assert!(index < self.capacity);
        let start = unsafe { self.heap.GetCPUDescriptorHandleForHeapStart() };
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: start.ptr + (index * self.increment) as usize,
        }
    }

    /// Only valid on shader-visible heaps.
    pub fn gpu_handle(&self, index: u32) -> D3D12_GPU_DESCRIPTOR_HANDLE {
        debug_assert!(self.shader_visible && index < self.capacity);
        let start = unsafe { self.heap.GetGPUDescriptorHandleForHeapStart() };
        D3D12_GPU_DESCRIPTOR_HANDLE {
            ptr: start.ptr + (index * self.increment) as u64,
        }
    }
}
