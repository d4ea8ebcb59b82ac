use std::ffi::c_void;

use tracing::debug;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use super::pipeline::DEPTH_FORMAT;
use crate::demo_error::DemoResult;
use crate::texture::MipChain;

const CONSTANT_BUFFER_ALIGNMENT: u64 = D3D12_CONSTANT_BUFFER_DATA_PLACEMENT_ALIGNMENT as u64;

fn buffer_desc(size: u64) -> D3D12_RESOURCE_DESC {
    D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Width: size,
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        ..Default::default()
    }
}

/// An upload-heap buffer that stays mapped until dropped.
///
/// The GPU reads it during the frame, so writes are only safe while the
/// queue is idle.
pub struct MappedBuffer {
    resource: ID3D12Resource,
    mapped: *mut u8,
    size: u64,
}

impl MappedBuffer {
    pub fn new(device: &ID3D12Device, size: u64) -> DemoResult<Self> {
        let heap_props = D3D12_HEAP_PROPERTIES {
            Type: D3D12_HEAP_TYPE_UPLOAD,
            ..Default::default()
        };
        let mut resource: Option<ID3D12Resource> = None;
        unsafe {
            device.CreateCommittedResource(
                &heap_props,
                D3D12_HEAP_FLAG_NONE,
                &buffer_desc(size),
                D3D12_RESOURCE_STATE_GENERIC_READ,
                None,
                &mut resource,
            )?
        };
        let resource =
            resource.ok_or_else(|| eyre::eyre!("CreateCommittedResource returned no buffer"))?;

        let mut mapped = std::ptr::null_mut::<c_void>();
        // Nothing is read back on the CPU.
        let read_range = D3D12_RANGE { Begin: 0, End: 0 };
        unsafe { resource.Map(0, Some(&read_range), Some(&mut mapped))? };

        Ok(Self {
            resource,
            mapped: mapped as *mut u8,
            size,
        })
    }

    /// A buffer sized for one `T`, rounded up to constant buffer placement.
    pub fn constant<T: Copy>(device: &ID3D12Device, initial: &T) -> DemoResult<Self> {
        let size = (std::mem::size_of::<T>() as u64).next_multiple_of(CONSTANT_BUFFER_ALIGNMENT);
        let mut buffer = Self::new(device, size)?;
        buffer.write(0, std::slice::from_ref(initial))?;
        Ok(buffer)
    }

    pub fn from_slice<T: Copy>(device: &ID3D12Device, data: &[T]) -> DemoResult<Self> {
        // Zero-sized buffers are invalid.
        let size = (std::mem::size_of_val(data) as u64).max(4);
        let mut buffer = Self::new(device, size)?;
        buffer.write(0, data)?;
        Ok(buffer)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Copies `data` to `offset` bytes into the buffer.
    pub fn write<T: Copy>(&mut self, offset: u64, data: &[T]) -> DemoResult<()> {
        let len = std::mem::size_of_val(data) as u64;
        if offset + len > self.size {
            return Err(eyre::eyre!(
                "write of {len} bytes at {offset} overflows buffer of {} bytes",
                self.size
            )
            .into());
        }
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr() as *const u8,
                self.mapped.add(offset as usize),
                len as usize,
            );
        }
        Ok(())
    }

    pub fn gpu_address(&self) -> u64 {
        unsafe { self.resource.GetGPUVirtualAddress() }
    }

    pub fn vertex_view<T>(&self, count: usize) -> D3D12_VERTEX_BUFFER_VIEW {
        D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: self.gpu_address(),
            StrideInBytes: std::mem::size_of::<T>() as u32,
            SizeInBytes: (std::mem::size_of::<T>() * count) as u32,
        }
    }

    pub fn index_view(&self, count: usize) -> D3D12_INDEX_BUFFER_VIEW {
        D3D12_INDEX_BUFFER_VIEW {
            BufferLocation: self.gpu_address(),
            SizeInBytes: (std::mem::size_of::<u32>() * count) as u32,
            Format: DXGI_FORMAT_R32_UINT,
        }
    }
}

impl Drop for MappedBuffer {
    fn drop(&mut self) {
        unsafe { self.resource.Unmap(0, None) };
    }
}

/// A 2D texture in a CPU-writable heap, filled with `WriteToSubresource`.
pub fn create_texture(
    device: &ID3D12Device,
    width: u32,
    height: u32,
    mip_levels: u16,
    format: DXGI_FORMAT,
) -> DemoResult<ID3D12Resource> {
    let desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
        Width: width as u64,
        Height: height,
        DepthOrArraySize: 1,
        MipLevels: mip_levels,
        Format: format,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        ..Default::default()
    };
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_CUSTOM,
        CPUPageProperty: D3D12_CPU_PAGE_PROPERTY_WRITE_BACK,
        MemoryPoolPreference: D3D12_MEMORY_POOL_L0,
        ..Default::default()
    };
    let mut resource: Option<ID3D12Resource> = None;
    unsafe {
        device.CreateCommittedResource(
            &heap_props,
            D3D12_HEAP_FLAG_NONE,
            &desc,
            D3D12_RESOURCE_STATE_GENERIC_READ,
            None,
            &mut resource,
        )?
    };
    let resource =
        resource.ok_or_else(|| eyre::eyre!("CreateCommittedResource returned no texture"))?;
    debug!(width, height, mip_levels, "created texture");
    Ok(resource)
}

/// Writes one tightly packed subresource.
pub fn write_subresource(
    texture: &ID3D12Resource,
    subresource: u32,
    pixels: &[u8],
    row_pitch: usize,
) -> DemoResult<()> {
    unsafe {
        texture.WriteToSubresource(
            subresource,
            None,
            pixels.as_ptr() as *const c_void,
            row_pitch as u32,
            pixels.len() as u32,
        )?
    };
    Ok(())
}

pub fn upload_mip_chain(device: &ID3D12Device, chain: &MipChain) -> DemoResult<ID3D12Resource> {
    let texture = create_texture(
        device,
        chain.width(),
        chain.height(),
        chain.mip_levels(),
        DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
    )?;
    for (mip, level) in chain.levels.iter().enumerate() {
        write_subresource(&texture, mip as u32, &level.pixels, level.row_pitch())?;
    }
    Ok(texture)
}

pub fn create_texture_srv(
    device: &ID3D12Device,
    texture: &ID3D12Resource,
    format: DXGI_FORMAT,
    mip_levels: u16,
    destination: D3D12_CPU_DESCRIPTOR_HANDLE,
) {
    let desc = D3D12_SHADER_RESOURCE_VIEW_DESC {
        Format: format,
        ViewDimension: D3D12_SRV_DIMENSION_TEXTURE2D,
        Shader4ComponentMapping: D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING,
        Anonymous: D3D12_SHADER_RESOURCE_VIEW_DESC_0 {
            Texture2D: D3D12_TEX2D_SRV {
                MipLevels: mip_levels as u32,
                ..Default::default()
            },
        },
    };
    unsafe { device.CreateShaderResourceView(texture, Some(&desc), destination) };
}

/// Window-sized depth buffer, optimized for clears to 1.0, and its view.
pub fn create_depth_buffer(
    device: &ID3D12Device,
    width: u32,
    height: u32,
    destination: D3D12_CPU_DESCRIPTOR_HANDLE,
) -> DemoResult<ID3D12Resource> {
    let desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
        Width: width as u64,
        Height: height,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DEPTH_FORMAT,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Flags: D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
        ..Default::default()
    };
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_DEFAULT,
        ..Default::default()
    };
    let clear_value = D3D12_CLEAR_VALUE {
        Format: DEPTH_FORMAT,
        Anonymous: D3D12_CLEAR_VALUE_0 {
            DepthStencil: D3D12_DEPTH_STENCIL_VALUE {
                Depth: 1.0,
                Stencil: 0,
            },
        },
    };
    let mut resource: Option<ID3D12Resource> = None;
    unsafe {
        device.CreateCommittedResource(
            &heap_props,
            D3D12_HEAP_FLAG_NONE,
            &desc,
            D3D12_RESOURCE_STATE_DEPTH_WRITE,
            Some(&clear_value as *const _),
            &mut resource,
        )?
    };
    let resource = resource
        .ok_or_else(|| eyre::eyre!("CreateCommittedResource returned no depth buffer"))?;

    let view_desc = D3D12_DEPTH_STENCIL_VIEW_DESC {
        Format: DEPTH_FORMAT,
        ViewDimension: D3D12_DSV_DIMENSION_TEXTURE2D,
        Flags: D3D12_DSV_FLAG_NONE,
        Anonymous: D3D12_DEPTH_STENCIL_VIEW_DESC_0 {
            Texture2D: D3D12_TEX2D_DSV { MipSlice: 0 },
        },
    };
    unsafe { device.CreateDepthStencilView(&resource, Some(&view_desc), destination) };
    Ok(resource)
}
