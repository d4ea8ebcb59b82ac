use bevy_math::Mat4;
use tracing::info;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R8G8B8A8_UNORM_SRGB;

use super::pipeline::create_model_pipeline;
use super::pipeline::Pipeline;
use super::render_context::RenderContext;
use super::upload::create_texture_srv;
use super::upload::upload_mip_chain;
use super::upload::MappedBuffer;
use crate::demo_error::DemoResult;
use crate::model::ModelData;
use crate::model::VertexData;
use crate::sprite::SPRITE_INDICES;
use crate::sprite::SPRITE_VERTICES;
use crate::texture::MipChain;

/// Descriptor slot of the model texture; slot 0 belongs to the overlay atlas.
pub const MODEL_TEXTURE_SRV_SLOT: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
}

/// GPU copies of the model, the sprite and their constants.
pub struct SceneResources {
    pub pipeline: Pipeline,
    pub model_vertices: MappedBuffer,
    pub model_vertex_count: u32,
    pub sprite_vertices: MappedBuffer,
    pub sprite_indices: MappedBuffer,
    pub material: MappedBuffer,
    pub model_wvp: MappedBuffer,
    pub sprite_wvp: MappedBuffer,
    pub texture: ID3D12Resource,
    pub texture_srv: D3D12_GPU_DESCRIPTOR_HANDLE,
}

impl SceneResources {
    pub fn new(context: &RenderContext, model: &ModelData, texture: &MipChain) -> DemoResult<Self> {
        let device = &context.device;
        let pipeline = create_model_pipeline(device)?;

        let model_vertices = MappedBuffer::from_slice(device, &model.vertices)?;
        let sprite_vertices = MappedBuffer::from_slice(device, &SPRITE_VERTICES)?;
        let sprite_indices = MappedBuffer::from_slice(device, &SPRITE_INDICES)?;

        let material = MappedBuffer::constant(device, &Material { color: [1.0; 4] })?;
        let identity = Mat4::IDENTITY.to_cols_array();
        let model_wvp = MappedBuffer::constant(device, &identity)?;
        let sprite_wvp = MappedBuffer::constant(device, &identity)?;

        let gpu_texture = upload_mip_chain(device, texture)?;
        create_texture_srv(
            device,
            &gpu_texture,
            DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
            texture.mip_levels(),
            context.srv_heap.cpu_handle(MODEL_TEXTURE_SRV_SLOT),
        );

        info!(
            vertices = model.vertices.len(),
            texture_width = texture.width(),
            texture_height = texture.height(),
            mip_levels = texture.mip_levels(),
            "scene resources uploaded"
        );
        Ok(Self {
            pipeline,
            model_vertices,
            model_vertex_count: model.vertices.len() as u32,
            sprite_vertices,
            sprite_indices,
            material,
            model_wvp,
            sprite_wvp,
            texture: gpu_texture,
            texture_srv: context.srv_heap.gpu_handle(MODEL_TEXTURE_SRV_SLOT),
        })
    }

    /// Only call while the GPU is idle; the buffers are read in place.
    pub fn update(&mut self, model_wvp: Mat4, sprite_wvp: Mat4, color: [f32; 4]) -> DemoResult<()> {
        self.model_wvp.write(0, &model_wvp.to_cols_array())?;
        self.sprite_wvp.write(0, &sprite_wvp.to_cols_array())?;
        self.material.write(0, &[Material { color }])
    }

    pub fn model_vertex_view(&self) -> D3D12_VERTEX_BUFFER_VIEW {
        self.model_vertices
            .vertex_view::<VertexData>(self.model_vertex_count as usize)
    }

    pub fn sprite_vertex_view(&self) -> D3D12_VERTEX_BUFFER_VIEW {
        self.sprite_vertices.vertex_view::<VertexData>(SPRITE_VERTICES.len())
    }

    pub fn sprite_index_view(&self) -> D3D12_INDEX_BUFFER_VIEW {
        self.sprite_indices.index_view(SPRITE_INDICES.len())
    }
}
