use tracing::debug;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R8G8B8A8_UNORM_SRGB;

use super::pipeline::create_overlay_pipeline;
use super::pipeline::overlay_slot;
use super::pipeline::Pipeline;
use super::render_context::RenderContext;
use super::upload::create_texture;
use super::upload::create_texture_srv;
use super::upload::write_subresource;
use super::upload::MappedBuffer;
use crate::demo_error::DemoResult;
use crate::overlay::OverlayAtlas;
use crate::overlay::OverlayDraw;
use crate::overlay::OverlayDrawList;
use crate::overlay::OverlayVertex;

pub const FONT_ATLAS_SRV_SLOT: u32 = 0;

struct AtlasTexture {
    resource: ID3D12Resource,
    width: usize,
    height: usize,
}

/// Growable pair of mapped vertex and index buffers.
#[derive(Default)]
struct MeshBuffers {
    vertices: Option<MappedBuffer>,
    indices: Option<MappedBuffer>,
    vertex_count: usize,
    index_count: usize,
}

impl MeshBuffers {
    fn upload(&mut self, device: &ID3D12Device, list: &OverlayDrawList) -> DemoResult<()> {
        let vertex_bytes = std::mem::size_of_val(list.vertices.as_slice()) as u64;
        if self.vertices.as_ref().is_none_or(|buffer| buffer.size() < vertex_bytes) {
            let capacity = vertex_bytes.next_power_of_two().max(64 * 1024);
            debug!(capacity, "growing overlay vertex buffer");
            self.vertices = Some(MappedBuffer::new(device, capacity)?);
        }
        let index_bytes = std::mem::size_of_val(list.indices.as_slice()) as u64;
        if self.indices.as_ref().is_none_or(|buffer| buffer.size() < index_bytes) {
            let capacity = index_bytes.next_power_of_two().max(64 * 1024);
            debug!(capacity, "growing overlay index buffer");
            self.indices = Some(MappedBuffer::new(device, capacity)?);
        }

        if let (Some(vertices), Some(indices)) = (&mut self.vertices, &mut self.indices) {
            vertices.write(0, &list.vertices)?;
            indices.write(0, &list.indices)?;
        }
        self.vertex_count = list.vertices.len();
        self.index_count = list.indices.len();
        Ok(())
    }
}

/// Draws the debug UI meshes on top of the scene.
pub struct OverlayRenderer {
    pipeline: Pipeline,
    atlas: Option<AtlasTexture>,
    buffers: MeshBuffers,
    draws: Vec<OverlayDraw>,
    screen_size: [f32; 2],
}

impl OverlayRenderer {
    pub fn new(context: &RenderContext) -> DemoResult<Self> {
        Ok(Self {
            pipeline: create_overlay_pipeline(&context.device)?,
            atlas: None,
            buffers: MeshBuffers::default(),
            draws: Vec::new(),
            screen_size: [context.viewport.Width, context.viewport.Height],
        })
    }

    /// Copies this frame's UI meshes and any atlas change to the GPU.
    /// Only call while the GPU is idle.
    pub fn prepare(
        &mut self,
        context: &RenderContext,
        atlas: &mut OverlayAtlas,
        list: OverlayDrawList,
    ) -> DemoResult<()> {
        if atlas.take_dirty() && !atlas.is_empty() {
            self.upload_atlas(context, atlas)?;
        }
        self.buffers.upload(&context.device, &list)?;
        self.draws = list.draws;
        Ok(())
    }

    fn upload_atlas(&mut self, context: &RenderContext, atlas: &OverlayAtlas) -> DemoResult<()> {
        let resized = self.atlas.as_ref().is_none_or(|texture| {
            texture.width != atlas.width() || texture.height != atlas.height()
        });
        if resized {
            let resource = create_texture(
                &context.device,
                atlas.width() as u32,
                atlas.height() as u32,
                1,
                DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
            )?;
            create_texture_srv(
                &context.device,
                &resource,
                DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
                1,
                context.srv_heap.cpu_handle(FONT_ATLAS_SRV_SLOT),
            );
            debug!(width = atlas.width(), height = atlas.height(), "created font atlas texture");
            self.atlas = Some(AtlasTexture {
                resource,
                width: atlas.width(),
                height: atlas.height(),
            });
        }
        if let Some(texture) = &self.atlas {
            write_subresource(&texture.resource, 0, atlas.pixels(), atlas.row_pitch())?;
        }
        Ok(())
    }

    pub fn record(&self, context: &RenderContext) -> DemoResult<()> {
        let (Some(_), Some(vertices), Some(indices)) =
            (&self.atlas, &self.buffers.vertices, &self.buffers.indices)
        else {
            return Ok(());
        };
        if self.draws.is_empty() {
            return Ok(());
        }

        let list = &context.command_list;
        let vertex_view = vertices.vertex_view::<OverlayVertex>(self.buffers.vertex_count);
        let index_view = indices.index_view(self.buffers.index_count);
        unsafe {
            list.SetGraphicsRootSignature(&self.pipeline.root_signature);
            list.SetPipelineState(&self.pipeline.pipeline_state);
            list.SetGraphicsRoot32BitConstants(
                overlay_slot::SCREEN_SIZE,
                2,
                self.screen_size.as_ptr() as *const _,
                0,
            );
            list.SetGraphicsRootDescriptorTable(
                overlay_slot::FONT_ATLAS,
                context.srv_heap.gpu_handle(FONT_ATLAS_SRV_SLOT),
            );
            list.IASetVertexBuffers(0, Some(&[vertex_view]));
            list.IASetIndexBuffer(Some(&index_view));
            list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
        }

        for draw in &self.draws {
            let end = draw.first_index as usize + draw.index_count as usize;
            if end > self.buffers.index_count
                || draw.base_vertex as usize >= self.buffers.vertex_count
            {
                return Err(eyre::eyre!(
                    "overlay draw {draw:?} exceeds uploaded mesh of {} vertices, {} indices",
                    self.buffers.vertex_count,
                    self.buffers.index_count
                )
                .into());
            }
            let scissor = RECT {
                left: draw.scissor.left as i32,
                top: draw.scissor.top as i32,
                right: draw.scissor.right as i32,
                bottom: draw.scissor.bottom as i32,
            };
            unsafe {
                list.RSSetScissorRects(&[scissor]);
                list.DrawIndexedInstanced(
                    draw.index_count,
                    1,
                    draw.first_index,
                    draw.base_vertex,
                    0,
                );
            }
        }

        unsafe { list.RSSetScissorRects(&[context.scissor_rect]) };
        Ok(())
    }
}
