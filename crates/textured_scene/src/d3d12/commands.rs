use std::mem::ManuallyDrop;

use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;

use super::overlay_renderer::OverlayRenderer;
use super::pipeline::model_slot;
use super::render_context::RenderContext;
use super::scene_resources::SceneResources;
use crate::demo_error::DemoResult;
use crate::frame_record::FrameCommands;
use crate::frame_record::ResourceState;
use crate::frame_record::Transition;

fn resource_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
    match state {
        ResourceState::Present => D3D12_RESOURCE_STATE_PRESENT,
        ResourceState::RenderTarget => D3D12_RESOURCE_STATE_RENDER_TARGET,
    }
}

fn transition_barrier(
    resource: &ID3D12Resource,
    state_before: D3D12_RESOURCE_STATES,
    state_after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                StateBefore: state_before,
                StateAfter: state_after,
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
            }),
        },
    }
}

/// Records the scene into the context's open command list.
pub struct SceneCommands<'a> {
    pub context: &'a RenderContext,
    pub scene: &'a SceneResources,
    pub overlay: &'a OverlayRenderer,
}

impl FrameCommands for SceneCommands<'_> {
    fn resource_barrier(&mut self, transition: Transition) {
        let barrier = transition_barrier(
            &self.context.render_targets[transition.back_buffer],
            resource_state(transition.before),
            resource_state(transition.after),
        );
        unsafe { self.context.command_list.ResourceBarrier(&[barrier]) };
    }

    fn clear_render_target(&mut self, back_buffer: usize, color: [f32; 4]) {
        let rtv = self.context.rtv_handle(back_buffer);
        let dsv = self.context.dsv_handle();
        unsafe {
            self.context
                .command_list
                .OMSetRenderTargets(1, Some(&rtv), false, Some(&dsv));
            self.context
                .command_list
                .ClearRenderTargetView(rtv, &color, None);
        }
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe {
            self.context.command_list.ClearDepthStencilView(
                self.context.dsv_handle(),
                D3D12_CLEAR_FLAG_DEPTH,
                depth,
                0,
                None,
            );
        }
    }

    fn draw_model(&mut self) {
        let list = &self.context.command_list;
        let scene = self.scene;
        unsafe {
            list.SetDescriptorHeaps(&[Some(self.context.srv_heap.heap().clone())]);
            list.RSSetViewports(&[self.context.viewport]);
            list.RSSetScissorRects(&[self.context.scissor_rect]);
            list.SetGraphicsRootSignature(&scene.pipeline.root_signature);
            list.SetPipelineState(&scene.pipeline.pipeline_state);
            list.IASetVertexBuffers(0, Some(&[scene.model_vertex_view()]));
            list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            list.SetGraphicsRootConstantBufferView(
                model_slot::MATERIAL,
                scene.material.gpu_address(),
            );
            list.SetGraphicsRootConstantBufferView(
                model_slot::TRANSFORM,
                scene.model_wvp.gpu_address(),
            );
            list.SetGraphicsRootDescriptorTable(model_slot::TEXTURE, scene.texture_srv);
            list.DrawInstanced(scene.model_vertex_count, 1, 0, 0);
        }
    }

    fn draw_sprite(&mut self) {
        let list = &self.context.command_list;
        let scene = self.scene;
        unsafe {
            list.IASetVertexBuffers(0, Some(&[scene.sprite_vertex_view()]));
            list.IASetIndexBuffer(Some(&scene.sprite_index_view()));
            list.SetGraphicsRootConstantBufferView(
                model_slot::TRANSFORM,
                scene.sprite_wvp.gpu_address(),
            );
            list.DrawIndexedInstanced(6, 1, 0, 0, 0);
        }
    }

    fn draw_overlay(&mut self) -> DemoResult<()> {
        self.overlay.record(self.context)
    }
}
