mod commands;
mod descriptor_heap;
mod device;
mod fence;
mod overlay_renderer;
mod pipeline;
mod render_context;
mod scene_resources;
mod shader;
mod upload;

pub use commands::SceneCommands;
pub use descriptor_heap::DescriptorHeap;
pub use device::create_device;
pub use device::report_live_objects;
pub use device::GpuDevice;
pub use fence::D3D12Fence;
pub use overlay_renderer::OverlayRenderer;
pub use render_context::RenderContext;
pub use scene_resources::SceneResources;
