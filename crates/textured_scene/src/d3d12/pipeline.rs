use tracing::error;
use windows::core::s;
use windows::core::PCSTR;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D::ID3DBlob;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use super::shader::blob_text;
use super::shader::compile_shader;
use crate::demo_error::DemoResult;

pub const RENDER_TARGET_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM_SRGB;
pub const DEPTH_FORMAT: DXGI_FORMAT = DXGI_FORMAT_D24_UNORM_S8_UINT;

/// Root parameter slots of the model pipeline.
pub mod model_slot {
    pub const MATERIAL: u32 = 0;
    pub const TRANSFORM: u32 = 1;
    pub const TEXTURE: u32 = 2;
}

/// Root parameter slots of the overlay pipeline.
pub mod overlay_slot {
    pub const SCREEN_SIZE: u32 = 0;
    pub const FONT_ATLAS: u32 = 1;
}

const OBJECT3D_VS: &str = include_str!("../../shaders/object3d_vs.hlsl");
const OBJECT3D_PS: &str = include_str!("../../shaders/object3d_ps.hlsl");
const OVERLAY_HLSL: &str = include_str!("../../shaders/overlay.hlsl");

pub struct Pipeline {
    pub root_signature: ID3D12RootSignature,
    pub pipeline_state: ID3D12PipelineState,
}

fn cbv_parameter(register: u32, visibility: D3D12_SHADER_VISIBILITY) -> D3D12_ROOT_PARAMETER {
    D3D12_ROOT_PARAMETER {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_CBV,
        Anonymous: D3D12_ROOT_PARAMETER_0 {
            Descriptor: D3D12_ROOT_DESCRIPTOR {
                ShaderRegister: register,
                RegisterSpace: 0,
            },
        },
        ShaderVisibility: visibility,
    }
}

fn srv_table_parameter(range: &D3D12_DESCRIPTOR_RANGE) -> D3D12_ROOT_PARAMETER {
    D3D12_ROOT_PARAMETER {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE,
        Anonymous: D3D12_ROOT_PARAMETER_0 {
            DescriptorTable: D3D12_ROOT_DESCRIPTOR_TABLE {
                NumDescriptorRanges: 1,
                pDescriptorRanges: range,
            },
        },
        ShaderVisibility: D3D12_SHADER_VISIBILITY_PIXEL,
    }
}

fn single_srv_range() -> D3D12_DESCRIPTOR_RANGE {
    D3D12_DESCRIPTOR_RANGE {
        RangeType: D3D12_DESCRIPTOR_RANGE_TYPE_SRV,
        NumDescriptors: 1,
        BaseShaderRegister: 0,
        RegisterSpace: 0,
        OffsetInDescriptorsFromTableStart: D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND,
    }
}

fn linear_sampler(address_mode: D3D12_TEXTURE_ADDRESS_MODE) -> D3D12_STATIC_SAMPLER_DESC {
    D3D12_STATIC_SAMPLER_DESC {
        Filter: D3D12_FILTER_MIN_MAG_MIP_LINEAR,
        AddressU: address_mode,
        AddressV: address_mode,
        AddressW: address_mode,
        ComparisonFunc: D3D12_COMPARISON_FUNC_NEVER,
        MaxLOD: D3D12_FLOAT32_MAX,
        ShaderRegister: 0,
        RegisterSpace: 0,
        ShaderVisibility: D3D12_SHADER_VISIBILITY_PIXEL,
        ..Default::default()
    }
}

fn create_root_signature(
    device: &ID3D12Device,
    parameters: &[D3D12_ROOT_PARAMETER],
    sampler: &D3D12_STATIC_SAMPLER_DESC,
) -> DemoResult<ID3D12RootSignature> {
    let desc = D3D12_ROOT_SIGNATURE_DESC {
        NumParameters: parameters.len() as u32,
        pParameters: parameters.as_ptr(),
        NumStaticSamplers: 1,
        pStaticSamplers: sampler,
        Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
    };

    let mut signature_blob: Option<ID3DBlob> = None;
    let mut error_blob: Option<ID3DBlob> = None;
    let serialized = unsafe {
        D3D12SerializeRootSignature(
            &desc,
            D3D_ROOT_SIGNATURE_VERSION_1,
            &mut signature_blob,
            Some(&mut error_blob),
        )
    };
    if let Err(e) = serialized {
        if let Some(blob) = error_blob {
            error!("root signature error: {}", blob_text(&blob));
        }
        return Err(e.into());
    }
    let signature_blob =
        signature_blob.ok_or_else(|| eyre::eyre!("root signature serialized to nothing"))?;

    let root_signature = unsafe {
        device.CreateRootSignature(
            0,
            std::slice::from_raw_parts(
                signature_blob.GetBufferPointer() as *const u8,
                signature_blob.GetBufferSize(),
            ),
        )?
    };
    Ok(root_signature)
}

fn bytecode(blob: &ID3DBlob) -> D3D12_SHADER_BYTECODE {
    D3D12_SHADER_BYTECODE {
        pShaderBytecode: unsafe { blob.GetBufferPointer() },
        BytecodeLength: unsafe { blob.GetBufferSize() },
    }
}

fn per_vertex(semantic: PCSTR, format: DXGI_FORMAT, offset: u32) -> D3D12_INPUT_ELEMENT_DESC {
    D3D12_INPUT_ELEMENT_DESC {
        SemanticName: semantic,
        SemanticIndex: 0,
        Format: format,
        InputSlot: 0,
        AlignedByteOffset: offset,
        InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
        InstanceDataStepRate: 0,
    }
}

fn render_target_formats() -> [DXGI_FORMAT; 8] {
    let mut formats = [DXGI_FORMAT_UNKNOWN; 8];
    formats[0] = RENDER_TARGET_FORMAT;
    formats
}

/// Textured mesh pipeline shared by the model and the sprite.
pub fn create_model_pipeline(device: &ID3D12Device) -> DemoResult<Pipeline> {
    let range = single_srv_range();
    let parameters = [
        cbv_parameter(0, D3D12_SHADER_VISIBILITY_PIXEL),
        cbv_parameter(0, D3D12_SHADER_VISIBILITY_VERTEX),
        srv_table_parameter(&range),
    ];
    let sampler = linear_sampler(D3D12_TEXTURE_ADDRESS_MODE_WRAP);
    let root_signature = create_root_signature(device, &parameters, &sampler)?;

    let vertex_shader =
        compile_shader(OBJECT3D_VS, s!("object3d_vs.hlsl"), s!("main"), s!("vs_5_0"))?;
    let pixel_shader =
        compile_shader(OBJECT3D_PS, s!("object3d_ps.hlsl"), s!("main"), s!("ps_5_0"))?;

    let input_element_descs = [
        per_vertex(s!("POSITION"), DXGI_FORMAT_R32G32B32A32_FLOAT, 0),
        per_vertex(s!("TEXCOORD"), DXGI_FORMAT_R32G32_FLOAT, 16),
    ];

    let pso_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
        pRootSignature: unsafe { std::mem::transmute_copy(&root_signature) },
        VS: bytecode(&vertex_shader),
        PS: bytecode(&pixel_shader),
        InputLayout: D3D12_INPUT_LAYOUT_DESC {
            pInputElementDescs: input_element_descs.as_ptr(),
            NumElements: input_element_descs.len() as u32,
        },
        RasterizerState: D3D12_RASTERIZER_DESC {
            FillMode: D3D12_FILL_MODE_SOLID,
            CullMode: D3D12_CULL_MODE_BACK,
            DepthClipEnable: TRUE,
            ..Default::default()
        },
        BlendState: D3D12_BLEND_DESC {
            AlphaToCoverageEnable: FALSE,
            IndependentBlendEnable: FALSE,
            RenderTarget: [D3D12_RENDER_TARGET_BLEND_DESC {
                BlendEnable: FALSE,
                RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
                ..Default::default()
            }; 8],
        },
        DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: TRUE,
            DepthWriteMask: D3D12_DEPTH_WRITE_MASK_ALL,
            DepthFunc: D3D12_COMPARISON_FUNC_LESS_EQUAL,
            StencilEnable: FALSE,
            ..Default::default()
        },
        DSVFormat: DEPTH_FORMAT,
        SampleMask: u32::MAX,
        PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
        NumRenderTargets: 1,
        RTVFormats: render_target_formats(),
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        ..Default::default()
    };

    let pipeline_state = unsafe { device.CreateGraphicsPipelineState(&pso_desc)? };
    Ok(Pipeline {
        root_signature,
        pipeline_state,
    })
}

/// Premultiplied-alpha, unculled, depth-ignoring pipeline for UI meshes.
pub fn create_overlay_pipeline(device: &ID3D12Device) -> DemoResult<Pipeline> {
    let range = single_srv_range();
    let parameters = [
        D3D12_ROOT_PARAMETER {
            ParameterType: D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS,
            Anonymous: D3D12_ROOT_PARAMETER_0 {
                Constants: D3D12_ROOT_CONSTANTS {
                    ShaderRegister: 0,
                    RegisterSpace: 0,
                    Num32BitValues: 2,
                },
            },
            ShaderVisibility: D3D12_SHADER_VISIBILITY_VERTEX,
        },
        srv_table_parameter(&range),
    ];
    let sampler = linear_sampler(D3D12_TEXTURE_ADDRESS_MODE_CLAMP);
    let root_signature = create_root_signature(device, &parameters, &sampler)?;

    let vertex_shader =
        compile_shader(OVERLAY_HLSL, s!("overlay.hlsl"), s!("vs_main"), s!("vs_5_0"))?;
    let pixel_shader =
        compile_shader(OVERLAY_HLSL, s!("overlay.hlsl"), s!("ps_main"), s!("ps_5_0"))?;

    let input_element_descs = [
        per_vertex(s!("POSITION"), DXGI_FORMAT_R32G32_FLOAT, 0),
        per_vertex(s!("TEXCOORD"), DXGI_FORMAT_R32G32_FLOAT, 8),
        per_vertex(s!("COLOR"), DXGI_FORMAT_R8G8B8A8_UNORM, 16),
    ];

    let pso_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
        pRootSignature: unsafe { std::mem::transmute_copy(&root_signature) },
        VS: bytecode(&vertex_shader),
        PS: bytecode(&pixel_shader),
        InputLayout: D3D12_INPUT_LAYOUT_DESC {
            pInputElementDescs: input_element_descs.as_ptr(),
            NumElements: input_element_descs.len() as u32,
        },
        RasterizerState: D3D12_RASTERIZER_DESC {
            FillMode: D3D12_FILL_MODE_SOLID,
            CullMode: D3D12_CULL_MODE_NONE,
            DepthClipEnable: TRUE,
            ..Default::default()
        },
        BlendState: D3D12_BLEND_DESC {
            AlphaToCoverageEnable: FALSE,
            IndependentBlendEnable: FALSE,
            RenderTarget: [D3D12_RENDER_TARGET_BLEND_DESC {
                BlendEnable: TRUE,
                LogicOpEnable: FALSE,
                SrcBlend: D3D12_BLEND_ONE,
                DestBlend: D3D12_BLEND_INV_SRC_ALPHA,
                BlendOp: D3D12_BLEND_OP_ADD,
                SrcBlendAlpha: D3D12_BLEND_INV_DEST_ALPHA,
                DestBlendAlpha: D3D12_BLEND_ONE,
                BlendOpAlpha: D3D12_BLEND_OP_ADD,
                LogicOp: D3D12_LOGIC_OP_NOOP,
                RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
            }; 8],
        },
        DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: FALSE,
            StencilEnable: FALSE,
            ..Default::default()
        },
        DSVFormat: DEPTH_FORMAT,
        SampleMask: u32::MAX,
        PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
        NumRenderTargets: 1,
        RTVFormats: render_target_formats(),
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        ..Default::default()
    };

    let pipeline_state = unsafe { device.CreateGraphicsPipelineState(&pso_desc)? };
    Ok(Pipeline {
        root_signature,
        pipeline_state,
    })
}
