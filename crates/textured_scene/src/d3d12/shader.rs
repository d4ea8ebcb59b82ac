use tracing::debug;
use tracing::error;
use windows::core::PCSTR;
use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::ID3DBlob;

use crate::demo_error::DemoResult;

pub fn compile_flags() -> u32 {
    let flags = D3DCOMPILE_PACK_MATRIX_ROW_MAJOR;
    if cfg!(debug_assertions) {
        flags | D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
    } else {
        flags
    }
}

/// Compiles HLSL `source` embedded in the binary. `name` only labels
/// diagnostics.
pub fn compile_shader(
    source: &str,
    name: PCSTR,
    entry_point: PCSTR,
    target: PCSTR,
) -> DemoResult<ID3DBlob> {
    let mut shader_blob = None;
    let mut error_blob = None;
    let result = unsafe {
        D3DCompile(
            source.as_ptr() as _,
            source.len(),
            name,
            None,
            None,
            entry_point,
            target,
            compile_flags(),
            0,
            &mut shader_blob,
            Some(&mut error_blob),
        )
    };

    if let Err(e) = result {
        if let Some(blob) = error_blob {
            error!(
                shader = %unsafe { name.display() },
                entry_point = %unsafe { entry_point.display() },
                "shader compile error: {}",
                blob_text(&blob)
            );
        }
        return Err(e.into());
    }

    debug!(shader = %unsafe { name.display() }, "compiled shader");
    shader_blob.ok_or_else(|| eyre::eyre!("D3DCompile returned no bytecode").into())
}

pub fn blob_text(blob: &ID3DBlob) -> String {
    let bytes = blob_bytes(blob);
    String::from_utf8_lossy(bytes).trim_end_matches('\0').to_owned()
}

pub fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize())
    }
}
