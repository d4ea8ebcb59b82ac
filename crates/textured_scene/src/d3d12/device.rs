use tracing::debug;
use tracing::info;
use tracing::warn;
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;

use crate::config::DemoConfig;
use crate::demo_error::DemoResult;

const FEATURE_LEVELS: [(D3D_FEATURE_LEVEL, &str); 3] = [
    (D3D_FEATURE_LEVEL_12_2, "12.2"),
    (D3D_FEATURE_LEVEL_12_1, "12.1"),
    (D3D_FEATURE_LEVEL_12_0, "12.0"),
];

pub struct GpuDevice {
    pub factory: IDXGIFactory6,
    pub device: ID3D12Device,
}

pub fn create_device(config: &DemoConfig) -> DemoResult<GpuDevice> {
    let mut factory_flags = DXGI_CREATE_FACTORY_FLAGS(0);
    if cfg!(debug_assertions) && enable_debug_layer() {
        factory_flags |= DXGI_CREATE_FACTORY_DEBUG;
    }

    let factory: IDXGIFactory6 = unsafe { CreateDXGIFactory2(factory_flags) }?;

    let adapter: IDXGIAdapter1 = if config.use_warp_device {
        info!("Using WARP adapter.");
        unsafe { factory.EnumWarpAdapter()? }
    } else {
        get_hardware_adapter(&factory)?
    };

    let device = create_device_for_adapter(&adapter)?;
    if cfg!(debug_assertions) {
        configure_info_queue(&device)?;
    }
    Ok(GpuDevice { factory, device })
}

fn enable_debug_layer() -> bool {
    unsafe {
        let mut debug: Option<ID3D12Debug1> = None;
        if let Some(debug) = D3D12GetDebugInterface(&mut debug).ok().and(debug) {
            debug.EnableDebugLayer();
            debug.SetEnableGPUBasedValidation(true);
            info!("D3D12 debug layer enabled with GPU-based validation");
            true
        } else {
            warn!("D3D12 debug layer unavailable");
            false
        }
    }
}

/// First hardware adapter in high-performance order.
fn get_hardware_adapter(factory: &IDXGIFactory6) -> DemoResult<IDXGIAdapter1> {
    for i in 0.. {
        let adapter: IDXGIAdapter1 = match unsafe {
            factory.EnumAdapterByGpuPreference(i, DXGI_GPU_PREFERENCE_HIGH_PERFORMANCE)
        } {
            Ok(adapter) => adapter,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => return Err(e.into()),
        };

        let desc = unsafe { adapter.GetDesc1()? };
        let name = adapter_name(&desc.Description);
        if (DXGI_ADAPTER_FLAG(desc.Flags as i32) & DXGI_ADAPTER_FLAG_SOFTWARE)
            != DXGI_ADAPTER_FLAG_NONE
        {
            debug!(adapter = %name, "skipping software adapter");
            continue;
        }

        info!(adapter = %name, "using adapter");
        return Ok(adapter);
    }
    Err(eyre::eyre!("no hardware adapter found; try -warp").into())
}

fn adapter_name(description: &[u16]) -> String {
    let len = description
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(description.len());
    String::from_utf16_lossy(&description[..len])
}

fn create_device_for_adapter(adapter: &IDXGIAdapter1) -> DemoResult<ID3D12Device> {
    for (level, name) in FEATURE_LEVELS {
        let mut device: Option<ID3D12Device> = None;
        match unsafe { D3D12CreateDevice(adapter, level, &mut device) } {
            Ok(()) => {
                if let Some(device) = device {
                    info!(feature_level = name, "created D3D12 device");
                    return Ok(device);
                }
            }
            Err(e) => debug!(feature_level = name, "device creation failed: {e}"),
        }
    }
    Err(eyre::eyre!("adapter supports none of feature levels 12.2, 12.1, 12.0").into())
}

fn configure_info_queue(device: &ID3D12Device) -> DemoResult<()> {
    let Ok(info_queue) = device.cast::<ID3D12InfoQueue>() else {
        warn!("D3D12 info queue unavailable");
        return Ok(());
    };
    unsafe {
        info_queue.SetBreakOnSeverity(D3D12_MESSAGE_SEVERITY_CORRUPTION, true)?;
        info_queue.SetBreakOnSeverity(D3D12_MESSAGE_SEVERITY_ERROR, true)?;
        info_queue.SetBreakOnSeverity(D3D12_MESSAGE_SEVERITY_WARNING, true)?;

        // Windows 11 reports this for the DXGI/D3D12 debug layer interaction.
        let mut deny_ids = [D3D12_MESSAGE_ID_RESOURCE_BARRIER_MISMATCHING_COMMAND_LIST_TYPE];
        let mut severities = [D3D12_MESSAGE_SEVERITY_INFO];
        let filter = D3D12_INFO_QUEUE_FILTER {
            DenyList: D3D12_INFO_QUEUE_FILTER_DESC {
                NumSeverities: severities.len() as u32,
                pSeverityList: severities.as_mut_ptr(),
                NumIDs: deny_ids.len() as u32,
                pIDList: deny_ids.as_mut_ptr(),
                ..Default::default()
            },
            ..Default::default()
        };
        info_queue.PushStorageFilter(&filter)?;
    }
    debug!("D3D12 info queue configured");
    Ok(())
}

/// Lists DXGI and D3D12 objects still alive. Debug builds only.
pub fn report_live_objects() {
    if !cfg!(debug_assertions) {
        return;
    }
    match unsafe { DXGIGetDebugInterface1::<IDXGIDebug1>(0) } {
        Ok(debug) => {
            for api in [DXGI_DEBUG_ALL, DXGI_DEBUG_APP] {
                if let Err(e) = unsafe { debug.ReportLiveObjects(api, DXGI_DEBUG_RLO_ALL) } {
                    warn!("ReportLiveObjects failed: {e}");
                }
            }
        }
        Err(e) => debug!("DXGI debug interface unavailable: {e}"),
    }
}
