use std::path::PathBuf;

use crate::frame_record::ResourceState;

pub type DemoResult<T, E = DemoReport> = core::result::Result<T, E>;

pub struct DemoReport {
    inner: eyre::Report,
}

impl DemoReport {
    /// True when the report was caused by the GPU device going away.
    /// Nothing recorded against the device after that point can succeed.
    pub fn is_device_lost(&self) -> bool {
        self.inner.chain().any(|cause| {
            matches!(cause.downcast_ref::<DeviceError>(), Some(DeviceError::Lost { .. }))
        })
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<E>()
    }
}

impl From<eyre::Report> for DemoReport {
    fn from(report: eyre::Report) -> Self {
        Self { inner: report }
    }
}

impl From<AssetError> for DemoReport {
    fn from(error: AssetError) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl From<FrameSyncError> for DemoReport {
    fn from(error: FrameSyncError) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl From<DeviceError> for DemoReport {
    fn from(error: DeviceError) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl std::fmt::Display for DemoReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::fmt::Debug for DemoReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

/// Failures while reading model, material or texture files.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: expected a number, found {token:?}")]
    Number {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("{path}:{line}: `{record}` record is missing a value")]
    MissingValue {
        path: PathBuf,
        line: usize,
        record: &'static str,
    },
    #[error("{path}:{line}: face corner {corner:?} needs position/texcoord/normal indices")]
    FaceComponent {
        path: PathBuf,
        line: usize,
        corner: String,
    },
    #[error("{path}:{line}: {kind} index {index} is outside 1..={available}")]
    IndexOutOfRange {
        path: PathBuf,
        line: usize,
        kind: &'static str,
        index: i64,
        available: usize,
    },
    #[error("{path}:{line}: only triangular faces are supported, found {corners} corners")]
    NonTriangularFace {
        path: PathBuf,
        line: usize,
        corners: usize,
    },
    #[error("failed to decode image {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameSyncError {
    #[error("command memory still in flight: gpu reached fence {completed}, frame needs {required}")]
    InFlight { completed: u64, required: u64 },
    #[error("back buffer {back_buffer} is {actual:?}, barrier expected {expected:?}")]
    BarrierMismatch {
        back_buffer: usize,
        expected: ResourceState,
        actual: ResourceState,
    },
    #[error("back buffer index {index} exceeds swap chain of {count}")]
    BackBufferOutOfRange { index: usize, count: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("gpu device lost (hresult {hresult:#010x}): {reason}")]
    Lost { hresult: u32, reason: String },
}

pub const DXGI_ERROR_DEVICE_REMOVED: u32 = 0x887A_0005;
pub const DXGI_ERROR_DEVICE_HUNG: u32 = 0x887A_0006;
pub const DXGI_ERROR_DEVICE_RESET: u32 = 0x887A_0007;

pub fn is_device_lost_code(hresult: u32) -> bool {
    matches!(
        hresult,
        DXGI_ERROR_DEVICE_REMOVED | DXGI_ERROR_DEVICE_HUNG | DXGI_ERROR_DEVICE_RESET
    )
}

#[cfg(windows)]
impl From<windows::core::Error> for DemoReport {
    fn from(error: windows::core::Error) -> Self {
        let hresult = error.code().0 as u32;
        if is_device_lost_code(hresult) {
            return DeviceError::Lost {
                hresult,
                reason: error.message(),
            }
            .into();
        }
        Self {
            inner: eyre::Report::new(WrappedWindowsError::from(error)),
        }
    }
}

#[cfg(windows)]
pub struct WrappedWindowsError {
    inner: windows::core::Error,
}

#[cfg(windows)]
impl From<windows::core::Error> for WrappedWindowsError {
    fn from(error: windows::core::Error) -> Self {
        Self { inner: error }
    }
}

#[cfg(windows)]
impl std::error::Error for WrappedWindowsError {}

#[cfg(windows)]
impl std::fmt::Display for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(windows)]
impl std::fmt::Debug for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_lost_is_detected_through_the_report() {
        let report: DemoReport = DeviceError::Lost {
            hresult: DXGI_ERROR_DEVICE_REMOVED,
            reason: "removed".into(),
        }
        .into();
        assert!(report.is_device_lost());
    }

    #[test]
    fn asset_errors_are_not_device_loss() {
        let report: DemoReport = AssetError::NonTriangularFace {
            path: "plane.obj".into(),
            line: 3,
            corners: 4,
        }
        .into();
        assert!(!report.is_device_lost());
        assert!(report.downcast_ref::<AssetError>().is_some());
    }

    #[test]
    fn device_lost_codes() {
        assert!(is_device_lost_code(DXGI_ERROR_DEVICE_REMOVED));
        assert!(is_device_lost_code(DXGI_ERROR_DEVICE_RESET));
        assert!(is_device_lost_code(DXGI_ERROR_DEVICE_HUNG));
        assert!(!is_device_lost_code(0x8000_4005));
    }
}
