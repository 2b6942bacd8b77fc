use thiserror::Error;

/// Failures surfaced by device enumeration and stream acquisition.
///
/// Permission denial and hardware failure are kept distinct so the caller
/// can show the right retry affordance for each.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no video input devices found")]
    NoDevicesFound,

    #[error("device '{0}' is not in the current device list")]
    InvalidDevice(String),

    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera acquisition failed: {0}")]
    Acquisition(String),

    #[error("capture session is already active")]
    AlreadyActive,
}
