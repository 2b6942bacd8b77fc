use crate::capture::domain::error::CaptureError;
use crate::capture::domain::video_device::VideoDevice;
use crate::shared::frame::Frame;

/// Platform media API: device enumeration and exclusive stream acquisition.
///
/// Implementations wrap whatever the platform provides (V4L2, AVFoundation,
/// Media Foundation). Enumeration is a plain query with no side effects;
/// `open` acquires the hardware handle, which is held until the returned
/// stream is dropped.
pub trait MediaBackend: Send + Sync {
    fn enumerate(&self) -> Result<Vec<VideoDevice>, CaptureError>;

    /// Acquire the device exclusively. Permission denial and hardware
    /// failure are reported as distinct errors.
    fn open(&self, device_id: &str) -> Result<Box<dyn MediaStream>, CaptureError>;
}

/// An open camera stream.
///
/// Dropping the stream releases the hardware handle.
pub trait MediaStream: Send {
    /// The most recent frame, or `None` while the stream is still warming
    /// up and has no frame to offer.
    fn current_frame(&mut self) -> Result<Option<Frame>, CaptureError>;
}
