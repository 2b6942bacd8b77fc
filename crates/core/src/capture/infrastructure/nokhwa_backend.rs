//! Camera access through `nokhwa` (V4L2 / AVFoundation / Media Foundation).
//!
//! The platform camera handle is not movable across threads, so each open
//! stream runs a dedicated capture thread that owns the handle and keeps
//! only the most recent decoded frame in a shared buffer. `current_frame`
//! never blocks on the hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::capture::domain::error::CaptureError;
use crate::capture::domain::media_backend::{MediaBackend, MediaStream};
use crate::capture::domain::video_device::VideoDevice;
use crate::shared::frame::Frame;

/// Pause before retrying after a failed hardware read.
const READ_RETRY_DELAY: Duration = Duration::from_millis(10);

/// `MediaBackend` over the platform's native capture API.
#[derive(Default)]
pub struct NokhwaBackend;

impl NokhwaBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for NokhwaBackend {
    fn enumerate(&self) -> Result<Vec<VideoDevice>, CaptureError> {
        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CaptureError::Acquisition(e.to_string()))?;
        Ok(cameras
            .iter()
            .map(|info| VideoDevice::new(info.index().to_string(), info.human_name()))
            .collect())
    }

    fn open(&self, device_id: &str) -> Result<Box<dyn MediaStream>, CaptureError> {
        let index = parse_index(device_id);
        let latest: Arc<Mutex<Option<Frame>>> = Arc::new(Mutex::new(None));
        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let worker = {
            let latest = latest.clone();
            let stop = stop.clone();
            thread::Builder::new()
                .name("camera-capture".into())
                .spawn(move || capture_loop(index, latest, stop, ready_tx))
                .map_err(|e| CaptureError::Acquisition(e.to_string()))?
        };

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(NokhwaStream {
                latest,
                stop,
                worker: Some(worker),
            })),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(map_open_error(e))
            }
            Err(_) => {
                let _ = worker.join();
                Err(CaptureError::Acquisition(
                    "camera thread exited before acquisition".into(),
                ))
            }
        }
    }
}

fn capture_loop(
    index: CameraIndex,
    latest: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    ready_tx: crossbeam_channel::Sender<Result<(), nokhwa::NokhwaError>>,
) {
    let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = match Camera::new(index, format).and_then(|mut c| c.open_stream().map(|_| c))
    {
        Ok(camera) => {
            let _ = ready_tx.send(Ok(()));
            camera
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    while !stop.load(Ordering::SeqCst) {
        match camera
            .frame()
            .and_then(|buffer| buffer.decode_image::<RgbFormat>())
        {
            Ok(decoded) => {
                let (width, height) = (decoded.width(), decoded.height());
                if width > 0 && height > 0 {
                    let frame = Frame::new(decoded.into_raw(), width, height, 3);
                    *latest.lock().unwrap() = Some(frame);
                }
            }
            Err(e) => {
                log::debug!("camera read error: {e}");
                thread::sleep(READ_RETRY_DELAY);
            }
        }
    }
    if let Err(e) = camera.stop_stream() {
        log::debug!("error stopping camera stream: {e}");
    }
}

struct NokhwaStream {
    latest: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MediaStream for NokhwaStream {
    fn current_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.worker.as_ref().is_some_and(|w| w.is_finished()) {
            return Err(CaptureError::Acquisition("camera thread exited".into()));
        }
        Ok(self.latest.lock().unwrap().clone())
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Device ids round-trip through `CameraIndex::to_string`: plain integers
/// for indexed backends, path/name strings otherwise.
fn parse_index(device_id: &str) -> CameraIndex {
    match device_id.parse::<u32>() {
        Ok(n) => CameraIndex::Index(n),
        Err(_) => CameraIndex::String(device_id.to_string()),
    }
}

/// The platform API folds permission refusal into its open errors; sort it
/// back out so the session can land in Denied rather than Error.
fn map_open_error(err: nokhwa::NokhwaError) -> CaptureError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") || lowered.contains("access") {
        CaptureError::PermissionDenied
    } else {
        CaptureError::Acquisition(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_numeric() {
        assert_eq!(parse_index("0"), CameraIndex::Index(0));
        assert_eq!(parse_index("3"), CameraIndex::Index(3));
    }

    #[test]
    fn test_parse_index_path() {
        assert_eq!(
            parse_index("/dev/video0"),
            CameraIndex::String("/dev/video0".to_string())
        );
    }

    #[test]
    fn test_map_open_error_classifies_permission() {
        let err = nokhwa::NokhwaError::OpenDeviceError(
            "/dev/video0".to_string(),
            "Permission denied (os error 13)".to_string(),
        );
        assert!(matches!(map_open_error(err), CaptureError::PermissionDenied));
    }

    #[test]
    fn test_map_open_error_other_is_acquisition() {
        let err = nokhwa::NokhwaError::OpenDeviceError(
            "/dev/video0".to_string(),
            "Device or resource busy".to_string(),
        );
        assert!(matches!(map_open_error(err), CaptureError::Acquisition(_)));
    }
}
