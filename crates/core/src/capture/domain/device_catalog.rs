use std::sync::Arc;

use crate::capture::domain::error::CaptureError;
use crate::capture::domain::media_backend::MediaBackend;
use crate::capture::domain::video_device::VideoDevice;

/// Cached listing of the platform's video inputs.
///
/// Re-enumeration is caller-triggered only; `validate` answers against the
/// last listing, never against a fresh platform query.
pub struct DeviceCatalog {
    backend: Arc<dyn MediaBackend>,
    devices: Vec<VideoDevice>,
}

impl DeviceCatalog {
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            backend,
            devices: Vec::new(),
        }
    }

    /// Query the platform and replace the cached listing.
    ///
    /// Devices the platform reports without a label get a positional
    /// `"Camera N"` fallback.
    pub fn refresh(&mut self) -> Result<&[VideoDevice], CaptureError> {
        let listed = self.backend.enumerate()?;
        if listed.is_empty() {
            self.devices.clear();
            return Err(CaptureError::NoDevicesFound);
        }
        self.devices = listed
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                if d.has_label() {
                    d
                } else {
                    VideoDevice::new(d.id(), format!("Camera {}", i + 1))
                }
            })
            .collect();
        log::debug!("enumerated {} video device(s)", self.devices.len());
        Ok(&self.devices)
    }

    /// The last listing, in platform order. Empty before the first refresh.
    pub fn list(&self) -> &[VideoDevice] {
        &self.devices
    }

    /// True only if `id` was present in the last listing.
    pub fn validate(&self, id: &str) -> bool {
        self.devices.iter().any(|d| d.id() == id)
    }

    /// The natural default selection: the first listed device.
    pub fn default_device(&self) -> Option<&VideoDevice> {
        self.devices.first()
    }
}
