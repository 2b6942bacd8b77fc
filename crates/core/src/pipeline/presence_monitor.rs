use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::capture::domain::capture_session::{CaptureSession, SessionStatus, SharedStream};
use crate::capture::domain::device_catalog::DeviceCatalog;
use crate::capture::domain::error::CaptureError;
use crate::capture::domain::media_backend::MediaBackend;
use crate::capture::domain::session_epoch::SessionEpoch;
use crate::capture::domain::video_device::VideoDevice;
use crate::detection::domain::model_bundle::{ModelBundle, ModelKind, ModelStatus};
use crate::pipeline::detection_pipeline::DetectionPipeline;
use crate::pipeline::frame_sampler::SamplerHandle;
use crate::pipeline::presence_gate::{PresenceGate, PresenceState};
use crate::shared::constants::{DEVICE_SETTLE_DELAY, SAMPLE_PERIOD};

#[derive(Clone, Copy, Debug)]
pub struct MonitorConfig {
    pub sample_period: Duration,
    pub settle_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_period: SAMPLE_PERIOD,
            settle_delay: DEVICE_SETTLE_DELAY,
        }
    }
}

/// The single owner of one presence-gating subsystem instance: device
/// catalog, capture session, model bundle, detection pipeline, and gate.
///
/// Model loading starts at construction and runs concurrently with any
/// camera work; a session can go Active before the models are ready, and
/// sampling ticks in that window are no-ops.
pub struct PresenceMonitor {
    catalog: DeviceCatalog,
    session: CaptureSession,
    bundle: Arc<ModelBundle>,
    pipeline: Arc<Mutex<DetectionPipeline>>,
    gate: Arc<PresenceGate>,
    config: MonitorConfig,
}

impl PresenceMonitor {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        bundle: Arc<ModelBundle>,
        pipeline: DetectionPipeline,
        config: MonitorConfig,
    ) -> Self {
        let epoch = Arc::new(SessionEpoch::new());
        let catalog = DeviceCatalog::new(backend.clone());
        let session = CaptureSession::new(backend, epoch.clone());
        let gate = Arc::new(PresenceGate::new(epoch));
        bundle.load();
        Self {
            catalog,
            session,
            bundle,
            pipeline: Arc::new(Mutex::new(pipeline)),
            gate,
            config,
        }
    }

    /// Re-enumerate the platform's video inputs.
    pub fn refresh_devices(&mut self) -> Result<&[VideoDevice], CaptureError> {
        self.catalog.refresh()
    }

    pub fn devices(&self) -> &[VideoDevice] {
        self.catalog.list()
    }

    pub fn default_device_id(&self) -> Option<String> {
        self.catalog.default_device().map(|d| d.id().to_string())
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn bound_device(&self) -> Option<&str> {
        self.session.bound_device()
    }

    pub fn presence(&self) -> PresenceState {
        self.gate.snapshot()
    }

    /// The boolean the UI gates its start action on: presence is only
    /// meaningful while the session is Active, whatever the stored state.
    pub fn start_action_enabled(&self) -> bool {
        self.session.status() == SessionStatus::Active && self.gate.detected()
    }

    pub fn model_status(&self, kind: ModelKind) -> ModelStatus {
        self.bundle.status_of(kind)
    }

    pub fn is_gate_ready(&self) -> bool {
        self.bundle.is_gate_ready()
    }

    /// Re-attempt any model that previously failed to load.
    pub fn reload_models(&self) -> thread::JoinHandle<()> {
        self.bundle.load()
    }

    /// Acquire the camera and begin sampling.
    pub fn enable_camera(&mut self, device_id: &str) -> Result<(), CaptureError> {
        let stream = self.session.start(&self.catalog, device_id)?;
        self.spawn_sampler(stream);
        Ok(())
    }

    /// Stop sampling, release the camera, and clear presence.
    pub fn disable_camera(&mut self) {
        self.session.stop();
        self.gate.reset();
    }

    /// Rebind to another device: stop, wait out the settle delay so the
    /// platform releases the prior hardware handle, then start.
    ///
    /// The new id is validated first so a bad switch leaves the current
    /// session running.
    pub fn switch_device(&mut self, device_id: &str) -> Result<(), CaptureError> {
        if !self.catalog.validate(device_id) {
            return Err(CaptureError::InvalidDevice(device_id.to_string()));
        }
        self.disable_camera();
        thread::sleep(self.config.settle_delay);
        self.enable_camera(device_id)
    }

    fn spawn_sampler(&mut self, stream: SharedStream) {
        let sampler = SamplerHandle::spawn(
            self.config.sample_period,
            stream,
            self.bundle.clone(),
            self.pipeline.clone(),
            self.gate.clone(),
            self.session.epoch().current(),
        );
        self.session.attach_sampler(sampler);
    }
}
