use std::sync::{Arc, Mutex};

use crate::capture::domain::device_catalog::DeviceCatalog;
use crate::capture::domain::error::CaptureError;
use crate::capture::domain::media_backend::{MediaBackend, MediaStream};
use crate::capture::domain::session_epoch::SessionEpoch;
use crate::pipeline::frame_sampler::SamplerHandle;

/// A stream shared between the session (owner) and the sampler thread
/// reading frames from it.
pub type SharedStream = Arc<Mutex<Box<dyn MediaStream>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Requesting,
    Active,
    Denied,
    Error,
}

/// Exclusive owner of one camera stream and the sampler driven by it.
///
/// State machine: `Idle → Requesting → {Active | Denied | Error}`, and back
/// to `Idle` on `stop`. At most one stream is ever held per session
/// instance; starting while Active is rejected rather than silently
/// re-acquiring.
pub struct CaptureSession {
    backend: Arc<dyn MediaBackend>,
    epoch: Arc<SessionEpoch>,
    status: SessionStatus,
    bound_device: Option<String>,
    stream: Option<SharedStream>,
    sampler: Option<SamplerHandle>,
}

impl CaptureSession {
    pub fn new(backend: Arc<dyn MediaBackend>, epoch: Arc<SessionEpoch>) -> Self {
        Self {
            backend,
            epoch,
            status: SessionStatus::Idle,
            bound_device: None,
            stream: None,
            sampler: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn bound_device(&self) -> Option<&str> {
        self.bound_device.as_deref()
    }

    pub fn epoch(&self) -> &Arc<SessionEpoch> {
        &self.epoch
    }

    pub fn stream(&self) -> Option<SharedStream> {
        self.stream.clone()
    }

    /// Acquire `device_id` and transition to Active.
    ///
    /// The id must be present in the catalog's last listing; an unknown id
    /// fails before the platform is touched. Denied and Error are terminal
    /// for this attempt but a later `start` may retry.
    pub fn start(
        &mut self,
        catalog: &DeviceCatalog,
        device_id: &str,
    ) -> Result<SharedStream, CaptureError> {
        if self.status == SessionStatus::Active {
            return Err(CaptureError::AlreadyActive);
        }
        if !catalog.validate(device_id) {
            return Err(CaptureError::InvalidDevice(device_id.to_string()));
        }

        self.status = SessionStatus::Requesting;
        log::info!("requesting camera '{device_id}'");

        match self.backend.open(device_id) {
            Ok(stream) => {
                let shared: SharedStream = Arc::new(Mutex::new(stream));
                self.stream = Some(shared.clone());
                self.bound_device = Some(device_id.to_string());
                let epoch = self.epoch.advance();
                self.status = SessionStatus::Active;
                log::info!("camera '{device_id}' active (epoch {epoch})");
                Ok(shared)
            }
            Err(CaptureError::PermissionDenied) => {
                self.status = SessionStatus::Denied;
                log::warn!("camera '{device_id}' permission denied");
                Err(CaptureError::PermissionDenied)
            }
            Err(e) => {
                self.status = SessionStatus::Error;
                log::warn!("camera '{device_id}' acquisition failed: {e}");
                Err(e)
            }
        }
    }

    /// Hand the session the periodic sampler it owns for the rest of this
    /// activation. A previously attached sampler is cancelled first.
    pub fn attach_sampler(&mut self, sampler: SamplerHandle) {
        debug_assert_eq!(self.status, SessionStatus::Active);
        if let Some(old) = self.sampler.replace(sampler) {
            old.cancel();
        }
    }

    /// Release everything and return to Idle.
    ///
    /// Order matters: the epoch is invalidated first so a pass completing
    /// mid-teardown is already stale, then the sampler is cancelled (joined)
    /// so no further tick can fire, and only then is the stream released.
    pub fn stop(&mut self) {
        if self.status == SessionStatus::Active {
            self.epoch.advance();
        }
        if let Some(sampler) = self.sampler.take() {
            sampler.cancel();
        }
        if self.stream.take().is_some() {
            log::info!(
                "camera '{}' released",
                self.bound_device.as_deref().unwrap_or("?")
            );
        }
        self.bound_device = None;
        self.status = SessionStatus::Idle;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::capture::domain::video_device::VideoDevice;
    use crate::shared::frame::Frame;

    struct StubStream {
        released: Arc<AtomicBool>,
    }

    impl MediaStream for StubStream {
        fn current_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
            Ok(None)
        }
    }

    impl Drop for StubStream {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    /// Backend whose `open` pops pre-scripted results and counts calls.
    struct StubBackend {
        devices: Vec<VideoDevice>,
        open_results: Mutex<VecDeque<Result<Arc<AtomicBool>, CaptureError>>>,
        open_calls: AtomicUsize,
    }

    impl StubBackend {
        fn new(devices: Vec<&str>) -> Self {
            Self {
                devices: devices
                    .into_iter()
                    .map(|id| VideoDevice::new(id, "stub"))
                    .collect(),
                open_results: Mutex::new(VecDeque::new()),
                open_calls: AtomicUsize::new(0),
            }
        }

        fn push_ok(&self) -> Arc<AtomicBool> {
            let released = Arc::new(AtomicBool::new(false));
            self.open_results
                .lock()
                .unwrap()
                .push_back(Ok(released.clone()));
            released
        }

        fn push_err(&self, err: CaptureError) {
            self.open_results.lock().unwrap().push_back(Err(err));
        }
    }

    impl MediaBackend for StubBackend {
        fn enumerate(&self) -> Result<Vec<VideoDevice>, CaptureError> {
            Ok(self.devices.clone())
        }

        fn open(&self, _device_id: &str) -> Result<Box<dyn MediaStream>, CaptureError> {
            self.open_calls.fetch_add(1, Ordering::SeqCst);
            match self.open_results.lock().unwrap().pop_front() {
                Some(Ok(released)) => Ok(Box::new(StubStream { released })),
                Some(Err(e)) => Err(e),
                None => panic!("unexpected open() call"),
            }
        }
    }

    fn session_with(backend: Arc<StubBackend>) -> (CaptureSession, DeviceCatalog) {
        let mut catalog = DeviceCatalog::new(backend.clone());
        catalog.refresh().unwrap();
        let session = CaptureSession::new(backend, Arc::new(SessionEpoch::new()));
        (session, catalog)
    }

    #[test]
    fn test_start_reaches_active_and_advances_epoch() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        backend.push_ok();
        let (mut session, catalog) = session_with(backend);

        assert_eq!(session.status(), SessionStatus::Idle);
        session.start(&catalog, "cam-1").unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.bound_device(), Some("cam-1"));
        assert_eq!(session.epoch().current(), 1);
        assert!(session.stream().is_some());
    }

    #[test]
    fn test_start_unknown_device_never_touches_platform() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        let (mut session, catalog) = session_with(backend.clone());

        let err = session.start(&catalog, "cam-9").err().unwrap();
        assert!(matches!(err, CaptureError::InvalidDevice(id) if id == "cam-9"));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(backend.open_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_start_while_active_is_rejected() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        backend.push_ok();
        let (mut session, catalog) = session_with(backend.clone());

        session.start(&catalog, "cam-1").unwrap();
        let err = session.start(&catalog, "cam-1").err().unwrap();
        assert!(matches!(err, CaptureError::AlreadyActive));
        assert_eq!(backend.open_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_permission_denied_lands_in_denied() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        backend.push_err(CaptureError::PermissionDenied);
        let (mut session, catalog) = session_with(backend);

        let err = session.start(&catalog, "cam-1").err().unwrap();
        assert!(matches!(err, CaptureError::PermissionDenied));
        assert_eq!(session.status(), SessionStatus::Denied);
        assert!(session.stream().is_none());
    }

    #[test]
    fn test_acquisition_failure_lands_in_error() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        backend.push_err(CaptureError::Acquisition("device busy".into()));
        let (mut session, catalog) = session_with(backend);

        session.start(&catalog, "cam-1").err().unwrap();
        assert_eq!(session.status(), SessionStatus::Error);
    }

    #[test]
    fn test_retry_after_denied_can_succeed() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        backend.push_err(CaptureError::PermissionDenied);
        let released = backend.push_ok();
        let (mut session, catalog) = session_with(backend);

        session.start(&catalog, "cam-1").err().unwrap();
        assert_eq!(session.status(), SessionStatus::Denied);

        session.start(&catalog, "cam-1").unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
        assert!(!released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stop_releases_stream_and_invalidates_epoch() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        let released = backend.push_ok();
        let (mut session, catalog) = session_with(backend);

        session.start(&catalog, "cam-1").unwrap();
        let epoch_while_active = session.epoch().current();
        session.stop();

        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.bound_device(), None);
        assert!(session.stream().is_none());
        assert!(released.load(Ordering::SeqCst));
        assert!(session.epoch().current() > epoch_while_active);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        let (mut session, _catalog) = session_with(backend);

        session.stop();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.epoch().current(), 0);
    }

    #[test]
    fn test_stop_after_denied_returns_to_idle_without_epoch_bump() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        backend.push_err(CaptureError::PermissionDenied);
        let (mut session, catalog) = session_with(backend);

        session.start(&catalog, "cam-1").err().unwrap();
        session.stop();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.epoch().current(), 0);
    }

    #[test]
    fn test_drop_releases_stream() {
        let backend = Arc::new(StubBackend::new(vec!["cam-1"]));
        let released = backend.push_ok();
        let (mut session, catalog) = session_with(backend);

        session.start(&catalog, "cam-1").unwrap();
        drop(session);
        assert!(released.load(Ordering::SeqCst));
    }
}
