//! Readiness tracking for the three inference models.
//!
//! The three slots load independently: one model failing never aborts the
//! others, and the gate only needs Detector and Landmarks. The Auxiliary
//! embedding model is unused by presence gating, so its failure is absorbed.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Detector,
    Landmarks,
    Auxiliary,
}

impl ModelKind {
    /// Load order: the models the gate depends on come first.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Detector,
        ModelKind::Landmarks,
        ModelKind::Auxiliary,
    ];

    fn index(self) -> usize {
        match self {
            ModelKind::Detector => 0,
            ModelKind::Landmarks => 1,
            ModelKind::Auxiliary => 2,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Detector => "detector",
            ModelKind::Landmarks => "landmarks",
            ModelKind::Auxiliary => "auxiliary",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModelStatus {
    #[default]
    NotLoaded,
    Loading,
    Ready,
    Failed,
}

/// Resolves one model asset to a local path. The only I/O-heavy, slow-start
/// path in the subsystem; it runs on a background thread so camera
/// acquisition is never blocked behind it.
pub trait ModelFetcher: Send + Sync {
    fn fetch(&self, kind: ModelKind) -> Result<PathBuf, Box<dyn std::error::Error>>;
}

#[derive(Default)]
struct Slot {
    status: ModelStatus,
    path: Option<PathBuf>,
    failure: Option<String>,
}

/// Per-model load status for the detection stack.
pub struct ModelBundle {
    fetcher: Arc<dyn ModelFetcher>,
    slots: Mutex<[Slot; 3]>,
}

impl ModelBundle {
    pub fn new(fetcher: Arc<dyn ModelFetcher>) -> Arc<Self> {
        Arc::new(Self {
            fetcher,
            slots: Mutex::new(Default::default()),
        })
    }

    /// Fetch every slot that is not already Loading or Ready, in order,
    /// on one background thread. Failures are recorded per slot and never
    /// abort the remaining loads. Idempotent per model: repeated calls only
    /// re-attempt NotLoaded and Failed slots.
    pub fn load(self: &Arc<Self>) -> thread::JoinHandle<()> {
        let to_fetch: Vec<ModelKind> = {
            let mut slots = self.slots.lock().unwrap();
            ModelKind::ALL
                .into_iter()
                .filter(|kind| {
                    let slot = &mut slots[kind.index()];
                    match slot.status {
                        ModelStatus::Loading | ModelStatus::Ready => false,
                        ModelStatus::NotLoaded | ModelStatus::Failed => {
                            slot.status = ModelStatus::Loading;
                            slot.failure = None;
                            true
                        }
                    }
                })
                .collect()
        };

        let bundle = self.clone();
        thread::spawn(move || {
            for kind in to_fetch {
                match bundle.fetcher.fetch(kind) {
                    Ok(path) => {
                        log::info!("{kind} model ready at {}", path.display());
                        let mut slots = bundle.slots.lock().unwrap();
                        let slot = &mut slots[kind.index()];
                        slot.status = ModelStatus::Ready;
                        slot.path = Some(path);
                    }
                    Err(e) => {
                        if kind == ModelKind::Auxiliary {
                            log::warn!("{kind} model failed to load (gating unaffected): {e}");
                        } else {
                            log::warn!("{kind} model failed to load: {e}");
                        }
                        let mut slots = bundle.slots.lock().unwrap();
                        let slot = &mut slots[kind.index()];
                        slot.status = ModelStatus::Failed;
                        slot.failure = Some(e.to_string());
                    }
                }
            }
        })
    }

    pub fn status_of(&self, kind: ModelKind) -> ModelStatus {
        self.slots.lock().unwrap()[kind.index()].status
    }

    pub fn path_of(&self, kind: ModelKind) -> Option<PathBuf> {
        self.slots.lock().unwrap()[kind.index()].path.clone()
    }

    pub fn failure_of(&self, kind: ModelKind) -> Option<String> {
        self.slots.lock().unwrap()[kind.index()].failure.clone()
    }

    /// True once both models the gate depends on are Ready. Polled before
    /// every sampling tick rather than awaited once.
    pub fn is_gate_ready(&self) -> bool {
        let slots = self.slots.lock().unwrap();
        slots[ModelKind::Detector.index()].status == ModelStatus::Ready
            && slots[ModelKind::Landmarks.index()].status == ModelStatus::Ready
    }
}
