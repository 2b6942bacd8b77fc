use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter identifying one session activation.
///
/// Advanced on every transition into Active and again on leaving it, so a
/// detection pass tagged at dispatch time can be recognized as stale once
/// the session it belonged to has moved on.
#[derive(Debug, Default)]
pub struct SessionEpoch(AtomicU64);

impl SessionEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}
