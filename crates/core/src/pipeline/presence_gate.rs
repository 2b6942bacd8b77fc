use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::capture::domain::session_epoch::SessionEpoch;
use crate::pipeline::detection_outcome::{DetectionOutcome, DetectionResult};

/// The boolean the UI gates its start action on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PresenceState {
    pub detected: bool,
    pub last_updated: Option<Instant>,
}

/// Reduces the most recent detection outcome into `PresenceState`.
///
/// Outcomes from a superseded session epoch are discarded. A failed pass
/// leaves `detected` unchanged rather than flipping it to false, since a
/// transient inference hiccup must not read as the subject leaving.
pub struct PresenceGate {
    epoch: Arc<SessionEpoch>,
    state: Mutex<PresenceState>,
}

impl PresenceGate {
    pub fn new(epoch: Arc<SessionEpoch>) -> Self {
        Self {
            epoch,
            state: Mutex::new(PresenceState::default()),
        }
    }

    pub fn apply(&self, outcome: &DetectionOutcome) {
        let live = self.epoch.current();
        if outcome.session_epoch != live {
            log::debug!(
                "discarding stale detection outcome (epoch {} != live {live})",
                outcome.session_epoch
            );
            return;
        }
        match &outcome.result {
            DetectionResult::Failed(reason) => {
                log::warn!("detection pass failed, presence unchanged: {reason}");
            }
            DetectionResult::Faces(faces) => {
                let mut state = self.state.lock().unwrap();
                state.detected = !faces.is_empty();
                state.last_updated = Some(outcome.sampled_at);
            }
        }
    }

    /// Force `detected = false`. Called whenever the session leaves Active.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = PresenceState::default();
    }

    pub fn detected(&self) -> bool {
        self.state.lock().unwrap().detected
    }

    pub fn snapshot(&self) -> PresenceState {
        *self.state.lock().unwrap()
    }
}
