use std::time::Instant;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::geometry::BoundingBox;

/// One face found by a detection pass, in display coordinates.
#[derive(Clone, Debug)]
pub struct FaceDetection {
    pub bounding_box: BoundingBox,
    pub landmarks: FaceLandmarks,
}

/// What a completed pass produced: the faces it saw, or the reason it
/// failed. A failed pass is never coerced into "zero faces".
#[derive(Clone, Debug)]
pub enum DetectionResult {
    Faces(Vec<FaceDetection>),
    Failed(String),
}

/// A completed detection pass, tagged with the session epoch it was
/// dispatched under so late completions can be recognized as stale.
#[derive(Clone, Debug)]
pub struct DetectionOutcome {
    pub result: DetectionResult,
    pub sampled_at: Instant,
    pub session_epoch: u64,
}

impl DetectionOutcome {
    pub fn faces(faces: Vec<FaceDetection>, session_epoch: u64) -> Self {
        Self {
            result: DetectionResult::Faces(faces),
            sampled_at: Instant::now(),
            session_epoch,
        }
    }

    pub fn failed(reason: impl Into<String>, session_epoch: u64) -> Self {
        Self {
            result: DetectionResult::Failed(reason.into()),
            sampled_at: Instant::now(),
            session_epoch,
        }
    }
}
