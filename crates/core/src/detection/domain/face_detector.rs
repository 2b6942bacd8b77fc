use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// Domain interface for face localization.
///
/// Returns one box per visible face, in frame pixel coordinates.
/// Implementations may be stateful (e.g., lazily initialized inference
/// sessions), hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;
}
