use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// Domain interface for facial keypoint localization within a detected box.
///
/// Returned points are in frame pixel coordinates, like the box itself.
pub trait LandmarkPredictor: Send {
    fn predict(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>>;
}
