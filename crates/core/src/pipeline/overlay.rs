use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::geometry::Size;

/// Output sink for the landmark overlay.
///
/// The pipeline is the sole writer: every pass prepares the surface at the
/// display resolution, clears the previous drawing, and draws the current
/// landmarks. Injecting the sink keeps the pipeline testable headlessly.
pub trait OverlaySink: Send {
    /// Match the surface to the display resolution. Called every pass;
    /// cheap when the size is unchanged.
    fn prepare(&mut self, size: Size);

    /// Erase whatever the previous pass drew.
    fn clear(&mut self);

    /// Draw one face's landmarks. Coordinates arrive already scaled to the
    /// display and mirrored.
    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks);

    /// The pass is complete; flush the surface if the sink buffers.
    /// Default: no-op.
    fn present(&mut self) {}
}

/// Sink that discards everything. For headless runs where only the
/// presence boolean matters.
pub struct NullOverlaySink;

impl OverlaySink for NullOverlaySink {
    fn prepare(&mut self, _size: Size) {}
    fn clear(&mut self) {}
    fn draw_landmarks(&mut self, _landmarks: &FaceLandmarks) {}
}
