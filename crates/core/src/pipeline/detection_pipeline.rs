use crate::capture::domain::capture_session::SharedStream;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::pipeline::detection_outcome::{DetectionOutcome, FaceDetection};
use crate::pipeline::overlay::OverlaySink;
use crate::shared::geometry::Size;

/// One detection pass per invocation: read the current frame, localize
/// faces, predict their landmarks, redraw the mirrored overlay, and emit
/// an epoch-tagged outcome.
///
/// A missing frame or zero-dimension frame is a startup transient and
/// skips the pass silently; anything failing after that is reported as a
/// failed outcome, never as "zero faces".
pub struct DetectionPipeline {
    detector: Box<dyn FaceDetector>,
    landmarks: Box<dyn LandmarkPredictor>,
    sink: Box<dyn OverlaySink>,
    display_size: Option<Size>,
}

impl DetectionPipeline {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        landmarks: Box<dyn LandmarkPredictor>,
        sink: Box<dyn OverlaySink>,
    ) -> Self {
        Self {
            detector,
            landmarks,
            sink,
            display_size: None,
        }
    }

    /// Render geometry at `size` instead of the frame's native resolution.
    pub fn with_display_size(mut self, size: Size) -> Self {
        self.display_size = Some(size);
        self
    }

    /// Run one pass against the stream's current frame.
    ///
    /// Returns `None` when no frame was available yet.
    pub fn run_pass(&mut self, stream: &SharedStream, epoch: u64) -> Option<DetectionOutcome> {
        let frame = {
            // Hold the stream lock only while reading the frame.
            let mut stream = stream.lock().unwrap();
            match stream.current_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::debug!("no frame available yet; skipping pass");
                    return None;
                }
                Err(e) => {
                    return Some(DetectionOutcome::failed(
                        format!("failed to read frame: {e}"),
                        epoch,
                    ))
                }
            }
        };
        if frame.size().is_empty() {
            log::debug!("frame has no dimensions yet; skipping pass");
            return None;
        }

        let display = self.display_size.unwrap_or(frame.size());

        let boxes = match self.detector.detect(&frame) {
            Ok(boxes) => boxes,
            Err(e) => {
                return Some(DetectionOutcome::failed(
                    format!("face detection failed: {e}"),
                    epoch,
                ))
            }
        };

        let mut faces = Vec::with_capacity(boxes.len());
        for bounding_box in &boxes {
            match self.landmarks.predict(&frame, bounding_box) {
                Ok(landmarks) => faces.push(FaceDetection {
                    bounding_box: bounding_box.scale_between(frame.size(), display),
                    landmarks: landmarks.scale_between(frame.size(), display),
                }),
                Err(e) => {
                    return Some(DetectionOutcome::failed(
                        format!("landmark prediction failed: {e}"),
                        epoch,
                    ))
                }
            }
        }

        // Redraw every pass; a pass with zero faces still erases whatever
        // the previous pass left on the surface.
        self.sink.prepare(display);
        self.sink.clear();
        let mirror_width = display.width as f64;
        for face in &faces {
            self.sink.draw_landmarks(&face.landmarks.mirrored(mirror_width));
        }
        self.sink.present();

        Some(DetectionOutcome::faces(faces, epoch))
    }
}
