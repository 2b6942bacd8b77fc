//! Single-shot face detector using ONNX Runtime via `ort`.
//!
//! Expects an UltraFace-style model: fixed NCHW input, two outputs of
//! per-anchor class scores `[1, N, 2]` and normalized corner boxes
//! `[1, N, 4]`. Post-processing is a confidence cut plus greedy NMS.

use std::sync::Arc;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::model_bundle::{ModelBundle, ModelKind};
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_WIDTH: u32 = 320;
const DEFAULT_INPUT_HEIGHT: u32 = 240;

/// Default confidence threshold for keeping a detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Face detector backed by an ONNX Runtime session.
///
/// The session is created lazily from the bundle's resolved model path, so
/// the detector can be constructed while the model is still loading; calls
/// before the Detector slot is Ready fail cleanly.
pub struct OnnxFaceDetector {
    bundle: Arc<ModelBundle>,
    session: Option<ort::session::Session>,
    confidence: f64,
    input_width: u32,
    input_height: u32,
}

impl OnnxFaceDetector {
    pub fn new(bundle: Arc<ModelBundle>, confidence: f64) -> Self {
        Self {
            bundle,
            session: None,
            confidence,
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
        }
    }

    fn ensure_session(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.session.is_some() {
            return Ok(());
        }
        let path = self
            .bundle
            .path_of(ModelKind::Detector)
            .ok_or("detector model is not ready")?;
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(&path)?;

        // Read the input resolution from the model metadata (NCHW: [1, 3, H, W])
        if let Some(input) = session.inputs().first() {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                if shape.len() >= 4 && shape[2] > 0 && shape[3] > 0 {
                    self.input_height = shape[2] as u32;
                    self.input_width = shape[3] as u32;
                }
            }
        }
        self.session = Some(session);
        Ok(())
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if frame.size().is_empty() {
            return Err("cannot run detection on an empty frame".into());
        }
        self.ensure_session()?;

        let fw = frame.width() as f64;
        let fh = frame.height() as f64;

        let input = resize_normalize(frame, self.input_width, self.input_height);
        let input_value = ort::value::Tensor::from_array(input)?;
        let session = self.session.as_mut().expect("session initialized above");
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() < 2 {
            return Err("detector model produced too few outputs".into());
        }

        let scores = outputs[0].try_extract_array::<f32>()?;
        let boxes = outputs[1].try_extract_array::<f32>()?;
        let s_shape = scores.shape();
        let b_shape = boxes.shape();
        if s_shape.len() != 3 || s_shape[2] != 2 || b_shape.len() != 3 || b_shape[2] != 4 {
            return Err(
                format!("unexpected detector output shapes: {s_shape:?} / {b_shape:?}").into(),
            );
        }

        let s = scores.as_slice().ok_or("cannot get scores slice")?;
        let b = boxes.as_slice().ok_or("cannot get boxes slice")?;
        let anchors = s_shape[1].min(b_shape[1]);

        let mut raw = Vec::new();
        for i in 0..anchors {
            let conf = s[i * 2 + 1] as f64;
            if conf < self.confidence {
                continue;
            }
            // Corner coordinates, normalized to [0, 1] over the input
            raw.push(RawDetection {
                x1: (b[i * 4] as f64 * fw).clamp(0.0, fw),
                y1: (b[i * 4 + 1] as f64 * fh).clamp(0.0, fh),
                x2: (b[i * 4 + 2] as f64 * fw).clamp(0.0, fw),
                y2: (b[i * 4 + 3] as f64 * fh).clamp(0.0, fh),
                confidence: conf,
            });
        }

        let kept = nms(&mut raw, NMS_IOU_THRESH);
        Ok(kept
            .iter()
            .map(|d| {
                BoundingBox::new(
                    d.x1,
                    d.y1,
                    (d.x2 - d.x1).max(0.0),
                    (d.y2 - d.y1).max(0.0),
                )
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Nearest-neighbor resize to the model input and normalize to roughly
/// [-1, 1] ((v - 127) / 128, the UltraFace convention), NCHW float32.
fn resize_normalize(frame: &Frame, target_w: u32, target_h: u32) -> ndarray::Array4<f32> {
    let tw = target_w as usize;
    let th = target_h as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, th, tw));

    let src = frame.as_ndarray(); // [H, W, C] u8
    let sw = frame.width() as usize;
    let sh = frame.height() as usize;

    for y in 0..th {
        let src_y = (y * sh / th).min(sh - 1);
        for x in 0..tw {
            let src_x = (x * sw / tw).min(sw - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - 127.0) / 128.0;
            }
        }
    }
    tensor
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && corner_iou(&dets[i], &dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn corner_iou(a: &RawDetection, b: &RawDetection) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}
