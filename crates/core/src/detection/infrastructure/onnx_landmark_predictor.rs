//! Facial keypoint localization using ONNX Runtime via `ort`.
//!
//! Expects a PFLD-style model: a square crop around the face box as NCHW
//! input, one output of `2 * N` keypoint coordinates normalized to the
//! crop. Points are mapped back to frame coordinates before returning.

use std::sync::Arc;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::detection::domain::model_bundle::{ModelBundle, ModelKind};
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::frame::Frame;
use crate::shared::geometry::{BoundingBox, Point};

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 112;

/// Landmark predictor backed by an ONNX Runtime session, created lazily
/// from the bundle's resolved model path.
pub struct OnnxLandmarkPredictor {
    bundle: Arc<ModelBundle>,
    session: Option<ort::session::Session>,
    input_size: u32,
}

impl OnnxLandmarkPredictor {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self {
            bundle,
            session: None,
            input_size: DEFAULT_INPUT_SIZE,
        }
    }

    fn ensure_session(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.session.is_some() {
            return Ok(());
        }
        let path = self
            .bundle
            .path_of(ModelKind::Landmarks)
            .ok_or("landmark model is not ready")?;
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(&path)?;

        // NCHW [1, 3, S, S]; square input expected
        if let Some(input) = session.inputs().first() {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                if shape.len() >= 4 && shape[2] > 0 {
                    self.input_size = shape[2] as u32;
                }
            }
        }
        self.session = Some(session);
        Ok(())
    }
}

impl LandmarkPredictor for OnnxLandmarkPredictor {
    fn predict(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>> {
        if frame.size().is_empty() {
            return Err("cannot predict landmarks on an empty frame".into());
        }
        self.ensure_session()?;

        let crop = CropRegion::square_around(face, frame.width(), frame.height());
        if crop.is_degenerate() {
            return Err("face box has no area to crop".into());
        }

        let input = crop_resize_normalize(frame, &crop, self.input_size);
        let input_value = ort::value::Tensor::from_array(input)?;
        let session = self.session.as_mut().expect("session initialized above");
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("landmark model produced no outputs".into());
        }

        let tensor = outputs[0].try_extract_array::<f32>()?;
        let flat = tensor.as_slice().ok_or("cannot get landmark slice")?;
        if flat.len() % 2 != 0 {
            return Err(format!("odd landmark output length: {}", flat.len()).into());
        }

        // Coordinates are normalized to the crop; map back into the frame.
        let points = flat
            .chunks_exact(2)
            .map(|xy| {
                Point::new(
                    crop.x as f64 + xy[0] as f64 * crop.width as f64,
                    crop.y as f64 + xy[1] as f64 * crop.height as f64,
                )
            })
            .collect();
        Ok(FaceLandmarks::new(points))
    }
}

/// Square crop around a face box, clamped to the frame bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CropRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl CropRegion {
    fn square_around(face: &BoundingBox, frame_w: u32, frame_h: u32) -> Self {
        let cx = face.x + face.width / 2.0;
        let cy = face.y + face.height / 2.0;
        let half = face.width.max(face.height) / 2.0;

        let x1 = (cx - half).max(0.0) as u32;
        let y1 = (cy - half).max(0.0) as u32;
        let x2 = ((cx + half).min(frame_w as f64)) as u32;
        let y2 = ((cy + half).min(frame_h as f64)) as u32;

        Self {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    }

    fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Nearest-neighbor resize of the crop to `target` × `target`, normalized
/// to [0, 1] (the PFLD convention), NCHW float32.
fn crop_resize_normalize(frame: &Frame, crop: &CropRegion, target: u32) -> ndarray::Array4<f32> {
    let t = target as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, t, t));

    let src = frame.as_ndarray(); // [H, W, C] u8
    let cw = crop.width as usize;
    let ch = crop.height as usize;

    for y in 0..t {
        let src_y = crop.y as usize + (y * ch / t).min(ch - 1);
        for x in 0..t {
            let src_x = crop.x as usize + (x * cw / t).min(cw - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_crop_centered() {
        // 10x20 box centered at (50, 50) → square side 20
        let face = BoundingBox::new(45.0, 40.0, 10.0, 20.0);
        let crop = CropRegion::square_around(&face, 640, 480);
        assert_eq!(
            crop,
            CropRegion {
                x: 40,
                y: 40,
                width: 20,
                height: 20
            }
        );
    }

    #[test]
    fn test_square_crop_clamps_to_frame() {
        let face = BoundingBox::new(0.0, 0.0, 40.0, 40.0);
        let crop = CropRegion::square_around(&face, 30, 30);
        assert_eq!(crop.x, 0);
        assert_eq!(crop.y, 0);
        assert_eq!(crop.width, 30);
        assert_eq!(crop.height, 30);
    }

    #[test]
    fn test_square_crop_degenerate_box() {
        let face = BoundingBox::new(10.0, 10.0, 0.0, 0.0);
        let crop = CropRegion::square_around(&face, 640, 480);
        assert!(crop.is_degenerate());
    }

    #[test]
    fn test_crop_resize_normalize_shape_and_range() {
        let frame = Frame::new(vec![255u8; 32 * 32 * 3], 32, 32, 3);
        let crop = CropRegion {
            x: 8,
            y: 8,
            width: 16,
            height: 16,
        };
        let tensor = crop_resize_normalize(&frame, &crop, 112);
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_crop_resize_normalize_reads_crop_region_only() {
        // Frame is black except a white crop region.
        let mut data = vec![0u8; 16 * 16 * 3];
        for y in 4..8 {
            for x in 4..8 {
                for c in 0..3 {
                    data[(y * 16 + x) * 3 + c] = 255;
                }
            }
        }
        let frame = Frame::new(data, 16, 16, 3);
        let crop = CropRegion {
            x: 4,
            y: 4,
            width: 4,
            height: 4,
        };
        let tensor = crop_resize_normalize(&frame, &crop, 8);
        // Every sampled pixel comes from the white region.
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 2, 7, 7]] - 1.0).abs() < 1e-6);
    }
}
