use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::pipeline::overlay::OverlaySink;
use crate::shared::geometry::Size;

const DOT_RADIUS: i64 = 2;
const DOT_COLOR: Rgba<u8> = Rgba([64, 255, 128, 255]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Rasterizes the landmark overlay into a transparent RGBA canvas sized to
/// the display resolution, one filled dot per keypoint.
pub struct ImageOverlaySink {
    canvas: RgbaImage,
}

impl Default for ImageOverlaySink {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageOverlaySink {
    pub fn new() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        self.canvas.save(path)
    }
}

impl OverlaySink for ImageOverlaySink {
    fn prepare(&mut self, size: Size) {
        if self.canvas.width() != size.width || self.canvas.height() != size.height {
            self.canvas = RgbaImage::new(size.width, size.height);
        }
    }

    fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks) {
        let (w, h) = (self.canvas.width() as i64, self.canvas.height() as i64);
        for point in landmarks.points() {
            let px = point.x.round() as i64;
            let py = point.y.round() as i64;
            for dy in -DOT_RADIUS..=DOT_RADIUS {
                for dx in -DOT_RADIUS..=DOT_RADIUS {
                    if dx * dx + dy * dy > DOT_RADIUS * DOT_RADIUS {
                        continue;
                    }
                    let (x, y) = (px + dx, py + dy);
                    if x >= 0 && x < w && y >= 0 && y < h {
                        self.canvas.put_pixel(x as u32, y as u32, DOT_COLOR);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::Point;

    fn landmarks(coords: &[(f64, f64)]) -> FaceLandmarks {
        FaceLandmarks::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn test_prepare_sizes_canvas() {
        let mut sink = ImageOverlaySink::new();
        sink.prepare(Size::new(64, 48));
        assert_eq!(sink.canvas().dimensions(), (64, 48));
    }

    #[test]
    fn test_prepare_same_size_keeps_canvas() {
        let mut sink = ImageOverlaySink::new();
        sink.prepare(Size::new(64, 48));
        sink.draw_landmarks(&landmarks(&[(10.0, 10.0)]));
        sink.prepare(Size::new(64, 48));
        // Unchanged size: the drawing is still there until clear().
        assert_eq!(*sink.canvas().get_pixel(10, 10), DOT_COLOR);
    }

    #[test]
    fn test_draw_then_clear() {
        let mut sink = ImageOverlaySink::new();
        sink.prepare(Size::new(32, 32));
        sink.draw_landmarks(&landmarks(&[(16.0, 16.0)]));
        assert_eq!(*sink.canvas().get_pixel(16, 16), DOT_COLOR);

        sink.clear();
        assert_eq!(*sink.canvas().get_pixel(16, 16), TRANSPARENT);
    }

    #[test]
    fn test_dot_has_radius() {
        let mut sink = ImageOverlaySink::new();
        sink.prepare(Size::new(32, 32));
        sink.draw_landmarks(&landmarks(&[(16.0, 16.0)]));
        assert_eq!(*sink.canvas().get_pixel(18, 16), DOT_COLOR);
        assert_eq!(*sink.canvas().get_pixel(16, 18), DOT_COLOR);
        // Corners beyond the radius stay transparent.
        assert_eq!(*sink.canvas().get_pixel(18, 18), TRANSPARENT);
    }

    #[test]
    fn test_out_of_bounds_points_are_ignored() {
        let mut sink = ImageOverlaySink::new();
        sink.prepare(Size::new(16, 16));
        sink.draw_landmarks(&landmarks(&[(-50.0, 8.0), (8.0, 200.0)]));
        assert!(sink.canvas().pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_edge_point_is_clipped_not_panicking() {
        let mut sink = ImageOverlaySink::new();
        sink.prepare(Size::new(16, 16));
        sink.draw_landmarks(&landmarks(&[(0.0, 0.0), (15.0, 15.0)]));
        assert_eq!(*sink.canvas().get_pixel(0, 0), DOT_COLOR);
        assert_eq!(*sink.canvas().get_pixel(15, 15), DOT_COLOR);
    }
}
