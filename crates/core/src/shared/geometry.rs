//! Detection geometry and the coordinate-space transforms applied before
//! anything is drawn: scaling between resolutions and horizontal mirroring
//! so overlays line up with a mirrored live preview.

/// Pixel dimensions of a frame or drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero. Streams report empty sizes
    /// briefly while the first frame is still being negotiated.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale_between(&self, from: Size, to: Size) -> Self {
        let (sx, sy) = scale_factors(from, to);
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }

    /// Reflect across the vertical center line of a surface `width` wide.
    pub fn mirrored(&self, width: f64) -> Self {
        Self {
            x: width - self.x,
            y: self.y,
        }
    }
}

/// Axis-aligned face bounding box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn scale_between(&self, from: Size, to: Size) -> Self {
        let (sx, sy) = scale_factors(from, to);
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }

    /// Reflect across the vertical center line. The mirrored box keeps its
    /// dimensions; its left edge lands where the right edge was.
    pub fn mirrored(&self, surface_width: f64) -> Self {
        Self {
            x: surface_width - (self.x + self.width),
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

fn scale_factors(from: Size, to: Size) -> (f64, f64) {
    if from.is_empty() {
        return (1.0, 1.0);
    }
    (
        to.width as f64 / from.width as f64,
        to.height as f64 / from.height as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    // ── Size ─────────────────────────────────────────────────────────

    #[rstest]
    #[case::both_zero(0, 0, true)]
    #[case::zero_width(0, 480, true)]
    #[case::zero_height(640, 0, true)]
    #[case::non_empty(640, 480, false)]
    fn test_size_is_empty(#[case] w: u32, #[case] h: u32, #[case] expected: bool) {
        assert_eq!(Size::new(w, h).is_empty(), expected);
    }

    // ── Point ────────────────────────────────────────────────────────

    #[test]
    fn test_point_scale_doubles() {
        let p = Point::new(10.0, 20.0);
        let scaled = p.scale_between(Size::new(100, 100), Size::new(200, 200));
        assert_relative_eq!(scaled.x, 20.0);
        assert_relative_eq!(scaled.y, 40.0);
    }

    #[test]
    fn test_point_scale_anisotropic() {
        let p = Point::new(50.0, 50.0);
        let scaled = p.scale_between(Size::new(100, 100), Size::new(200, 50));
        assert_relative_eq!(scaled.x, 100.0);
        assert_relative_eq!(scaled.y, 25.0);
    }

    #[test]
    fn test_point_scale_from_empty_is_identity() {
        let p = Point::new(13.0, 7.0);
        let scaled = p.scale_between(Size::new(0, 0), Size::new(640, 480));
        assert_eq!(scaled, p);
    }

    #[test]
    fn test_point_mirrored() {
        let p = Point::new(100.0, 50.0);
        let m = p.mirrored(640.0);
        assert_relative_eq!(m.x, 540.0);
        assert_relative_eq!(m.y, 50.0);
    }

    #[test]
    fn test_point_mirrored_twice_is_identity() {
        let p = Point::new(123.0, 45.0);
        let round_trip = p.mirrored(640.0).mirrored(640.0);
        assert_relative_eq!(round_trip.x, p.x);
        assert_relative_eq!(round_trip.y, p.y);
    }

    // ── BoundingBox ──────────────────────────────────────────────────

    #[test]
    fn test_bbox_scale_between() {
        let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        let scaled = b.scale_between(Size::new(100, 100), Size::new(300, 200));
        assert_relative_eq!(scaled.x, 30.0);
        assert_relative_eq!(scaled.y, 40.0);
        assert_relative_eq!(scaled.width, 90.0);
        assert_relative_eq!(scaled.height, 80.0);
    }

    #[test]
    fn test_bbox_scale_identity() {
        let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        let same = b.scale_between(Size::new(640, 480), Size::new(640, 480));
        assert_eq!(same, b);
    }

    #[test]
    fn test_bbox_mirrored_left_edge() {
        // Box at x=100, width=50 on a 640-wide surface: right edge at 150,
        // so the mirrored left edge is 640 - 150 = 490.
        let b = BoundingBox::new(100.0, 10.0, 50.0, 60.0);
        let m = b.mirrored(640.0);
        assert_relative_eq!(m.x, 490.0);
        assert_relative_eq!(m.y, 10.0);
        assert_relative_eq!(m.width, 50.0);
        assert_relative_eq!(m.height, 60.0);
    }

    #[test]
    fn test_bbox_mirrored_preserves_area() {
        let b = BoundingBox::new(10.0, 10.0, 80.0, 120.0);
        assert_relative_eq!(b.mirrored(640.0).area(), b.area());
    }

    #[test]
    fn test_bbox_centered_box_is_mirror_symmetric() {
        let b = BoundingBox::new(270.0, 10.0, 100.0, 100.0);
        let m = b.mirrored(640.0);
        assert_relative_eq!(m.x, 270.0);
    }
}
