//! The 68-point facial keypoint set produced by the landmark model.
//!
//! Points travel through the same coordinate-space transforms as the face
//! box they belong to: scaled to the display resolution, then mirrored so
//! the overlay lines up with a mirrored live preview.

use crate::shared::geometry::{Point, Size};

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn scale_between(&self, from: Size, to: Size) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| p.scale_between(from, to))
                .collect(),
        }
    }

    /// Reflect every point across the vertical center line of a surface
    /// `width` wide.
    pub fn mirrored(&self, width: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p.mirrored(width)).collect(),
        }
    }
}
