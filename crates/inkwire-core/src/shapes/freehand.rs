//! Freehand ink strokes.

use super::{InkStyle, point_to_polyline_dist};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// A freehand stroke: points in the order they were drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreehandStroke {
    pub(crate) id: StrokeId,
    /// Points in the stroke, in drawing order.
    pub points: Vec<Point>,
    /// Style properties.
    pub style: InkStyle,
}

impl FreehandStroke {
    /// Create a new empty stroke.
    pub fn new() -> Self {
        Self::from_points(Vec::new())
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style: InkStyle::default(),
        }
    }

    /// Get the stroke's identifier.
    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Add a point to the stroke.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point drawn.
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Last point drawn.
    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Total length along the drawn path.
    pub fn path_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Bounding box of all points (zero rect when empty).
    pub fn bounds(&self) -> Rect {
        let Some(&first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .fold(Rect::from_points(first, first), |acc, &p| acc.union_pt(p))
    }

    /// Check if a point lies on the ink, within `tolerance` plus half the
    /// stroke width.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.style.stroke_width / 2.0
    }

    /// Polyline path for rendering.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((&first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(first);
        for &point in rest {
            path.line_to(point);
        }
        path
    }
}

impl Default for FreehandStroke {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_creation() {
        let stroke = FreehandStroke::new();
        assert!(stroke.is_empty());
        assert_eq!(stroke.bounds(), Rect::ZERO);
        assert!(stroke.start().is_none());
    }

    #[test]
    fn test_add_points_keeps_order() {
        let mut stroke = FreehandStroke::new();
        stroke.add_point(Point::new(0.0, 0.0));
        stroke.add_point(Point::new(10.0, 10.0));
        stroke.add_point(Point::new(5.0, 0.0));
        assert_eq!(stroke.len(), 3);
        assert_eq!(stroke.start(), Some(Point::new(0.0, 0.0)));
        assert_eq!(stroke.end(), Some(Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_bounds() {
        let stroke = FreehandStroke::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ]);

        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let stroke =
            FreehandStroke::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);

        assert!(stroke.hit_test(Point::new(50.0, 0.0), 5.0));
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_path_length() {
        let stroke = FreehandStroke::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ]);
        assert!((stroke.path_length() - 11.0).abs() < 1e-9);
    }
}
