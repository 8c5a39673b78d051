//! Rectangle shape.

use super::{ShapeTrait, clamp_between};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
///
/// Width and height may be negative (a drag towards the top-left); every
/// query works on the normalized rectangle from [`Rectangle::as_rect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Top-left corner position.
    pub position: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let width = (p2.x - p1.x).abs();
        let height = (p2.y - p1.y).abs();

        Self::new(Point::new(min_x, min_y), width, height)
    }

    /// Create a rectangle covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_corners(Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1))
    }

    /// Get the rectangle as a normalized kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
        .abs()
    }

    /// The four edges in tie-break order: top, right, bottom, left.
    fn edges(&self) -> [(Point, Point); 4] {
        let r = self.as_rect();
        [
            (Point::new(r.x0, r.y0), Point::new(r.x1, r.y0)),
            (Point::new(r.x1, r.y0), Point::new(r.x1, r.y1)),
            (Point::new(r.x0, r.y1), Point::new(r.x1, r.y1)),
            (Point::new(r.x0, r.y0), Point::new(r.x0, r.y1)),
        ]
    }
}

impl ShapeTrait for Rectangle {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn contains_point(&self, point: Point) -> bool {
        // Half-open, like kurbo: left/top inclusive, right/bottom exclusive.
        self.as_rect().contains(point)
    }

    fn closest_edge_point(&self, from: Point) -> Point {
        let r = self.as_rect();
        if [from.x, from.y, r.x0, r.y0, r.x1, r.y1].iter().any(|v| v.is_nan()) {
            return Point::new(f64::NAN, f64::NAN);
        }

        let mut best = Point::new(clamp_between(from.x, r.x0, r.x1), r.y0);
        let mut best_dist = from.distance_squared(best);
        for (a, b) in self.edges().into_iter().skip(1) {
            let candidate = Point::new(
                clamp_between(from.x, a.x, b.x),
                clamp_between(from.y, a.y, b.y),
            );
            let dist = from.distance_squared(candidate);
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }

    fn connection_points(&self) -> Vec<Point> {
        let r = self.as_rect();
        let center = r.center();
        vec![
            Point::new(center.x, r.y0),
            Point::new(r.x1, center.y),
            Point::new(center.x, r.y1),
            Point::new(r.x0, center.y),
        ]
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn resize(&mut self, size: Size) {
        let origin = self.as_rect().origin();
        self.position = origin;
        self.width = size.width.abs();
        self.height = size.height.abs();
    }
}
