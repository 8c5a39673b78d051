//! Circle shape.

use super::{ShapeTrait, unit_or_x};
use kurbo::{BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Number of evenly spaced anchor candidates on a circle.
const CONNECTION_POINT_COUNT: usize = 8;

/// A circle shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center point.
    pub center: Point,
    /// Radius. Negative values are treated as their magnitude.
    pub radius: f64,
}

impl Circle {
    /// Create a new circle.
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Create the circle inscribed in a bounding rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.center(), rect.width().min(rect.height()) / 2.0)
    }

    /// The normalized, non-negative radius.
    pub fn effective_radius(&self) -> f64 {
        self.radius.abs()
    }

    /// The boundary point at `angle` radians (0 = +x, clockwise in screen space).
    pub fn point_at_angle(&self, angle: f64) -> Point {
        let r = self.effective_radius();
        Point::new(self.center.x + r * angle.cos(), self.center.y + r * angle.sin())
    }

    /// Get as a kurbo Circle.
    pub fn as_kurbo(&self) -> KurboCircle {
        KurboCircle::new(self.center, self.effective_radius())
    }
}

impl ShapeTrait for Circle {
    fn bounds(&self) -> Rect {
        let r = self.effective_radius();
        Rect::new(
            self.center.x - r,
            self.center.y - r,
            self.center.x + r,
            self.center.y + r,
        )
    }

    fn contains_point(&self, point: Point) -> bool {
        point.distance(self.center) <= self.effective_radius()
    }

    fn closest_edge_point(&self, from: Point) -> Point {
        // A query point at the center has no direction; +x is used instead.
        let dir = unit_or_x(from - self.center);
        self.center + dir * self.effective_radius()
    }

    fn connection_points(&self) -> Vec<Point> {
        (0..CONNECTION_POINT_COUNT)
            .map(|i| self.point_at_angle(i as f64 * FRAC_PI_4))
            .collect()
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn resize(&mut self, size: Size) {
        let origin = self.bounds().origin();
        let radius = size.width.abs().min(size.height.abs()) / 2.0;
        self.center = Point::new(origin.x + radius, origin.y + radius);
        self.radius = radius;
    }
}
