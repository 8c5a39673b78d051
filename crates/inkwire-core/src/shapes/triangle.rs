//! Triangle shape.

use super::{ShapeTrait, closest_point_on_segment};
use kurbo::{BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// An isosceles triangle with its apex on top, described by the center of
/// its bounding box and that box's size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Center of the bounding box.
    pub center: Point,
    /// Bounding box size. Negative dimensions are treated as their magnitude.
    pub size: Size,
}

impl Triangle {
    /// Create a new triangle.
    pub fn new(center: Point, size: Size) -> Self {
        Self { center, size }
    }

    /// Create the triangle that fills a bounding rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.center(), rect.size())
    }

    fn half_extents(&self) -> (f64, f64) {
        (self.size.width.abs() / 2.0, self.size.height.abs() / 2.0)
    }

    /// Vertices in order: apex, bottom-left, bottom-right.
    pub fn vertices(&self) -> [Point; 3] {
        let (hw, hh) = self.half_extents();
        let c = self.center;
        [
            Point::new(c.x, c.y - hh),
            Point::new(c.x - hw, c.y + hh),
            Point::new(c.x + hw, c.y + hh),
        ]
    }

    /// Edges in tie-break order: left side, right side, base.
    fn edges(&self) -> [(Point, Point); 3] {
        let [apex, left, right] = self.vertices();
        [(apex, left), (apex, right), (left, right)]
    }

    /// Zero width or zero height. Any positive extent, however small, still
    /// encloses area.
    fn is_degenerate(&self) -> bool {
        let (hw, hh) = self.half_extents();
        !(hw > 0.0 && hh > 0.0)
    }
}

/// Twice the signed area of p1-p2-p3.
fn sign(p1: Point, p2: Point, p3: Point) -> f64 {
    (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
}

impl ShapeTrait for Triangle {
    fn bounds(&self) -> Rect {
        let (hw, hh) = self.half_extents();
        Rect::new(
            self.center.x - hw,
            self.center.y - hh,
            self.center.x + hw,
            self.center.y + hh,
        )
    }

    fn contains_point(&self, point: Point) -> bool {
        let [apex, left, right] = self.vertices();
        let d1 = sign(point, apex, left);
        let d2 = sign(point, left, right);
        let d3 = sign(point, right, apex);
        if d1.is_nan() || d2.is_nan() || d3.is_nan() {
            return false;
        }

        if self.is_degenerate() {
            // Collapsed to a segment or a point: only the outline itself counts.
            return self.edges().iter().any(|&(a, b)| {
                point.distance(closest_point_on_segment(point, a, b)) < f64::EPSILON
            });
        }

        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    }

    fn closest_edge_point(&self, from: Point) -> Point {
        let edges = self.edges();
        let mut best = closest_point_on_segment(from, edges[0].0, edges[0].1);
        let mut best_dist = from.distance_squared(best);
        for &(a, b) in &edges[1..] {
            let candidate = closest_point_on_segment(from, a, b);
            let dist = from.distance_squared(candidate);
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }

    fn connection_points(&self) -> Vec<Point> {
        let [apex, left, right] = self.vertices();
        vec![apex, left.midpoint(apex), right.midpoint(apex), left.midpoint(right)]
    }

    fn to_path(&self) -> BezPath {
        let [apex, left, right] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(apex);
        path.line_to(right);
        path.line_to(left);
        path.close_path();
        path
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn resize(&mut self, size: Size) {
        let origin = self.bounds().origin();
        let size = Size::new(size.width.abs(), size.height.abs());
        self.center = Point::new(origin.x + size.width / 2.0, origin.y + size.height / 2.0);
        self.size = size;
    }
}
