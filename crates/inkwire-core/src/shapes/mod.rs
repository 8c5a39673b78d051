//! Shape definitions and the geometric primitives shared by every variant.

mod circle;
mod freehand;
mod rectangle;
mod triangle;

pub use circle::Circle;
pub use freehand::{FreehandStroke, StrokeId};
pub use rectangle::Rectangle;
pub use triangle::Triangle;

use kurbo::{BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that derived points stay inside bounds.
pub const GEOMETRY_EPSILON: f64 = 1e-6;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

/// Dash pattern for connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Appearance of freehand ink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }
}

/// Clamp without the assertions of `f64::clamp`; NaN bounds or `lo > hi`
/// never panic here.
pub(crate) fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Unit vector in the direction of `v`, or +x when `v` has no usable length.
pub(crate) fn unit_or_x(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > f64::EPSILON && len.is_finite() {
        v / len
    } else if v.x.is_nan() || v.y.is_nan() {
        Vec2::new(f64::NAN, f64::NAN)
    } else {
        Vec2::new(1.0, 0.0)
    }
}

/// Closest point to `point` on the segment a→b.
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> Point {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return a;
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    point.distance(closest_point_on_segment(point, a, b))
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => point.distance(*single),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Geometry queries every shape variant answers.
///
/// Coordinates are whatever space the shape's parameters live in: local to
/// the owning node, or world space for a shape returned by
/// [`crate::Node::world_shape`].
pub trait ShapeTrait {
    /// Axis-aligned bounding box, normalized to non-negative width and height.
    fn bounds(&self) -> Rect;

    /// Whether `point` lies inside the shape.
    fn contains_point(&self, point: Point) -> bool;

    /// The boundary point nearest to `from`.
    fn closest_edge_point(&self, from: Point) -> Point;

    /// Canonical anchor candidates on the outline.
    fn connection_points(&self) -> Vec<Point>;

    /// Outline path for rendering.
    fn to_path(&self) -> BezPath;

    /// Move the shape by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Fit the shape to a new bounding size, keeping its top-left corner.
    fn resize(&mut self, size: Size);
}

/// Kind tag for a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Triangle(_) => ShapeKind::Triangle,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Triangle(s) => s.bounds(),
        }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        match self {
            Shape::Rectangle(s) => s.contains_point(point),
            Shape::Circle(s) => s.contains_point(point),
            Shape::Triangle(s) => s.contains_point(point),
        }
    }

    pub fn closest_edge_point(&self, from: Point) -> Point {
        match self {
            Shape::Rectangle(s) => s.closest_edge_point(from),
            Shape::Circle(s) => s.closest_edge_point(from),
            Shape::Triangle(s) => s.closest_edge_point(from),
        }
    }

    pub fn connection_points(&self) -> Vec<Point> {
        match self {
            Shape::Rectangle(s) => s.connection_points(),
            Shape::Circle(s) => s.connection_points(),
            Shape::Triangle(s) => s.connection_points(),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Rectangle(s) => s.to_path(),
            Shape::Circle(s) => s.to_path(),
            Shape::Triangle(s) => s.to_path(),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Rectangle(s) => s.translate(delta),
            Shape::Circle(s) => s.translate(delta),
            Shape::Triangle(s) => s.translate(delta),
        }
    }

    pub fn resize(&mut self, size: Size) {
        match self {
            Shape::Rectangle(s) => s.resize(size),
            Shape::Circle(s) => s.resize(size),
            Shape::Triangle(s) => s.resize(size),
        }
    }

    /// A copy of this shape moved by `delta`.
    pub fn translated(&self, delta: Vec2) -> Shape {
        let mut shape = self.clone();
        shape.translate(delta);
        shape
    }

    /// Geometric center of the bounds.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Distance from `point` to the shape: zero inside, otherwise the
    /// distance to the nearest boundary point.
    pub fn distance_to(&self, point: Point) -> f64 {
        if self.contains_point(point) {
            0.0
        } else {
            point.distance(self.closest_edge_point(point))
        }
    }
}

impl From<Rectangle> for Shape {
    fn from(rect: Rectangle) -> Self {
        Shape::Rectangle(rect)
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Triangle> for Shape {
    fn from(triangle: Triangle) -> Self {
        Shape::Triangle(triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_shapes() -> Vec<Shape> {
        vec![
            Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0).into(),
            Circle::new(Point::new(50.0, 50.0), 25.0).into(),
            Triangle::new(Point::new(0.0, 0.0), Size::new(60.0, 40.0)).into(),
        ]
    }

    fn query_points() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(-300.0, 12.5),
            Point::new(75.0, 45.0),
            Point::new(1e4, -1e4),
            Point::new(33.3, 200.0),
        ]
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(-4.0, 3.0), a, b) - 5.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_distance_degenerate_segment() {
        let a = Point::new(2.0, 2.0);
        assert!((point_to_segment_dist(Point::new(5.0, 6.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_distance() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert!((point_to_polyline_dist(Point::new(12.0, 5.0), &pts) - 2.0).abs() < 1e-9);
        assert!(point_to_polyline_dist(Point::ZERO, &[]).is_infinite());
    }

    #[test]
    fn test_closest_edge_point_not_farther_than_vertices() {
        for shape in sample_shapes() {
            let b = shape.bounds();
            let mut vertices = shape.connection_points();
            if shape.kind() == ShapeKind::Rectangle {
                vertices = vec![
                    Point::new(b.x0, b.y0),
                    Point::new(b.x1, b.y0),
                    Point::new(b.x1, b.y1),
                    Point::new(b.x0, b.y1),
                ];
            }
            for p in query_points() {
                let closest = shape.closest_edge_point(p);
                let d = p.distance(closest);
                for v in &vertices {
                    assert!(d <= p.distance(*v) + 1e-9, "{:?} from {:?}", shape.kind(), p);
                }
            }
        }
    }

    #[test]
    fn test_closest_edge_point_is_deterministic() {
        for shape in sample_shapes() {
            for p in query_points() {
                let first = shape.closest_edge_point(p);
                let second = shape.closest_edge_point(p);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_connection_points_within_bounds() {
        for shape in sample_shapes() {
            let area = shape.bounds().inflate(GEOMETRY_EPSILON, GEOMETRY_EPSILON);
            for p in shape.connection_points() {
                assert!(
                    p.x >= area.x0 && p.x <= area.x1 && p.y >= area.y0 && p.y <= area.y1,
                    "{:?} outside {:?}",
                    p,
                    area
                );
            }
        }
    }

    #[test]
    fn test_distance_to_inside_is_zero() {
        let shape: Shape = Rectangle::new(Point::ZERO, 10.0, 10.0).into();
        assert_eq!(shape.distance_to(Point::new(5.0, 5.0)), 0.0);
        assert!((shape.distance_to(Point::new(13.0, 5.0)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_translated_moves_bounds() {
        for shape in sample_shapes() {
            let before = shape.bounds();
            let after = shape.translated(Vec2::new(5.0, -7.0)).bounds();
            assert!((after.x0 - before.x0 - 5.0).abs() < 1e-9);
            assert!((after.y1 - before.y1 + 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_extreme_magnitudes_do_not_panic() {
        let shapes: Vec<Shape> = vec![
            Rectangle::new(Point::new(-1e10, -1e10), 2e10, 1e10).into(),
            Circle::new(Point::new(1e10, 1e10), 1e10).into(),
            Triangle::new(Point::new(1e10, -1e10), Size::new(1e10, 1e10)).into(),
        ];
        for shape in shapes {
            let b = shape.bounds();
            assert!(b.width() >= 0.0 && b.height() >= 0.0);
            let p = shape.closest_edge_point(Point::new(3e10, -3e10));
            assert!(p.x.is_finite() && p.y.is_finite());
            let _ = shape.contains_point(Point::ZERO);
            assert!(!shape.connection_points().is_empty());
        }
    }

    #[test]
    fn test_nan_parameters_propagate_without_panic() {
        let shapes: Vec<Shape> = vec![
            Rectangle::new(Point::new(f64::NAN, 0.0), 10.0, 10.0).into(),
            Circle::new(Point::ZERO, f64::NAN).into(),
            Triangle::new(Point::new(0.0, f64::NAN), Size::new(10.0, 10.0)).into(),
        ];
        for shape in shapes {
            assert!(!shape.contains_point(Point::new(1.0, 1.0)));
            let p = shape.closest_edge_point(Point::new(1.0, 1.0));
            assert!(p.x.is_nan() || p.y.is_nan());
            let _ = shape.bounds();
            let _ = shape.connection_points();
            let _ = shape.to_path();
        }
    }

    #[test]
    fn test_nan_query_point_does_not_panic() {
        for shape in sample_shapes() {
            let nan = Point::new(f64::NAN, f64::NAN);
            assert!(!shape.contains_point(nan));
            let _ = shape.closest_edge_point(nan);
        }
    }

    #[test]
    fn test_shape_serializes_with_variant_tag() {
        let shape: Shape = Circle::new(Point::new(1.0, 2.0), 3.0).into();
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("Circle"));
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }
}
