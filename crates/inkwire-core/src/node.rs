//! Canvas nodes: a stable identity, a world position and an owned shape.

use crate::shapes::{Circle, Rectangle, Shape, Triangle};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// A shape placed on the canvas.
///
/// The shape's parameters are local to `position`; every query here answers
/// in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    /// World position of the shape's local origin.
    pub position: Point,
    /// The owned shape, in local coordinates.
    pub shape: Shape,
}

impl Node {
    /// Create a node with a fresh id.
    pub fn new(position: Point, shape: impl Into<Shape>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            shape: shape.into(),
        }
    }

    /// Rectangle node covering `rect` in world space.
    pub fn rectangle(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.origin(), Rectangle::new(Point::ZERO, rect.width(), rect.height()))
    }

    /// Circle node centered at `center`.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(center, Circle::new(Point::ZERO, radius))
    }

    /// Triangle node filling `rect` in world space.
    pub fn triangle(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.center(), Triangle::new(Point::ZERO, rect.size()))
    }

    /// Get the node's identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The shape translated into world coordinates.
    pub fn world_shape(&self) -> Shape {
        self.shape.translated(self.position.to_vec2())
    }

    /// World-space bounding box.
    pub fn bounds(&self) -> Rect {
        self.shape.bounds() + self.position.to_vec2()
    }

    /// World-space center of the bounds.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Whether the world-space `point` lies inside the node's shape.
    pub fn contains_point(&self, point: Point) -> bool {
        self.shape.contains_point(self.to_local(point))
    }

    /// The world-space boundary point nearest to `from`.
    pub fn closest_edge_point(&self, from: Point) -> Point {
        self.shape.closest_edge_point(self.to_local(from)) + self.position.to_vec2()
    }

    /// Anchor candidates in world coordinates.
    pub fn connection_points(&self) -> Vec<Point> {
        let offset = self.position.to_vec2();
        self.shape
            .connection_points()
            .into_iter()
            .map(|p| p + offset)
            .collect()
    }

    /// Distance from the world-space `point` to the shape (zero inside).
    pub fn distance_to(&self, point: Point) -> f64 {
        self.shape.distance_to(self.to_local(point))
    }

    /// Move the node by `delta`.
    pub fn move_by(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Place the node's local origin at `position`.
    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    /// Resize the shape to a new bounding size, keeping its top-left corner.
    pub fn resize(&mut self, size: Size) {
        self.shape.resize(size);
    }

    fn to_local(&self, point: Point) -> Point {
        point - self.position.to_vec2()
    }
}
