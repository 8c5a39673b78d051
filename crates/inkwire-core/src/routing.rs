//! Connector routing: anchor selection and curved path synthesis.

use crate::config::RoutingConfig;
use crate::node::{Node, NodeId};
use crate::shapes::{Shape, point_to_segment_dist, unit_or_x};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Routing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("Connector endpoint node not found: {0}")]
    MissingNode(NodeId),
}

/// Side of a shape's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Outward unit normal (screen coordinates, y down).
    pub fn normal(self) -> Vec2 {
        match self {
            Side::Left => Vec2::new(-1.0, 0.0),
            Side::Right => Vec2::new(1.0, 0.0),
            Side::Top => Vec2::new(0.0, -1.0),
            Side::Bottom => Vec2::new(0.0, 1.0),
        }
    }

    /// The side facing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// Midpoint of this side of `bounds`.
    pub fn midpoint_of(self, bounds: Rect) -> Point {
        let c = bounds.center();
        match self {
            Side::Left => Point::new(bounds.x0, c.y),
            Side::Right => Point::new(bounds.x1, c.y),
            Side::Top => Point::new(c.x, bounds.y0),
            Side::Bottom => Point::new(c.x, bounds.y1),
        }
    }
}

/// A connector endpoint on a shape's outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    /// World-space position.
    pub position: Point,
    /// Side of the shape the anchor belongs to.
    pub side: Side,
    /// Outward unit direction at the anchor.
    pub normal: Vec2,
}

/// Which curve family a path between two anchors uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Coincident anchors: a zero-length line.
    Straight,
    /// One cubic with a single bulge.
    Single,
    /// Two cubics meeting at the midpoint, inflected.
    SCurve,
}

/// Classify a displacement into its dominant cardinal direction.
/// Ties go to the horizontal axis.
pub fn estimate_edge_direction(vector: Vec2) -> Side {
    if vector.x.abs() >= vector.y.abs() {
        if vector.x >= 0.0 { Side::Right } else { Side::Left }
    } else if vector.y >= 0.0 {
        Side::Bottom
    } else {
        Side::Top
    }
}

/// Distance from `point` to the segment `line_start`→`line_end`.
pub fn distance_to_line(point: Point, line_start: Point, line_end: Point) -> f64 {
    point_to_segment_dist(point, line_start, line_end)
}

/// World-space boundary point of `node` nearest to `from`.
pub fn closest_edge_point(node: &Node, from: Point) -> Point {
    node.closest_edge_point(from)
}

/// Anchor on `node` facing the world-space point `toward`.
///
/// Circles anchor where the line from their center to `toward` crosses the
/// outline. Other shapes anchor at the midpoint of the bounding-box side
/// facing `toward`; triangles then snap that midpoint onto their outline.
pub fn anchor_toward(node: &Node, toward: Point) -> AnchorPoint {
    let shape = node.world_shape();
    let bounds = shape.bounds();
    let delta = toward - bounds.center();

    match &shape {
        Shape::Circle(circle) => {
            let dir = unit_or_x(delta);
            AnchorPoint {
                position: circle.center + dir * circle.effective_radius(),
                side: estimate_edge_direction(dir),
                normal: dir,
            }
        }
        Shape::Rectangle(_) => {
            let side = estimate_edge_direction(delta);
            AnchorPoint {
                position: side.midpoint_of(bounds),
                side,
                normal: side.normal(),
            }
        }
        Shape::Triangle(_) => {
            let side = estimate_edge_direction(delta);
            AnchorPoint {
                position: shape.closest_edge_point(side.midpoint_of(bounds)),
                side,
                normal: side.normal(),
            }
        }
    }
}

/// Anchor on `from` facing the center of `toward`.
pub fn smart_anchor_point(from: &Node, toward: &Node) -> AnchorPoint {
    anchor_toward(from, toward.center())
}

/// Anchor for a free endpoint, its normal facing `toward`.
pub fn loose_anchor(position: Point, toward: Point) -> AnchorPoint {
    let dir = unit_or_x(toward - position);
    AnchorPoint {
        position,
        side: estimate_edge_direction(dir),
        normal: dir,
    }
}

/// Curve family used for two anchors `distance` apart.
pub fn curve_kind(distance: f64, config: &RoutingConfig) -> CurveKind {
    if !(distance > f64::EPSILON) {
        CurveKind::Straight
    } else if distance < config.curve_threshold {
        CurveKind::Single
    } else {
        CurveKind::SCurve
    }
}

/// Smooth path from `start` to `end`, leaving and entering along the
/// anchors' normals. Both anchor positions are exact path endpoints.
pub fn smart_curved_path(
    start: &AnchorPoint,
    end: &AnchorPoint,
    config: &RoutingConfig,
) -> BezPath {
    let (p0, p3) = (start.position, end.position);
    let distance = p0.distance(p3);
    let mut path = BezPath::new();
    path.move_to(p0);

    match curve_kind(distance, config) {
        CurveKind::Straight => path.line_to(p3),
        CurveKind::Single => {
            let offset = (distance * config.c_curve_ratio).min(config.max_control_offset);
            path.curve_to(p0 + start.normal * offset, p3 + end.normal * offset, p3);
        }
        CurveKind::SCurve => {
            let offset = (distance * config.s_curve_ratio).min(config.max_control_offset);
            let mid = p0.midpoint(p3);
            let tangent = unit_or_x(p3 - p0) * (offset / 2.0);
            path.curve_to(p0 + start.normal * offset, mid - tangent, mid);
            path.curve_to(mid + tangent, p3 + end.normal * offset, p3);
        }
    }
    path
}
