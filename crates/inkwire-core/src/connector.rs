//! Connectors: curved links between nodes or free points.

use crate::config::RoutingConfig;
use crate::node::{Node, NodeId};
use crate::routing::{
    AnchorPoint, RoutingError, anchor_toward, distance_to_line, loose_anchor, smart_curved_path,
};
use crate::shapes::{SerializableColor, StrokeStyle};
use kurbo::{BezPath, ParamCurve, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for connectors.
pub type ConnectorId = Uuid;

/// Samples per path segment when measuring distance to the curve.
const HIT_SAMPLES: usize = 16;

/// Read access to nodes by id.
pub trait NodeLookup {
    /// Look up a node.
    fn node(&self, id: NodeId) -> Option<&Node>;
}

impl NodeLookup for HashMap<NodeId, Node> {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.get(&id)
    }
}

/// One end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConnectorEnd {
    /// Attached to a node's outline.
    Node(NodeId),
    /// Free endpoint in world space.
    Point(Point),
}

impl ConnectorEnd {
    /// The attached node, if any.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            ConnectorEnd::Node(id) => Some(*id),
            ConnectorEnd::Point(_) => None,
        }
    }
}

impl From<NodeId> for ConnectorEnd {
    fn from(id: NodeId) -> Self {
        ConnectorEnd::Node(id)
    }
}

impl From<Point> for ConnectorEnd {
    fn from(point: Point) -> Self {
        ConnectorEnd::Point(point)
    }
}

/// Visual properties of a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            stroke_style: StrokeStyle::Solid,
        }
    }
}

/// Anchors and path from the last successful routing pass.
#[derive(Debug, Clone, PartialEq)]
struct RoutedPath {
    source: AnchorPoint,
    target: AnchorPoint,
    path: BezPath,
}

/// A directed link from `source` to `target`.
///
/// The routed path is cached; it is recomputed by [`Connector::update_points`]
/// and is absent until the first successful call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connector {
    pub(crate) id: ConnectorId,
    pub source: ConnectorEnd,
    pub target: ConnectorEnd,
    pub style: ConnectorStyle,
    #[serde(skip)]
    routed: Option<RoutedPath>,
}

enum ResolvedEnd<'a> {
    Node(&'a Node),
    Point(Point),
}

impl ResolvedEnd<'_> {
    fn reference_point(&self) -> Point {
        match self {
            ResolvedEnd::Node(node) => node.center(),
            ResolvedEnd::Point(point) => *point,
        }
    }

    fn anchor(&self, toward: Point) -> AnchorPoint {
        match self {
            ResolvedEnd::Node(node) => anchor_toward(node, toward),
            ResolvedEnd::Point(point) => loose_anchor(*point, toward),
        }
    }
}

fn resolve<L: NodeLookup + ?Sized>(
    end: ConnectorEnd,
    nodes: &L,
) -> Result<ResolvedEnd<'_>, RoutingError> {
    match end {
        ConnectorEnd::Node(id) => nodes
            .node(id)
            .map(ResolvedEnd::Node)
            .ok_or(RoutingError::MissingNode(id)),
        ConnectorEnd::Point(point) => Ok(ResolvedEnd::Point(point)),
    }
}

impl Connector {
    /// Create an unrouted connector with a fresh id.
    pub fn new(source: impl Into<ConnectorEnd>, target: impl Into<ConnectorEnd>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            target: target.into(),
            style: ConnectorStyle::default(),
            routed: None,
        }
    }

    /// Create an unrouted connector between two nodes.
    pub fn between(source: NodeId, target: NodeId) -> Self {
        Self::new(source, target)
    }

    /// Get the connector's identifier.
    pub fn id(&self) -> ConnectorId {
        self.id
    }

    /// Whether either end is attached to `node`.
    pub fn references(&self, node: NodeId) -> bool {
        self.source.node_id() == Some(node) || self.target.node_id() == Some(node)
    }

    /// Recompute anchors and path from the current node geometry.
    ///
    /// On failure the cached path is dropped, so a stale path is never
    /// reported as current.
    pub fn update_points<L: NodeLookup + ?Sized>(
        &mut self,
        nodes: &L,
        config: &RoutingConfig,
    ) -> Result<(), RoutingError> {
        let resolved = resolve(self.source, nodes)
            .and_then(|s| Ok((s, resolve(self.target, nodes)?)));
        let (source, target) = match resolved {
            Ok(ends) => ends,
            Err(err) => {
                log::warn!("Cannot route connector {}: {}", self.id, err);
                self.routed = None;
                return Err(err);
            }
        };

        let source_anchor = source.anchor(target.reference_point());
        let target_anchor = target.anchor(source.reference_point());
        let path = smart_curved_path(&source_anchor, &target_anchor, config);
        self.routed = Some(RoutedPath {
            source: source_anchor,
            target: target_anchor,
            path,
        });
        Ok(())
    }

    /// Cached path, if routed.
    pub fn path(&self) -> Option<&BezPath> {
        self.routed.as_ref().map(|r| &r.path)
    }

    /// Source anchor position, if routed.
    pub fn source_point(&self) -> Option<Point> {
        self.routed.as_ref().map(|r| r.source.position)
    }

    /// Target anchor position, if routed.
    pub fn target_point(&self) -> Option<Point> {
        self.routed.as_ref().map(|r| r.target.position)
    }

    /// Bounding box of the cached path.
    pub fn bounds(&self) -> Option<Rect> {
        self.path().map(|p| p.bounding_box())
    }

    /// True until the next successful [`Connector::update_points`].
    pub fn is_stale(&self) -> bool {
        self.routed.is_none()
    }

    /// Drop the cached path.
    pub fn invalidate(&mut self) {
        self.routed = None;
    }

    /// Approximate distance from `point` to the routed curve.
    pub fn distance_to(&self, point: Point) -> Option<f64> {
        let path = self.path()?;
        let samples = sample_path(path);
        if samples.len() == 1 {
            return Some(point.distance(samples[0]));
        }
        samples
            .windows(2)
            .map(|w| distance_to_line(point, w[0], w[1]))
            .reduce(f64::min)
    }

    /// Check if `point` lies on the connector, within `tolerance` plus half
    /// the stroke width. Unrouted connectors are never hit.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.distance_to(point)
            .is_some_and(|d| d <= tolerance + self.style.stroke_width / 2.0)
    }
}

fn sample_path(path: &BezPath) -> Vec<Point> {
    let mut points = Vec::new();
    for seg in path.segments() {
        if points.is_empty() {
            points.push(seg.eval(0.0));
        }
        for i in 1..=HIT_SAMPLES {
            points.push(seg.eval(i as f64 / HIT_SAMPLES as f64));
        }
    }
    points
}
