//! Canvas state: nodes, connectors and ink strokes, plus their spatial index.

use crate::classifier::{self, ConnectionIntent};
use crate::config::EngineConfig;
use crate::connector::{Connector, ConnectorEnd, ConnectorId, NodeLookup};
use crate::node::{Node, NodeId};
use crate::quadtree::Quadtree;
use crate::routing::RoutingError;
use crate::shapes::{FreehandStroke, StrokeId};
use kurbo::{Point, Rect, Size, Vec2};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

/// Canvas errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Unknown stroke: {0}")]
    UnknownStroke(StrokeId),
    #[error("Cannot connect node {0} to itself")]
    SelfLoop(NodeId),
    #[error("Stroke is not a connection")]
    NotAConnection,
    #[error("Connection intent does not describe stroke {0}")]
    IntentMismatch(StrokeId),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Owns everything on the canvas and keeps derived state in sync.
///
/// Node bounds are mirrored in a quadtree; every mutator that changes a
/// node's geometry updates it and reroutes the connectors attached to the
/// node.
#[derive(Debug, Clone)]
pub struct Canvas {
    nodes: HashMap<NodeId, Node>,
    /// Stacking rank per node; higher is nearer the front.
    z_ranks: HashMap<NodeId, i64>,
    front_rank: i64,
    back_rank: i64,
    connectors: HashMap<ConnectorId, Connector>,
    strokes: HashMap<StrokeId, FreehandStroke>,
    index: Quadtree<NodeId>,
    config: EngineConfig,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLookup for Canvas {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }
}

impl Canvas {
    /// Create an empty canvas with default settings.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty canvas.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            z_ranks: HashMap::new(),
            front_rank: 0,
            back_rank: 0,
            connectors: HashMap::new(),
            strokes: HashMap::new(),
            index: Quadtree::new(config.quadtree.clone()),
            config,
        }
    }

    /// Get the settings this canvas was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The node index.
    pub fn spatial_index(&self) -> &Quadtree<NodeId> {
        &self.index
    }

    /// Add a node on top of the z-order. A node with a known id replaces the
    /// old one in place.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.index.insert(id, node.bounds());
        if self.nodes.insert(id, node).is_some() {
            self.reroute(id);
        } else {
            self.raise(id);
        }
        id
    }

    /// Remove a node and every connector attached to it.
    /// Returns the node and the ids of the removed connectors.
    pub fn remove_node(&mut self, id: NodeId) -> Option<(Node, Vec<ConnectorId>)> {
        let node = self.nodes.remove(&id)?;
        self.z_ranks.remove(&id);
        self.index.remove(id);

        let dependents = self.connectors_of(id);
        for connector_id in &dependents {
            self.connectors.remove(connector_id);
        }
        if !dependents.is_empty() {
            log::debug!("Removed node {} with {} connector(s)", id, dependents.len());
        }
        Some((node, dependents))
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Move a node by `delta`.
    pub fn move_node(&mut self, id: NodeId, delta: Vec2) -> Result<(), CanvasError> {
        self.edit_node(id, |node| node.move_by(delta))
    }

    /// Place a node's origin at `position`.
    pub fn set_node_position(
        &mut self,
        id: NodeId,
        position: Point,
    ) -> Result<(), CanvasError> {
        self.edit_node(id, |node| node.move_to(position))
    }

    /// Resize a node's shape.
    pub fn resize_node(&mut self, id: NodeId, size: Size) -> Result<(), CanvasError> {
        self.edit_node(id, |node| node.resize(size))
    }

    fn edit_node(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Node),
    ) -> Result<(), CanvasError> {
        let node = self.nodes.get_mut(&id).ok_or(CanvasError::UnknownNode(id))?;
        edit(node);
        let bounds = node.bounds();
        self.index.update(id, bounds);
        self.reroute(id);
        Ok(())
    }

    /// Refresh the connectors attached to `node`. Both ends of a canvas
    /// connector always resolve, so routing cannot fail here.
    fn reroute(&mut self, node: NodeId) {
        let routing = &self.config.routing;
        for connector in self.connectors.values_mut().filter(|c| c.references(node)) {
            if let Err(err) = connector.update_points(&self.nodes, routing) {
                log::warn!("Connector {} left unrouted: {}", connector.id(), err);
            }
        }
    }

    /// Stacking rank of a node. Only the order of ranks is meaningful:
    /// a higher rank is drawn above a lower one.
    pub fn z_rank(&self, id: NodeId) -> Option<i64> {
        self.z_ranks.get(&id).copied()
    }

    /// Node ids from back to front.
    pub fn z_order(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.z_ranks.keys().copied().collect();
        ids.sort_by_key(|id| self.z_ranks.get(id).copied());
        ids
    }

    fn raise(&mut self, id: NodeId) {
        self.front_rank += 1;
        self.z_ranks.insert(id, self.front_rank);
    }

    fn sort_topmost_first(&self, ids: &mut [NodeId]) {
        ids.sort_by_key(|&id| std::cmp::Reverse(self.z_rank(id)));
    }

    /// Nodes whose shape contains `point`, topmost first.
    pub fn nodes_at_point(&self, point: Point) -> Vec<NodeId> {
        let mut hits: Vec<NodeId> = self
            .index
            .query_point(point)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.contains_point(point)))
            .collect();
        self.sort_topmost_first(&mut hits);
        hits
    }

    /// Topmost node containing `point`.
    pub fn node_at_point(&self, point: Point) -> Option<NodeId> {
        self.nodes_at_point(point).first().copied()
    }

    /// Nodes whose bounds touch `rect`, back to front.
    pub fn nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
        let mut hits = self.index.query_region(rect);
        hits.sort_by_key(|&id| self.z_rank(id));
        hits
    }

    /// Nodes within `radius` of `point` (zero for points inside), nearest
    /// first and topmost first among equals.
    pub fn nodes_near(&self, point: Point, radius: f64) -> Vec<NodeId> {
        let search = Rect::from_points(point, point).inflate(radius, radius);
        let mut near: Vec<(NodeId, f64, Option<i64>)> = self
            .index
            .query_region(search)
            .into_iter()
            .filter_map(|id| {
                let distance = self.nodes.get(&id)?.distance_to(point);
                (distance <= radius).then(|| (id, distance, self.z_rank(id)))
            })
            .collect();
        near.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.2.cmp(&a.2))
        });
        near.into_iter().map(|(id, _, _)| id).collect()
    }

    /// Bring a node to the front (topmost).
    pub fn bring_to_front(&mut self, id: NodeId) {
        if self.nodes.contains_key(&id) {
            self.raise(id);
        }
    }

    /// Send a node to the back (bottommost).
    pub fn send_to_back(&mut self, id: NodeId) {
        if self.nodes.contains_key(&id) {
            self.back_rank -= 1;
            self.z_ranks.insert(id, self.back_rank);
        }
    }

    /// Connect two distinct nodes.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<ConnectorId, CanvasError> {
        if source == target {
            return Err(CanvasError::SelfLoop(source));
        }
        self.connect_ends(ConnectorEnd::Node(source), ConnectorEnd::Node(target))
    }

    /// Add a connector between arbitrary ends, routing it immediately.
    pub fn connect_ends(
        &mut self,
        source: ConnectorEnd,
        target: ConnectorEnd,
    ) -> Result<ConnectorId, CanvasError> {
        for end in [source, target] {
            if let Some(id) = end.node_id() {
                if !self.nodes.contains_key(&id) {
                    return Err(CanvasError::UnknownNode(id));
                }
            }
        }
        let mut connector = Connector::new(source, target);
        connector.update_points(&self.nodes, &self.config.routing)?;
        let id = connector.id();
        self.connectors.insert(id, connector);
        Ok(id)
    }

    /// Remove a connector.
    pub fn remove_connector(&mut self, id: ConnectorId) -> Option<Connector> {
        self.connectors.remove(&id)
    }

    /// Get a connector by ID.
    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    /// All connectors, in no particular order.
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    /// Connectors attached to `node`, sorted by id.
    pub fn connectors_of(&self, node: NodeId) -> Vec<ConnectorId> {
        let mut ids: Vec<ConnectorId> = self
            .connectors
            .values()
            .filter(|c| c.references(node))
            .map(|c| c.id())
            .collect();
        ids.sort();
        ids
    }

    /// The connector nearest to `point` among those hit within `tolerance`.
    pub fn connector_at_point(&self, point: Point, tolerance: f64) -> Option<ConnectorId> {
        self.connectors
            .values()
            .filter(|c| c.hit_test(point, tolerance))
            .filter_map(|c| Some((c.id(), c.distance_to(point)?)))
            .min_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            })
            .map(|(id, _)| id)
    }

    /// Keep a stroke as ink.
    pub fn add_stroke(&mut self, stroke: FreehandStroke) -> StrokeId {
        let id = stroke.id();
        self.strokes.insert(id, stroke);
        id
    }

    /// Remove a stroke.
    pub fn remove_stroke(&mut self, id: StrokeId) -> Option<FreehandStroke> {
        self.strokes.remove(&id)
    }

    /// Get a stroke by ID.
    pub fn stroke(&self, id: StrokeId) -> Option<&FreehandStroke> {
        self.strokes.get(&id)
    }

    /// All strokes, in no particular order.
    pub fn strokes(&self) -> impl Iterator<Item = &FreehandStroke> {
        self.strokes.values()
    }

    /// Classify a stored stroke against the current nodes.
    pub fn analyze_stroke(&self, id: StrokeId) -> Option<ConnectionIntent> {
        let stroke = self.strokes.get(&id)?;
        Some(classifier::analyze_stroke(
            &stroke.points,
            self,
            &self.config.classifier,
        ))
    }

    /// Turn a stroke classified as a connection into a connector.
    ///
    /// `intent` must match what [`Canvas::analyze_stroke`] reports for
    /// `stroke_id` right now; an intent taken from another stroke, or made
    /// stale by edits since, is refused. The stroke is dropped only once the
    /// connector exists.
    pub fn confirm_connection(
        &mut self,
        stroke_id: StrokeId,
        intent: &ConnectionIntent,
    ) -> Result<ConnectorId, CanvasError> {
        let current = self
            .analyze_stroke(stroke_id)
            .ok_or(CanvasError::UnknownStroke(stroke_id))?;
        let (source, target) = intent.endpoints().ok_or(CanvasError::NotAConnection)?;
        if current.endpoints() != Some((source, target)) {
            return Err(CanvasError::IntentMismatch(stroke_id));
        }
        let connector_id = self.connect(source, target)?;
        self.strokes.remove(&stroke_id);
        log::debug!("Stroke {} became connector {}", stroke_id, connector_id);
        Ok(connector_id)
    }

    /// Decline a suggested connection; the stroke stays as ink.
    pub fn cancel_connection(&mut self, stroke_id: StrokeId) -> Result<(), CanvasError> {
        if !self.strokes.contains_key(&stroke_id) {
            return Err(CanvasError::UnknownStroke(stroke_id));
        }
        log::debug!("Stroke {} kept as ink", stroke_id);
        Ok(())
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.z_ranks.clear();
        self.front_rank = 0;
        self.back_rank = 0;
        self.connectors.clear();
        self.strokes.clear();
        self.index.clear();
    }

    /// Check if the canvas has no nodes, connectors or strokes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connectors.is_empty() && self.strokes.is_empty()
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}
