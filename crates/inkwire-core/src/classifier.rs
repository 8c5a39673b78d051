//! Decides whether a freehand stroke is a connection between two nodes.
//!
//! A stroke counts as a connection when it starts on (or near) one node,
//! ends on a different one, and runs roughly straight between them. Anything
//! else is ink.

use crate::canvas::Canvas;
use crate::config::ClassifierConfig;
use crate::node::NodeId;
use crate::routing::distance_to_line;
use crate::shapes::clamp_between;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Result of classifying a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionIntent {
    /// Node under or near the first point.
    pub source: Option<NodeId>,
    /// Node under or near the last point.
    pub target: Option<NodeId>,
    /// Straightness score in [0, 1].
    pub confidence: f64,
    /// Both ends resolved to distinct nodes and the stroke is straight enough.
    pub is_valid_connection: bool,
}

impl ConnectionIntent {
    /// Negative result with no endpoints.
    pub fn rejected() -> Self {
        Self {
            source: None,
            target: None,
            confidence: 0.0,
            is_valid_connection: false,
        }
    }

    /// Source and target, only for a valid connection.
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        if !self.is_valid_connection {
            return None;
        }
        self.source.zip(self.target)
    }
}

/// How closely `points` follow the segment from the first to the last point.
///
/// The mean distance of the intermediate points to that segment, relative to
/// its length, is subtracted from 1 and clamped to [0, 1]. A stroke whose ends
/// coincide scores 0.
pub fn straightness(points: &[Point]) -> f64 {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    let ideal_length = first.distance(last);
    if !(ideal_length > f64::EPSILON) {
        return 0.0;
    }

    let interior = &points[1..points.len() - 1];
    if interior.is_empty() {
        return 1.0;
    }
    let mean_deviation = interior
        .iter()
        .map(|&p| distance_to_line(p, first, last))
        .sum::<f64>()
        / interior.len() as f64;

    clamp_between(1.0 - mean_deviation / ideal_length, 0.0, 1.0)
}

/// Nearest node to `point` within `tolerance`, topmost on ties.
fn resolve_endpoint(canvas: &Canvas, point: Point, tolerance: f64) -> Option<NodeId> {
    canvas.nodes_near(point, tolerance).first().copied()
}

/// Classify `points` against the nodes on `canvas`.
pub fn analyze_stroke(
    points: &[Point],
    canvas: &Canvas,
    config: &ClassifierConfig,
) -> ConnectionIntent {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return ConnectionIntent::rejected();
    };
    if points.len() < config.min_points {
        log::debug!(
            "Stroke rejected: {} points, need {}",
            points.len(),
            config.min_points
        );
        return ConnectionIntent::rejected();
    }

    let source = resolve_endpoint(canvas, first, config.proximity_tolerance);
    let target = resolve_endpoint(canvas, last, config.proximity_tolerance);
    let confidence = straightness(points);

    let distinct = matches!((source, target), (Some(s), Some(t)) if s != t);
    let is_valid_connection = distinct && confidence > config.acceptance_threshold;

    log::debug!(
        "Stroke classified: source={:?} target={:?} confidence={:.3} valid={}",
        source,
        target,
        confidence,
        is_valid_connection
    );

    ConnectionIntent {
        source,
        target,
        confidence,
        is_valid_connection,
    }
}
