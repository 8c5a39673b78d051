//! Tunable constants for the engine.
//!
//! Every threshold the engine uses lives here with a default. Embedders can
//! override any subset from JSON; missing fields keep their defaults.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Spatial index shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// Region covered by the root node. Objects outside it are still stored
    /// (at the root) but do not benefit from subdivision.
    pub region: Rect,
    /// Items a node holds before it subdivides.
    pub capacity: usize,
    /// Deepest level a node may be created at (the root is depth 0).
    pub max_depth: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            region: Rect::new(-1_000_000.0, -1_000_000.0, 1_000_000.0, 1_000_000.0),
            capacity: 8,
            max_depth: 8,
        }
    }
}

/// Connector path synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Anchor separation at which paths switch from a single C-curve to an
    /// S-curve.
    pub curve_threshold: f64,
    /// Control-point offset as a fraction of the separation, C-curve regime.
    pub c_curve_ratio: f64,
    /// Control-point offset as a fraction of the separation, S-curve regime.
    pub s_curve_ratio: f64,
    /// Upper bound on any control-point offset.
    pub max_control_offset: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            curve_threshold: 240.0,
            c_curve_ratio: 0.4,
            s_curve_ratio: 0.5,
            max_control_offset: 160.0,
        }
    }
}

/// Freehand connection-intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Strokes with fewer points are never connections.
    pub min_points: usize,
    /// How far a stroke end may be from a shape and still attach to it.
    pub proximity_tolerance: f64,
    /// Straightness confidence a stroke must exceed to count as a connection.
    pub acceptance_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_points: 3,
            proximity_tolerance: 24.0,
            acceptance_threshold: 0.6,
        }
    }
}

/// Stroke recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Points closer than this to the previously kept point are dropped.
    pub min_point_spacing: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_point_spacing: 2.0,
        }
    }
}

/// All engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub quadtree: QuadtreeConfig,
    pub routing: RoutingConfig,
    pub classifier: ClassifierConfig,
    pub gesture: GestureConfig,
}

impl EngineConfig {
    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a configuration from JSON, defaulting missing fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.classifier.min_points, 3);
        assert_eq!(config.classifier.proximity_tolerance, 24.0);
        assert_eq!(config.classifier.acceptance_threshold, 0.6);
        assert_eq!(config.routing.curve_threshold, 240.0);
        assert_eq!(config.routing.c_curve_ratio, 0.4);
        assert_eq!(config.routing.s_curve_ratio, 0.5);
        assert_eq!(config.routing.max_control_offset, 160.0);
        assert_eq!(config.quadtree.capacity, 8);
        assert_eq!(config.quadtree.max_depth, 8);
        assert_eq!(config.gesture.min_point_spacing, 2.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "classifier": { "acceptance_threshold": 0.75 } }"#)
                .unwrap();
        assert!((config.classifier.acceptance_threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.classifier.min_points, 3);
        assert_eq!(config.routing, RoutingConfig::default());
        assert_eq!(config.quadtree.capacity, 8);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EngineConfig::default();
        config.routing.curve_threshold = 90.0;
        config.quadtree.region = Rect::new(0.0, 0.0, 512.0, 512.0);
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(EngineConfig::from_json(r#"{ "routing": 5 }"#).is_err());
    }
}
