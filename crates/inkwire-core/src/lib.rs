//! Inkwire Core Library
//!
//! Geometry, spatial indexing, connector routing and freehand
//! connection classification for an infinite diagramming canvas.

pub mod canvas;
pub mod classifier;
pub mod config;
pub mod connector;
pub mod gesture;
pub mod node;
pub mod quadtree;
pub mod routing;
pub mod shapes;

pub use canvas::{Canvas, CanvasError};
pub use classifier::{ConnectionIntent, analyze_stroke, straightness};
pub use config::{ClassifierConfig, EngineConfig, GestureConfig, QuadtreeConfig, RoutingConfig};
pub use connector::{Connector, ConnectorEnd, ConnectorId, ConnectorStyle, NodeLookup};
pub use gesture::{StrokeRecorder, StrokeState};
pub use node::{Node, NodeId};
pub use quadtree::Quadtree;
pub use routing::{AnchorPoint, RoutingError, Side, smart_anchor_point, smart_curved_path};
pub use shapes::{Circle, FreehandStroke, Rectangle, Shape, ShapeTrait, StrokeId, Triangle};
