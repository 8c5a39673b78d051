//! Stroke recording for the freehand pointer gesture.

use crate::config::GestureConfig;
use crate::shapes::{FreehandStroke, InkStyle};
use kurbo::Point;

/// State of a stroke interaction.
#[derive(Debug, Clone, Default)]
pub enum StrokeState {
    /// Waiting for the pointer to go down.
    #[default]
    Idle,
    /// Pointer is down; points are being collected.
    Drawing(FreehandStroke),
}

/// Collects pointer samples into a [`FreehandStroke`].
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    state: StrokeState,
    config: GestureConfig,
    /// Style applied to strokes started from now on.
    pub style: InkStyle,
}

impl StrokeRecorder {
    /// Create an idle recorder.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            state: StrokeState::Idle,
            config,
            style: InkStyle::default(),
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &StrokeState {
        &self.state
    }

    /// Start a stroke at `point`, discarding any stroke in progress.
    pub fn begin(&mut self, point: Point) {
        let mut stroke = FreehandStroke::from_points(vec![point]);
        stroke.style = self.style.clone();
        self.state = StrokeState::Drawing(stroke);
    }

    /// Add a sample. Samples closer than the configured spacing to the last
    /// kept point are dropped. Returns true if the point was kept.
    pub fn extend(&mut self, point: Point) -> bool {
        let StrokeState::Drawing(stroke) = &mut self.state else {
            return false;
        };
        let far_enough = stroke
            .end()
            .is_none_or(|last| last.distance(point) >= self.config.min_point_spacing);
        if far_enough {
            stroke.add_point(point);
        }
        far_enough
    }

    /// End the stroke and hand it over.
    pub fn finish(&mut self) -> Option<FreehandStroke> {
        match std::mem::take(&mut self.state) {
            StrokeState::Drawing(stroke) => Some(stroke),
            StrokeState::Idle => None,
        }
    }

    /// Abandon the stroke in progress.
    pub fn cancel(&mut self) {
        self.state = StrokeState::Idle;
    }

    /// Check if a stroke is being drawn.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing(_))
    }

    /// The stroke in progress, for previews.
    pub fn current(&self) -> Option<&FreehandStroke> {
        match &self.state {
            StrokeState::Drawing(stroke) => Some(stroke),
            StrokeState::Idle => None,
        }
    }
}
