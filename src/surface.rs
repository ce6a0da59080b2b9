use egui::{Color32, Pos2};

use crate::brush::BrushConfig;
use crate::document::Document;
use crate::error::SurfaceError;
use crate::renderer::{Background, RenderTarget, render_strokes};
use crate::stroke::{MutableStroke, StrokeRef};

/// Smallest thickness a stroke is created with
pub const MIN_THICKNESS: f32 = 0.1;

/// The canvas state: completed strokes, at most one stroke in progress, and
/// the brush used for the next stroke.
///
/// Input arrives as `begin_stroke`, any number of `extend_stroke`, then
/// `finalize_stroke`. Calls out of that order are treated as no-ops.
#[derive(Debug, Default)]
pub struct DrawingSurface {
    document: Document,
    current: Option<MutableStroke>,
    brush: BrushConfig,
    revision: u64,
}

impl DrawingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brush(brush: BrushConfig) -> Self {
        Self {
            brush,
            ..Self::default()
        }
    }

    /// Start a new stroke at `point`. A stroke that was never finalized is discarded.
    pub fn begin_stroke(&mut self, point: Pos2, color: Color32, thickness: f32) {
        if let Some(stray) = self.current.take() {
            log::warn!(
                "begin_stroke while a stroke was in progress; discarding {} points",
                stray.points().len()
            );
        }

        let thickness = if thickness.is_finite() && thickness > 0.0 {
            thickness
        } else {
            log::warn!("Invalid stroke thickness {thickness}, using {MIN_THICKNESS}");
            MIN_THICKNESS
        };

        self.current = Some(MutableStroke::begin(point, color, thickness));
        self.touch();
    }

    /// Start a new stroke at `point` with the current brush
    pub fn begin_stroke_with_brush(&mut self, point: Pos2) {
        let BrushConfig { color, thickness } = self.brush;
        self.begin_stroke(point, color, thickness);
    }

    pub fn extend_stroke(&mut self, point: Pos2) {
        match &mut self.current {
            Some(stroke) => {
                stroke.add_point(point);
                self.revision += 1;
            }
            None => log::debug!("extend_stroke ignored: no stroke in progress"),
        }
    }

    /// Move the in-progress stroke onto the end of the completed list
    pub fn finalize_stroke(&mut self) -> Option<StrokeRef> {
        let Some(stroke) = self.current.take() else {
            log::debug!("finalize_stroke ignored: no stroke in progress");
            return None;
        };

        let stroke = stroke.finish();
        log::info!(
            "Stroke finalized: {} segments, thickness {}",
            stroke.segment_count(),
            stroke.thickness()
        );
        self.document.add_stroke(stroke.clone());
        self.touch();
        Some(stroke)
    }

    /// Remove the most recent completed stroke, if any
    pub fn undo(&mut self) -> Option<StrokeRef> {
        let removed = self.document.remove_last_stroke();
        if removed.is_some() {
            log::info!("Undo: {} strokes remain", self.document.len());
            self.touch();
        }
        removed
    }

    /// Remove every stroke, including one still in progress
    pub fn clear(&mut self) {
        if self.document.is_empty() && self.current.is_none() {
            return;
        }
        self.document.clear();
        self.current = None;
        self.touch();
    }

    pub fn set_color(&mut self, color: Color32) {
        self.brush.color = color;
    }

    pub fn set_thickness(&mut self, thickness: f32) -> Result<(), SurfaceError> {
        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(SurfaceError::InvalidThickness(thickness));
        }
        self.brush.thickness = thickness;
        Ok(())
    }

    pub fn brush(&self) -> BrushConfig {
        self.brush
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        self.document.strokes()
    }

    pub fn in_progress(&self) -> Option<&MutableStroke> {
        self.current.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.document.is_empty()
    }

    /// Completed strokes only; the stroke in progress is never part of a snapshot
    pub fn snapshot(&self) -> Vec<StrokeRef> {
        self.document.snapshot()
    }

    /// Bumped on every change that affects rendered output
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Render the full canvas state onto `target`
    pub fn render(&self, target: &mut RenderTarget, background: &Background) {
        render_strokes(target, self.document.strokes(), self.current.as_ref(), background);
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
