use egui::{Color32, Pos2};
use std::sync::Arc;

// Completed stroke, shared between the surface and export snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

// Stroke still being extended by pointer movement
#[derive(Debug, Clone, PartialEq)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    pub fn new(color: Color32, thickness: f32, points: Vec<Pos2>) -> Self {
        Self {
            points,
            color,
            thickness,
        }
    }

    pub fn new_ref(color: Color32, thickness: f32, points: Vec<Pos2>) -> StrokeRef {
        Arc::new(Self::new(color, thickness, points))
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Number of line segments between consecutive points
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}

impl MutableStroke {
    /// Start a stroke at `start`; a started stroke always has at least one point.
    pub fn begin(start: Pos2, color: Color32, thickness: f32) -> Self {
        Self {
            points: vec![start],
            color,
            thickness,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn last_point(&self) -> Pos2 {
        // `begin` guarantees at least one point
        self.points[self.points.len() - 1]
    }

    /// Consume the in-progress stroke into its immutable, shareable form
    pub fn finish(self) -> StrokeRef {
        Arc::new(Stroke::new(self.color, self.thickness, self.points))
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}
