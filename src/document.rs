use crate::stroke::StrokeRef;

/// Completed strokes, oldest first. Later strokes are drawn on top.
#[derive(Debug, Clone, Default)]
pub struct Document {
    strokes: Vec<StrokeRef>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            strokes: Vec::new(),
        }
    }

    pub fn add_stroke(&mut self, stroke: StrokeRef) {
        self.strokes.push(stroke);
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    pub fn remove_last_stroke(&mut self) -> Option<StrokeRef> {
        self.strokes.pop()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Copy of the stroke list that shares the strokes themselves.
    /// Later edits to the document never show up in a snapshot.
    pub fn snapshot(&self) -> Vec<StrokeRef> {
        self.strokes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;
    use egui::{Color32, pos2};
    use std::sync::Arc;

    #[test]
    fn test_snapshot_is_independent_of_later_edits() {
        let mut doc = Document::new();
        let first = Stroke::new_ref(Color32::RED, 2.0, vec![pos2(0.0, 0.0)]);
        doc.add_stroke(first.clone());

        let snapshot = doc.snapshot();
        doc.add_stroke(Stroke::new_ref(Color32::BLUE, 2.0, vec![pos2(1.0, 1.0)]));
        doc.remove_last_stroke();
        doc.remove_last_stroke();

        assert!(doc.is_empty());
        assert_eq!(snapshot.len(), 1);
        assert!(Arc::ptr_eq(&snapshot[0], &first));
    }

    #[test]
    fn test_remove_last_on_empty_is_none() {
        let mut doc = Document::new();
        assert!(doc.remove_last_stroke().is_none());
        assert_eq!(doc.len(), 0);
    }
}
