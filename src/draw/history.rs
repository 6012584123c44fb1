use crate::draw::model::CanvasModel;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Snapshot undo/redo. Each entry is the full canvas before an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawHistory {
    undo_stack: VecDeque<CanvasModel>,
    redo_stack: Vec<CanvasModel>,
    limit: usize,
}

impl Default for DrawHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl DrawHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn record(&mut self, before: CanvasModel) {
        if self.undo_stack.len() == self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(before);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: &CanvasModel) -> Option<CanvasModel> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    pub fn redo(&mut self, current: &CanvasModel) -> Option<CanvasModel> {
        let next = self.redo_stack.pop()?;
        if self.undo_stack.len() == self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(current.clone());
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{Color, Geometry, Point, Shape};

    fn canvas_with(count: usize) -> CanvasModel {
        CanvasModel {
            shapes: (0..count)
                .map(|i| {
                    let p = Point::new(i as f32, i as f32);
                    Shape::new(
                        Geometry::Line {
                            start: p,
                            end: p.offset(1.0, 1.0),
                        },
                        Color::BLACK,
                        2,
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn new_record_clears_redo_stack() {
        let mut history = DrawHistory::default();
        history.record(canvas_with(0));
        let _ = history.undo(&canvas_with(1));
        assert_eq!(history.redo_len(), 1);

        history.record(canvas_with(0));
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn undo_redo_roundtrip_snapshots() {
        let mut history = DrawHistory::default();
        history.record(canvas_with(0));
        history.record(canvas_with(1));
        let current = canvas_with(2);

        let after_undo = history.undo(&current).expect("first undo");
        assert_eq!(after_undo, canvas_with(1));
        let after_second = history.undo(&after_undo).expect("second undo");
        assert_eq!(after_second, canvas_with(0));
        assert_eq!(history.undo(&after_second), None);

        let redone = history.redo(&after_second).expect("redo");
        assert_eq!(redone, canvas_with(1));
        let redone = history.redo(&redone).expect("redo again");
        assert_eq!(redone, current);
        assert!(!history.can_redo());
    }

    #[test]
    fn oldest_snapshot_is_dropped_at_limit() {
        let mut history = DrawHistory::with_limit(3);
        for i in 0..5 {
            history.record(canvas_with(i));
        }
        assert_eq!(history.undo_len(), 3);

        let mut current = canvas_with(5);
        let mut seen = Vec::new();
        while let Some(previous) = history.undo(&current) {
            seen.push(previous.len());
            current = previous;
        }
        assert_eq!(seen, vec![4, 3, 2]);
    }
}
