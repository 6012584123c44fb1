//! Bounding-box handles and the move/resize transform applied while a
//! selected shape is dragged.

use crate::draw::model::{Point, Rect, Shape};

pub const HANDLE_DRAW_SIZE: f32 = 6.0;
pub const HANDLE_HIT_SIZE: f32 = 8.0;
pub const MIN_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopCenter,
    BottomCenter,
    LeftCenter,
    RightCenter,
    Move,
}

impl Handle {
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
        Handle::TopCenter,
        Handle::BottomCenter,
        Handle::LeftCenter,
        Handle::RightCenter,
    ];

    pub fn opposite(self) -> Handle {
        match self {
            Handle::TopLeft => Handle::BottomRight,
            Handle::TopRight => Handle::BottomLeft,
            Handle::BottomLeft => Handle::TopRight,
            Handle::BottomRight => Handle::TopLeft,
            Handle::TopCenter => Handle::BottomCenter,
            Handle::BottomCenter => Handle::TopCenter,
            Handle::LeftCenter => Handle::RightCenter,
            Handle::RightCenter => Handle::LeftCenter,
            Handle::Move => Handle::Move,
        }
    }

    pub fn position(self, rect: &Rect) -> Point {
        let center = rect.center();
        match self {
            Handle::TopLeft => Point::new(rect.min_x, rect.min_y),
            Handle::TopRight => Point::new(rect.max_x, rect.min_y),
            Handle::BottomLeft => Point::new(rect.min_x, rect.max_y),
            Handle::BottomRight => Point::new(rect.max_x, rect.max_y),
            Handle::TopCenter => Point::new(center.x, rect.min_y),
            Handle::BottomCenter => Point::new(center.x, rect.max_y),
            Handle::LeftCenter => Point::new(rect.min_x, center.y),
            Handle::RightCenter => Point::new(rect.max_x, center.y),
            Handle::Move => center,
        }
    }
}

pub fn handle_positions(rect: &Rect) -> [(Handle, Point); 8] {
    Handle::RESIZE.map(|handle| (handle, handle.position(rect)))
}

pub fn handle_square(center: Point, size: f32) -> Rect {
    let half = size * 0.5;
    Rect::from_points(center.offset(-half, -half), center.offset(half, half))
}

/// Resize handles win over the body; `None` when `point` misses the box.
pub fn handle_at(rect: &Rect, point: Point) -> Option<Handle> {
    handle_positions(rect)
        .into_iter()
        .find(|(_, center)| handle_square(*center, HANDLE_HIT_SIZE).contains(point))
        .map(|(handle, _)| handle)
        .or_else(|| rect.contains(point).then_some(Handle::Move))
}

/// Scale factors and anchor for dragging `handle` from `drag_start` to `pos`.
/// The anchor is the opposite handle, so the dragged edge follows the pointer.
pub fn resize_factors(
    handle: Handle,
    original_rect: &Rect,
    drag_start: Point,
    pos: Point,
) -> (f32, f32, Point) {
    let width = if original_rect.width() > 0.0 {
        original_rect.width()
    } else {
        1.0
    };
    let height = if original_rect.height() > 0.0 {
        original_rect.height()
    } else {
        1.0
    };
    let dx = pos.x - drag_start.x;
    let dy = pos.y - drag_start.y;

    let sx = match handle {
        Handle::TopLeft | Handle::BottomLeft | Handle::LeftCenter => (width - dx) / width,
        Handle::TopRight | Handle::BottomRight | Handle::RightCenter => (width + dx) / width,
        _ => 1.0,
    };
    let sy = match handle {
        Handle::TopLeft | Handle::TopRight | Handle::TopCenter => (height - dy) / height,
        Handle::BottomLeft | Handle::BottomRight | Handle::BottomCenter => (height + dy) / height,
        _ => 1.0,
    };
    (
        sx.max(MIN_SCALE),
        sy.max(MIN_SCALE),
        handle.opposite().position(original_rect),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformSession {
    pub index: usize,
    pub handle: Handle,
    pub drag_start: Point,
    pub last_pos: Point,
    pub original_shape: Shape,
    pub original_rect: Rect,
}

impl TransformSession {
    pub fn begin(index: usize, handle: Handle, shape: &Shape, pos: Point) -> Self {
        Self {
            index,
            handle,
            drag_start: pos,
            last_pos: pos,
            original_shape: shape.clone(),
            original_rect: shape.bounding_rect(),
        }
    }

    /// Applies the drag to `shape`. Moves are incremental; resizes always
    /// start again from the original snapshot so rounding never accumulates.
    pub fn update(&mut self, shape: &mut Shape, pos: Point) {
        match self.handle {
            Handle::Move => {
                shape.translate(pos.x - self.last_pos.x, pos.y - self.last_pos.y);
            }
            handle => {
                let (sx, sy, anchor) =
                    resize_factors(handle, &self.original_rect, self.drag_start, pos);
                let mut resized = self.original_shape.clone();
                resized.scale_about(anchor, sx, sy);
                *shape = resized;
            }
        }
        self.last_pos = pos;
    }
}
