use crate::draw::model::{Point, Rect};
use std::time::{Duration, Instant};

pub const ZOOM_DURATION: Duration = Duration::from_secs(2);
pub const ZOOM_BASE_SIZE: f32 = 100.0;
pub const DEGENERATE_ZOOM_FACTOR: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomView {
    pub factor: f32,
    pub center: Point,
    pub expires_at: Instant,
}

impl ZoomView {
    /// Region of a `size` canvas magnified onto the whole window, kept inside
    /// the canvas so the view never shows past an edge.
    pub fn source_rect(&self, size: (u32, u32)) -> Rect {
        let (width, height) = (size.0 as f32, size.1 as f32);
        let src_w = width / self.factor;
        let src_h = height / self.factor;
        let min_x = (self.center.x - src_w * 0.5).clamp(0.0, (width - src_w).max(0.0));
        let min_y = (self.center.y - src_h * 0.5).clamp(0.0, (height - src_h).max(0.0));
        Rect::from_min_size(Point::new(min_x, min_y), src_w, src_h)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZoomState {
    marquee: Option<(Point, Point)>,
    view: Option<ZoomView>,
}

impl ZoomState {
    pub fn begin(&mut self, point: Point) {
        self.marquee = Some((point, point));
    }

    pub fn update(&mut self, point: Point) {
        if let Some((_, end)) = self.marquee.as_mut() {
            *end = point;
        }
    }

    pub fn marquee(&self) -> Option<Rect> {
        self.marquee.map(|(start, end)| Rect::from_points(start, end))
    }

    /// Turns the marquee into a timed zoom. A press without movement does nothing.
    pub fn finish(&mut self, now: Instant) -> Option<ZoomView> {
        let (start, end) = self.marquee.take()?;
        if start == end {
            return None;
        }
        let rect = Rect::from_points(start, end);
        let smallest = rect.width().min(rect.height());
        let factor = if smallest > 0.0 {
            (ZOOM_BASE_SIZE / smallest).max(1.0)
        } else {
            DEGENERATE_ZOOM_FACTOR
        };
        let view = ZoomView {
            factor,
            center: rect.center(),
            expires_at: now + ZOOM_DURATION,
        };
        tracing::debug!(factor, x = view.center.x, y = view.center.y, "zoom started");
        self.view = Some(view);
        Some(view)
    }

    pub fn cancel(&mut self) {
        self.marquee = None;
        self.view = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.active_view(now).is_some()
    }

    pub fn is_selecting(&self) -> bool {
        self.marquee.is_some()
    }

    pub fn active_view(&self, now: Instant) -> Option<ZoomView> {
        self.view.filter(|view| now < view.expires_at)
    }

    /// Drops an expired view; returns `true` when one was dropped.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.view {
            Some(view) if now >= view.expires_at => {
                self.view = None;
                true
            }
            _ => false,
        }
    }
}
