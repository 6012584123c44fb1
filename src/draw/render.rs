use crate::draw::composite::{blend_into, AlphaMask};
use crate::draw::hit_test::point_segment_distance_sq;
use crate::draw::laser::{glow_passes, LaserLayer, LaserSegment, LaserStyle};
use crate::draw::model::{CanvasModel, Color, Geometry, Point, Rect, Shape};
use crate::draw::selection::{handle_positions, handle_square, HANDLE_DRAW_SIZE};
use crate::draw::text;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

/// Cleared pixels keep alpha 1 so a transparent window still receives pointer input.
pub const INPUT_KEEPALIVE_COLOR: Color = Color::rgba(0, 0, 0, 1);
pub const BOARD_COLOR: Color = Color::rgba(255, 255, 255, 220);
pub const SELECTION_COLOR: Color = Color::rgb(0, 120, 215);
const DASH_ON: i32 = 6;
const DASH_OFF: i32 = 4;
const ARROW_HEAD_ANGLE: f32 = std::f32::consts::PI / 6.0;
const ARROW_HEAD_MIN: f32 = 12.0;
const TEXT_PAD: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn from_points(a: (i32, i32), b: (i32, i32), pad: i32) -> Self {
        let min_x = a.0.min(b.0) - pad;
        let max_x = a.0.max(b.0) + pad;
        let min_y = a.1.min(b.1) - pad;
        let max_y = a.1.max(b.1) + pad;
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1).max(1),
            height: (max_y - min_y + 1).max(1),
        }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::from_points(
            (rect.min_x.floor() as i32, rect.min_y.floor() as i32),
            (rect.max_x.ceil() as i32, rect.max_y.ceil() as i32),
            1,
        )
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        DirtyRect {
            x: min_x,
            y: min_y,
            width: (max_x - min_x).max(1),
            height: (max_y - min_y).max(1),
        }
    }

    pub fn intersect(self, other: DirtyRect) -> Option<DirtyRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        self.intersect(DirtyRect::full(width, height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundClearMode {
    Transparent,
    Solid(Color),
}

impl BackgroundClearMode {
    pub fn board(enabled: bool) -> Self {
        if enabled {
            BackgroundClearMode::Solid(BOARD_COLOR)
        } else {
            BackgroundClearMode::Transparent
        }
    }

    pub fn clear_color(self) -> Color {
        match self {
            BackgroundClearMode::Transparent => INPUT_KEEPALIVE_COLOR,
            BackgroundClearMode::Solid(color) => color,
        }
    }
}

/// A mutable RGBA surface plus the region drawing is allowed to touch.
pub struct PixelTarget<'a> {
    pub pixels: &'a mut [u8],
    pub width: u32,
    pub height: u32,
    pub clip: Option<DirtyRect>,
}

impl<'a> PixelTarget<'a> {
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
            clip: None,
        }
    }

    pub fn with_clip(mut self, clip: Option<DirtyRect>) -> Self {
        self.clip = clip;
        self
    }

    fn drawable(&self) -> Option<DirtyRect> {
        let canvas = DirtyRect::full(self.width, self.height);
        match self.clip {
            Some(clip) => clip.intersect(canvas),
            None => canvas.clamp(self.width, self.height),
        }
    }

    fn mask_for(&self, bounds: &Rect) -> Option<AlphaMask> {
        let area = DirtyRect::from_rect(bounds).intersect(self.drawable()?)?;
        Some(AlphaMask::new(area))
    }

    fn composite(&mut self, mask: &AlphaMask, color: Color) {
        mask.composite_onto(color, self.pixels, self.width, self.height);
    }

    fn put(&mut self, x: i32, y: i32, color: Color) {
        let Some(area) = self.drawable() else {
            return;
        };
        if x < area.x || y < area.y || x >= area.x + area.width || y >= area.y + area.height {
            return;
        }
        blend_into(self.pixels, self.width, self.height, x, y, color);
    }

    fn clear(&mut self, mode: BackgroundClearMode) {
        let Some(area) = self.drawable() else {
            return;
        };
        let clear = mode.clear_color().to_rgba_array();
        for y in area.y..area.y + area.height {
            let row = (y as u32 * self.width) as usize * 4;
            for x in area.x..area.x + area.width {
                let idx = row + x as usize * 4;
                self.pixels[idx..idx + 4].copy_from_slice(&clear);
            }
        }
    }
}

#[derive(Clone)]
struct BrushMaskRow {
    dy: i32,
    min_dx: i32,
    max_dx: i32,
}

fn brush_mask_cache() -> &'static Mutex<HashMap<u32, Vec<BrushMaskRow>>> {
    static CACHE: OnceLock<Mutex<HashMap<u32, Vec<BrushMaskRow>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn brush_rows(radius: u32) -> Vec<BrushMaskRow> {
    let cache = brush_mask_cache();
    if let Ok(guard) = cache.lock() {
        if let Some(rows) = guard.get(&radius) {
            return rows.clone();
        }
    }

    let radius_i = radius as i32;
    let mut rows = Vec::with_capacity((radius_i * 2 + 1) as usize);
    for dy in -radius_i..=radius_i {
        let mut max_dx = radius_i;
        while max_dx >= 0 && max_dx * max_dx + dy * dy > radius_i * radius_i {
            max_dx -= 1;
        }
        if max_dx >= 0 {
            rows.push(BrushMaskRow {
                dy,
                min_dx: -max_dx,
                max_dx,
            });
        }
    }
    if let Ok(mut guard) = cache.lock() {
        let _ = guard.insert(radius, rows.clone());
    }
    rows
}

/// Solid round dot, used for strokes that never left their first point.
fn stamp_dot(mask: &mut AlphaMask, center: Point, width: f32, coverage: u8) {
    let radius = ((width - 1.0) * 0.5).round().max(0.0) as u32;
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    for row in brush_rows(radius) {
        for dx in row.min_dx..=row.max_dx {
            mask.stamp(cx + dx, cy + row.dy, coverage);
        }
    }
}

/// Anti-aliased capsule around the segment.
fn stamp_segment(mask: &mut AlphaMask, start: Point, end: Point, width: f32, coverage: u8) {
    let radius = (width * 0.5).max(0.5);
    let Some(area) = DirtyRect::from_rect(&Rect::from_points(start, end).inflate(radius + 1.0))
        .intersect(mask.area())
    else {
        return;
    };
    let scale = coverage as f32;
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let distance =
                point_segment_distance_sq(Point::new(x as f32, y as f32), start, end).sqrt();
            let edge = (radius + 0.5 - distance).clamp(0.0, 1.0);
            if edge > 0.0 {
                mask.stamp(x, y, (edge * scale).round() as u8);
            }
        }
    }
}

fn stamp_polyline(mask: &mut AlphaMask, points: &[Point], width: f32, closed: bool) {
    match points {
        [] => {}
        [only] => stamp_dot(mask, *only, width, 255),
        _ => {
            for pair in points.windows(2) {
                stamp_segment(mask, pair[0], pair[1], width, 255);
            }
            if closed {
                if let (Some(first), Some(last)) = (points.first(), points.last()) {
                    stamp_segment(mask, *last, *first, width, 255);
                }
            }
        }
    }
}

/// Even-odd scanline fill sampled at pixel centers.
fn fill_polygon(mask: &mut AlphaMask, points: &[Point]) {
    if points.len() < 3 {
        return;
    }
    let area = mask.area();
    let mut crossings = Vec::with_capacity(points.len());
    for y in area.y..area.y + area.height {
        let sample_y = y as f32;
        crossings.clear();
        for (idx, a) in points.iter().enumerate() {
            let b = points[(idx + 1) % points.len()];
            if (a.y <= sample_y && b.y > sample_y) || (b.y <= sample_y && a.y > sample_y) {
                let t = (sample_y - a.y) / (b.y - a.y);
                crossings.push(a.x + (b.x - a.x) * t);
            }
        }
        crossings.sort_by(f32::total_cmp);
        for span in crossings.chunks_exact(2) {
            let x0 = span[0].ceil() as i32;
            let x1 = span[1].floor() as i32;
            for x in x0.max(area.x)..=x1.min(area.x + area.width - 1) {
                mask.stamp(x, y, 255);
            }
        }
    }
}

fn ellipse_points(center: Point, rx: f32, ry: f32) -> Vec<Point> {
    let circumference = std::f32::consts::TAU * rx.max(ry);
    let steps = (circumference / 4.0).clamp(24.0, 256.0) as usize;
    (0..steps)
        .map(|step| {
            let t = step as f32 / steps as f32 * std::f32::consts::TAU;
            Point::new(center.x + rx * t.cos(), center.y + ry * t.sin())
        })
        .collect()
}

fn diamond_points(rect: &Rect) -> [Point; 4] {
    let center = rect.center();
    [
        Point::new(center.x, rect.min_y),
        Point::new(rect.max_x, center.y),
        Point::new(center.x, rect.max_y),
        Point::new(rect.min_x, center.y),
    ]
}

fn rect_points(rect: &Rect) -> [Point; 4] {
    [
        Point::new(rect.min_x, rect.min_y),
        Point::new(rect.max_x, rect.min_y),
        Point::new(rect.max_x, rect.max_y),
        Point::new(rect.min_x, rect.max_y),
    ]
}

/// Polygon traced by the stroke of a closed shape, without repeating the
/// first point. `None` for open strokes, highlight boxes and text.
pub fn closed_outline(geometry: &Geometry) -> Option<Vec<Point>> {
    match geometry {
        Geometry::Rect { start, end } => Some(rect_points(&Rect::from_points(*start, *end)).to_vec()),
        Geometry::Diamond { start, end } => {
            Some(diamond_points(&Rect::from_points(*start, *end)).to_vec())
        }
        Geometry::Ellipse { start, end } => {
            let rect = Rect::from_points(*start, *end);
            Some(ellipse_points(rect.center(), rect.width() * 0.5, rect.height() * 0.5))
        }
        Geometry::Circle { center, edge } => {
            let radius = center.distance(*edge);
            Some(ellipse_points(*center, radius, radius))
        }
        _ => None,
    }
}

/// Pencil strokes pass through the midpoints of their samples with each raw
/// sample as a quadratic control point.
pub fn smooth_stroke(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * 4);
    out.push(points[0]);
    for idx in 1..points.len() - 1 {
        let start = out.last().copied().unwrap_or(points[0]);
        let control = points[idx];
        let end = points[idx].midpoint(points[idx + 1]);
        let length = start.distance(control) + control.distance(end);
        let steps = (length / 3.0).clamp(2.0, 16.0) as usize;
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            out.push(start.lerp(control, t).lerp(control.lerp(end, t), t));
        }
    }
    if let Some(last) = points.last() {
        out.push(*last);
    }
    out
}

pub fn arrow_head(start: Point, end: Point, thickness: f32) -> Option<[Point; 2]> {
    let dx = start.x - end.x;
    let dy = start.y - end.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return None;
    }
    let head = (thickness * 4.0).max(ARROW_HEAD_MIN);
    let base = dy.atan2(dx);
    let wing = |angle: f32| Point::new(end.x + head * angle.cos(), end.y + head * angle.sin());
    Some([wing(base + ARROW_HEAD_ANGLE), wing(base - ARROW_HEAD_ANGLE)])
}

/// Pixel bounds a shape may touch when painted.
pub fn shape_paint_bounds(shape: &Shape) -> Rect {
    let mut pad = shape.stroke_width() * 0.5 + 2.0;
    match shape.geometry {
        Geometry::Arrow { .. } => pad += (shape.thickness as f32 * 4.0).max(ARROW_HEAD_MIN),
        Geometry::Text { .. } | Geometry::HighlightBox { .. } => pad = TEXT_PAD + 2.0,
        _ => {}
    }
    shape.bounding_rect().inflate(pad)
}

pub fn render_shape(shape: &Shape, target: &mut PixelTarget<'_>) {
    let Some(mut mask) = target.mask_for(&shape_paint_bounds(shape)) else {
        return;
    };
    let width = shape.stroke_width();

    if let Some(fill) = shape.fill {
        let outline = closed_outline(&shape.geometry).unwrap_or_default();
        if !outline.is_empty() {
            let mut fill_mask = AlphaMask::new(mask.area());
            fill_polygon(&mut fill_mask, &outline);
            target.composite(&fill_mask, fill);
        }
    }

    match &shape.geometry {
        Geometry::Freehand { points } => stamp_polyline(&mut mask, &smooth_stroke(points), width, false),
        Geometry::Highlight { points } => stamp_polyline(&mut mask, points, width, false),
        Geometry::HighlightBox { rect } => fill_polygon(&mut mask, &rect_points(rect)),
        Geometry::Line { start, end } => stamp_segment(&mut mask, *start, *end, width, 255),
        Geometry::Arrow { start, end } => {
            stamp_segment(&mut mask, *start, *end, width, 255);
            if let Some(wings) = arrow_head(*start, *end, width) {
                for wing in wings {
                    stamp_segment(&mut mask, *end, wing, width, 255);
                }
            }
        }
        Geometry::Rect { start, end } => {
            stamp_polyline(&mut mask, &rect_points(&Rect::from_points(*start, *end)), width, true)
        }
        Geometry::Diamond { start, end } => stamp_polyline(
            &mut mask,
            &diamond_points(&Rect::from_points(*start, *end)),
            width,
            true,
        ),
        Geometry::Ellipse { start, end } => {
            let rect = Rect::from_points(*start, *end);
            let points = ellipse_points(rect.center(), rect.width() * 0.5, rect.height() * 0.5);
            stamp_polyline(&mut mask, &points, width, true);
        }
        Geometry::Circle { center, edge } => {
            let radius = center.distance(*edge);
            stamp_polyline(&mut mask, &ellipse_points(*center, radius, radius), width, true);
        }
        Geometry::Text {
            anchor,
            text: content,
            size,
        } => text::rasterize(content, *size, *anchor, |x, y, coverage| {
            mask.stamp_f(x, y, coverage)
        }),
    }
    target.composite(&mask, shape.color);
}

fn stamp_laser_segment(mask: &mut AlphaMask, segment: &LaserSegment) {
    stamp_segment(mask, segment.start, segment.end, segment.width, segment.alpha);
}

pub fn render_laser(
    layer: &LaserLayer,
    style: &LaserStyle,
    now: Instant,
    target: &mut PixelTarget<'_>,
) {
    for trail in layer.trails() {
        let Some(bounds) = trail.bounds(style) else {
            continue;
        };
        let segments = trail.segments(now, style);
        if segments.is_empty() {
            if let Some(dot) = trail.lone_sample(now, style) {
                if let Some(mut mask) = target.mask_for(&bounds) {
                    stamp_dot(&mut mask, dot.start, dot.width, dot.alpha);
                    target.composite(&mask, style.color);
                }
            }
            continue;
        }
        if style.glow {
            if let Some(mut glow) = target.mask_for(&bounds) {
                for segment in &segments {
                    for pass in glow_passes(segment) {
                        stamp_laser_segment(&mut glow, &pass);
                    }
                }
                target.composite(&glow, style.color);
            }
        }
        if let Some(mut core) = target.mask_for(&bounds) {
            for segment in &segments {
                stamp_laser_segment(&mut core, segment);
            }
            target.composite(&core, style.color);
        }
    }
}

fn dashed_line(target: &mut PixelTarget<'_>, from: (i32, i32), to: (i32, i32), phase: &mut i32) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs());
    let sx = (to.0 - from.0).signum();
    let sy = (to.1 - from.1).signum();
    for step in 0..=steps {
        if *phase % (DASH_ON + DASH_OFF) < DASH_ON {
            target.put(from.0 + sx * step, from.1 + sy * step, SELECTION_COLOR);
        }
        *phase += 1;
    }
}

pub fn render_dashed_rect(rect: &Rect, target: &mut PixelTarget<'_>) {
    let x0 = rect.min_x.round() as i32;
    let y0 = rect.min_y.round() as i32;
    let x1 = rect.max_x.round() as i32;
    let y1 = rect.max_y.round() as i32;
    let mut phase = 0;
    dashed_line(target, (x0, y0), (x1, y0), &mut phase);
    dashed_line(target, (x1, y0), (x1, y1), &mut phase);
    dashed_line(target, (x1, y1), (x0, y1), &mut phase);
    dashed_line(target, (x0, y1), (x0, y0), &mut phase);
}

pub fn render_selection(rect: &Rect, target: &mut PixelTarget<'_>) {
    render_dashed_rect(rect, target);
    for (_, center) in handle_positions(rect) {
        let square = handle_square(center, HANDLE_DRAW_SIZE);
        let x0 = square.min_x.round() as i32;
        let y0 = square.min_y.round() as i32;
        let x1 = square.max_x.round() as i32;
        let y1 = square.max_y.round() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let border = x == x0 || x == x1 || y == y0 || y == y1;
                target.put(x, y, if border { SELECTION_COLOR } else { Color::WHITE });
            }
        }
    }
}

fn render_caret(draft: &Shape, target: &mut PixelTarget<'_>) {
    let Geometry::Text {
        anchor,
        text: content,
        size,
    } = &draft.geometry
    else {
        return;
    };
    let last_line = content.rsplit('\n').next().unwrap_or_default();
    let rows = content.matches('\n').count() as f32;
    let single = text::measure("", *size);
    let line_height = text::measure("\n", *size).height - single.height;
    let x = (anchor.x + text::measure(last_line, *size).width + 1.0).round() as i32;
    let baseline = anchor.y + rows * line_height;
    let top = (baseline - single.ascent).round() as i32;
    let bottom = (baseline - single.ascent + single.height).round() as i32;
    for y in top..=bottom {
        target.put(x, y, draft.color);
    }
}

pub struct LaserFrame<'a> {
    pub layer: &'a LaserLayer,
    pub style: &'a LaserStyle,
    pub now: Instant,
}

/// Everything painted over the committed shapes for a single frame.
#[derive(Default)]
pub struct TransientLayer<'a> {
    pub active_shape: Option<&'a Shape>,
    pub text_draft: Option<&'a Shape>,
    pub selection: Option<Rect>,
    pub marquee: Option<Rect>,
    pub laser: Option<LaserFrame<'a>>,
}

impl TransientLayer<'_> {
    pub fn bounds(&self) -> Option<Rect> {
        let decoration_pad = HANDLE_DRAW_SIZE + 2.0;
        [
            self.active_shape.map(shape_paint_bounds),
            self.text_draft
                .map(|draft| shape_paint_bounds(draft).inflate(decoration_pad)),
            self.selection.map(|rect| rect.inflate(decoration_pad)),
            self.marquee.map(|rect| rect.inflate(2.0)),
            self.laser
                .as_ref()
                .and_then(|laser| laser.layer.bounds(laser.style)),
        ]
        .into_iter()
        .flatten()
        .reduce(|acc, rect| acc.union(&rect))
    }

    pub fn paint(&self, target: &mut PixelTarget<'_>) {
        if let Some(shape) = self.active_shape {
            render_shape(shape, target);
        }
        if let Some(draft) = self.text_draft {
            render_shape(draft, target);
            render_caret(draft, target);
        }
        if let Some(rect) = self.selection {
            render_selection(&rect, target);
        }
        if let Some(rect) = self.marquee {
            render_dashed_rect(&rect, target);
        }
        if let Some(laser) = &self.laser {
            render_laser(laser.layer, laser.style, laser.now, target);
        }
    }
}

#[derive(Debug, Default)]
struct RenderFrameBuffer {
    rgba: Vec<u8>,
    size: (u32, u32),
}

impl RenderFrameBuffer {
    fn ensure_size(&mut self, size: (u32, u32)) -> bool {
        let target_len = (size.0 as usize)
            .saturating_mul(size.1 as usize)
            .saturating_mul(4);
        let resized = self.size != size || self.rgba.len() != target_len;
        if resized {
            self.rgba = vec![0; target_len];
            self.size = size;
        }
        resized
    }
}

/// What changed in the composed frame since the previous call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Unchanged,
    Full,
    Region(DirtyRect),
}

/// Caches the committed shapes and repaints only the transient region on
/// frames where the canvas itself did not change.
#[derive(Debug, Default)]
pub struct LayeredRenderer {
    committed: RenderFrameBuffer,
    composed: RenderFrameBuffer,
    last_committed_revision: Option<u64>,
    last_clear_mode: Option<BackgroundClearMode>,
    last_transient: Option<DirtyRect>,
    committed_rebuild_count: usize,
}

impl LayeredRenderer {
    pub fn invalidate(&mut self) {
        self.last_committed_revision = None;
    }

    pub fn render(
        &mut self,
        canvas: &CanvasModel,
        committed_revision: u64,
        clear_mode: BackgroundClearMode,
        transient: &TransientLayer<'_>,
        size: (u32, u32),
    ) -> Presentation {
        let resized = self.committed.ensure_size(size);
        self.composed.ensure_size(size);
        let committed_changed = resized
            || self.last_committed_revision != Some(committed_revision)
            || self.last_clear_mode != Some(clear_mode);

        let current = transient
            .bounds()
            .and_then(|rect| DirtyRect::from_rect(&rect).clamp(size.0, size.1));

        if committed_changed {
            let mut target = PixelTarget::new(&mut self.committed.rgba, size.0, size.1);
            target.clear(clear_mode);
            for shape in &canvas.shapes {
                render_shape(shape, &mut target);
            }
            self.last_committed_revision = Some(committed_revision);
            self.last_clear_mode = Some(clear_mode);
            self.committed_rebuild_count += 1;
            tracing::trace!(
                revision = committed_revision,
                shapes = canvas.shapes.len(),
                "committed layer rebuilt"
            );

            self.composed.rgba.copy_from_slice(&self.committed.rgba);
            transient.paint(&mut PixelTarget::new(
                &mut self.composed.rgba,
                size.0,
                size.1,
            ));
            self.last_transient = current;
            return Presentation::Full;
        }

        let dirty = match (self.last_transient, current) {
            (Some(previous), Some(current)) => previous.union(current),
            (Some(rect), None) | (None, Some(rect)) => rect,
            (None, None) => return Presentation::Unchanged,
        };
        let Some(dirty) = dirty.clamp(size.0, size.1) else {
            self.last_transient = current;
            return Presentation::Unchanged;
        };

        copy_rect(&self.committed.rgba, &mut self.composed.rgba, size.0, dirty);
        transient.paint(
            &mut PixelTarget::new(&mut self.composed.rgba, size.0, size.1).with_clip(Some(dirty)),
        );
        self.last_transient = current;
        Presentation::Region(dirty)
    }

    pub fn frame(&self) -> &[u8] {
        &self.composed.rgba
    }

    pub fn size(&self) -> (u32, u32) {
        self.composed.size
    }

    /// Copies `rect` out of the composed frame as tightly packed RGBA rows.
    pub fn region_pixels(&self, rect: DirtyRect) -> Vec<u8> {
        let width = self.composed.size.0;
        let mut out = Vec::with_capacity((rect.width * rect.height * 4).max(0) as usize);
        for y in rect.y..rect.y + rect.height {
            let start = ((y as u32 * width + rect.x as u32) * 4) as usize;
            let end = start + rect.width as usize * 4;
            if let Some(row) = self.composed.rgba.get(start..end) {
                out.extend_from_slice(row);
            }
        }
        out
    }

    pub fn committed_rebuild_count(&self) -> usize {
        self.committed_rebuild_count
    }
}

fn copy_rect(src: &[u8], dst: &mut [u8], width: u32, rect: DirtyRect) {
    for y in rect.y..(rect.y + rect.height) {
        let start = ((y as u32 * width + rect.x as u32) * 4) as usize;
        let end = start + rect.width as usize * 4;
        dst[start..end].copy_from_slice(&src[start..end]);
    }
}

pub fn render_canvas_to_rgba(
    canvas: &CanvasModel,
    clear_mode: BackgroundClearMode,
    size: (u32, u32),
) -> Vec<u8> {
    let (width, height) = size;
    let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
    let mut target = PixelTarget::new(&mut pixels, width, height);
    target.clear(clear_mode);
    for shape in &canvas.shapes {
        render_shape(shape, &mut target);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::HIGHLIGHT_COLOR;
    use std::time::Duration;

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [
            pixels[idx],
            pixels[idx + 1],
            pixels[idx + 2],
            pixels[idx + 3],
        ]
    }

    fn line_shape(start: (f32, f32), end: (f32, f32), color: Color, thickness: u32) -> Shape {
        Shape::new(
            Geometry::Line {
                start: start.into(),
                end: end.into(),
            },
            color,
            thickness,
        )
    }

    #[test]
    fn render_empty_canvas_respects_background_clear_mode() {
        let canvas = CanvasModel::default();
        let transparent = render_canvas_to_rgba(&canvas, BackgroundClearMode::Transparent, (2, 2));
        assert!(transparent.chunks_exact(4).all(|px| px == [0, 0, 0, 1]));

        let board = render_canvas_to_rgba(&canvas, BackgroundClearMode::board(true), (2, 2));
        assert!(board.chunks_exact(4).all(|px| px == [255, 255, 255, 220]));
    }

    #[test]
    fn line_covers_its_center_pixels() {
        let canvas = CanvasModel {
            shapes: vec![line_shape((2.0, 5.0), (17.0, 5.0), Color::rgb(255, 0, 0), 3)],
        };
        let pixels = render_canvas_to_rgba(&canvas, BackgroundClearMode::Solid(Color::WHITE), (20, 10));
        assert_eq!(pixel(&pixels, 20, 10, 5), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixels, 20, 10, 9), [255, 255, 255, 255]);
    }

    #[test]
    fn translucent_strokes_do_not_darken_where_segments_overlap() {
        let shape = Shape::new(
            Geometry::Highlight {
                points: vec![
                    Point::new(5.0, 10.0),
                    Point::new(30.0, 10.0),
                    Point::new(5.0, 10.5),
                ],
            },
            HIGHLIGHT_COLOR,
            4,
        );
        let canvas = CanvasModel {
            shapes: vec![shape],
        };
        let pixels = render_canvas_to_rgba(&canvas, BackgroundClearMode::Solid(Color::WHITE), (40, 20));
        let a = pixel(&pixels, 40, 10, 10);
        let b = pixel(&pixels, 40, 28, 10);
        assert_eq!(a, b);
        assert!(a[2] < 255, "highlight tints the board");
    }

    #[test]
    fn filled_rect_paints_interior_with_fill_color() {
        let shape = Shape::new(
            Geometry::Rect {
                start: Point::new(2.0, 2.0),
                end: Point::new(17.0, 17.0),
            },
            Color::rgb(0, 0, 255),
            2,
        )
        .with_fill(Some(Color::rgb(0, 255, 0)));
        let canvas = CanvasModel {
            shapes: vec![shape],
        };
        let pixels = render_canvas_to_rgba(&canvas, BackgroundClearMode::Transparent, (20, 20));
        assert_eq!(pixel(&pixels, 20, 10, 10), [0, 255, 0, 255]);
        assert_eq!(pixel(&pixels, 20, 2, 10), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixels, 20, 19, 19), [0, 0, 0, 1]);
    }

    #[test]
    fn single_point_pencil_stroke_leaves_a_dot() {
        let shape = Shape::new(
            Geometry::Freehand {
                points: vec![Point::new(5.0, 5.0)],
            },
            Color::BLACK,
            5,
        );
        let canvas = CanvasModel {
            shapes: vec![shape],
        };
        let pixels = render_canvas_to_rgba(&canvas, BackgroundClearMode::Transparent, (10, 10));
        assert_eq!(pixel(&pixels, 10, 5, 5), [0, 0, 0, 255]);
        assert_eq!(pixel(&pixels, 10, 7, 5), [0, 0, 0, 255]);
        assert_eq!(pixel(&pixels, 10, 0, 0), [0, 0, 0, 1]);
    }

    #[test]
    fn smoothing_keeps_stroke_endpoints() {
        let raw = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 10.0),
        ];
        let smooth = smooth_stroke(&raw);
        assert_eq!(smooth.first(), raw.first());
        assert_eq!(smooth.last(), raw.last());
        assert!(smooth.len() > raw.len());
    }

    #[test]
    fn arrow_head_wings_point_back_along_shaft() {
        let wings = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 2.0).expect("wings");
        for wing in wings {
            assert!(wing.x < 100.0);
            assert!((Point::new(100.0, 0.0).distance(wing) - ARROW_HEAD_MIN).abs() < 1e-3);
        }
        assert!(arrow_head(Point::new(1.0, 1.0), Point::new(1.0, 1.0), 2.0).is_none());
    }

    #[test]
    fn rendering_is_bounds_safe_on_canvas_edges() {
        let canvas = CanvasModel {
            shapes: vec![
                line_shape((-50.0, -50.0), (200.0, 200.0), Color::BLACK, 12),
                Shape::new(
                    Geometry::Circle {
                        center: Point::new(0.0, 0.0),
                        edge: Point::new(30.0, 0.0),
                    },
                    Color::BLACK,
                    4,
                ),
            ],
        };
        let pixels = render_canvas_to_rgba(&canvas, BackgroundClearMode::Transparent, (16, 16));
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert_eq!(pixel(&pixels, 16, 8, 8), [0, 0, 0, 255]);
    }

    #[test]
    fn committed_layer_rebuilds_only_when_revision_changes() {
        let mut renderer = LayeredRenderer::default();
        let canvas = CanvasModel {
            shapes: vec![line_shape((0.0, 0.0), (10.0, 10.0), Color::BLACK, 2)],
        };
        let empty = TransientLayer::default();
        let mode = BackgroundClearMode::Transparent;

        assert_eq!(renderer.render(&canvas, 1, mode, &empty, (32, 32)), Presentation::Full);
        assert_eq!(renderer.render(&canvas, 1, mode, &empty, (32, 32)), Presentation::Unchanged);
        assert_eq!(renderer.committed_rebuild_count(), 1);

        let preview = line_shape((20.0, 20.0), (25.0, 20.0), Color::BLACK, 2);
        let with_preview = TransientLayer {
            active_shape: Some(&preview),
            ..TransientLayer::default()
        };
        let presented = renderer.render(&canvas, 1, mode, &with_preview, (32, 32));
        assert!(matches!(presented, Presentation::Region(_)));
        assert_eq!(renderer.committed_rebuild_count(), 1);

        // Removing the preview repaints the region it used to cover.
        let presented = renderer.render(&canvas, 1, mode, &empty, (32, 32));
        let Presentation::Region(rect) = presented else {
            panic!("expected a region update, got {presented:?}");
        };
        assert!(rect.x <= 20 && rect.x + rect.width >= 26);
        assert_eq!(pixel(renderer.frame(), 32, 22, 20), [0, 0, 0, 1]);

        assert_eq!(renderer.render(&canvas, 2, mode, &empty, (32, 32)), Presentation::Full);
        assert_eq!(renderer.committed_rebuild_count(), 2);
    }

    #[test]
    fn region_update_matches_full_redraw() {
        let canvas = CanvasModel {
            shapes: vec![line_shape((0.0, 16.0), (31.0, 16.0), Color::rgb(0, 0, 255), 4)],
        };
        let preview = Shape::new(
            Geometry::Ellipse {
                start: Point::new(4.0, 4.0),
                end: Point::new(24.0, 28.0),
            },
            Color::rgba(255, 0, 0, 200),
            3,
        );
        let transient = TransientLayer {
            active_shape: Some(&preview),
            ..TransientLayer::default()
        };
        let mode = BackgroundClearMode::Transparent;

        let mut incremental = LayeredRenderer::default();
        incremental.render(&canvas, 1, mode, &TransientLayer::default(), (32, 32));
        incremental.render(&canvas, 1, mode, &transient, (32, 32));

        let mut full = LayeredRenderer::default();
        full.render(&canvas, 1, mode, &transient, (32, 32));

        assert_eq!(incremental.frame(), full.frame());
    }

    #[test]
    fn laser_trail_paints_and_fades() {
        let start = Instant::now();
        let style = LaserStyle {
            glow: false,
            ..LaserStyle::default()
        };
        let mut layer = LaserLayer::default();
        layer.begin(Point::new(4.0, 10.0), start);
        layer.extend(Point::new(36.0, 10.0), start);
        layer.end();

        let mut pixels = vec![0u8; 40 * 20 * 4];
        render_laser(&layer, &style, start, &mut PixelTarget::new(&mut pixels, 40, 20));
        assert_eq!(pixel(&pixels, 40, 20, 10), [255, 30, 30, 255]);

        let mut faded = vec![0u8; 40 * 20 * 4];
        let later = start + style.duration + Duration::from_millis(1);
        render_laser(&layer, &style, later, &mut PixelTarget::new(&mut faded, 40, 20));
        assert!(faded.iter().all(|b| *b == 0));
    }

    #[test]
    fn lone_trailing_sample_keeps_fading() {
        let start = Instant::now();
        let style = LaserStyle {
            duration: Duration::from_millis(1500),
            glow: false,
            ..LaserStyle::default()
        };
        let mut layer = LaserLayer::default();
        layer.begin(Point::new(4.0, 10.0), start);
        layer.extend(Point::new(30.0, 10.0), start + Duration::from_millis(1000));
        layer.end();

        let now = start + Duration::from_millis(1600);
        layer.tick(now, style.duration);
        assert_eq!(layer.trails().map(|trail| trail.len()).sum::<usize>(), 1);

        let mut pixels = vec![0u8; 40 * 20 * 4];
        render_laser(&layer, &style, now, &mut PixelTarget::new(&mut pixels, 40, 20));
        let [r, g, b, a] = pixel(&pixels, 40, 30, 10);
        assert_eq!([r, g, b], [255, 30, 30]);
        assert!((150..=156).contains(&a), "alpha {a}");
    }

    #[test]
    fn selection_decoration_draws_handles() {
        let mut pixels = vec![0u8; 40 * 40 * 4];
        let rect = Rect::from_points(Point::new(10.0, 10.0), Point::new(30.0, 30.0));
        render_selection(&rect, &mut PixelTarget::new(&mut pixels, 40, 40));
        assert_eq!(pixel(&pixels, 40, 10, 10), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixels, 40, 7, 10), [0, 120, 215, 255]);
        assert_eq!(pixel(&pixels, 40, 20, 20), [0, 0, 0, 0]);
    }

    #[test]
    fn dirty_rect_union_and_clamp() {
        let a = DirtyRect::from_points((0, 0), (4, 4), 1);
        let b = DirtyRect::from_points((10, 10), (12, 12), 0);
        let merged = a.union(b);
        assert_eq!((merged.x, merged.y), (-1, -1));
        assert_eq!((merged.width, merged.height), (14, 14));
        let clamped = merged.clamp(8, 8).expect("overlaps canvas");
        assert_eq!(clamped, DirtyRect::full(8, 8));
        assert!(DirtyRect::from_points((20, 20), (22, 22), 0).clamp(8, 8).is_none());
    }
}
