use std::time::Instant;

use crate::draw::history::DrawHistory;
use crate::draw::hit_test::{topmost_at, topmost_text_at, DEFAULT_TOLERANCE};
use crate::draw::keyboard::{map_key_event_to_command, KeyCommand, KeyEvent, ShortcutMap};
use crate::draw::laser::{LaserLayer, LaserStyle};
use crate::draw::model::{
    CanvasModel, Color, Geometry, Point, Rect, Shape, Tool, DEFAULT_TEXT_SIZE, HIGHLIGHT_COLOR,
};
use crate::draw::render::{LaserFrame, TransientLayer};
use crate::draw::selection::{handle_at, Handle, TransformSession};
use crate::draw::settings::{MAX_THICKNESS, MIN_THICKNESS};
use crate::draw::zoom::{ZoomState, ZoomView};

const MIN_POINT_DIST: f32 = 2.0;
const TEXT_HIGHLIGHT_PAD: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Undo,
    Redo,
    RequestExit,
    ToolChanged(Tool),
    /// Clear was requested from the keyboard; the shell confirms before clearing.
    Clear,
    Save,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingTransform {
    session: TransformSession,
    before: CanvasModel,
}

#[derive(Debug, Clone)]
pub struct DrawInputState {
    tool: Tool,
    color: Color,
    thickness: u32,
    fill_enabled: bool,
    laser_style: LaserStyle,
    canvas: CanvasModel,
    history: DrawHistory,
    revision: u64,
    active_shape: Option<Shape>,
    text_draft: Option<Shape>,
    selected: Option<usize>,
    transform: Option<PendingTransform>,
    erase_before: Option<CanvasModel>,
    laser: LaserLayer,
    zoom: ZoomState,
}

impl DrawInputState {
    pub fn new(tool: Tool, color: Color, thickness: u32) -> Self {
        Self {
            tool,
            color,
            thickness: thickness.clamp(MIN_THICKNESS, MAX_THICKNESS),
            fill_enabled: false,
            laser_style: LaserStyle::default(),
            canvas: CanvasModel::default(),
            history: DrawHistory::default(),
            revision: 0,
            active_shape: None,
            text_draft: None,
            selected: None,
            transform: None,
            erase_before: None,
            laser: LaserLayer::default(),
            zoom: ZoomState::default(),
        }
    }

    pub fn canvas(&self) -> &CanvasModel {
        &self.canvas
    }

    pub fn history(&self) -> &DrawHistory {
        &self.history
    }

    /// Bumped on every change to the committed shapes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    pub fn fill_enabled(&self) -> bool {
        self.fill_enabled
    }

    pub fn laser_style(&self) -> &LaserStyle {
        &self.laser_style
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        self.selected
            .and_then(|index| self.canvas.shapes.get(index))
            .map(Shape::bounding_rect)
    }

    pub fn active_shape(&self) -> Option<&Shape> {
        self.active_shape.as_ref()
    }

    pub fn zoom_view(&self, now: Instant) -> Option<ZoomView> {
        self.zoom.active_view(now)
    }

    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if tool == self.tool {
            return false;
        }
        self.finish_text();
        self.active_shape = None;
        self.finish_interaction();
        if tool != Tool::Select {
            self.selected = None;
        }
        if tool != Tool::Zoom {
            self.zoom.cancel();
        }
        tracing::debug!(from = self.tool.name(), to = tool.name(), "tool changed");
        self.tool = tool;
        true
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        if let Some(draft) = self.text_draft.as_mut() {
            draft.color = color;
        }
    }

    pub fn set_thickness(&mut self, thickness: u32) {
        self.thickness = thickness.clamp(MIN_THICKNESS, MAX_THICKNESS);
    }

    pub fn set_fill_enabled(&mut self, enabled: bool) {
        self.fill_enabled = enabled;
    }

    pub fn set_laser_style(&mut self, style: LaserStyle) {
        self.laser_style = style;
    }

    pub fn handle_left_down(&mut self, point: Point, now: Instant) {
        match self.tool {
            Tool::Mouse => {}
            Tool::Select => self.begin_select(point),
            Tool::Text => {
                self.finish_text();
                self.text_draft = Some(Shape::new(
                    Geometry::Text {
                        anchor: point,
                        text: String::new(),
                        size: DEFAULT_TEXT_SIZE,
                    },
                    self.color,
                    self.thickness,
                ));
            }
            Tool::Laser => self.laser.begin(point, now),
            Tool::Zoom => self.zoom.begin(point),
            Tool::Eraser => {
                self.erase_before = Some(self.canvas.clone());
                self.erase_at(point);
            }
            Tool::Highlighter => {
                if let Some(index) = topmost_text_at(&self.canvas, point) {
                    let rect = self.canvas.shapes[index]
                        .bounding_rect()
                        .inflate(TEXT_HIGHLIGHT_PAD);
                    self.commit_shape(Shape::new(
                        Geometry::HighlightBox { rect },
                        HIGHLIGHT_COLOR,
                        self.thickness,
                    ));
                } else {
                    self.active_shape = Geometry::start_for(Tool::Highlighter, point)
                        .map(|geometry| Shape::new(geometry, HIGHLIGHT_COLOR, self.thickness));
                }
            }
            tool => {
                let fill = (self.fill_enabled && tool.supports_fill()).then_some(self.color);
                self.active_shape = Geometry::start_for(tool, point)
                    .map(|geometry| Shape::new(geometry, self.color, self.thickness).with_fill(fill));
            }
        }
    }

    pub fn handle_move(&mut self, point: Point, now: Instant) {
        if let Some(pending) = self.transform.as_mut() {
            if let Some(shape) = self.canvas.shapes.get_mut(pending.session.index) {
                pending.session.update(shape, point);
                self.revision += 1;
            }
            return;
        }
        if self.laser.is_drawing() {
            self.laser.extend(point, now);
            return;
        }
        if self.zoom.is_selecting() {
            self.zoom.update(point);
            return;
        }
        if self.erase_before.is_some() {
            self.erase_at(point);
            return;
        }

        match self.active_shape.as_mut().map(|shape| &mut shape.geometry) {
            Some(Geometry::Freehand { points }) | Some(Geometry::Highlight { points }) => {
                if should_append_point(points.last().copied(), point) {
                    points.push(point);
                }
            }
            Some(Geometry::Line { end, .. })
            | Some(Geometry::Arrow { end, .. })
            | Some(Geometry::Rect { end, .. })
            | Some(Geometry::Diamond { end, .. })
            | Some(Geometry::Ellipse { end, .. }) => *end = point,
            Some(Geometry::Circle { edge, .. }) => *edge = point,
            Some(Geometry::HighlightBox { .. }) | Some(Geometry::Text { .. }) | None => {}
        }
    }

    pub fn handle_left_up(&mut self, point: Point, now: Instant) {
        self.handle_move(point, now);
        if self.laser.is_drawing() {
            self.laser.end();
        }
        if self.zoom.is_selecting() {
            self.zoom.finish(now);
        }
        self.finish_interaction();

        if let Some(shape) = self.active_shape.take() {
            if is_degenerate(&shape) {
                tracing::trace!(tool = shape.tool().name(), "dropping zero-size shape");
            } else {
                self.commit_shape(shape);
            }
        }
    }

    /// Applies a key press. Text editing keys are handled here; commands that
    /// need the shell (exit, save, clear confirmation) are returned.
    pub fn handle_key_event(
        &mut self,
        event: KeyEvent,
        shortcuts: &ShortcutMap,
    ) -> Option<InputCommand> {
        let command = map_key_event_to_command(event, shortcuts, self.text_draft.is_some())?;
        match command {
            KeyCommand::Undo => {
                self.undo();
                Some(InputCommand::Undo)
            }
            KeyCommand::Redo => {
                self.redo();
                Some(InputCommand::Redo)
            }
            KeyCommand::RequestExit => Some(InputCommand::RequestExit),
            KeyCommand::Save => Some(InputCommand::Save),
            KeyCommand::Clear => Some(InputCommand::Clear),
            KeyCommand::DeleteSelection => {
                self.delete_selected();
                None
            }
            KeyCommand::SelectTool(tool) => {
                self.set_tool(tool).then_some(InputCommand::ToolChanged(tool))
            }
            KeyCommand::CommitText => {
                self.finish_text();
                None
            }
            KeyCommand::CancelText => {
                self.cancel_text();
                None
            }
            KeyCommand::TextNewline => {
                self.insert_text("\n");
                None
            }
            KeyCommand::TextBackspace => {
                if let Some(Geometry::Text { text, .. }) =
                    self.text_draft.as_mut().map(|draft| &mut draft.geometry)
                {
                    text.pop();
                }
                None
            }
        }
    }

    pub fn text_draft(&self) -> Option<&Shape> {
        self.text_draft.as_ref()
    }

    pub fn text_draft_mut(&mut self) -> Option<&mut Shape> {
        self.text_draft.as_mut()
    }

    pub fn insert_text(&mut self, input: &str) {
        if let Some(Geometry::Text { text, .. }) =
            self.text_draft.as_mut().map(|draft| &mut draft.geometry)
        {
            text.extend(input.chars().filter(|c| *c == '\n' || !c.is_control()));
        }
    }

    /// Commits the draft when it holds visible text. Returns `true` if a shape
    /// was added.
    pub fn finish_text(&mut self) -> bool {
        let Some(draft) = self.text_draft.take() else {
            return false;
        };
        match &draft.geometry {
            Geometry::Text { text, .. } if !text.trim().is_empty() => {
                self.commit_shape(draft);
                true
            }
            _ => false,
        }
    }

    pub fn cancel_text(&mut self) {
        self.text_draft = None;
    }

    pub fn undo(&mut self) -> bool {
        self.abort_interaction();
        let Some(previous) = self.history.undo(&self.canvas) else {
            return false;
        };
        self.replace_canvas(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.abort_interaction();
        let Some(next) = self.history.redo(&self.canvas) else {
            return false;
        };
        self.replace_canvas(next);
        true
    }

    /// Removes every shape and laser trail. Recorded in history so it can be undone.
    pub fn clear(&mut self) -> bool {
        self.abort_interaction();
        self.laser.clear();
        if self.canvas.is_empty() {
            return false;
        }
        let shapes = self.canvas.len();
        let before = std::mem::take(&mut self.canvas);
        self.history.record(before);
        self.selected = None;
        self.revision += 1;
        tracing::info!(shapes, "canvas cleared");
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(index) = self.selected.take() else {
            return false;
        };
        if index >= self.canvas.len() {
            return false;
        }
        self.history.record(self.canvas.clone());
        self.canvas.shapes.remove(index);
        self.revision += 1;
        true
    }

    /// Expires laser samples and zoom views. Returns `true` while something is
    /// still animating and the frame should be repainted.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.laser.tick(now, self.laser_style.duration);
        let zoom_expired = self.zoom.tick(now);
        zoom_expired || self.laser.is_animating() || self.zoom.is_active(now)
    }

    pub fn transient(&self, now: Instant) -> TransientLayer<'_> {
        TransientLayer {
            active_shape: self.active_shape.as_ref(),
            text_draft: self.text_draft.as_ref(),
            selection: if self.tool == Tool::Select {
                self.selection_rect()
            } else {
                None
            },
            marquee: self.zoom.marquee(),
            laser: self.laser.is_animating().then_some(LaserFrame {
                layer: &self.laser,
                style: &self.laser_style,
                now,
            }),
        }
    }

    fn begin_select(&mut self, point: Point) {
        let handle = self
            .selection_rect()
            .and_then(|rect| handle_at(&rect, point))
            .zip(self.selected);
        let (index, handle) = match handle {
            Some((handle, index)) => (index, handle),
            None => match topmost_at(&self.canvas, point, DEFAULT_TOLERANCE) {
                Some(index) => (index, Handle::Move),
                None => {
                    self.selected = None;
                    return;
                }
            },
        };
        self.selected = Some(index);
        let Some(shape) = self.canvas.shapes.get(index) else {
            return;
        };
        self.transform = Some(PendingTransform {
            session: TransformSession::begin(index, handle, shape, point),
            before: self.canvas.clone(),
        });
    }

    fn erase_at(&mut self, point: Point) {
        if let Some(index) = topmost_at(&self.canvas, point, DEFAULT_TOLERANCE) {
            self.canvas.shapes.remove(index);
            self.selected = None;
            self.revision += 1;
        }
    }

    fn commit_shape(&mut self, shape: Shape) {
        self.history.record(self.canvas.clone());
        tracing::debug!(tool = shape.tool().name(), "shape committed");
        self.canvas.shapes.push(shape);
        self.revision += 1;
    }

    /// Ends transform and eraser drags, recording them as single history steps.
    fn finish_interaction(&mut self) {
        if let Some(pending) = self.transform.take() {
            if pending.before != self.canvas {
                self.history.record(pending.before);
            }
        }
        if let Some(before) = self.erase_before.take() {
            if before != self.canvas {
                self.history.record(before);
            }
        }
    }

    fn abort_interaction(&mut self) {
        self.finish_interaction();
        self.active_shape = None;
        self.text_draft = None;
    }

    fn replace_canvas(&mut self, canvas: CanvasModel) {
        self.canvas = canvas;
        self.selected = None;
        self.revision += 1;
    }
}

fn should_append_point(last: Option<Point>, point: Point) -> bool {
    let Some(last) = last else {
        return true;
    };
    last.distance_sq(point) >= MIN_POINT_DIST * MIN_POINT_DIST
}

/// Two-point shapes created by a click without a drag.
fn is_degenerate(shape: &Shape) -> bool {
    match &shape.geometry {
        Geometry::Line { start, end }
        | Geometry::Arrow { start, end }
        | Geometry::Rect { start, end }
        | Geometry::Diamond { start, end }
        | Geometry::Ellipse { start, end } => start == end,
        Geometry::Circle { center, edge } => center == edge,
        _ => false,
    }
}
