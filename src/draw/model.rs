use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_SIZE: f32 = 28.0;
pub const HIGHLIGHT_COLOR: Color = Color::rgba(255, 255, 0, 128);
pub const HIGHLIGHT_MIN_WIDTH: f32 = 8.0;
const MIN_TEXT_SIZE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Point) -> f32 {
        self.distance_sq(other).sqrt()
    }

    pub fn lerp(self, other: Point, t: f32) -> Self {
        Self::new(
            self.x * (1.0 - t) + other.x * t,
            self.y * (1.0 - t) + other.y * t,
        )
    }

    pub fn midpoint(self, other: Point) -> Self {
        self.lerp(other, 0.5)
    }

    /// Maps the point through a scale anchored at `anchor`.
    pub fn scaled_about(self, anchor: Point, sx: f32, sy: f32) -> Self {
        Self::new(
            anchor.x + (self.x - anchor.x) * sx,
            anchor.y + (self.y - anchor.y) * sy,
        )
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned rectangle, always normalized (`min <= max`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn from_min_size(min: Point, width: f32, height: f32) -> Self {
        Self::from_points(min, min.offset(width, height))
    }

    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Self::from_points(*first, *first);
        for p in &points[1..] {
            rect.min_x = rect.min_x.min(p.x);
            rect.min_y = rect.min_y.min(p.y);
            rect.max_x = rect.max_x.max(p.x);
            rect.max_y = rect.max_y.max(p.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn inflate(&self, pad: f32) -> Rect {
        Rect {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Mouse,
    Select,
    Pencil,
    Highlighter,
    Line,
    Arrow,
    Rect,
    Diamond,
    Ellipse,
    Circle,
    Text,
    Laser,
    Zoom,
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 14] = [
        Tool::Mouse,
        Tool::Select,
        Tool::Pencil,
        Tool::Highlighter,
        Tool::Line,
        Tool::Arrow,
        Tool::Rect,
        Tool::Diamond,
        Tool::Ellipse,
        Tool::Circle,
        Tool::Text,
        Tool::Laser,
        Tool::Zoom,
        Tool::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Mouse => "mouse",
            Tool::Select => "select",
            Tool::Pencil => "pencil",
            Tool::Highlighter => "highlighter",
            Tool::Line => "line",
            Tool::Arrow => "arrow",
            Tool::Rect => "rect",
            Tool::Diamond => "diamond",
            Tool::Ellipse => "ellipse",
            Tool::Circle => "circle",
            Tool::Text => "text",
            Tool::Laser => "laser",
            Tool::Zoom => "zoom",
            Tool::Eraser => "eraser",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        let name = name.trim().to_ascii_lowercase();
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Mouse => "Mouse",
            Tool::Select => "Select",
            Tool::Pencil => "Pencil",
            Tool::Highlighter => "Highlighter",
            Tool::Line => "Line",
            Tool::Arrow => "Arrow",
            Tool::Rect => "Rectangle",
            Tool::Diamond => "Diamond",
            Tool::Ellipse => "Ellipse",
            Tool::Circle => "Circle",
            Tool::Text => "Text",
            Tool::Laser => "Laser",
            Tool::Zoom => "Zoom",
            Tool::Eraser => "Eraser",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Tool::Mouse => "🖱",
            Tool::Select => "⬉",
            Tool::Pencil => "✏",
            Tool::Highlighter => "🖍",
            Tool::Line => "╱",
            Tool::Arrow => "➡",
            Tool::Rect => "⬜",
            Tool::Diamond => "◇",
            Tool::Ellipse => "⬭",
            Tool::Circle => "⭕",
            Tool::Text => "T",
            Tool::Laser => "✨",
            Tool::Zoom => "🔍",
            Tool::Eraser => "⌫",
        }
    }

    pub fn supports_fill(self) -> bool {
        matches!(
            self,
            Tool::Rect | Tool::Diamond | Tool::Ellipse | Tool::Circle
        )
    }

    /// `false` only for the pass-through mouse mode.
    pub fn captures_input(self) -> bool {
        !matches!(self, Tool::Mouse)
    }

    pub fn creates_shape(self) -> bool {
        matches!(
            self,
            Tool::Pencil
                | Tool::Highlighter
                | Tool::Line
                | Tool::Arrow
                | Tool::Rect
                | Tool::Diamond
                | Tool::Ellipse
                | Tool::Circle
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Freehand { points: Vec<Point> },
    Highlight { points: Vec<Point> },
    HighlightBox { rect: Rect },
    Line { start: Point, end: Point },
    Arrow { start: Point, end: Point },
    Rect { start: Point, end: Point },
    Diamond { start: Point, end: Point },
    Ellipse { start: Point, end: Point },
    Circle { center: Point, edge: Point },
    Text { anchor: Point, text: String, size: f32 },
}

impl Geometry {
    /// Initial geometry for a drag-created shape starting at `point`.
    pub fn start_for(tool: Tool, point: Point) -> Option<Geometry> {
        Some(match tool {
            Tool::Pencil => Geometry::Freehand {
                points: vec![point],
            },
            Tool::Highlighter => Geometry::Highlight {
                points: vec![point],
            },
            Tool::Line => Geometry::Line {
                start: point,
                end: point,
            },
            Tool::Arrow => Geometry::Arrow {
                start: point,
                end: point,
            },
            Tool::Rect => Geometry::Rect {
                start: point,
                end: point,
            },
            Tool::Diamond => Geometry::Diamond {
                start: point,
                end: point,
            },
            Tool::Ellipse => Geometry::Ellipse {
                start: point,
                end: point,
            },
            Tool::Circle => Geometry::Circle {
                center: point,
                edge: point,
            },
            _ => return None,
        })
    }
}

/// A committed or in-progress drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub geometry: Geometry,
    pub color: Color,
    pub thickness: u32,
    pub fill: Option<Color>,
}

impl Shape {
    pub fn new(geometry: Geometry, color: Color, thickness: u32) -> Self {
        Self {
            geometry,
            color,
            thickness: thickness.max(1),
            fill: None,
        }
    }

    pub fn with_fill(mut self, fill: Option<Color>) -> Self {
        self.fill = fill;
        self
    }

    pub fn tool(&self) -> Tool {
        match self.geometry {
            Geometry::Freehand { .. } => Tool::Pencil,
            Geometry::Highlight { .. } | Geometry::HighlightBox { .. } => Tool::Highlighter,
            Geometry::Line { .. } => Tool::Line,
            Geometry::Arrow { .. } => Tool::Arrow,
            Geometry::Rect { .. } => Tool::Rect,
            Geometry::Diamond { .. } => Tool::Diamond,
            Geometry::Ellipse { .. } => Tool::Ellipse,
            Geometry::Circle { .. } => Tool::Circle,
            Geometry::Text { .. } => Tool::Text,
        }
    }

    /// Painted stroke width in pixels. Highlighter strokes are wider than the
    /// configured thickness.
    pub fn stroke_width(&self) -> f32 {
        let thickness = self.thickness.max(1) as f32;
        match self.geometry {
            Geometry::Highlight { .. } => (thickness * 2.0).max(HIGHLIGHT_MIN_WIDTH),
            _ => thickness,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.geometry, Geometry::Text { .. })
    }

    pub fn bounding_rect(&self) -> Rect {
        match &self.geometry {
            Geometry::Freehand { points } | Geometry::Highlight { points } => {
                Rect::bounding(points).unwrap_or_default()
            }
            Geometry::HighlightBox { rect } => *rect,
            Geometry::Line { start, end }
            | Geometry::Arrow { start, end }
            | Geometry::Rect { start, end }
            | Geometry::Diamond { start, end }
            | Geometry::Ellipse { start, end } => Rect::from_points(*start, *end),
            Geometry::Circle { center, edge } => {
                let radius = center.distance(*edge);
                Rect::from_points(
                    center.offset(-radius, -radius),
                    center.offset(radius, radius),
                )
            }
            Geometry::Text { anchor, text, size } => {
                let metrics = crate::draw::text::measure(text, *size);
                Rect::from_min_size(
                    anchor.offset(0.0, -metrics.ascent),
                    metrics.width,
                    metrics.height,
                )
            }
        }
    }

    fn for_each_point_mut(&mut self, mut f: impl FnMut(&mut Point)) {
        match &mut self.geometry {
            Geometry::Freehand { points } | Geometry::Highlight { points } => {
                points.iter_mut().for_each(f)
            }
            Geometry::HighlightBox { rect } => {
                let mut a = rect.top_left();
                let mut b = rect.bottom_right();
                f(&mut a);
                f(&mut b);
                *rect = Rect::from_points(a, b);
            }
            Geometry::Line { start, end }
            | Geometry::Arrow { start, end }
            | Geometry::Rect { start, end }
            | Geometry::Diamond { start, end }
            | Geometry::Ellipse { start, end } => {
                f(start);
                f(end);
            }
            Geometry::Circle { center, edge } => {
                f(center);
                f(edge);
            }
            Geometry::Text { anchor, .. } => f(anchor),
        }
    }

    /// Moves every control point of the shape.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.for_each_point_mut(|p| *p = p.offset(dx, dy));
    }

    pub fn scale_about(&mut self, anchor: Point, sx: f32, sy: f32) {
        self.for_each_point_mut(|p| *p = p.scaled_about(anchor, sx, sy));
        if let Geometry::Text { size, .. } = &mut self.geometry {
            *size = (*size * sy).max(MIN_TEXT_SIZE);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasModel {
    pub shapes: Vec<Shape>,
}

impl CanvasModel {
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .map(Shape::bounding_rect)
            .reduce(|acc, rect| acc.union(&rect))
    }
}
