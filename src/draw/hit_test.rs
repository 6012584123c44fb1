use crate::draw::model::{CanvasModel, Geometry, Point, Shape};
use crate::draw::render::closed_outline;

pub const DEFAULT_TOLERANCE: f32 = 6.0;

pub fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return point.distance_sq(start);
    }
    let wx = point.x - start.x;
    let wy = point.y - start.y;
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    point.distance_sq(Point::new(start.x + vx * t, start.y + vy * t))
}

fn near_polyline(points: &[Point], point: Point, reach: f32) -> bool {
    let reach_sq = reach * reach;
    match points {
        [] => false,
        [only] => only.distance_sq(point) <= reach_sq,
        _ => points
            .windows(2)
            .any(|pair| point_segment_distance_sq(point, pair[0], pair[1]) <= reach_sq),
    }
}

fn near_outline(outline: &[Point], point: Point, reach: f32) -> bool {
    let reach_sq = reach * reach;
    outline
        .iter()
        .zip(outline.iter().cycle().skip(1))
        .any(|(a, b)| point_segment_distance_sq(point, *a, *b) <= reach_sq)
}

/// Filled closed shapes, highlight boxes and text hit anywhere inside their
/// padded bounds. Outlined closed shapes and open strokes hit within half
/// their painted width plus `tolerance`.
pub fn shape_contains(shape: &Shape, point: Point, tolerance: f32) -> bool {
    let reach = shape.stroke_width() * 0.5 + tolerance;
    match &shape.geometry {
        Geometry::Freehand { points } | Geometry::Highlight { points } => {
            near_polyline(points, point, reach)
        }
        Geometry::Line { start, end } | Geometry::Arrow { start, end } => {
            near_polyline(&[*start, *end], point, reach)
        }
        Geometry::Rect { .. }
        | Geometry::Diamond { .. }
        | Geometry::Ellipse { .. }
        | Geometry::Circle { .. }
            if shape.fill.is_none() =>
        {
            closed_outline(&shape.geometry)
                .is_some_and(|outline| near_outline(&outline, point, reach))
        }
        Geometry::Rect { .. }
        | Geometry::Diamond { .. }
        | Geometry::Ellipse { .. }
        | Geometry::Circle { .. }
        | Geometry::HighlightBox { .. }
        | Geometry::Text { .. } => shape.bounding_rect().inflate(tolerance).contains(point),
    }
}

/// Index of the topmost shape under `point`, walking in reverse paint order.
pub fn topmost_at(canvas: &CanvasModel, point: Point, tolerance: f32) -> Option<usize> {
    canvas
        .shapes
        .iter()
        .rposition(|shape| shape_contains(shape, point, tolerance))
}

pub fn topmost_text_at(canvas: &CanvasModel, point: Point) -> Option<usize> {
    canvas
        .shapes
        .iter()
        .rposition(|shape| shape.is_text() && shape_contains(shape, point, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Color;

    fn line(start: (f32, f32), end: (f32, f32), thickness: u32) -> Shape {
        Shape::new(
            Geometry::Line {
                start: start.into(),
                end: end.into(),
            },
            Color::BLACK,
            thickness,
        )
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(point_segment_distance_sq(Point::new(5.0, 3.0), a, b), 9.0);
        assert_eq!(point_segment_distance_sq(Point::new(13.0, 4.0), a, b), 25.0);
        assert_eq!(point_segment_distance_sq(Point::new(1.0, 1.0), a, a), 2.0);
    }

    #[test]
    fn line_hit_uses_segment_not_infinite_line() {
        let shape = line((0.0, 0.0), (100.0, 0.0), 2);
        assert!(shape_contains(&shape, Point::new(50.0, 5.0), DEFAULT_TOLERANCE));
        assert!(!shape_contains(&shape, Point::new(150.0, 0.0), DEFAULT_TOLERANCE));
    }

    #[test]
    fn thicker_strokes_reach_further() {
        let thin = line((0.0, 0.0), (100.0, 0.0), 2);
        let thick = line((0.0, 0.0), (100.0, 0.0), 20);
        let probe = Point::new(50.0, 14.0);
        assert!(!shape_contains(&thin, probe, DEFAULT_TOLERANCE));
        assert!(shape_contains(&thick, probe, DEFAULT_TOLERANCE));
    }

    fn rect(fill: Option<Color>) -> Shape {
        Shape::new(
            Geometry::Rect {
                start: Point::new(40.0, 40.0),
                end: Point::new(10.0, 10.0),
            },
            Color::BLACK,
            2,
        )
        .with_fill(fill)
    }

    #[test]
    fn outlined_rect_hits_only_near_its_edges() {
        let shape = rect(None);
        assert!(!shape_contains(&shape, Point::new(25.0, 25.0), DEFAULT_TOLERANCE));
        assert!(shape_contains(&shape, Point::new(10.0, 25.0), 0.0));
        assert!(!shape_contains(&shape, Point::new(45.0, 25.0), 0.0));
        assert!(shape_contains(&shape, Point::new(45.0, 25.0), DEFAULT_TOLERANCE));
    }

    #[test]
    fn filled_rect_hits_inside_its_bounds() {
        let shape = rect(Some(Color::BLACK));
        assert!(shape_contains(&shape, Point::new(25.0, 25.0), 0.0));
        assert!(!shape_contains(&shape, Point::new(45.0, 25.0), 0.0));
    }

    #[test]
    fn outlined_ellipse_and_diamond_ignore_their_centre() {
        for geometry in [
            Geometry::Ellipse {
                start: Point::new(0.0, 0.0),
                end: Point::new(100.0, 60.0),
            },
            Geometry::Diamond {
                start: Point::new(0.0, 0.0),
                end: Point::new(100.0, 60.0),
            },
            Geometry::Circle {
                center: Point::new(50.0, 30.0),
                edge: Point::new(80.0, 30.0),
            },
        ] {
            let shape = Shape::new(geometry, Color::BLACK, 2);
            assert!(!shape_contains(&shape, Point::new(50.0, 30.0), DEFAULT_TOLERANCE));
        }
        let ellipse = Shape::new(
            Geometry::Ellipse {
                start: Point::new(0.0, 0.0),
                end: Point::new(100.0, 60.0),
            },
            Color::BLACK,
            2,
        );
        assert!(shape_contains(&ellipse, Point::new(100.0, 30.0), DEFAULT_TOLERANCE));
    }

    #[test]
    fn stroke_inside_outlined_rect_stays_reachable() {
        let canvas = CanvasModel {
            shapes: vec![
                line((100.0, 150.0), (200.0, 150.0), 2),
                Shape::new(
                    Geometry::Rect {
                        start: Point::new(0.0, 0.0),
                        end: Point::new(300.0, 300.0),
                    },
                    Color::BLACK,
                    2,
                ),
            ],
        };
        assert_eq!(topmost_at(&canvas, Point::new(150.0, 150.0), DEFAULT_TOLERANCE), Some(0));
        assert_eq!(topmost_at(&canvas, Point::new(0.0, 150.0), DEFAULT_TOLERANCE), Some(1));
    }

    #[test]
    fn topmost_prefers_last_painted_shape() {
        let canvas = CanvasModel {
            shapes: vec![
                line((0.0, 0.0), (100.0, 0.0), 4),
                line((50.0, -50.0), (50.0, 50.0), 4),
            ],
        };
        assert_eq!(topmost_at(&canvas, Point::new(50.0, 0.0), 2.0), Some(1));
        assert_eq!(topmost_at(&canvas, Point::new(10.0, 0.0), 2.0), Some(0));
        assert_eq!(topmost_at(&canvas, Point::new(10.0, 40.0), 2.0), None);
    }

    #[test]
    fn text_lookup_ignores_other_shapes() {
        let canvas = CanvasModel {
            shapes: vec![
                Shape::new(
                    Geometry::Text {
                        anchor: Point::new(10.0, 40.0),
                        text: "Note".into(),
                        size: 28.0,
                    },
                    Color::BLACK,
                    1,
                ),
                line((0.0, 30.0), (200.0, 30.0), 4),
            ],
        };
        assert_eq!(topmost_text_at(&canvas, Point::new(15.0, 30.0)), Some(0));
        assert_eq!(topmost_text_at(&canvas, Point::new(190.0, 30.0)), None);
    }
}
