use std::time::Instant;
use tutor_draw::draw::composite::annotation_from_canvas;
use tutor_draw::draw::input::DrawInputState;
use tutor_draw::draw::model::{CanvasModel, Color, Geometry, Point, Shape, Tool};
use tutor_draw::draw::render::{
    render_canvas_to_rgba, BackgroundClearMode, LayeredRenderer, Presentation, TransientLayer,
    BOARD_COLOR, INPUT_KEEPALIVE_COLOR,
};

const SIZE: (u32, u32) = (80, 60);

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE.0 + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn rect_canvas(fill: Option<Color>) -> CanvasModel {
    CanvasModel {
        shapes: vec![Shape::new(
            Geometry::Rect {
                start: Point::new(10.0, 10.0),
                end: Point::new(60.0, 45.0),
            },
            Color::rgb(0, 0, 255),
            4,
        )
        .with_fill(fill)],
    }
}

#[test]
fn stroked_rect_leaves_interior_clear() {
    let pixels = render_canvas_to_rgba(&rect_canvas(None), BackgroundClearMode::Transparent, SIZE);
    assert_eq!(pixel(&pixels, 10, 25), [0, 0, 255, 255]);
    assert_eq!(pixel(&pixels, 35, 27), INPUT_KEEPALIVE_COLOR.to_rgba_array());
    assert_eq!(pixel(&pixels, 75, 55), INPUT_KEEPALIVE_COLOR.to_rgba_array());
}

#[test]
fn filled_rect_covers_interior() {
    let pixels = render_canvas_to_rgba(
        &rect_canvas(Some(Color::rgb(0, 0, 255))),
        BackgroundClearMode::Transparent,
        SIZE,
    );
    assert_eq!(pixel(&pixels, 35, 27), [0, 0, 255, 255]);
}

#[test]
fn board_background_sits_under_shapes() {
    let pixels = render_canvas_to_rgba(&rect_canvas(None), BackgroundClearMode::board(true), SIZE);
    assert_eq!(pixel(&pixels, 2, 2), BOARD_COLOR.to_rgba_array());
    assert_eq!(pixel(&pixels, 10, 25), [0, 0, 255, 255]);
}

#[test]
fn export_buffer_is_fully_transparent_off_board() {
    let buffer = annotation_from_canvas(&rect_canvas(None), SIZE.0, SIZE.1, None);
    assert_eq!(buffer.pixel(2, 2), Color::TRANSPARENT);
    assert_eq!(buffer.pixel(10, 25), Color::rgb(0, 0, 255));
}

#[test]
fn layered_renderer_repaints_only_the_draft_region() {
    let mut input = DrawInputState::new(Tool::Rect, Color::rgb(255, 0, 0), 2);
    let now = Instant::now();
    let mut renderer = LayeredRenderer::default();
    let clear = BackgroundClearMode::Transparent;

    let first = renderer.render(input.canvas(), input.revision(), clear, &TransientLayer::default(), SIZE);
    assert_eq!(first, Presentation::Full);
    let idle = renderer.render(input.canvas(), input.revision(), clear, &TransientLayer::default(), SIZE);
    assert_eq!(idle, Presentation::Unchanged);

    input.handle_left_down(Point::new(20.0, 20.0), now);
    input.handle_move(Point::new(40.0, 30.0), now);
    let drafting = renderer.render(input.canvas(), input.revision(), clear, &input.transient(now), SIZE);
    let Presentation::Region(region) = drafting else {
        panic!("expected partial repaint, got {drafting:?}");
    };
    assert!(region.width < SIZE.0 as i32 && region.height < SIZE.1 as i32);
    assert_eq!(renderer.committed_rebuild_count(), 1);

    input.handle_left_up(Point::new(40.0, 30.0), now);
    let committed = renderer.render(input.canvas(), input.revision(), clear, &input.transient(now), SIZE);
    assert_ne!(committed, Presentation::Unchanged);
    assert_eq!(renderer.committed_rebuild_count(), 2);
}
