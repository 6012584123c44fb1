use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Instant;
use tutor_draw::draw::input::DrawInputState;
use tutor_draw::draw::model::{CanvasModel, Color, Geometry, Point, Shape, Tool};
use tutor_draw::draw::render::{
    render_canvas_to_rgba, BackgroundClearMode, LayeredRenderer, TransientLayer,
};

const SIZE: (u32, u32) = (1920, 1080);

fn build_canvas(count: usize) -> CanvasModel {
    let shapes = (0..count)
        .map(|i| {
            let x = (i % 40) as f32 * 45.0;
            let y = (i / 40) as f32 * 40.0;
            let geometry = match i % 4 {
                0 => Geometry::Rect {
                    start: Point::new(x, y),
                    end: Point::new(x + 35.0, y + 30.0),
                },
                1 => Geometry::Ellipse {
                    start: Point::new(x, y),
                    end: Point::new(x + 35.0, y + 30.0),
                },
                2 => Geometry::Arrow {
                    start: Point::new(x, y),
                    end: Point::new(x + 35.0, y + 30.0),
                },
                _ => Geometry::Freehand {
                    points: (0..24)
                        .map(|step| Point::new(x + step as f32 * 1.5, y + (step % 5) as f32 * 4.0))
                        .collect(),
                },
            };
            Shape::new(geometry, Color::rgb(220, 30, 30), 3)
        })
        .collect();
    CanvasModel { shapes }
}

fn bench_full_render(c: &mut Criterion) {
    let canvas = build_canvas(500);
    c.bench_function("render_500_shapes_full", |b| {
        b.iter(|| render_canvas_to_rgba(black_box(&canvas), BackgroundClearMode::Transparent, SIZE))
    });
}

fn bench_draft_frames(c: &mut Criterion) {
    let mut input = DrawInputState::new(Tool::Pencil, Color::rgb(0, 90, 200), 4);
    for shape in build_canvas(500).shapes {
        input.set_tool(shape.tool());
        let bounds = shape.bounding_rect();
        let now = Instant::now();
        input.handle_left_down(bounds.top_left(), now);
        input.handle_left_up(bounds.bottom_right(), now);
    }
    input.set_tool(Tool::Pencil);
    let now = Instant::now();
    input.handle_left_down(Point::new(400.0, 400.0), now);

    let mut renderer = LayeredRenderer::default();
    let clear = BackgroundClearMode::Transparent;
    renderer.render(input.canvas(), input.revision(), clear, &TransientLayer::default(), SIZE);

    let mut step = 0.0f32;
    c.bench_function("render_draft_stroke_partial", |b| {
        b.iter(|| {
            step += 1.0;
            input.handle_move(Point::new(400.0 + step % 300.0, 400.0 + (step * 0.5) % 200.0), now);
            black_box(renderer.render(
                input.canvas(),
                input.revision(),
                clear,
                &input.transient(now),
                SIZE,
            ))
        })
    });
}

criterion_group!(benches, bench_full_render, bench_draft_frames);
criterion_main!(benches);
