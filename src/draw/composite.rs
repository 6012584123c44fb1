use crate::draw::model::{CanvasModel, Color};
use crate::draw::render::{render_canvas_to_rgba, BackgroundClearMode, DirtyRect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&fill.to_rgba_array());
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == (width as usize) * (height as usize) * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 4) as usize;
        Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }
}

/// Committed annotations over `background`, or over nothing when `None`.
pub fn annotation_from_canvas(
    canvas: &CanvasModel,
    width: u32,
    height: u32,
    background: Option<Color>,
) -> RgbaBuffer {
    let clear = BackgroundClearMode::Solid(background.unwrap_or(Color::TRANSPARENT));
    RgbaBuffer {
        width,
        height,
        pixels: render_canvas_to_rgba(canvas, clear, (width, height)),
    }
}

/// Straight-alpha source-over.
pub fn blend_pixel(bottom: Color, top: Color) -> Color {
    let sa = top.a as f32 / 255.0;
    let da = bottom.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Color::TRANSPARENT;
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color::rgba(
        blend(top.r, bottom.r),
        blend(top.g, bottom.g),
        blend(top.b, bottom.b),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

pub fn blend_into(pixels: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 || color.a == 0 {
        return;
    }
    let idx = ((y as u32 * width + x as u32) * 4) as usize;
    let Some(dst) = pixels.get_mut(idx..idx + 4) else {
        return;
    };
    let blended = if color.a == 255 {
        color
    } else {
        blend_pixel(Color::rgba(dst[0], dst[1], dst[2], dst[3]), color)
    };
    dst.copy_from_slice(&blended.to_rgba_array());
}

/// Per-pixel coverage for one shape or trail over a bounded area.
///
/// Stamps combine with `max`, so overlapping pieces of the same stroke never
/// darken each other; the mask is then composited once in the stroke color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    area: DirtyRect,
    coverage: Vec<u8>,
}

impl AlphaMask {
    pub fn new(area: DirtyRect) -> Self {
        let len = (area.width.max(0) as usize) * (area.height.max(0) as usize);
        Self {
            area,
            coverage: vec![0; len],
        }
    }

    pub fn area(&self) -> DirtyRect {
        self.area
    }

    pub fn stamp(&mut self, x: i32, y: i32, coverage: u8) {
        let lx = x - self.area.x;
        let ly = y - self.area.y;
        if lx < 0 || ly < 0 || lx >= self.area.width || ly >= self.area.height {
            return;
        }
        let idx = (ly * self.area.width + lx) as usize;
        if let Some(slot) = self.coverage.get_mut(idx) {
            *slot = (*slot).max(coverage);
        }
    }

    pub fn stamp_f(&mut self, x: i32, y: i32, coverage: f32) {
        let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
        if value > 0 {
            self.stamp(x, y, value);
        }
    }

    pub fn coverage_at(&self, x: i32, y: i32) -> u8 {
        let lx = x - self.area.x;
        let ly = y - self.area.y;
        if lx < 0 || ly < 0 || lx >= self.area.width || ly >= self.area.height {
            return 0;
        }
        self.coverage[(ly * self.area.width + lx) as usize]
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|c| *c == 0)
    }

    pub fn composite_onto(&self, color: Color, pixels: &mut [u8], width: u32, height: u32) {
        if color.a == 0 {
            return;
        }
        for ly in 0..self.area.height {
            let row = (ly * self.area.width) as usize;
            for lx in 0..self.area.width {
                let coverage = self.coverage[row + lx as usize];
                if coverage == 0 {
                    continue;
                }
                let alpha = (color.a as u32 * coverage as u32 + 127) / 255;
                blend_into(
                    pixels,
                    width,
                    height,
                    self.area.x + lx,
                    self.area.y + ly,
                    color.with_alpha(alpha as u8),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{Geometry, Point, Shape};

    #[test]
    fn half_alpha_over_opaque_mixes_evenly() {
        let out = blend_pixel(Color::rgb(100, 100, 100), Color::rgba(200, 0, 0, 128));
        assert_eq!(out, Color::rgb(150, 50, 50));
    }

    #[test]
    fn transparent_over_transparent_stays_clear() {
        assert_eq!(
            blend_pixel(Color::TRANSPARENT, Color::TRANSPARENT),
            Color::TRANSPARENT
        );
    }

    #[test]
    fn mask_stamps_keep_the_maximum() {
        let mut mask = AlphaMask::new(DirtyRect {
            x: 10,
            y: 10,
            width: 4,
            height: 4,
        });
        mask.stamp(11, 11, 100);
        mask.stamp(11, 11, 60);
        mask.stamp(30, 30, 255);
        assert_eq!(mask.coverage_at(11, 11), 100);
        assert_eq!(mask.coverage_at(30, 30), 0);
    }

    #[test]
    fn overlapping_mask_stamps_composite_once() {
        let mut pixels = RgbaBuffer::new(2, 1, Color::WHITE).pixels;
        let mut mask = AlphaMask::new(DirtyRect {
            x: 0,
            y: 0,
            width: 2,
            height: 1,
        });
        mask.stamp(0, 0, 255);
        mask.stamp(0, 0, 255);
        mask.composite_onto(Color::rgba(0, 0, 0, 128), &mut pixels, 2, 1);
        assert_eq!(&pixels[0..4], &[127, 127, 127, 255]);
        assert_eq!(&pixels[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn export_without_background_is_transparent_outside_strokes() {
        let canvas = CanvasModel {
            shapes: vec![Shape::new(
                Geometry::Rect {
                    start: Point::new(2.0, 2.0),
                    end: Point::new(8.0, 8.0),
                },
                Color::rgb(10, 20, 30),
                2,
            )],
        };
        let out = annotation_from_canvas(&canvas, 12, 12, None);
        assert_eq!(out.pixel(11, 11), Color::TRANSPARENT);
        assert_eq!(out.pixel(2, 5), Color::rgb(10, 20, 30));

        let boarded = annotation_from_canvas(&canvas, 12, 12, Some(Color::WHITE));
        assert_eq!(boarded.pixel(11, 11), Color::WHITE);
    }
}
