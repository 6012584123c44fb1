use crate::draw::model::Point;
use ab_glyph::{point, Font, FontArc, ScaleFont};
use eframe::egui;
use once_cell::sync::Lazy;

static FONT: Lazy<Option<FontArc>> = Lazy::new(load_default_font);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub ascent: f32,
    pub height: f32,
}

fn load_default_font() -> Option<FontArc> {
    let definitions = egui::FontDefinitions::default();
    let family = definitions.families.get(&egui::FontFamily::Proportional)?;
    let name = family.first()?;
    let data = definitions.font_data.get(name)?.clone();
    let font = match data.font {
        std::borrow::Cow::Borrowed(bytes) => {
            ab_glyph::FontRef::try_from_slice_and_index(bytes, data.index)
                .map(FontArc::from)
                .ok()
        }
        std::borrow::Cow::Owned(bytes) => {
            ab_glyph::FontVec::try_from_vec_and_index(bytes, data.index)
                .map(FontArc::from)
                .ok()
        }
    };
    if font.is_none() {
        tracing::warn!(font = %name, "default font could not be parsed; text uses estimated metrics");
    }
    font
}

fn line_width<F: Font, S: ScaleFont<F>>(scaled: &S, line: &str) -> f32 {
    let mut width = 0.0;
    let mut previous = None;
    for ch in line.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Layout box of `text` at pixel `size`, relative to the baseline-left anchor.
pub fn measure(text: &str, size: f32) -> TextMetrics {
    let size = size.max(1.0);
    let line_count = text.split('\n').count().max(1) as f32;
    let Some(font) = FONT.as_ref() else {
        let longest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
        return TextMetrics {
            width: longest as f32 * size * 0.6,
            ascent: size * 0.8,
            height: size * 1.2 * line_count,
        };
    };
    let scaled = font.as_scaled(size);
    let width = text
        .split('\n')
        .map(|line| line_width(&scaled, line))
        .fold(0.0_f32, f32::max);
    let line_height = scaled.height() + scaled.line_gap();
    TextMetrics {
        width,
        ascent: scaled.ascent(),
        height: scaled.height() + line_height * (line_count - 1.0),
    }
}

/// Rasterizes `text` with its first baseline at `anchor`, reporting each
/// covered pixel with a coverage in `0.0..=1.0`.
pub fn rasterize(text: &str, size: f32, anchor: Point, mut plot: impl FnMut(i32, i32, f32)) {
    let Some(font) = FONT.as_ref() else {
        return;
    };
    let scaled = font.as_scaled(size.max(1.0));
    let line_height = scaled.height() + scaled.line_gap();
    for (row, line) in text.split('\n').enumerate() {
        let mut caret = point(anchor.x, anchor.y + row as f32 * line_height);
        let mut previous = None;
        for ch in line.chars() {
            let mut glyph = scaled.scaled_glyph(ch);
            if let Some(prev) = previous {
                caret.x += scaled.kern(prev, glyph.id);
            }
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);
            previous = Some(glyph.id);
            if let Some(outlined) = scaled.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    plot(
                        x as i32 + bounds.min.x as i32,
                        y as i32 + bounds.min.y as i32,
                        coverage,
                    );
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wider_text_measures_wider() {
        let short = measure("Hi", 28.0);
        let long = measure("Hello there", 28.0);
        assert!(long.width > short.width);
        assert!(short.ascent > 0.0);
        assert!(short.height >= short.ascent);
    }

    #[test]
    fn extra_lines_add_height() {
        let one = measure("line", 20.0);
        let two = measure("line\nline", 20.0);
        assert!(two.height > one.height);
        assert!((two.width - one.width).abs() < 0.01);
    }

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure("", 20.0).width, 0.0);
    }

    #[test]
    fn rasterized_pixels_sit_around_the_baseline() {
        let anchor = Point::new(10.0, 40.0);
        let mut min_y = i32::MAX;
        let mut max_y = i32::MIN;
        let mut count = 0;
        rasterize("H", 28.0, anchor, |_, y, coverage| {
            if coverage > 0.0 {
                min_y = min_y.min(y);
                max_y = max_y.max(y);
                count += 1;
            }
        });
        if FONT.is_some() {
            assert!(count > 0);
            assert!(min_y < 40);
            assert!(max_y <= 41);
        }
    }
}
