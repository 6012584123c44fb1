use crate::draw::composite::{annotation_from_canvas, RgbaBuffer};
use crate::draw::model::CanvasModel;
use crate::draw::render::BOARD_COLOR;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub const PICTURES_SUBDIR: &str = "TutorDraw";
pub const DRAW_EXPORT_SUBDIR: &str = "draw_exports";
pub const EXPORT_PREFIX: &str = "tutordraw";

pub fn exe_relative_output_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(DRAW_EXPORT_SUBDIR))
}

/// `Pictures/TutorDraw` when the platform has a pictures folder, otherwise
/// `draw_exports` next to the executable.
pub fn resolve_output_folder() -> Result<PathBuf> {
    if let Some(pictures) = dirs_next::picture_dir() {
        return Ok(pictures.join(PICTURES_SUBDIR));
    }
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    exe_relative_output_folder_from_path(&exe_path)
}

pub fn ensure_output_folder() -> Result<PathBuf> {
    let output = resolve_output_folder()?;
    fs::create_dir_all(&output)
        .with_context(|| format!("create draw output folder {}", output.display()))?;
    Ok(output)
}

pub fn timestamped_stem(now: chrono::DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn build_filename(stem: &str) -> String {
    format!("{EXPORT_PREFIX}_{stem}.png")
}

pub fn write_png(path: &Path, buffer: &RgbaBuffer) -> Result<()> {
    let image = image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.pixels.clone())
        .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", buffer.width, buffer.height))?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png {}", path.display()))
}

/// Renders the committed shapes into `output_dir`. The background is the
/// board color when the board is on and fully transparent otherwise.
pub fn export_canvas(
    canvas: &CanvasModel,
    size: (u32, u32),
    board_enabled: bool,
    output_dir: &Path,
    now: chrono::DateTime<Local>,
) -> Result<PathBuf> {
    if size.0 == 0 || size.1 == 0 {
        return Err(anyhow!("cannot export an empty {}x{} canvas", size.0, size.1));
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create draw output folder {}", output_dir.display()))?;
    let background = board_enabled.then_some(BOARD_COLOR);
    let buffer = annotation_from_canvas(canvas, size.0, size.1, background);
    let path = output_dir.join(build_filename(&timestamped_stem(now)));
    write_png(&path, &buffer)?;
    tracing::info!(path = %path.display(), shapes = canvas.len(), "annotations exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{Color, Geometry, Point, Shape};
    use chrono::TimeZone;

    fn fixed_time() -> chrono::DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("date time")
    }

    fn sample_canvas() -> CanvasModel {
        CanvasModel {
            shapes: vec![Shape::new(
                Geometry::Rect {
                    start: Point::new(4.0, 4.0),
                    end: Point::new(28.0, 20.0),
                },
                Color::rgb(0, 0, 255),
                5,
            )],
        }
    }

    #[test]
    fn exe_relative_output_folder_is_sibling_of_exe() {
        let exe = Path::new("/tmp/myapp/bin/tutor_draw");
        let output = exe_relative_output_folder_from_path(exe).expect("output path");
        assert_eq!(output, Path::new("/tmp/myapp/bin").join(DRAW_EXPORT_SUBDIR));
    }

    #[test]
    fn filename_uses_prefix_and_timestamp() {
        assert_eq!(
            build_filename(&timestamped_stem(fixed_time())),
            "tutordraw_20260102_030405.png"
        );
    }

    #[test]
    fn export_writes_transparent_png() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = export_canvas(&sample_canvas(), (32, 24), false, dir.path(), fixed_time())
            .expect("export");
        assert!(path.ends_with("tutordraw_20260102_030405.png"));

        let image = image::open(&path).expect("open png").to_rgba8();
        assert_eq!(image.dimensions(), (32, 24));
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(4, 12).0[3], 255);
    }

    #[test]
    fn board_export_fills_background() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = export_canvas(&CanvasModel::default(), (8, 8), true, dir.path(), fixed_time())
            .expect("export");
        let image = image::open(&path).expect("open png").to_rgba8();
        assert_eq!(image.get_pixel(7, 7).0, BOARD_COLOR.to_rgba_array());
    }

    #[test]
    fn zero_sized_export_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(export_canvas(&sample_canvas(), (0, 10), false, dir.path(), fixed_time()).is_err());
    }
}
