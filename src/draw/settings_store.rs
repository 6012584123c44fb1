use crate::draw::settings::DrawSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "tutordraw_settings.json";
pub const APP_DIR_NAME: &str = "tutor_draw";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

/// `<config dir>/tutor_draw/tutordraw_settings.json`, or next to the
/// executable on systems without a config directory.
pub fn resolve_settings_path() -> Result<PathBuf> {
    if let Some(config) = dirs_next::config_dir() {
        return Ok(config.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME));
    }
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

pub fn load() -> Result<DrawSettings> {
    load_from_path(&resolve_settings_path()?)
}

pub fn save(settings: &DrawSettings) -> Result<PathBuf> {
    let path = resolve_settings_path()?;
    save_to_path(&path, settings)?;
    Ok(path)
}

pub fn load_from_path(path: &Path) -> Result<DrawSettings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(DrawSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read draw settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(DrawSettings::default());
    }

    let mut loaded: DrawSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize draw settings file {}", path.display()))?;
    loaded.sanitize();
    Ok(loaded)
}

pub fn save_to_path(path: &Path, settings: &DrawSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create draw settings parent folder {}", parent.display()))?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize draw settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write draw settings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Color;

    #[test]
    fn settings_path_is_resolved_next_to_executable() {
        let exe = Path::new("/tmp/myapp/bin/tutor_draw");
        let path = settings_path_from_exe_path(exe).expect("path");
        assert_eq!(path, Path::new("/tmp/myapp/bin").join(SETTINGS_FILE_NAME));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let loaded = load_from_path(&dir.path().join(SETTINGS_FILE_NAME)).expect("load");
        assert_eq!(loaded, DrawSettings::default());
    }

    #[test]
    fn empty_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "  \n").expect("write");
        assert_eq!(load_from_path(&path).expect("load"), DrawSettings::default());
    }

    #[test]
    fn malformed_file_reports_path_in_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").expect("write");
        let err = load_from_path(&path).expect_err("malformed settings");
        assert!(format!("{err:#}").contains(SETTINGS_FILE_NAME));
    }

    #[test]
    fn store_roundtrip_creates_parent_folders() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(APP_DIR_NAME).join(SETTINGS_FILE_NAME);

        let settings = DrawSettings {
            current_color: Color::rgb(1, 2, 3),
            laser_glow: false,
            toolbar_position: Some([40.0, 60.0]),
            ..DrawSettings::default()
        };

        save_to_path(&path, &settings).expect("save settings");
        let loaded = load_from_path(&path).expect("load settings");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn saved_file_is_sanitized() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let settings = DrawSettings {
            default_thickness: 500,
            ..DrawSettings::default()
        };
        save_to_path(&path, &settings).expect("save");
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(raw["default_thickness"], 20);
    }
}
