use tutor_draw::draw::model::Color;
use tutor_draw::draw::settings::{DrawSettings, ToolbarOrientation, MAX_THICKNESS};
use tutor_draw::draw::settings_store::{load_from_path, save_to_path};

#[test]
fn saved_settings_load_back_unchanged() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("tutordraw_settings.json");

    let mut settings = DrawSettings::default();
    settings.current_color = Color::rgb(12, 34, 56);
    settings.default_thickness = 9;
    settings.enable_fill = true;
    settings.laser_duration = 2.5;
    settings.toolbar_orientation = ToolbarOrientation::Vertical;
    settings.current_theme = "Deep Green".into();
    settings.board_enabled = true;
    settings.toolbar_position = Some([40.0, 80.0]);
    settings.shortcuts.insert("laser".into(), "K".into());

    save_to_path(&path, &settings).expect("save settings");
    let loaded = load_from_path(&path).expect("load settings");
    assert_eq!(loaded, settings);
}

#[test]
fn missing_or_blank_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tutordraw_settings.json");
    assert_eq!(load_from_path(&path).expect("missing"), DrawSettings::default());

    std::fs::write(&path, "   \n").expect("write blank");
    assert_eq!(load_from_path(&path).expect("blank"), DrawSettings::default());
}

#[test]
fn partial_file_is_filled_and_clamped() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tutordraw_settings.json");
    std::fs::write(
        &path,
        r##"{ "default_thickness": 500, "current_theme": "no such theme", "shortcuts": { "pencil": "Ctrl+P" } }"##,
    )
    .expect("write partial");

    let loaded = load_from_path(&path).expect("load partial");
    let defaults = DrawSettings::default();
    assert_eq!(loaded.default_thickness, MAX_THICKNESS);
    assert_eq!(loaded.current_theme, defaults.current_theme);
    assert_eq!(loaded.shortcuts, defaults.shortcuts);
    assert_eq!(loaded.laser_color, defaults.laser_color);
}

#[test]
fn malformed_json_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tutordraw_settings.json");
    std::fs::write(&path, "{ not json").expect("write malformed");
    let err = load_from_path(&path).expect_err("malformed settings must fail");
    assert!(format!("{err:#}").contains("deserialize draw settings"));
}
