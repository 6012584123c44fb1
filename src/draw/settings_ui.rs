use crate::draw::model::Color;
use crate::draw::settings::{
    default_shortcuts, parse_shortcut, DrawSettings, ToolbarOrientation, MAX_LASER_DURATION,
    MAX_LASER_SMOOTHNESS, MAX_LASER_THICKNESS, MAX_THICKNESS, MIN_LASER_DURATION,
    MIN_LASER_SMOOTHNESS, MIN_LASER_THICKNESS, MIN_THICKNESS,
};
use crate::draw::theme;
use eframe::egui;

pub struct DrawSettingsFormResult {
    pub changed: bool,
    pub shortcut_errors: Vec<String>,
}

/// Shortcut problems that block saving: unparsable strings and keys bound
/// to more than one action.
pub fn validate_shortcuts(settings: &DrawSettings) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen: Vec<(crate::hotkey::Hotkey, &str)> = Vec::new();
    for (action, value) in &settings.shortcuts {
        match parse_shortcut(value) {
            Ok(hotkey) => {
                if let Some((_, other)) = seen.iter().find(|(existing, _)| *existing == hotkey) {
                    errors.push(format!("'{value}' is bound to both {other} and {action}."));
                } else {
                    seen.push((hotkey, action));
                }
            }
            Err(error) => errors.push(format!("{action}: {error}")),
        }
    }
    errors
}

fn edit_color(ui: &mut egui::Ui, label: &str, color: &mut Color) -> bool {
    let mut color_changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        let mut rgba = color.to_rgba_array();
        color_changed = ui.color_edit_button_srgba_unmultiplied(&mut rgba).changed();
        if color_changed {
            *color = Color::from_rgba_array(rgba);
        }
    });
    color_changed
}

pub fn render_draw_settings_form(
    ui: &mut egui::Ui,
    settings: &mut DrawSettings,
    id_source: &str,
) -> DrawSettingsFormResult {
    let mut changed = false;

    ui.heading("Drawing");
    changed |= edit_color(ui, "Pen color", &mut settings.current_color);
    ui.horizontal(|ui| {
        ui.label("Default thickness");
        changed |= ui
            .add(
                egui::DragValue::new(&mut settings.default_thickness)
                    .clamp_range(MIN_THICKNESS..=MAX_THICKNESS),
            )
            .changed();
    });
    changed |= ui
        .checkbox(&mut settings.enable_fill, "Fill closed shapes")
        .changed();
    changed |= ui
        .checkbox(&mut settings.board_enabled, "Start with the board on")
        .changed();

    ui.separator();
    ui.heading("Laser pointer");
    changed |= edit_color(ui, "Laser color", &mut settings.laser_color);
    ui.horizontal(|ui| {
        ui.label("Thickness");
        changed |= ui
            .add(
                egui::DragValue::new(&mut settings.laser_thickness)
                    .clamp_range(MIN_LASER_THICKNESS..=MAX_LASER_THICKNESS),
            )
            .changed();
    });
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.laser_duration,
                MIN_LASER_DURATION..=MAX_LASER_DURATION,
            )
            .text("Fade (seconds)"),
        )
        .changed();
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.laser_smoothness,
                MIN_LASER_SMOOTHNESS..=MAX_LASER_SMOOTHNESS,
            )
            .text("Smoothness"),
        )
        .changed();
    changed |= ui.checkbox(&mut settings.laser_glow, "Glow").changed();

    ui.separator();
    ui.heading("Appearance");
    ui.horizontal(|ui| {
        ui.label("Theme");
        egui::ComboBox::from_id_source(format!("{id_source}_theme"))
            .selected_text(settings.current_theme.clone())
            .show_ui(ui, |ui| {
                for name in theme::theme_names() {
                    if ui
                        .selectable_label(settings.current_theme == name, name)
                        .clicked()
                        && settings.current_theme != name
                    {
                        settings.current_theme = name.to_owned();
                        changed = true;
                    }
                }
            });
    });
    ui.horizontal(|ui| {
        ui.label("Toolbar");
        changed |= ui
            .radio_value(
                &mut settings.toolbar_orientation,
                ToolbarOrientation::Horizontal,
                "Horizontal",
            )
            .changed();
        changed |= ui
            .radio_value(
                &mut settings.toolbar_orientation,
                ToolbarOrientation::Vertical,
                "Vertical",
            )
            .changed();
    });
    changed |= ui
        .checkbox(&mut settings.debug_logging, "Debug logging (after restart)")
        .changed();

    ui.separator();
    ui.heading("Shortcuts");
    egui::Grid::new(format!("{id_source}_shortcuts"))
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for (action, value) in settings.shortcuts.iter_mut() {
                ui.label(action.as_str());
                changed |= ui
                    .add(egui::TextEdit::singleline(value).desired_width(80.0))
                    .changed();
                ui.end_row();
            }
        });
    if ui.button("Restore default shortcuts").clicked() {
        settings.shortcuts = default_shortcuts();
        changed = true;
    }

    let shortcut_errors = validate_shortcuts(settings);
    for error in &shortcut_errors {
        ui.colored_label(egui::Color32::RED, error);
    }

    DrawSettingsFormResult {
        changed,
        shortcut_errors,
    }
}

/// Modal-less settings window. Edits a copy and hands it back on Apply.
#[derive(Default)]
pub struct DrawSettingsDialog {
    pub open: bool,
    settings: DrawSettings,
    dirty: bool,
    shortcut_errors: Vec<String>,
}

impl DrawSettingsDialog {
    pub fn open(&mut self, current: &DrawSettings) {
        self.open = true;
        self.settings = current.clone();
        self.dirty = false;
        self.shortcut_errors.clear();
    }

    /// Returns the edited settings on the frame Apply or Reset is pressed.
    pub fn ui(&mut self, ctx: &egui::Context) -> Option<DrawSettings> {
        if !self.open {
            return None;
        }

        let mut applied = None;
        let mut open = self.open;
        egui::Window::new("TutorDraw Settings")
            .open(&mut open)
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let form = render_draw_settings_form(ui, &mut self.settings, "draw_dialog");
                    self.dirty |= form.changed;
                    self.shortcut_errors = form.shortcut_errors;
                });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(
                            self.dirty && self.shortcut_errors.is_empty(),
                            egui::Button::new("Apply"),
                        )
                        .clicked()
                    {
                        applied = Some(self.apply());
                    }
                    if ui.button("Reset").clicked() {
                        self.settings = DrawSettings::default();
                        applied = Some(self.apply());
                    }
                });
            });

        self.open = open;
        applied
    }

    fn apply(&mut self) -> DrawSettings {
        self.settings.sanitize();
        self.dirty = false;
        self.settings.clone()
    }

    #[cfg(test)]
    pub fn settings_for_test(&mut self) -> &mut DrawSettings {
        self.dirty = true;
        &mut self.settings
    }

    #[cfg(test)]
    pub fn apply_for_test(&mut self) -> DrawSettings {
        self.apply()
    }
}
