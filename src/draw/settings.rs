use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::draw::model::{Color, Tool};
use crate::draw::theme;
use crate::hotkey::{parse_hotkey, Hotkey};

pub const MIN_THICKNESS: u32 = 1;
pub const MAX_THICKNESS: u32 = 20;
pub const MIN_LASER_THICKNESS: u32 = 1;
pub const MAX_LASER_THICKNESS: u32 = 64;
pub const MIN_LASER_DURATION: f32 = 0.1;
pub const MAX_LASER_DURATION: f32 = 10.0;
pub const MIN_LASER_SMOOTHNESS: u32 = 1;
pub const MAX_LASER_SMOOTHNESS: u32 = 20;
pub const CLEAR_ACTION: &str = "clear";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Colors are written as `{r,g,b,a}` and read from either that or a hex string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ColorWire {
    Rgba(Color),
    Hex(String),
}

impl ColorWire {
    fn resolve(self, fallback: Color) -> Color {
        match self {
            ColorWire::Rgba(color) => color,
            ColorWire::Hex(hex) => Color::from_hex(&hex).unwrap_or_else(|| {
                tracing::warn!(value = %hex, "ignoring malformed color in settings");
                fallback
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrawSettings {
    pub shortcuts: BTreeMap<String, String>,
    pub current_color: Color,
    pub default_thickness: u32,
    pub enable_fill: bool,
    pub laser_color: Color,
    pub laser_thickness: u32,
    /// Seconds a laser sample stays visible.
    pub laser_duration: f32,
    pub laser_smoothness: u32,
    pub laser_glow: bool,
    pub toolbar_orientation: ToolbarOrientation,
    pub current_theme: String,
    pub board_enabled: bool,
    pub toolbar_position: Option<[f32; 2]>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct DrawSettingsDe {
    #[serde(default = "default_shortcuts")]
    shortcuts: BTreeMap<String, String>,
    #[serde(default)]
    current_color: Option<ColorWire>,
    #[serde(default = "default_thickness")]
    default_thickness: u32,
    #[serde(default)]
    enable_fill: bool,
    #[serde(default)]
    laser_color: Option<ColorWire>,
    #[serde(default = "default_laser_thickness")]
    laser_thickness: u32,
    #[serde(default = "default_laser_duration")]
    laser_duration: f32,
    #[serde(default = "default_laser_smoothness")]
    laser_smoothness: u32,
    #[serde(default = "default_laser_glow")]
    laser_glow: bool,
    #[serde(default)]
    toolbar_orientation: ToolbarOrientation,
    #[serde(default = "default_theme")]
    current_theme: String,
    #[serde(default)]
    board_enabled: bool,
    #[serde(default)]
    toolbar_position: Option<[f32; 2]>,
    #[serde(default)]
    debug_logging: bool,
}

impl<'de> Deserialize<'de> for DrawSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let decoded = DrawSettingsDe::deserialize(deserializer)?;
        Ok(Self {
            shortcuts: decoded.shortcuts,
            current_color: decoded
                .current_color
                .map(|wire| wire.resolve(default_current_color()))
                .unwrap_or_else(default_current_color),
            default_thickness: decoded.default_thickness,
            enable_fill: decoded.enable_fill,
            laser_color: decoded
                .laser_color
                .map(|wire| wire.resolve(default_laser_color()))
                .unwrap_or_else(default_laser_color),
            laser_thickness: decoded.laser_thickness,
            laser_duration: decoded.laser_duration,
            laser_smoothness: decoded.laser_smoothness,
            laser_glow: decoded.laser_glow,
            toolbar_orientation: decoded.toolbar_orientation,
            current_theme: decoded.current_theme,
            board_enabled: decoded.board_enabled,
            toolbar_position: decoded.toolbar_position,
            debug_logging: decoded.debug_logging,
        })
    }
}

/// Single-key defaults: one per tool plus `clear`.
pub fn default_shortcuts() -> BTreeMap<String, String> {
    [
        ("mouse", "M"),
        ("select", "V"),
        ("pencil", "P"),
        ("highlighter", "H"),
        ("line", "I"),
        ("arrow", "A"),
        ("rect", "R"),
        ("diamond", "D"),
        ("ellipse", "E"),
        ("circle", "O"),
        ("text", "T"),
        ("laser", "L"),
        ("zoom", "Z"),
        ("eraser", "X"),
        (CLEAR_ACTION, "C"),
    ]
    .into_iter()
    .map(|(action, key)| (action.to_owned(), key.to_owned()))
    .collect()
}

fn default_current_color() -> Color {
    Color::rgb(255, 0, 0)
}

fn default_thickness() -> u32 {
    4
}

fn default_laser_color() -> Color {
    Color::rgb(255, 30, 30)
}

fn default_laser_thickness() -> u32 {
    14
}

fn default_laser_duration() -> f32 {
    1.5
}

fn default_laser_smoothness() -> u32 {
    5
}

fn default_laser_glow() -> bool {
    true
}

fn default_theme() -> String {
    theme::DEFAULT_THEME.to_owned()
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            shortcuts: default_shortcuts(),
            current_color: default_current_color(),
            default_thickness: default_thickness(),
            enable_fill: false,
            laser_color: default_laser_color(),
            laser_thickness: default_laser_thickness(),
            laser_duration: default_laser_duration(),
            laser_smoothness: default_laser_smoothness(),
            laser_glow: default_laser_glow(),
            toolbar_orientation: ToolbarOrientation::default(),
            current_theme: default_theme(),
            board_enabled: false,
            toolbar_position: None,
            debug_logging: false,
        }
    }
}

pub fn is_known_action(action: &str) -> bool {
    action == CLEAR_ACTION || Tool::from_name(action).is_some()
}

/// Shortcut strings must name exactly one key without Ctrl/Alt; Shift is allowed.
pub fn parse_shortcut(value: &str) -> Result<Hotkey, String> {
    let hotkey = parse_hotkey(value)
        .ok_or_else(|| format!("Invalid shortcut '{value}' (example: P or Shift+P)."))?;
    if hotkey.ctrl || hotkey.alt {
        return Err(format!(
            "Shortcut '{value}' cannot use Ctrl or Alt; those are reserved for editing keys."
        ));
    }
    Ok(hotkey)
}

impl DrawSettings {
    /// Clamps numeric ranges, repairs shortcuts and theme. Returns `true`
    /// when anything was changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();

        self.default_thickness = self.default_thickness.clamp(MIN_THICKNESS, MAX_THICKNESS);
        self.laser_thickness = self
            .laser_thickness
            .clamp(MIN_LASER_THICKNESS, MAX_LASER_THICKNESS);
        self.laser_duration = if self.laser_duration.is_finite() {
            self.laser_duration
                .clamp(MIN_LASER_DURATION, MAX_LASER_DURATION)
        } else {
            default_laser_duration()
        };
        self.laser_smoothness = self
            .laser_smoothness
            .clamp(MIN_LASER_SMOOTHNESS, MAX_LASER_SMOOTHNESS);
        self.sanitize_shortcuts();
        self.current_theme = theme::theme_or_default(&self.current_theme).name.to_owned();
        if let Some([x, y]) = self.toolbar_position {
            if !x.is_finite() || !y.is_finite() {
                self.toolbar_position = None;
            }
        }

        let changed = before != *self;
        if changed {
            tracing::debug!("draw settings sanitized");
        }
        changed
    }

    fn sanitize_shortcuts(&mut self) {
        let defaults = default_shortcuts();
        self.shortcuts.retain(|action, _| {
            let known = is_known_action(action);
            if !known {
                tracing::warn!(action = %action, "dropping shortcut for unknown action");
            }
            known
        });
        for (action, default) in defaults {
            let entry = self.shortcuts.entry(action).or_insert_with(|| default.clone());
            if parse_shortcut(entry).is_err() {
                tracing::warn!(value = %entry, fallback = %default, "invalid shortcut replaced");
                *entry = default;
            }
        }
    }

    pub fn laser_style(&self) -> crate::draw::laser::LaserStyle {
        crate::draw::laser::LaserStyle {
            color: self.laser_color,
            thickness: self.laser_thickness as f32,
            duration: std::time::Duration::from_secs_f32(self.laser_duration.max(MIN_LASER_DURATION)),
            smoothness: self.laser_smoothness,
            glow: self.laser_glow,
        }
    }
}
