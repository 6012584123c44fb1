use crate::draw::model::Color;
use eframe::egui;

pub const DEFAULT_THEME: &str = "Light";

/// Named color set shared by the toolbar and dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub name: &'static str,
    pub bg: Color,
    pub text: Color,
    pub accent: Color,
    pub secondary: Color,
    pub border: Color,
    pub highlight: Color,
    pub button_hover: Color,
    pub toolbar_bg: Color,
    pub canvas_bg: Color,
    pub icon: Color,
}

pub const THEMES: [ThemePalette; 7] = [
    ThemePalette {
        name: "Light",
        bg: Color::rgb(255, 255, 255),
        text: Color::rgb(51, 51, 51),
        accent: Color::rgb(105, 101, 219),
        secondary: Color::rgb(240, 240, 240),
        border: Color::rgb(224, 224, 224),
        highlight: Color::rgb(227, 242, 253),
        button_hover: Color::rgb(209, 208, 255),
        toolbar_bg: Color::rgb(255, 255, 255),
        canvas_bg: Color::rgb(255, 255, 255),
        icon: Color::rgb(51, 51, 51),
    },
    ThemePalette {
        name: "Dark",
        bg: Color::rgb(1, 0, 44),
        text: Color::rgb(240, 240, 240),
        accent: Color::rgb(138, 180, 248),
        secondary: Color::rgb(64, 64, 64),
        border: Color::rgb(85, 85, 85),
        highlight: Color::rgb(58, 58, 58),
        button_hover: Color::rgb(62, 62, 62),
        toolbar_bg: Color::rgb(1, 0, 44),
        canvas_bg: Color::rgb(1, 0, 44),
        icon: Color::rgb(255, 255, 255),
    },
    ThemePalette {
        name: "Deep Blue",
        bg: Color::rgb(3, 0, 91),
        text: Color::rgb(227, 242, 253),
        accent: Color::rgb(66, 165, 245),
        secondary: Color::rgb(21, 101, 192),
        border: Color::rgb(25, 118, 210),
        highlight: Color::rgb(30, 136, 229),
        button_hover: Color::rgb(25, 118, 210),
        toolbar_bg: Color::rgb(3, 0, 91),
        canvas_bg: Color::rgb(3, 0, 91),
        icon: Color::rgb(255, 255, 255),
    },
    ThemePalette {
        name: "Jellyfish",
        bg: Color::rgb(10, 15, 44),
        text: Color::rgb(224, 224, 255),
        accent: Color::rgb(0, 188, 212),
        secondary: Color::rgb(224, 64, 251),
        border: Color::rgb(255, 64, 129),
        highlight: Color::rgb(26, 35, 126),
        button_hover: Color::rgb(13, 71, 161),
        toolbar_bg: Color::rgb(12, 17, 37),
        canvas_bg: Color::rgb(8, 12, 32),
        icon: Color::rgb(255, 255, 255),
    },
    ThemePalette {
        name: "Charcoal",
        bg: Color::rgb(42, 42, 42),
        text: Color::rgb(224, 224, 224),
        accent: Color::rgb(160, 160, 160),
        secondary: Color::rgb(58, 58, 58),
        border: Color::rgb(74, 74, 74),
        highlight: Color::rgb(53, 53, 53),
        button_hover: Color::rgb(63, 63, 63),
        toolbar_bg: Color::rgb(48, 48, 48),
        canvas_bg: Color::rgb(37, 37, 37),
        icon: Color::rgb(255, 255, 255),
    },
    ThemePalette {
        name: "Colorful",
        bg: Color::rgb(245, 245, 245),
        text: Color::rgb(33, 33, 33),
        accent: Color::rgb(233, 30, 99),
        secondary: Color::rgb(255, 205, 210),
        border: Color::rgb(233, 30, 99),
        highlight: Color::rgb(255, 236, 179),
        button_hover: Color::rgb(224, 223, 255),
        toolbar_bg: Color::rgb(255, 255, 255),
        canvas_bg: Color::rgb(250, 250, 250),
        icon: Color::rgb(33, 33, 33),
    },
    ThemePalette {
        name: "Deep Green",
        bg: Color::rgb(27, 46, 0),
        text: Color::rgb(255, 255, 255),
        accent: Color::rgb(76, 175, 80),
        secondary: Color::rgb(46, 125, 50),
        border: Color::rgb(56, 142, 60),
        highlight: Color::rgb(27, 94, 32),
        button_hover: Color::rgb(46, 125, 50),
        toolbar_bg: Color::rgb(27, 46, 0),
        canvas_bg: Color::rgb(27, 46, 0),
        icon: Color::rgb(255, 255, 255),
    },
];

impl ThemePalette {
    pub fn is_dark(&self) -> bool {
        let luma = 0.299 * self.bg.r as f32 + 0.587 * self.bg.g as f32 + 0.114 * self.bg.b as f32;
        luma < 128.0
    }
}

pub fn theme_names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|theme| theme.name)
}

/// Case-insensitive lookup.
pub fn find_theme(name: &str) -> Option<&'static ThemePalette> {
    let name = name.trim();
    THEMES
        .iter()
        .find(|theme| theme.name.eq_ignore_ascii_case(name))
}

/// Unknown names resolve to the light theme.
pub fn theme_or_default(name: &str) -> &'static ThemePalette {
    find_theme(name).unwrap_or(&THEMES[0])
}

pub fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn theme_to_visuals(theme: &ThemePalette, defaults: &egui::Visuals) -> egui::Visuals {
    let mut visuals = if theme.is_dark() == defaults.dark_mode {
        defaults.clone()
    } else if theme.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    visuals.dark_mode = theme.is_dark();
    visuals.window_fill = color32(theme.bg);
    visuals.panel_fill = color32(theme.toolbar_bg);
    visuals.extreme_bg_color = color32(theme.secondary);
    visuals.faint_bg_color = color32(theme.secondary);
    visuals.override_text_color = Some(color32(theme.text));
    visuals.hyperlink_color = color32(theme.accent);
    visuals.window_stroke.color = color32(theme.border);

    visuals.widgets.noninteractive.bg_fill = color32(theme.toolbar_bg);
    visuals.widgets.noninteractive.bg_stroke.color = color32(theme.border);
    visuals.widgets.noninteractive.fg_stroke.color = color32(theme.text);
    visuals.widgets.inactive.bg_fill = color32(theme.secondary);
    visuals.widgets.inactive.weak_bg_fill = color32(theme.secondary);
    visuals.widgets.inactive.bg_stroke.color = color32(theme.border);
    visuals.widgets.inactive.fg_stroke.color = color32(theme.icon);
    visuals.widgets.hovered.bg_fill = color32(theme.button_hover);
    visuals.widgets.hovered.weak_bg_fill = color32(theme.button_hover);
    visuals.widgets.hovered.bg_stroke.color = color32(theme.accent);
    visuals.widgets.hovered.fg_stroke.color = color32(theme.icon);
    visuals.widgets.active.bg_fill = color32(theme.accent);
    visuals.widgets.active.weak_bg_fill = color32(theme.accent);
    visuals.widgets.active.bg_stroke.color = color32(theme.accent);

    visuals.selection.bg_fill = color32(theme.highlight);
    visuals.selection.stroke.color = color32(theme.accent);

    visuals
}
