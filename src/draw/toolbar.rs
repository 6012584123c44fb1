use eframe::egui;

use crate::draw::keyboard::ShortcutMap;
use crate::draw::model::{Color, Tool};
use crate::draw::settings::{ToolbarOrientation, MAX_THICKNESS, MIN_THICKNESS};
use crate::draw::theme::{self, ThemePalette};

pub const BUTTON_SIZE: f32 = 30.0;
pub const ITEM_SPACING: f32 = 4.0;
pub const HEADER_SIZE: f32 = 16.0;
pub const PANEL_MARGIN: f32 = 6.0;
pub const HIDDEN_HANDLE_SIZE: f32 = 22.0;

/// Tool buttons in toolbar order.
pub const TOOLBAR_TOOLS: [Tool; 14] = [
    Tool::Mouse,
    Tool::Select,
    Tool::Pencil,
    Tool::Highlighter,
    Tool::Line,
    Tool::Rect,
    Tool::Ellipse,
    Tool::Circle,
    Tool::Diamond,
    Tool::Arrow,
    Tool::Laser,
    Tool::Zoom,
    Tool::Eraser,
    Tool::Text,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarCommand {
    SelectTool(Tool),
    SetColor(Color),
    SetThickness(u32),
    IncreaseThickness,
    DecreaseThickness,
    ToggleFill,
    ToggleBoard,
    Undo,
    Redo,
    /// Asks for confirmation; `ConfirmClear` performs it.
    Clear,
    ConfirmClear,
    CancelClear,
    Save,
    OpenSettings,
    CloseSettings,
    Hide,
    Peek,
    Restore,
    SetOrientation(ToolbarOrientation),
    SetTheme(&'static str),
    SetPosition { x: f32, y: f32 },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolbarVisibility {
    #[default]
    Shown,
    Hidden,
    /// Hidden toolbar temporarily expanded while the pointer hovers its handle.
    Peeking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolbarState {
    pub visibility: ToolbarVisibility,
    pub orientation: ToolbarOrientation,
    pub position: Option<(f32, f32)>,
    pub clear_prompt: bool,
    pub settings_open: bool,
}

impl ToolbarState {
    pub fn new(orientation: ToolbarOrientation, position: Option<[f32; 2]>) -> Self {
        Self {
            visibility: ToolbarVisibility::Shown,
            orientation,
            position: position.map(|[x, y]| (x, y)),
            clear_prompt: false,
            settings_open: false,
        }
    }

    pub fn apply_command(&mut self, command: ToolbarCommand) {
        reduce_toolbar_state(self, command);
    }

    pub fn shows_panel(&self) -> bool {
        !matches!(self.visibility, ToolbarVisibility::Hidden)
    }
}

pub fn reduce_toolbar_state(state: &mut ToolbarState, command: ToolbarCommand) {
    match command {
        ToolbarCommand::Hide => state.visibility = ToolbarVisibility::Hidden,
        ToolbarCommand::Peek => {
            if state.visibility == ToolbarVisibility::Hidden {
                state.visibility = ToolbarVisibility::Peeking;
            }
        }
        ToolbarCommand::Restore => state.visibility = ToolbarVisibility::Shown,
        ToolbarCommand::SetOrientation(orientation) => state.orientation = orientation,
        ToolbarCommand::SetPosition { x, y } => {
            if x.is_finite() && y.is_finite() {
                state.position = Some((x.max(0.0), y.max(0.0)));
            }
        }
        ToolbarCommand::Clear => state.clear_prompt = true,
        ToolbarCommand::ConfirmClear | ToolbarCommand::CancelClear => state.clear_prompt = false,
        ToolbarCommand::OpenSettings => state.settings_open = true,
        ToolbarCommand::CloseSettings => state.settings_open = false,
        _ => {}
    }
}

pub fn step_thickness(current: u32, command: ToolbarCommand) -> u32 {
    match command {
        ToolbarCommand::IncreaseThickness => current.saturating_add(1),
        ToolbarCommand::DecreaseThickness => current.saturating_sub(1),
        ToolbarCommand::SetThickness(value) => value,
        _ => current,
    }
    .clamp(MIN_THICKNESS, MAX_THICKNESS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarItem {
    Tool(Tool),
    Fill,
    Board,
    ColorPicker,
    ThicknessDown,
    ThicknessLabel,
    ThicknessUp,
    Undo,
    Redo,
    More,
}

pub fn toolbar_items() -> Vec<ToolbarItem> {
    let mut items: Vec<ToolbarItem> = TOOLBAR_TOOLS.into_iter().map(ToolbarItem::Tool).collect();
    items.extend([
        ToolbarItem::Fill,
        ToolbarItem::Board,
        ToolbarItem::ColorPicker,
        ToolbarItem::ThicknessDown,
        ToolbarItem::ThicknessLabel,
        ToolbarItem::ThicknessUp,
        ToolbarItem::Undo,
        ToolbarItem::Redo,
        ToolbarItem::More,
    ]);
    items
}

/// Window size needed for the toolbar in its current state.
pub fn panel_size(state: &ToolbarState) -> egui::Vec2 {
    if !state.shows_panel() {
        return egui::vec2(HIDDEN_HANDLE_SIZE, HIDDEN_HANDLE_SIZE);
    }
    let count = toolbar_items().len() as f32;
    let run = count * BUTTON_SIZE + (count - 1.0) * ITEM_SPACING + 2.0 * PANEL_MARGIN;
    let cross = BUTTON_SIZE + 2.0 * PANEL_MARGIN;
    match state.orientation {
        ToolbarOrientation::Horizontal => egui::vec2(run + HEADER_SIZE, cross),
        ToolbarOrientation::Vertical => egui::vec2(cross, run + HEADER_SIZE),
    }
}

pub fn default_position(screen: egui::Vec2, state: &ToolbarState) -> (f32, f32) {
    let size = panel_size(state);
    match state.orientation {
        ToolbarOrientation::Horizontal => (((screen.x - size.x) * 0.5).max(0.0), 12.0),
        ToolbarOrientation::Vertical => (12.0, ((screen.y - size.y) * 0.5).max(0.0)),
    }
}

/// Canvas state the toolbar reflects.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarView<'a> {
    pub tool: Tool,
    pub color: Color,
    pub thickness: u32,
    pub fill_enabled: bool,
    pub board_enabled: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub shortcuts: &'a ShortcutMap,
    pub theme: &'a ThemePalette,
}

pub fn map_item_to_command(item: ToolbarItem) -> Option<ToolbarCommand> {
    match item {
        ToolbarItem::Tool(tool) => Some(ToolbarCommand::SelectTool(tool)),
        ToolbarItem::Fill => Some(ToolbarCommand::ToggleFill),
        ToolbarItem::Board => Some(ToolbarCommand::ToggleBoard),
        ToolbarItem::ThicknessDown => Some(ToolbarCommand::DecreaseThickness),
        ToolbarItem::ThicknessUp => Some(ToolbarCommand::IncreaseThickness),
        ToolbarItem::Undo => Some(ToolbarCommand::Undo),
        ToolbarItem::Redo => Some(ToolbarCommand::Redo),
        ToolbarItem::ColorPicker | ToolbarItem::ThicknessLabel | ToolbarItem::More => None,
    }
}

fn tool_tooltip(tool: Tool, shortcuts: &ShortcutMap) -> String {
    match shortcuts.label_for(tool) {
        Some(key) => format!("{} ({key})", tool.label()),
        None => tool.label().to_owned(),
    }
}

fn item_button(
    ui: &mut egui::Ui,
    text: &str,
    active: bool,
    enabled: bool,
    palette: &ThemePalette,
) -> egui::Response {
    let fill = if active {
        theme::color32(palette.highlight)
    } else {
        egui::Color32::TRANSPARENT
    };
    let button = egui::Button::new(egui::RichText::new(text).size(16.0).color(theme::color32(palette.icon)))
        .fill(fill)
        .min_size(egui::vec2(BUTTON_SIZE, BUTTON_SIZE));
    ui.add_enabled(enabled, button)
}

fn render_item(
    ui: &mut egui::Ui,
    item: ToolbarItem,
    view: &ToolbarView<'_>,
    commands: &mut Vec<ToolbarCommand>,
) {
    let palette = view.theme;
    let response = match item {
        ToolbarItem::Tool(tool) => item_button(ui, tool.glyph(), view.tool == tool, true, palette)
            .on_hover_text(tool_tooltip(tool, view.shortcuts)),
        ToolbarItem::Fill => {
            item_button(ui, "◼", view.fill_enabled, true, palette).on_hover_text("Fill shapes")
        }
        ToolbarItem::Board => {
            item_button(ui, "▦", view.board_enabled, true, palette).on_hover_text("Toggle board")
        }
        ToolbarItem::ColorPicker => {
            let mut color = theme::color32(view.color);
            let response = ui.color_edit_button_srgba(&mut color);
            if response.changed() {
                commands.push(ToolbarCommand::SetColor(Color::rgba(
                    color.r(),
                    color.g(),
                    color.b(),
                    color.a(),
                )));
            }
            response.on_hover_text("Color");
            return;
        }
        ToolbarItem::ThicknessDown => {
            item_button(ui, "−", false, view.thickness > MIN_THICKNESS, palette)
                .on_hover_text("Thinner")
        }
        ToolbarItem::ThicknessLabel => {
            ui.add_sized(
                egui::vec2(BUTTON_SIZE, BUTTON_SIZE),
                egui::Label::new(view.thickness.to_string()),
            );
            return;
        }
        ToolbarItem::ThicknessUp => {
            item_button(ui, "+", false, view.thickness < MAX_THICKNESS, palette)
                .on_hover_text("Thicker")
        }
        ToolbarItem::Undo => {
            item_button(ui, "↶", false, view.can_undo, palette).on_hover_text("Undo (Ctrl+Z)")
        }
        ToolbarItem::Redo => {
            item_button(ui, "↷", false, view.can_redo, palette).on_hover_text("Redo (Ctrl+Y)")
        }
        ToolbarItem::More => {
            ui.menu_button("⋯", |ui| more_menu(ui, commands));
            return;
        }
    };
    if response.clicked() {
        commands.extend(map_item_to_command(item));
    }
}

fn menu_entry(
    ui: &mut egui::Ui,
    label: &str,
    command: ToolbarCommand,
    commands: &mut Vec<ToolbarCommand>,
) {
    if ui.button(label).clicked() {
        commands.push(command);
        ui.close_menu();
    }
}

fn more_menu(ui: &mut egui::Ui, commands: &mut Vec<ToolbarCommand>) {
    menu_entry(ui, "⚙ Settings", ToolbarCommand::OpenSettings, commands);
    menu_entry(ui, "💾 Save PNG", ToolbarCommand::Save, commands);
    menu_entry(ui, "🗑 Clear All", ToolbarCommand::Clear, commands);
    ui.menu_button("🎨 Theme", |ui| {
        for name in theme::theme_names() {
            menu_entry(ui, name, ToolbarCommand::SetTheme(name), commands);
        }
    });
    ui.separator();
    menu_entry(ui, "🙈 Hide Toolbar", ToolbarCommand::Hide, commands);
    ui.separator();
    menu_entry(ui, "❌ Exit", ToolbarCommand::Exit, commands);
}

/// Draws the toolbar contents into `ui` and returns the commands clicked
/// this frame. The header strip is returned separately so the caller can
/// start a window drag from it.
pub fn toolbar_ui(
    ui: &mut egui::Ui,
    state: &ToolbarState,
    view: &ToolbarView<'_>,
) -> (Vec<ToolbarCommand>, Option<egui::Response>) {
    let mut commands = Vec::new();

    if !state.shows_panel() {
        let handle = item_button(ui, "☰", false, true, view.theme).on_hover_text("Show toolbar");
        if handle.hovered() {
            commands.push(ToolbarCommand::Peek);
        }
        if handle.clicked() {
            commands.push(ToolbarCommand::Restore);
        }
        return (commands, None);
    }

    let header_size = match state.orientation {
        ToolbarOrientation::Horizontal => egui::vec2(HEADER_SIZE, BUTTON_SIZE),
        ToolbarOrientation::Vertical => egui::vec2(BUTTON_SIZE, HEADER_SIZE),
    };
    let items = toolbar_items();
    let mut header = None;
    let mut body = |ui: &mut egui::Ui| {
        ui.spacing_mut().item_spacing = egui::vec2(ITEM_SPACING, ITEM_SPACING);
        let (rect, response) = ui.allocate_exact_size(header_size, egui::Sense::click_and_drag());
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "⠿",
            egui::FontId::proportional(12.0),
            theme::color32(view.theme.icon),
        );
        header = Some(response.on_hover_text("Drag to move"));
        for item in &items {
            render_item(ui, *item, view, &mut commands);
        }
    };
    match state.orientation {
        ToolbarOrientation::Horizontal => {
            ui.horizontal(|ui| body(ui));
        }
        ToolbarOrientation::Vertical => {
            ui.vertical(|ui| body(ui));
        }
    }

    if state.visibility == ToolbarVisibility::Peeking && !ui.ui_contains_pointer() {
        commands.push(ToolbarCommand::Hide);
    }
    (commands, header)
}
