use crate::draw::confirm::{ClearConfirmation, ConfirmationResult};
use crate::draw::input::{DrawInputState, InputCommand};
use crate::draw::keyboard::{key_event_from_egui, ShortcutMap};
use crate::draw::model::{Point, Tool};
use crate::draw::render::{BackgroundClearMode, LayeredRenderer, Presentation};
use crate::draw::save;
use crate::draw::settings::DrawSettings;
use crate::draw::settings_store;
use crate::draw::settings_ui::DrawSettingsDialog;
use crate::draw::theme::{self, theme_or_default, theme_to_visuals};
use crate::draw::toolbar::{
    default_position, panel_size, step_thickness, toolbar_ui, ToolbarCommand, ToolbarState,
    ToolbarView,
};
use eframe::egui;
use std::time::{Duration, Instant};

pub const APP_TITLE: &str = "TutorDraw";
const TOOLBAR_VIEWPORT: &str = "tutor_draw_toolbar";
const CANVAS_TEXTURE: &str = "tutor_draw_canvas";
const ANIMATION_FRAME: Duration = Duration::from_millis(16);
const STATUS_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPointerEvent {
    LeftDown,
    Move,
    LeftUp,
}

/// Converts an egui position to canvas pixels. The canvas texture is sized
/// in physical pixels so shapes stay crisp on scaled displays.
pub fn canvas_point(pos: egui::Pos2, origin: egui::Pos2, pixels_per_point: f32) -> Point {
    Point::new(
        (pos.x - origin.x) * pixels_per_point,
        (pos.y - origin.y) * pixels_per_point,
    )
}

pub fn canvas_pixel_size(rect: egui::Rect, pixels_per_point: f32) -> (u32, u32) {
    (
        (rect.width() * pixels_per_point).round().max(0.0) as u32,
        (rect.height() * pixels_per_point).round().max(0.0) as u32,
    )
}

/// Routes a pointer sample into the drawing state unless a dialog owns input.
pub fn forward_pointer_event_to_draw_input(
    draw_input: &mut DrawInputState,
    blocked: bool,
    point: Point,
    event: OverlayPointerEvent,
    now: Instant,
) -> bool {
    if blocked || !draw_input.tool().captures_input() {
        return false;
    }
    match event {
        OverlayPointerEvent::LeftDown => draw_input.handle_left_down(point, now),
        OverlayPointerEvent::Move => draw_input.handle_move(point, now),
        OverlayPointerEvent::LeftUp => draw_input.handle_left_up(point, now),
    }
    true
}

/// Maps a point on the magnified window back onto the canvas under it.
pub fn unzoom_point(point: Point, source: crate::draw::model::Rect, size: (u32, u32)) -> Point {
    let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
    Point::new(
        source.min_x + point.x * source.width() / w,
        source.min_y + point.y * source.height() / h,
    )
}

/// The zoom source rectangle expressed in texture UV space.
pub fn zoom_uv(source: crate::draw::model::Rect, size: (u32, u32)) -> egui::Rect {
    let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
    egui::Rect::from_min_max(
        egui::pos2(source.min_x / w, source.min_y / h),
        egui::pos2(source.max_x / w, source.max_y / h),
    )
}

pub fn native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_maximized(true)
            .with_taskbar(false),
        ..Default::default()
    }
}

pub struct OverlayApp {
    settings: DrawSettings,
    input: DrawInputState,
    shortcuts: ShortcutMap,
    toolbar: ToolbarState,
    renderer: LayeredRenderer,
    texture: Option<egui::TextureHandle>,
    board_enabled: bool,
    clear_modal: ClearConfirmation,
    settings_dialog: DrawSettingsDialog,
    mouse_passthrough: Option<bool>,
    toolbar_embedded: bool,
    applied_theme: Option<&'static str>,
    pointer_down: bool,
    status: Option<(String, Instant)>,
}

impl OverlayApp {
    pub fn new(settings: DrawSettings) -> Self {
        let mut input = DrawInputState::new(
            Tool::Pencil,
            settings.current_color,
            settings.default_thickness,
        );
        input.set_fill_enabled(settings.enable_fill);
        input.set_laser_style(settings.laser_style());
        Self {
            shortcuts: ShortcutMap::from_settings(&settings.shortcuts),
            toolbar: ToolbarState::new(settings.toolbar_orientation, settings.toolbar_position),
            board_enabled: settings.board_enabled,
            settings,
            input,
            renderer: LayeredRenderer::default(),
            texture: None,
            clear_modal: ClearConfirmation::default(),
            settings_dialog: DrawSettingsDialog::default(),
            mouse_passthrough: None,
            toolbar_embedded: false,
            applied_theme: None,
            pointer_down: false,
            status: None,
        }
    }

    fn input_blocked(&self) -> bool {
        self.toolbar.clear_prompt
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn persist_settings(&mut self) {
        self.settings.current_color = self.input.color();
        self.settings.default_thickness = self.input.thickness();
        self.settings.enable_fill = self.input.fill_enabled();
        self.settings.board_enabled = self.board_enabled;
        self.settings.toolbar_orientation = self.toolbar.orientation;
        self.settings.toolbar_position = self.toolbar.position.map(|(x, y)| [x, y]);
        if let Err(err) = settings_store::save(&self.settings) {
            tracing::warn!(error = %format!("{err:#}"), "failed to save draw settings");
            self.set_status(format!("Failed to save settings: {err}"));
        }
    }

    fn apply_settings(&mut self, settings: DrawSettings) {
        self.shortcuts = ShortcutMap::from_settings(&settings.shortcuts);
        self.input.set_color(settings.current_color);
        self.input.set_thickness(settings.default_thickness);
        self.input.set_fill_enabled(settings.enable_fill);
        self.input.set_laser_style(settings.laser_style());
        self.board_enabled = settings.board_enabled;
        self.toolbar.orientation = settings.toolbar_orientation;
        self.settings = settings;
        self.persist_settings();
        tracing::info!(theme = %self.settings.current_theme, "draw settings applied");
    }

    fn export(&mut self) {
        let size = self.renderer.size();
        let result = save::ensure_output_folder().and_then(|dir| {
            save::export_canvas(
                self.input.canvas(),
                size,
                self.board_enabled,
                &dir,
                chrono::Local::now(),
            )
        });
        match result {
            Ok(path) => self.set_status(format!("Saved {}", path.display())),
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "export failed");
                self.set_status(format!("Failed to save PNG: {err}"));
            }
        }
    }

    fn request_exit(&mut self, ctx: &egui::Context) {
        self.input.finish_text();
        self.persist_settings();
        tracing::info!("overlay exit requested");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn apply_toolbar_command(&mut self, ctx: &egui::Context, command: ToolbarCommand) {
        self.toolbar.apply_command(command);
        match command {
            ToolbarCommand::SelectTool(tool) => {
                self.input.set_tool(tool);
            }
            ToolbarCommand::SetColor(color) => {
                self.input.set_color(color);
                self.persist_settings();
            }
            ToolbarCommand::SetThickness(_)
            | ToolbarCommand::IncreaseThickness
            | ToolbarCommand::DecreaseThickness => {
                self.input
                    .set_thickness(step_thickness(self.input.thickness(), command));
                self.persist_settings();
            }
            ToolbarCommand::ToggleFill => {
                self.input.set_fill_enabled(!self.input.fill_enabled());
                self.persist_settings();
            }
            ToolbarCommand::ToggleBoard => {
                self.board_enabled = !self.board_enabled;
                self.persist_settings();
            }
            ToolbarCommand::Undo => {
                self.input.undo();
            }
            ToolbarCommand::Redo => {
                self.input.redo();
            }
            ToolbarCommand::Clear => self.clear_modal.open(self.input.canvas().len()),
            ToolbarCommand::ConfirmClear => {
                self.input.clear();
            }
            ToolbarCommand::Save => self.export(),
            ToolbarCommand::OpenSettings => {
                let mut current = self.settings.clone();
                current.current_color = self.input.color();
                current.default_thickness = self.input.thickness();
                current.enable_fill = self.input.fill_enabled();
                current.board_enabled = self.board_enabled;
                current.toolbar_orientation = self.toolbar.orientation;
                self.settings_dialog.open(&current);
            }
            ToolbarCommand::SetOrientation(_) => self.persist_settings(),
            ToolbarCommand::SetTheme(name) => {
                self.settings.current_theme = name.to_owned();
                self.persist_settings();
            }
            ToolbarCommand::Exit => self.request_exit(ctx),
            ToolbarCommand::CancelClear
            | ToolbarCommand::CloseSettings
            | ToolbarCommand::Hide
            | ToolbarCommand::Peek
            | ToolbarCommand::Restore
            | ToolbarCommand::SetPosition { .. } => {}
        }
    }

    fn apply_input_command(&mut self, ctx: &egui::Context, command: InputCommand) {
        match command {
            InputCommand::RequestExit => self.request_exit(ctx),
            InputCommand::Clear => self.apply_toolbar_command(ctx, ToolbarCommand::Clear),
            InputCommand::Save => self.export(),
            InputCommand::ToolChanged(tool) => {
                tracing::debug!(tool = tool.name(), "tool selected from keyboard");
            }
            InputCommand::Undo | InputCommand::Redo => {}
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let palette = theme_or_default(&self.settings.current_theme);
        if self.applied_theme != Some(palette.name) {
            ctx.set_visuals(theme_to_visuals(palette, &egui::Visuals::default()));
            self.applied_theme = Some(palette.name);
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if self.clear_modal.is_open() || ctx.wants_keyboard_input() {
            return;
        }

        let events = ctx.input(|i| i.events.clone());
        let mut commands = Vec::new();
        for event in events {
            match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    let Some(event) = key_event_from_egui(key, modifiers) else {
                        continue;
                    };
                    commands.extend(self.input.handle_key_event(event, &self.shortcuts));
                }
                egui::Event::Text(text) if self.input.text_draft().is_some() => {
                    self.input.insert_text(&text);
                }
                egui::Event::Paste(text) if self.input.text_draft().is_some() => {
                    self.input.insert_text(&text);
                }
                _ => {}
            }
        }
        for command in commands {
            self.apply_input_command(ctx, command);
        }
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, canvas: &egui::Response, now: Instant) {
        let origin = canvas.rect.min;
        let ppp = ctx.pixels_per_point();
        let size = canvas_pixel_size(canvas.rect, ppp);
        let source = self.input.zoom_view(now).map(|view| view.source_rect(size));
        let to_canvas = |pos: egui::Pos2| {
            let point = canvas_point(pos, origin, ppp);
            match source {
                Some(source) => unzoom_point(point, source, size),
                None => point,
            }
        };
        let over_canvas = canvas.hovered();
        let blocked = self.input_blocked();
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    ..
                } if over_canvas => {
                    self.pointer_down = forward_pointer_event_to_draw_input(
                        &mut self.input,
                        blocked,
                        to_canvas(pos),
                        OverlayPointerEvent::LeftDown,
                        now,
                    );
                }
                egui::Event::PointerMoved(pos) if self.pointer_down => {
                    forward_pointer_event_to_draw_input(
                        &mut self.input,
                        blocked,
                        to_canvas(pos),
                        OverlayPointerEvent::Move,
                        now,
                    );
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: false,
                    ..
                } if self.pointer_down => {
                    self.pointer_down = false;
                    forward_pointer_event_to_draw_input(
                        &mut self.input,
                        blocked,
                        to_canvas(pos),
                        OverlayPointerEvent::LeftUp,
                        now,
                    );
                }
                egui::Event::PointerGone if self.pointer_down => {
                    self.pointer_down = false;
                    if let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) {
                        self.input
                            .handle_left_up(to_canvas(pos), now);
                    }
                }
                _ => {}
            }
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context, presentation: Presentation) {
        let size = self.renderer.size();
        let texture_size = [size.0 as usize, size.1 as usize];
        let full_upload = matches!(presentation, Presentation::Full)
            || self
                .texture
                .as_ref()
                .map_or(true, |texture| texture.size() != texture_size);
        if full_upload {
            let image = egui::ColorImage::from_rgba_unmultiplied(texture_size, self.renderer.frame());
            match self.texture.as_mut() {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.texture =
                        Some(ctx.load_texture(CANVAS_TEXTURE, image, egui::TextureOptions::LINEAR))
                }
            }
            return;
        }
        if let (Presentation::Region(rect), Some(texture)) = (presentation, self.texture.as_mut()) {
            let region = egui::ColorImage::from_rgba_unmultiplied(
                [rect.width as usize, rect.height as usize],
                &self.renderer.region_pixels(rect),
            );
            texture.set_partial(
                [rect.x as usize, rect.y as usize],
                region,
                egui::TextureOptions::LINEAR,
            );
        }
    }

    fn show_canvas(&mut self, ctx: &egui::Context, now: Instant) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let canvas = ui.allocate_rect(rect, egui::Sense::drag());
                self.handle_pointer(ctx, &canvas, now);

                let ppp = ctx.pixels_per_point();
                let size = canvas_pixel_size(rect, ppp);
                if size.0 == 0 || size.1 == 0 {
                    return;
                }
                let presentation = self.renderer.render(
                    self.input.canvas(),
                    self.input.revision(),
                    BackgroundClearMode::board(self.board_enabled),
                    &self.input.transient(now),
                    size,
                );
                self.upload_frame(ctx, presentation);

                if let Some(texture) = &self.texture {
                    let uv = match self.input.zoom_view(now) {
                        Some(view) => zoom_uv(view.source_rect(size), size),
                        None => egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    };
                    ui.painter()
                        .image(texture.id(), rect, uv, egui::Color32::WHITE);
                }

                if let Some(draft) = self.input.text_draft() {
                    let anchor = draft.bounding_rect();
                    let pos = egui::pos2(
                        rect.min.x + anchor.min_x / ppp,
                        rect.min.y + anchor.max_y / ppp + 4.0,
                    );
                    ui.painter().text(
                        pos,
                        egui::Align2::LEFT_TOP,
                        "Enter to place · Shift+Enter new line · Esc to cancel",
                        egui::FontId::proportional(11.0),
                        egui::Color32::from_gray(140),
                    );
                }
            });
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        let palette = theme_or_default(&self.settings.current_theme);
        let size = panel_size(&self.toolbar);
        let screen = ctx.screen_rect();
        let (x, y) = self
            .toolbar
            .position
            .unwrap_or_else(|| default_position(screen.size(), &self.toolbar));
        let origin = ctx
            .input(|i| i.viewport().outer_rect)
            .map_or(egui::Pos2::ZERO, |rect| rect.min);

        let view = ToolbarView {
            tool: self.input.tool(),
            color: self.input.color(),
            thickness: self.input.thickness(),
            fill_enabled: self.input.fill_enabled(),
            board_enabled: self.board_enabled,
            can_undo: self.input.history().can_undo(),
            can_redo: self.input.history().can_redo(),
            shortcuts: &self.shortcuts,
            theme: palette,
        };
        let toolbar = self.toolbar;
        let panel_frame = egui::Frame::window(&ctx.style())
            .fill(theme::color32(palette.toolbar_bg))
            .inner_margin(egui::Margin::same(crate::draw::toolbar::PANEL_MARGIN));

        let builder = egui::ViewportBuilder::default()
            .with_title("TutorDraw Toolbar")
            .with_decorations(false)
            .with_always_on_top()
            .with_resizable(false)
            .with_taskbar(false)
            .with_inner_size(size)
            .with_position(egui::pos2(origin.x + x, origin.y + y));

        let (commands, moved_to, embedded) = ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of(TOOLBAR_VIEWPORT),
            builder,
            |ctx, class| {
                if class == egui::ViewportClass::Embedded {
                    let mut moved_to = None;
                    let response = egui::Area::new(egui::Id::new(TOOLBAR_VIEWPORT))
                        .order(egui::Order::Foreground)
                        .fixed_pos(egui::pos2(x, y))
                        .show(ctx, |ui| {
                            panel_frame.show(ui, |ui| toolbar_ui(ui, &toolbar, &view)).inner
                        });
                    let (commands, header) = response.inner;
                    if let Some(header) = header.filter(|header| header.dragged()) {
                        let delta = header.drag_delta();
                        moved_to = Some((x + delta.x, y + delta.y));
                    }
                    return (commands, moved_to, true);
                }

                let mut moved_to = None;
                let (commands, header) = egui::CentralPanel::default()
                    .frame(panel_frame)
                    .show(ctx, |ui| toolbar_ui(ui, &toolbar, &view))
                    .inner;
                if let Some(header) = header {
                    if header.drag_started() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
                    }
                }
                if let Some(outer) = ctx.input(|i| i.viewport().outer_rect) {
                    let actual = (outer.min.x - origin.x, outer.min.y - origin.y);
                    if (actual.0 - x).abs() > 0.5 || (actual.1 - y).abs() > 0.5 {
                        moved_to = Some(actual);
                    }
                }
                (commands, moved_to, false)
            },
        );

        self.toolbar_embedded = embedded;
        if let Some((x, y)) = moved_to {
            self.toolbar.apply_command(ToolbarCommand::SetPosition { x, y });
        } else if self.toolbar.position.is_none() {
            self.toolbar.position = Some((x, y));
        }
        for command in commands {
            self.apply_toolbar_command(ctx, command);
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if self.toolbar.clear_prompt && !self.clear_modal.is_open() {
            self.clear_modal.open(self.input.canvas().len());
        }
        match self.clear_modal.ui(ctx) {
            ConfirmationResult::Confirmed => {
                self.apply_toolbar_command(ctx, ToolbarCommand::ConfirmClear)
            }
            ConfirmationResult::Cancelled => {
                self.apply_toolbar_command(ctx, ToolbarCommand::CancelClear)
            }
            ConfirmationResult::None => {}
        }

        if let Some(settings) = self.settings_dialog.ui(ctx) {
            self.apply_settings(settings);
        }
        if self.toolbar.settings_open && !self.settings_dialog.open {
            self.toolbar.apply_command(ToolbarCommand::CloseSettings);
        }

        if let Some((message, since)) = &self.status {
            if since.elapsed() >= STATUS_DURATION {
                self.status = None;
            } else {
                egui::Area::new(egui::Id::new("tutor_draw_status"))
                    .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
                    .order(egui::Order::Foreground)
                    .show(ctx, |ui| {
                        egui::Frame::popup(ui.style()).show(ui, |ui| ui.label(message.as_str()));
                    });
                ctx.request_repaint_after(STATUS_DURATION);
            }
        }
    }

    fn sync_mouse_passthrough(&mut self, ctx: &egui::Context) {
        // An embedded toolbar lives in this window, so passthrough would make it unreachable.
        let wanted = !self.input.tool().captures_input() && !self.toolbar_embedded;
        if self.mouse_passthrough != Some(wanted) {
            tracing::debug!(enabled = wanted, "mouse passthrough");
            ctx.send_viewport_cmd(egui::ViewportCommand::MousePassthrough(wanted));
            self.mouse_passthrough = Some(wanted);
        }
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.apply_theme(ctx);

        if ctx.input(|i| i.viewport().close_requested()) {
            self.input.finish_text();
            self.persist_settings();
        }

        self.handle_keyboard(ctx);
        self.show_toolbar(ctx);
        self.show_dialogs(ctx);
        self.show_canvas(ctx, now);
        self.sync_mouse_passthrough(ctx);

        if self.input.tick(now) || self.pointer_down {
            ctx.request_repaint_after(ANIMATION_FRAME);
        }
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }
}
