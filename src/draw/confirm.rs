use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResult {
    None,
    Confirmed,
    Cancelled,
}

/// Frame inputs that can end the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptInput {
    pub confirm_clicked: bool,
    pub cancel_clicked: bool,
    pub enter_pressed: bool,
    pub escape_pressed: bool,
    pub window_closed: bool,
}

/// Buttons win over keys; closing the window counts as cancel.
pub fn resolve_prompt(input: PromptInput) -> ConfirmationResult {
    if input.confirm_clicked {
        ConfirmationResult::Confirmed
    } else if input.cancel_clicked || input.escape_pressed || input.window_closed {
        ConfirmationResult::Cancelled
    } else if input.enter_pressed {
        ConfirmationResult::Confirmed
    } else {
        ConfirmationResult::None
    }
}

/// "Clear all" prompt shown before the canvas is wiped.
#[derive(Debug, Clone, Default)]
pub struct ClearConfirmation {
    open: bool,
    shape_count: usize,
}

impl ClearConfirmation {
    pub fn open(&mut self, shape_count: usize) {
        self.open = true;
        self.shape_count = shape_count;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    fn description(&self) -> String {
        match self.shape_count {
            0 => "The canvas is already empty.".to_owned(),
            1 => "1 annotation will be removed.".to_owned(),
            n => format!("{n} annotations will be removed."),
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> ConfirmationResult {
        if !self.open {
            return ConfirmationResult::None;
        }
        let mut input = PromptInput::default();
        let mut window_open = true;
        egui::Window::new("Clear all annotations?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut window_open)
            .show(ctx, |ui| {
                ui.label(self.description());
                ui.weak("Undo (Ctrl+Z) brings them back.");
                ui.horizontal(|ui| {
                    input.confirm_clicked = ui.button("Clear").clicked();
                    input.cancel_clicked = ui.button("Cancel").clicked();
                });
            });
        ctx.input(|i| {
            input.enter_pressed = i.key_pressed(egui::Key::Enter);
            input.escape_pressed = i.key_pressed(egui::Key::Escape);
        });
        input.window_closed = !window_open;

        let result = resolve_prompt(input);
        if result != ConfirmationResult::None {
            tracing::debug!(?result, shapes = self.shape_count, "clear prompt answered");
            self.open = false;
        }
        result
    }
}
