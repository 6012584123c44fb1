use std::collections::BTreeMap;

use eframe::egui;

use crate::draw::model::Tool;
use crate::draw::settings::{parse_shortcut, CLEAR_ACTION};
use crate::hotkey::{Hotkey, Key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers {
                ctrl: true,
                ..KeyModifiers::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Tool(Tool),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Undo,
    Redo,
    RequestExit,
    Save,
    DeleteSelection,
    SelectTool(Tool),
    Clear,
    CommitText,
    CancelText,
    TextNewline,
    TextBackspace,
}

/// Parsed single-key shortcuts, built from the settings map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortcutMap {
    bindings: Vec<(Hotkey, ShortcutAction)>,
}

impl ShortcutMap {
    pub fn from_settings(shortcuts: &BTreeMap<String, String>) -> Self {
        let mut bindings = Vec::with_capacity(shortcuts.len());
        for (action, value) in shortcuts {
            let action = if action == CLEAR_ACTION {
                ShortcutAction::Clear
            } else if let Some(tool) = Tool::from_name(action) {
                ShortcutAction::Tool(tool)
            } else {
                tracing::warn!(action = %action, "unknown shortcut action");
                continue;
            };
            match parse_shortcut(value) {
                Ok(hotkey) => bindings.push((hotkey, action)),
                Err(err) => tracing::warn!(%err, "skipping shortcut"),
            }
        }
        Self { bindings }
    }

    pub fn lookup(&self, event: KeyEvent) -> Option<ShortcutAction> {
        if event.modifiers.ctrl || event.modifiers.alt {
            return None;
        }
        self.bindings
            .iter()
            .find(|(hotkey, _)| hotkey.key == event.key && hotkey.shift == event.modifiers.shift)
            .map(|(_, action)| *action)
    }

    /// Display string for the key bound to `tool`, used in toolbar tooltips.
    pub fn label_for(&self, tool: Tool) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, action)| *action == ShortcutAction::Tool(tool))
            .map(|(hotkey, _)| hotkey.to_string())
    }
}

/// Maps a key press to a command. While a text draft is open only the text
/// editing keys and Escape are handled so typed letters never switch tools.
pub fn map_key_event_to_command(
    event: KeyEvent,
    shortcuts: &ShortcutMap,
    editing_text: bool,
) -> Option<KeyCommand> {
    let KeyModifiers { ctrl, shift, alt } = event.modifiers;

    if editing_text {
        return match event.key {
            Key::Escape => Some(KeyCommand::CancelText),
            Key::Return if shift => Some(KeyCommand::TextNewline),
            Key::Return => Some(KeyCommand::CommitText),
            Key::Backspace => Some(KeyCommand::TextBackspace),
            _ => None,
        };
    }

    match (event.key, ctrl, shift) {
        (Key::Escape, _, _) => return Some(KeyCommand::RequestExit),
        (Key::Letter('Z'), true, false) => return Some(KeyCommand::Undo),
        (Key::Letter('Y'), true, _) | (Key::Letter('Z'), true, true) => {
            return Some(KeyCommand::Redo)
        }
        (Key::Letter('S'), true, false) => return Some(KeyCommand::Save),
        (Key::Delete | Key::Backspace, false, _) if !alt => {
            return Some(KeyCommand::DeleteSelection)
        }
        _ => {}
    }

    shortcuts.lookup(event).map(|action| match action {
        ShortcutAction::Tool(tool) => KeyCommand::SelectTool(tool),
        ShortcutAction::Clear => KeyCommand::Clear,
    })
}

pub fn key_from_egui(key: egui::Key) -> Option<Key> {
    use egui::Key as E;
    let letter = |c: char| Some(Key::Letter(c));
    match key {
        E::Escape => Some(Key::Escape),
        E::Enter => Some(Key::Return),
        E::Tab => Some(Key::Tab),
        E::Space => Some(Key::Space),
        E::Delete => Some(Key::Delete),
        E::Backspace => Some(Key::Backspace),
        E::Home => Some(Key::Home),
        E::End => Some(Key::End),
        E::PageUp => Some(Key::PageUp),
        E::PageDown => Some(Key::PageDown),
        E::ArrowLeft => Some(Key::LeftArrow),
        E::ArrowRight => Some(Key::RightArrow),
        E::ArrowUp => Some(Key::UpArrow),
        E::ArrowDown => Some(Key::DownArrow),
        E::Num0 => Some(Key::Digit(0)),
        E::Num1 => Some(Key::Digit(1)),
        E::Num2 => Some(Key::Digit(2)),
        E::Num3 => Some(Key::Digit(3)),
        E::Num4 => Some(Key::Digit(4)),
        E::Num5 => Some(Key::Digit(5)),
        E::Num6 => Some(Key::Digit(6)),
        E::Num7 => Some(Key::Digit(7)),
        E::Num8 => Some(Key::Digit(8)),
        E::Num9 => Some(Key::Digit(9)),
        E::F1 => Some(Key::Function(1)),
        E::F2 => Some(Key::Function(2)),
        E::F3 => Some(Key::Function(3)),
        E::F4 => Some(Key::Function(4)),
        E::F5 => Some(Key::Function(5)),
        E::F6 => Some(Key::Function(6)),
        E::F7 => Some(Key::Function(7)),
        E::F8 => Some(Key::Function(8)),
        E::F9 => Some(Key::Function(9)),
        E::F10 => Some(Key::Function(10)),
        E::F11 => Some(Key::Function(11)),
        E::F12 => Some(Key::Function(12)),
        E::A => letter('A'),
        E::B => letter('B'),
        E::C => letter('C'),
        E::D => letter('D'),
        E::E => letter('E'),
        E::F => letter('F'),
        E::G => letter('G'),
        E::H => letter('H'),
        E::I => letter('I'),
        E::J => letter('J'),
        E::K => letter('K'),
        E::L => letter('L'),
        E::M => letter('M'),
        E::N => letter('N'),
        E::O => letter('O'),
        E::P => letter('P'),
        E::Q => letter('Q'),
        E::R => letter('R'),
        E::S => letter('S'),
        E::T => letter('T'),
        E::U => letter('U'),
        E::V => letter('V'),
        E::W => letter('W'),
        E::X => letter('X'),
        E::Y => letter('Y'),
        E::Z => letter('Z'),
        _ => None,
    }
}

pub fn key_event_from_egui(key: egui::Key, modifiers: egui::Modifiers) -> Option<KeyEvent> {
    Some(KeyEvent {
        key: key_from_egui(key)?,
        modifiers: KeyModifiers {
            ctrl: modifiers.ctrl || modifiers.command,
            shift: modifiers.shift,
            alt: modifiers.alt,
        },
    })
}
