use std::fmt;

/// Platform-neutral key identity used by configurable shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Letter(char),
    Digit(u8),
    Function(u8),
    Space,
    Tab,
    Return,
    Escape,
    Delete,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Letter(c) => write!(f, "{c}"),
            Key::Digit(d) => write!(f, "{d}"),
            Key::Function(n) => write!(f, "F{n}"),
            Key::Space => f.write_str("Space"),
            Key::Tab => f.write_str("Tab"),
            Key::Return => f.write_str("Enter"),
            Key::Escape => f.write_str("Esc"),
            Key::Delete => f.write_str("Delete"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::PageUp => f.write_str("PageUp"),
            Key::PageDown => f.write_str("PageDown"),
            Key::LeftArrow => f.write_str("Left"),
            Key::RightArrow => f.write_str("Right"),
            Key::UpArrow => f.write_str("Up"),
            Key::DownArrow => f.write_str("Down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Hotkey {
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn has_modifiers(&self) -> bool {
        self.ctrl || self.shift || self.alt
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parse a hotkey string like "Ctrl+Shift+Space" into a [`Hotkey`].
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" => alt = true,
            "" => {}
            _ => key = Some(parse_key(&upper)?),
        }
    }

    key.map(|key| Hotkey {
        key,
        ctrl,
        shift,
        alt,
    })
}

fn parse_key(upper: &str) -> Option<Key> {
    match upper {
        "SPACE" => Some(Key::Space),
        "TAB" => Some(Key::Tab),
        "ENTER" | "RETURN" => Some(Key::Return),
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "DELETE" | "DEL" => Some(Key::Delete),
        "BACKSPACE" => Some(Key::Backspace),
        "HOME" => Some(Key::Home),
        "END" => Some(Key::End),
        "PAGEUP" => Some(Key::PageUp),
        "PAGEDOWN" => Some(Key::PageDown),
        "LEFT" | "LEFTARROW" => Some(Key::LeftArrow),
        "RIGHT" | "RIGHTARROW" => Some(Key::RightArrow),
        "UP" | "UPARROW" => Some(Key::UpArrow),
        "DOWN" | "DOWNARROW" => Some(Key::DownArrow),
        _ if upper.len() > 1 && upper.starts_with('F') => match upper[1..].parse::<u8>() {
            Ok(n @ 1..=12) => Some(Key::Function(n)),
            _ => None,
        },
        _ => {
            let mut chars = upper.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            if let Some(digit) = c.to_digit(10) {
                Some(Key::Digit(digit as u8))
            } else if c.is_ascii_alphabetic() {
                Some(Key::Letter(c))
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifiers_in_any_order() {
        let hotkey = parse_hotkey("shift+ctrl+z").expect("parse");
        assert_eq!(hotkey.key, Key::Letter('Z'));
        assert!(hotkey.ctrl && hotkey.shift && !hotkey.alt);
    }

    #[test]
    fn single_letters_digits_and_function_keys() {
        assert_eq!(parse_hotkey("p"), Some(Hotkey::plain(Key::Letter('P'))));
        assert_eq!(parse_hotkey("7").map(|h| h.key), Some(Key::Digit(7)));
        assert_eq!(parse_hotkey("F12").map(|h| h.key), Some(Key::Function(12)));
        assert_eq!(parse_hotkey("F").map(|h| h.key), Some(Key::Letter('F')));
        assert_eq!(parse_hotkey("F13"), None);
    }

    #[test]
    fn empty_segments_are_ignored_but_unknown_keys_rejected() {
        assert_eq!(
            parse_hotkey("Ctrl++D"),
            Some(Hotkey {
                key: Key::Letter('D'),
                ctrl: true,
                shift: false,
                alt: false,
            })
        );
        assert_eq!(parse_hotkey("Ctrl+Shift+NotAKey"), None);
        assert_eq!(parse_hotkey("Ctrl+Shift"), None);
        assert_eq!(parse_hotkey(""), None);
        assert_eq!(parse_hotkey("é"), None);
    }

    #[test]
    fn display_roundtrips_through_parser() {
        for text in ["Ctrl+Shift+Z", "Esc", "Alt+F4", "M", "Delete", "Ctrl+Space"] {
            let parsed = parse_hotkey(text).expect("parse");
            assert_eq!(parse_hotkey(&parsed.to_string()), Some(parsed));
        }
        assert_eq!(parse_hotkey("ctrl+y").expect("parse").to_string(), "Ctrl+Y");
    }
}
