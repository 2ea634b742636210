//! Key trigger parsing and normalization
//!
//! Config files name triggers as either a named key ("Enter", "F1") or a
//! single literal character; incoming crossterm events are normalized to
//! the same representation before registry lookup.

use crossterm::event::{KeyCode, KeyEvent};

/// A normalized key trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyTrigger(pub KeyCode);

impl KeyTrigger {
    /// Parse the config-file form of a trigger.
    ///
    /// Returns `None` for strings that map to no key; the registry treats
    /// such rows as malformed.
    pub fn parse(s: &str) -> Option<Self> {
        let code = match s {
            "Enter" => KeyCode::Enter,
            "Esc" | "Escape" => KeyCode::Esc,
            "Tab" => KeyCode::Tab,
            "Backspace" => KeyCode::Backspace,
            "Delete" => KeyCode::Delete,
            "Insert" => KeyCode::Insert,
            "Home" => KeyCode::Home,
            "End" => KeyCode::End,
            "PageUp" => KeyCode::PageUp,
            "PageDown" => KeyCode::PageDown,
            "Up" => KeyCode::Up,
            "Down" => KeyCode::Down,
            "Left" => KeyCode::Left,
            "Right" => KeyCode::Right,
            "Space" => KeyCode::Char(' '),
            _ => {
                if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                    if (1..=12).contains(&n) {
                        return Some(Self(KeyCode::F(n)));
                    }
                    return None;
                }
                let mut chars = s.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };
        Some(Self(code))
    }

    /// Normalize an incoming event, ignoring modifiers.
    pub fn from_event(event: &KeyEvent) -> Self {
        Self(event.code)
    }

    /// Display form for the action bar.
    pub fn label(&self) -> String {
        match self.0 {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            other => format!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(KeyTrigger::parse("Enter"), Some(KeyTrigger(KeyCode::Enter)));
        assert_eq!(KeyTrigger::parse("Esc"), Some(KeyTrigger(KeyCode::Esc)));
        assert_eq!(KeyTrigger::parse("F1"), Some(KeyTrigger(KeyCode::F(1))));
        assert_eq!(KeyTrigger::parse("F12"), Some(KeyTrigger(KeyCode::F(12))));
        assert_eq!(KeyTrigger::parse("Space"), Some(KeyTrigger(KeyCode::Char(' '))));
    }

    #[test]
    fn test_parse_literal_characters() {
        assert_eq!(KeyTrigger::parse("q"), Some(KeyTrigger(KeyCode::Char('q'))));
        assert_eq!(KeyTrigger::parse("R"), Some(KeyTrigger(KeyCode::Char('R'))));
        // 'F' alone is a literal character, not a function key.
        assert_eq!(KeyTrigger::parse("F"), Some(KeyTrigger(KeyCode::Char('F'))));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(KeyTrigger::parse(""), None);
        assert_eq!(KeyTrigger::parse("NotAKey"), None);
        assert_eq!(KeyTrigger::parse("F13"), None);
    }

    #[test]
    fn test_from_event_ignores_modifiers() {
        let event = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(KeyTrigger::from_event(&event), KeyTrigger(KeyCode::Char('R')));
    }

    #[test]
    fn test_labels() {
        assert_eq!(KeyTrigger(KeyCode::Enter).label(), "Enter");
        assert_eq!(KeyTrigger(KeyCode::F(2)).label(), "F2");
        assert_eq!(KeyTrigger(KeyCode::Char('v')).label(), "v");
    }
}
