//! Keyboard shortcuts and the commands they trigger.

use crate::config::EngineConfig;
use crate::input::{Key, KeyEvent};

/// Editor command reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    DeleteSelection,
    ClearSelection,
    Copy,
    Paste,
    SelectAll,
    Undo,
    Redo,
    ResetView,
    /// Rotate the selection by this many degrees.
    RotateSelection(f64),
    /// Grow the selection by (dw, dh).
    ResizeSelection(f64, f64),
}

/// Map a key press to a command.
pub fn resolve(event: &KeyEvent, config: &EngineConfig) -> Option<Command> {
    let m = event.modifiers;
    let rotate = config.keyboard_rotate_step;
    let resize = config.keyboard_resize_step;

    match event.key {
        Key::Delete | Key::Backspace => Some(Command::DeleteSelection),
        Key::Escape => Some(Command::ClearSelection),
        Key::ArrowLeft if m.alt => Some(Command::RotateSelection(-rotate)),
        Key::ArrowRight if m.alt => Some(Command::RotateSelection(rotate)),
        Key::ArrowUp if m.command() => Some(Command::ResizeSelection(0.0, -resize)),
        Key::ArrowDown if m.command() => Some(Command::ResizeSelection(0.0, resize)),
        Key::ArrowLeft if m.command() => Some(Command::ResizeSelection(-resize, 0.0)),
        Key::ArrowRight if m.command() => Some(Command::ResizeSelection(resize, 0.0)),
        Key::Char('0') if m.alt => Some(Command::ResetView),
        Key::Char(c) if m.command() => match c.to_ascii_lowercase() {
            'c' => Some(Command::Copy),
            'v' => Some(Command::Paste),
            'a' => Some(Command::SelectAll),
            'z' if m.shift => Some(Command::Redo),
            'z' => Some(Command::Undo),
            'y' => Some(Command::Redo),
            _ => None,
        },
        _ => None,
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub keys: &'static str,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(keys: &'static str, description: &'static str) -> Self {
        Self { keys, description }
    }
}

/// Registry of all keyboard shortcuts, for help screens.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete / Backspace", "Delete selected elements"),
            Shortcut::new("Escape", "Clear selection"),
            Shortcut::new("Ctrl+C", "Copy selected elements"),
            Shortcut::new("Ctrl+V", "Paste elements"),
            Shortcut::new("Ctrl+A", "Select all"),
            Shortcut::new("Ctrl+Z", "Undo"),
            Shortcut::new("Ctrl+Shift+Z / Ctrl+Y", "Redo"),
            Shortcut::new("Alt+0", "Reset view"),
            Shortcut::new("Alt+Left / Alt+Right", "Rotate selection"),
            Shortcut::new("Ctrl/Cmd+Arrows", "Resize selection"),
            Shortcut::new("Shift+Wheel", "Zoom canvas"),
            Shortcut::new("Wheel", "Resize selection"),
            Shortcut::new("Right drag / Space+drag", "Pan canvas"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn key(key: Key, modifiers: Modifiers) -> Option<Command> {
        resolve(&KeyEvent::new(key, modifiers), &EngineConfig::default())
    }

    #[test]
    fn test_clipboard_shortcuts() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(key(Key::Char('c'), ctrl), Some(Command::Copy));
        assert_eq!(key(Key::Char('V'), meta), Some(Command::Paste));
        assert_eq!(key(Key::Char('c'), Modifiers::NONE), None);
    }

    #[test]
    fn test_undo_redo() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        let ctrl_shift = Modifiers { shift: true, ..ctrl };
        assert_eq!(key(Key::Char('z'), ctrl), Some(Command::Undo));
        assert_eq!(key(Key::Char('Z'), ctrl_shift), Some(Command::Redo));
        assert_eq!(key(Key::Char('y'), ctrl), Some(Command::Redo));
    }

    #[test]
    fn test_rotate_and_resize() {
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        assert_eq!(key(Key::ArrowLeft, alt), Some(Command::RotateSelection(-5.0)));
        assert_eq!(key(Key::ArrowRight, alt), Some(Command::RotateSelection(5.0)));
        assert_eq!(key(Key::ArrowUp, ctrl), Some(Command::ResizeSelection(0.0, -10.0)));
        assert_eq!(key(Key::ArrowRight, ctrl), Some(Command::ResizeSelection(10.0, 0.0)));
        assert_eq!(key(Key::ArrowUp, Modifiers::NONE), None);
        assert_eq!(key(Key::Char('0'), alt), Some(Command::ResetView));
    }

    #[test]
    fn test_resize_accepts_cmd() {
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(key(Key::ArrowDown, meta), Some(Command::ResizeSelection(0.0, 10.0)));
        assert_eq!(key(Key::ArrowLeft, meta), Some(Command::ResizeSelection(-10.0, 0.0)));
    }

    #[test]
    fn test_delete_keys() {
        assert_eq!(key(Key::Delete, Modifiers::NONE), Some(Command::DeleteSelection));
        assert_eq!(key(Key::Backspace, Modifiers::NONE), Some(Command::DeleteSelection));
        assert_eq!(key(Key::Escape, Modifiers::NONE), Some(Command::ClearSelection));
    }

    #[test]
    fn test_registry_lists_shortcuts() {
        assert!(ShortcutRegistry::all().iter().any(|s| s.keys == "Alt+0"));
    }
}
