//! Normalized input events forwarded by the presentation layer.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    /// Space bar held; turns a left drag on the background into a pan.
    pub space: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
        space: false,
    };

    /// Ctrl or Cmd: toggles membership instead of replacing the selection.
    pub fn additive(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Ctrl or Cmd, for command shortcuts.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn pan_trigger(&self) -> bool {
        self.space
    }

    /// Wheel zooms the canvas instead of resizing the selection.
    pub fn wheel_zoom(&self) -> bool {
        self.shift
    }
}

/// One active touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Printable character, compared case-insensitively.
    Char(char),
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Input event in screen coordinates.
///
/// Touch events carry every touch still active after the event, like the DOM `touches` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
        button: MouseButton,
    },
    Wheel {
        position: Point,
        delta: Vec2,
        #[serde(default)]
        modifiers: Modifiers,
    },
    TouchStart {
        touches: Vec<TouchPoint>,
    },
    TouchMove {
        touches: Vec<TouchPoint>,
    },
    TouchEnd {
        touches: Vec<TouchPoint>,
    },
    TouchCancel,
    Key(KeyEvent),
    /// Window or document lost focus.
    Blur,
}

impl InputEvent {
    pub fn down(x: f64, y: f64, button: MouseButton) -> Self {
        InputEvent::PointerDown {
            position: Point::new(x, y),
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn down_with(x: f64, y: f64, button: MouseButton, modifiers: Modifiers) -> Self {
        InputEvent::PointerDown {
            position: Point::new(x, y),
            button,
            modifiers,
        }
    }

    pub fn move_to(x: f64, y: f64) -> Self {
        InputEvent::PointerMove {
            position: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64, button: MouseButton) -> Self {
        InputEvent::PointerUp {
            position: Point::new(x, y),
            button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_roles() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        assert!(ctrl.additive());
        assert!(!ctrl.wheel_zoom());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(meta.command());
        assert!(!Modifiers::default().pan_trigger());
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{ "PointerDown": { "position": { "x": 1.0, "y": 2.0 }, "button": "Left" } }"#;
        let event: InputEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, InputEvent::down(1.0, 2.0, MouseButton::Left));

        let key = r#"{ "Key": { "key": { "Char": "c" }, "modifiers": { "ctrl": true } } }"#;
        let event: InputEvent = serde_json::from_str(key).unwrap();
        assert!(matches!(
            event,
            InputEvent::Key(KeyEvent { key: Key::Char('c'), modifiers }) if modifiers.ctrl
        ));
    }
}
