//! InfiniCanvas Core Library
//!
//! Interaction and transform engine for an infinite-canvas scene editor: the scene model and
//! its store, the pan/zoom viewport, the gesture state machine that turns normalized input
//! into scene mutations, and JSON exchange plus autosave.
//!
//! Rendering is left to the host: it reads [`Scene`] and [`GestureState`] and forwards
//! [`InputEvent`]s.

pub mod clipboard;
pub mod config;
pub mod elements;
pub mod exchange;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod marquee;
pub mod scene;
pub mod selection;
pub mod shortcuts;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use clipboard::Clipboard;
pub use config::{ConfigError, EngineConfig};
pub use elements::{Element, ElementDraft, ElementId, ElementKind, ElementPatch, Geometry};
pub use exchange::{ExchangeError, export_json, import_json};
pub use gesture::{Effect, GestureController, GestureState, PlacementTicket};
pub use input::{InputEvent, Key, KeyEvent, Modifiers, MouseButton, TouchPoint};
pub use marquee::{Marquee, MarqueeMode};
pub use scene::{Scene, SceneChange, SceneStore, ZOrder};
pub use selection::{Handle, HandleKind};
pub use tools::{ShapeKind, Tool};
pub use viewport::{Viewport, ViewportPatch};
