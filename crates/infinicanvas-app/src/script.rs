//! Input scripts: recorded sessions replayed against a scene.
//!
//! A script is a JSON document:
//!
//! ```json
//! {
//!   "screen": { "width": 1280, "height": 800 },
//!   "steps": [
//!     { "Tool": { "Shape": { "shape": "Rectangle" } } },
//!     { "Input": { "PointerDown": { "position": { "x": 300, "y": 200 }, "button": "Left" } } },
//!     { "Input": { "PointerUp": { "position": { "x": 300, "y": 200 }, "button": "Left" } } }
//!   ]
//! }
//! ```

use infinicanvas_core::elements::{ImageLoadError, LoadedImage};
use infinicanvas_core::{Effect, GestureController, InputEvent, PlacementTicket, SceneStore, Tool};
use kurbo::Size;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_screen() -> Size {
    Size::new(1280.0, 800.0)
}

/// One scripted step.
#[derive(Debug, Clone, Deserialize)]
pub enum Step {
    /// Forward an input event to the gesture controller.
    Input(InputEvent),
    /// Switch the active tool.
    Tool(Tool),
    /// Resize the presentation surface.
    Resize(Size),
    /// Toggle the external text editor focus.
    TextEditing(bool),
    /// The oldest pending image request finished loading.
    ImageLoaded { src: String, width: f64, height: f64 },
    /// The oldest pending image request failed.
    ImageFailed { reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_screen")]
    pub screen: Size,
    #[serde(default)]
    pub tool: Tool,
    pub steps: Vec<Step>,
}

/// Counters reported after a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub images_placed: usize,
    pub images_dropped: usize,
}

impl Script {
    pub fn from_json_str(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let script = Self::from_json_str(&json)?;
        log::info!("Loaded script {} ({} steps)", path.display(), script.steps.len());
        Ok(script)
    }

    /// Run every step in order. `after_step` is called once per step, e.g. to drive autosave.
    pub fn replay(
        &self,
        controller: &mut GestureController,
        store: &mut SceneStore,
        mut after_step: impl FnMut(&SceneStore),
    ) -> ReplaySummary {
        controller.set_screen_size(self.screen);
        controller.set_tool(self.tool.clone());

        let mut pending: VecDeque<PlacementTicket> = VecDeque::new();
        let mut summary = ReplaySummary::default();

        for step in &self.steps {
            match step {
                Step::Input(event) => {
                    if let Some(Effect::PickImage(ticket)) = controller.handle_event(store, event) {
                        pending.push_back(ticket);
                    }
                }
                Step::Tool(tool) => controller.set_tool(tool.clone()),
                Step::Resize(size) => controller.set_screen_size(*size),
                Step::TextEditing(editing) => controller.set_text_editing(*editing),
                Step::ImageLoaded { src, width, height } => {
                    let Some(ticket) = pending.pop_front() else {
                        log::warn!("Image {} loaded without a pending request", src);
                        continue;
                    };
                    let image = LoadedImage {
                        src: src.clone(),
                        width: *width,
                        height: *height,
                    };
                    match controller.complete_image_placement(store, ticket, Ok(image)) {
                        Some(_) => summary.images_placed += 1,
                        None => summary.images_dropped += 1,
                    }
                }
                Step::ImageFailed { reason } => {
                    if let Some(ticket) = pending.pop_front() {
                        let err = ImageLoadError::Decode(reason.clone());
                        controller.complete_image_placement(store, ticket, Err(err));
                        summary.images_dropped += 1;
                    }
                }
            }
            summary.steps += 1;
            after_step(store);
        }

        for ticket in pending {
            controller.cancel_image(ticket);
            summary.images_dropped += 1;
        }
        summary
    }
}
