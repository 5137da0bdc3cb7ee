//! Gesture controller: the state machine that turns normalized input into scene mutations.
//!
//! Exactly one [`GestureState`] is active at a time. A press picks the gesture from what it
//! lands on (selection handle, element, background) and the button/modifiers; moves apply
//! per-frame deltas through the [`SceneStore`]; release returns to `Idle`. A second touch
//! always pre-empts a single-pointer gesture with a pinch.
//!
//! Pan binding: the right or middle mouse button, or the left button with Space held, pans.
//! A plain left press on the background starts a marquee. A single touch on the background
//! pans.

use crate::clipboard::Clipboard;
use crate::config::EngineConfig;
use crate::elements::{
    ElementDraft, ElementId, ElementKind, Geometry, ImageContent, ImageLoadError, LoadedImage,
};
use crate::geometry::{Corner, handle_resize_delta, rotation_delta};
use crate::input::{InputEvent, KeyEvent, Modifiers, MouseButton, TouchPoint};
use crate::marquee::{Marquee, MarqueeMode, apply_marquee};
use crate::scene::SceneStore;
use crate::selection::{HandleKind, hit_test_handles};
use crate::shortcuts::{self, Command};
use crate::tools::Tool;
use crate::viewport::ViewportPatch;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pointer driving a single-pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// Active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    PanningCanvas {
        pointer: PointerId,
        /// Last pointer position, screen space.
        last: Point,
    },
    DraggingElements {
        pointer: PointerId,
        /// Last pointer position, screen space.
        last: Point,
    },
    ResizingElement {
        pointer: PointerId,
        corner: Corner,
        /// Last pointer position, screen space.
        last: Point,
    },
    RotatingElement {
        pointer: PointerId,
        /// Element whose rotate handle was grabbed.
        pivot: ElementId,
        /// Rotation center, canvas space.
        center: Point,
        /// Last pointer position, canvas space.
        last: Point,
    },
    MarqueeSelecting {
        pointer: PointerId,
        marquee: Marquee,
    },
    PinchZooming {
        touches: (u64, u64),
        last_distance: f64,
    },
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "Idle",
            GestureState::PanningCanvas { .. } => "PanningCanvas",
            GestureState::DraggingElements { .. } => "DraggingElements",
            GestureState::ResizingElement { .. } => "ResizingElement",
            GestureState::RotatingElement { .. } => "RotatingElement",
            GestureState::MarqueeSelecting { .. } => "MarqueeSelecting",
            GestureState::PinchZooming { .. } => "PinchZooming",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    /// Pointer driving a single-pointer gesture.
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            GestureState::PanningCanvas { pointer, .. }
            | GestureState::DraggingElements { pointer, .. }
            | GestureState::ResizingElement { pointer, .. }
            | GestureState::RotatingElement { pointer, .. }
            | GestureState::MarqueeSelecting { pointer, .. } => Some(*pointer),
            GestureState::Idle | GestureState::PinchZooming { .. } => None,
        }
    }

    /// Live marquee, for drawing the rubber band.
    pub fn marquee(&self) -> Option<&Marquee> {
        match self {
            GestureState::MarqueeSelecting { marquee, .. } => Some(marquee),
            _ => None,
        }
    }
}

/// What a press landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PressTarget {
    Background,
    Element { id: ElementId, was_selected: bool },
    Handle,
    Pan,
}

/// Bookkeeping for the press that started the current gesture.
#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Point,
    last: Point,
    target: PressTarget,
    modifiers: Modifiers,
    /// A real drag occurred: the pointer left the click threshold.
    moved: bool,
}

/// Ticket for an image placement waiting on an asynchronous load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementTicket(pub u64);

/// Requests the presentation layer must fulfil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Let the user pick an image, then call
    /// [`GestureController::complete_image_placement`] with the ticket.
    PickImage(PlacementTicket),
}

/// Per-frame delta computed from the gesture state.
enum Step {
    None,
    Pan(Vec2),
    Move(Vec2),
    Resize(Vec2),
    Rotate(f64),
}

/// Interprets input events and drives a [`SceneStore`].
#[derive(Debug)]
pub struct GestureController {
    config: EngineConfig,
    state: GestureState,
    press: Option<Press>,
    tool: Tool,
    clipboard: Clipboard,
    screen_size: Size,
    text_editing: bool,
    pending_images: HashSet<PlacementTicket>,
    next_ticket: u64,
    checkpointed: bool,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GestureController {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
            press: None,
            tool: Tool::Select,
            clipboard: Clipboard::new(),
            screen_size: Size::ZERO,
            text_editing: false,
            pending_images: HashSet::new(),
            next_ticket: 0,
            checkpointed: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        log::debug!("tool -> {:?}", tool);
        self.tool = tool;
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Size of the presentation surface, used to place images at the view center.
    pub fn set_screen_size(&mut self, size: Size) {
        self.screen_size = size;
    }

    pub fn screen_size(&self) -> Size {
        self.screen_size
    }

    /// While the external text editor has focus, keyboard shortcuts are ignored.
    pub fn set_text_editing(&mut self, editing: bool) {
        self.text_editing = editing;
    }

    /// Whether the current press has moved beyond the click threshold.
    pub fn drag_occurred(&self) -> bool {
        self.press.is_some_and(|p| p.moved)
    }

    /// Feed one input event. Returns a request for the presentation layer, if any.
    pub fn handle_event(&mut self, store: &mut SceneStore, event: &InputEvent) -> Option<Effect> {
        match event {
            InputEvent::PointerDown {
                position,
                button,
                modifiers,
            } => {
                self.pointer_down(store, PointerId::Mouse, *position, *button, *modifiers);
                None
            }
            InputEvent::PointerMove { position } => {
                self.pointer_move(store, PointerId::Mouse, *position);
                None
            }
            InputEvent::PointerUp { position, .. } => {
                self.pointer_up(store, PointerId::Mouse, *position)
            }
            InputEvent::Wheel {
                position,
                delta,
                modifiers,
            } => {
                self.wheel(store, *position, *delta, *modifiers);
                None
            }
            InputEvent::TouchStart { touches } => {
                self.touch_start(store, touches);
                None
            }
            InputEvent::TouchMove { touches } => {
                self.touch_move(store, touches);
                None
            }
            InputEvent::TouchEnd { touches } => self.touch_end(store, touches),
            InputEvent::TouchCancel | InputEvent::Blur => {
                self.cancel(store);
                None
            }
            InputEvent::Key(key) => {
                self.key(store, key);
                None
            }
        }
    }

    /// Abandon the active gesture without a click and return to `Idle`.
    pub fn cancel(&mut self, store: &mut SceneStore) {
        if !self.state.is_idle() {
            log::debug!("cancel {}", self.state.name());
        }
        if matches!(
            self.state,
            GestureState::DraggingElements { .. }
                | GestureState::ResizingElement { .. }
                | GestureState::RotatingElement { .. }
        ) {
            store.set_dragging(false);
        }
        self.state = GestureState::Idle;
        self.press = None;
    }

    /// Apply one gesture step. The first step that changes the scene records the undo entry.
    fn apply_step(&mut self, store: &mut SceneStore, edit: impl FnOnce(&mut SceneStore)) {
        if self.checkpointed {
            edit(store);
        } else {
            self.checkpointed = store.undoable(edit);
        }
    }

    fn pointer_down(
        &mut self,
        store: &mut SceneStore,
        pointer: PointerId,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) {
        if !self.state.is_idle() {
            log::debug!("ignoring press during {}", self.state.name());
            return;
        }
        store.clear_highlights();
        self.checkpointed = false;

        let viewport = *store.scene().viewport();
        let canvas = viewport.screen_to_canvas(position);
        let is_touch = matches!(pointer, PointerId::Touch(_));
        let wants_pan =
            matches!(button, MouseButton::Right | MouseButton::Middle) || modifiers.pan_trigger();

        let handle = if wants_pan {
            None
        } else {
            hit_test_handles(
                store.scene(),
                position,
                self.config.handle_hit_radius,
                self.config.rotate_handle_offset,
            )
        };
        let element = store.scene().element_at(canvas).map(|e| e.id);

        let (target, state) = if wants_pan {
            (PressTarget::Pan, GestureState::PanningCanvas { pointer, last: position })
        } else if let Some(handle) = handle {
            let state = match handle.kind {
                HandleKind::Corner(corner) => GestureState::ResizingElement {
                    pointer,
                    corner,
                    last: position,
                },
                HandleKind::Rotate => {
                    let Some(center) = store.scene().get(handle.element).map(|e| e.geometry.center())
                    else {
                        return;
                    };
                    GestureState::RotatingElement {
                        pointer,
                        pivot: handle.element,
                        center,
                        last: canvas,
                    }
                }
            };
            store.set_dragging(true);
            (PressTarget::Handle, state)
        } else if let Some(id) = element {
            let was_selected = store.scene().is_selected(id);
            if !was_selected {
                store.select(id, modifiers.additive());
            }
            store.set_dragging(true);
            (
                PressTarget::Element { id, was_selected },
                GestureState::DraggingElements { pointer, last: position },
            )
        } else if is_touch {
            (PressTarget::Background, GestureState::PanningCanvas { pointer, last: position })
        } else {
            let mode = if modifiers.additive() {
                MarqueeMode::Add
            } else {
                MarqueeMode::Replace
            };
            (
                PressTarget::Background,
                GestureState::MarqueeSelecting {
                    pointer,
                    marquee: Marquee::new(position, mode),
                },
            )
        };

        log::debug!("{} -> {}", self.state.name(), state.name());
        self.state = state;
        self.press = Some(Press {
            origin: position,
            last: position,
            target,
            modifiers,
            moved: false,
        });
    }

    fn pointer_move(&mut self, store: &mut SceneStore, pointer: PointerId, position: Point) {
        if self.state.pointer() != Some(pointer) {
            return;
        }
        let Some(press) = self.press.as_mut() else {
            return;
        };
        if !press.moved && (position - press.origin).hypot() > self.config.click_threshold {
            press.moved = true;
        }
        press.last = position;
        let moved = press.moved;

        let viewport = *store.scene().viewport();
        let step = match &mut self.state {
            GestureState::MarqueeSelecting { marquee, .. } => {
                marquee.update(position);
                Step::None
            }
            // Below the click threshold nothing moves; the first real step carries the
            // accumulated offset because `last` stays at the press position.
            _ if !moved => Step::None,
            GestureState::PanningCanvas { last, .. } => {
                let delta = position - *last;
                *last = position;
                Step::Pan(delta)
            }
            GestureState::DraggingElements { last, .. } => {
                let delta = viewport.screen_delta_to_canvas(position - *last);
                *last = position;
                Step::Move(delta)
            }
            GestureState::ResizingElement { corner, last, .. } => {
                let delta = viewport.screen_delta_to_canvas(position - *last);
                *last = position;
                Step::Resize(handle_resize_delta(*corner, delta))
            }
            GestureState::RotatingElement { center, last, .. } => {
                let current = viewport.screen_to_canvas(position);
                let degrees = rotation_delta(*center, *last, current);
                *last = current;
                Step::Rotate(degrees)
            }
            GestureState::Idle | GestureState::PinchZooming { .. } => Step::None,
        };

        match step {
            Step::None => {}
            Step::Pan(delta) => store.pan_by(delta),
            Step::Move(delta) => self.apply_step(store, |s| s.move_selected(delta.x, delta.y)),
            Step::Resize(delta) => self.apply_step(store, |s| s.resize_selected(delta.x, delta.y)),
            Step::Rotate(degrees) => self.apply_step(store, |s| s.rotate_selected(degrees)),
        }
    }

    fn pointer_up(
        &mut self,
        store: &mut SceneStore,
        pointer: PointerId,
        position: Point,
    ) -> Option<Effect> {
        if self.state.pointer() != Some(pointer) {
            return None;
        }
        self.pointer_move(store, pointer, position);

        let state = std::mem::take(&mut self.state);
        let press = self.press.take()?;
        log::debug!("{} -> Idle", state.name());

        match state {
            GestureState::MarqueeSelecting { marquee, .. } => {
                if marquee.is_click_through(self.config.marquee_threshold) {
                    self.click_background(store, &press)
                } else {
                    apply_marquee(store, &marquee);
                    None
                }
            }
            GestureState::DraggingElements { .. } => {
                store.set_dragging(false);
                if !press.moved {
                    self.click_element(store, &press);
                }
                None
            }
            GestureState::ResizingElement { .. } | GestureState::RotatingElement { .. } => {
                store.set_dragging(false);
                None
            }
            GestureState::PanningCanvas { .. } => {
                if !press.moved && press.target == PressTarget::Background {
                    self.click_background(store, &press)
                } else {
                    None
                }
            }
            GestureState::Idle | GestureState::PinchZooming { .. } => None,
        }
    }

    /// A click on empty background: deselect, or place an element with the active tool.
    fn click_background(&mut self, store: &mut SceneStore, press: &Press) -> Option<Effect> {
        if store.scene().has_selection() {
            if !press.modifiers.additive() {
                store.clear_selection();
            }
            return None;
        }
        if matches!(self.tool, Tool::Image) {
            return Some(Effect::PickImage(self.request_image()));
        }
        let center = store.scene().viewport().screen_to_canvas(press.last);
        let draft = self.tool.draft_at(center)?;
        let id = store.add_element(draft);
        log::debug!("placed {} at {:?}", id, center);
        None
    }

    /// A click on an element: refine the selection and flash a highlight.
    fn click_element(&mut self, store: &mut SceneStore, press: &Press) {
        let PressTarget::Element { id, was_selected } = press.target else {
            return;
        };
        if was_selected {
            store.select(id, press.modifiers.additive());
        }
        if store.scene().is_selected(id) {
            store.set_highlighted(id, true);
        }
    }

    fn wheel(&mut self, store: &mut SceneStore, position: Point, delta: Vec2, modifiers: Modifiers) {
        if !delta.y.is_finite() || delta.y == 0.0 {
            return;
        }
        if modifiers.wheel_zoom() {
            let factor = if delta.y > 0.0 {
                self.config.wheel_zoom_out
            } else {
                self.config.wheel_zoom_in
            };
            store.zoom_about(position, factor);
        } else if store.scene().has_selection() && self.state.is_idle() {
            let step = if delta.y > 0.0 {
                -self.config.wheel_resize_step
            } else {
                self.config.wheel_resize_step
            };
            store.undoable(|s| s.resize_selected(step, step));
        }
    }

    fn touch_start(&mut self, store: &mut SceneStore, touches: &[TouchPoint]) {
        if let [a, b, ..] = touches {
            if matches!(self.state, GestureState::PinchZooming { .. }) {
                return;
            }
            if !self.state.is_idle() {
                log::debug!("pinch pre-empts {}", self.state.name());
                self.cancel(store);
            }
            self.state = GestureState::PinchZooming {
                touches: (a.id, b.id),
                last_distance: (a.position - b.position).hypot(),
            };
            return;
        }
        if let Some(touch) = touches.first() {
            self.pointer_down(
                store,
                PointerId::Touch(touch.id),
                touch.position,
                MouseButton::Left,
                Modifiers::NONE,
            );
        }
    }

    fn touch_move(&mut self, store: &mut SceneStore, touches: &[TouchPoint]) {
        let find = |id: u64| touches.iter().find(|t| t.id == id).map(|t| t.position);

        if let GestureState::PinchZooming {
            touches: (a, b),
            last_distance,
        } = self.state
        {
            let (Some(pa), Some(pb)) = (find(a), find(b)) else {
                return;
            };
            let distance = (pa - pb).hypot();
            if last_distance > 0.0 && distance > 0.0 {
                store.zoom_about(pa.midpoint(pb), distance / last_distance);
            }
            self.state = GestureState::PinchZooming {
                touches: (a, b),
                last_distance: distance,
            };
            return;
        }

        if let Some(PointerId::Touch(id)) = self.state.pointer() {
            if let Some(position) = find(id) {
                self.pointer_move(store, PointerId::Touch(id), position);
            }
        }
    }

    fn touch_end(&mut self, store: &mut SceneStore, touches: &[TouchPoint]) -> Option<Effect> {
        let active = |id: u64| touches.iter().any(|t| t.id == id);

        if let GestureState::PinchZooming { touches: (a, b), .. } = self.state {
            if !(active(a) && active(b)) {
                log::debug!("PinchZooming -> Idle");
                self.state = GestureState::Idle;
                self.press = None;
            }
            return None;
        }

        match self.state.pointer() {
            Some(PointerId::Touch(id)) if !active(id) => {
                let position = self.press.map_or(Point::ZERO, |p| p.last);
                self.pointer_up(store, PointerId::Touch(id), position)
            }
            _ => None,
        }
    }

    fn key(&mut self, store: &mut SceneStore, event: &KeyEvent) {
        if self.text_editing {
            return;
        }
        if let Some(command) = shortcuts::resolve(event, &self.config) {
            self.run_command(store, command);
        }
    }

    /// Execute an editor command. Any active gesture is cancelled first.
    pub fn run_command(&mut self, store: &mut SceneStore, command: Command) {
        self.cancel(store);
        log::debug!("command {:?}", command);
        match command {
            Command::DeleteSelection => store.delete_selected(),
            Command::ClearSelection => store.clear_selection(),
            Command::Copy => {
                self.clipboard.copy(store.scene());
            }
            Command::Paste => {
                let drafts = self.clipboard.paste_drafts(self.config.paste_offset);
                store.add_elements(drafts);
            }
            Command::SelectAll => store.select_all(),
            Command::Undo => {
                store.undo();
            }
            Command::Redo => {
                store.redo();
            }
            Command::ResetView => store.set_viewport(ViewportPatch::reset()),
            Command::RotateSelection(degrees) => {
                store.undoable(|s| s.rotate_selected(degrees));
            }
            Command::ResizeSelection(dw, dh) => {
                store.undoable(|s| s.resize_selected(dw, dh));
            }
        }
    }

    /// Start an image placement outside of a canvas click (e.g. from a toolbar button).
    pub fn request_image(&mut self) -> PlacementTicket {
        let ticket = PlacementTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending_images.insert(ticket);
        ticket
    }

    /// Forget a pending placement, e.g. when the picker was dismissed.
    pub fn cancel_image(&mut self, ticket: PlacementTicket) {
        self.pending_images.remove(&ticket);
    }

    pub fn has_pending_images(&self) -> bool {
        !self.pending_images.is_empty()
    }

    /// Finish an asynchronous image placement.
    ///
    /// The element is centered on the view center under the viewport current *now*, not when
    /// the image was requested. Failures and unknown tickets drop the placement.
    pub fn complete_image_placement(
        &mut self,
        store: &mut SceneStore,
        ticket: PlacementTicket,
        result: Result<LoadedImage, ImageLoadError>,
    ) -> Option<ElementId> {
        if !self.pending_images.remove(&ticket) {
            log::warn!("Ignoring image for unknown placement {:?}", ticket);
            return None;
        }
        let image = match result {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Dropping image placement {:?}: {}", ticket, err);
                return None;
            }
        };
        let Some(size) = image.fitted_size(self.config.max_image_size) else {
            log::warn!("Dropping image placement {:?}: degenerate size", ticket);
            return None;
        };
        let screen_center = Point::new(self.screen_size.width / 2.0, self.screen_size.height / 2.0);
        let center = store.scene().viewport().screen_to_canvas(screen_center);
        let draft = ElementDraft::new(
            Geometry::centered_on(center, size),
            ElementKind::Image(ImageContent::new(image.src)),
        );
        Some(store.add_element(draft))
    }
}
