//! Scene model and the store that owns it.
//!
//! [`SceneStore`] is the only place a [`Scene`] is mutated. Every operation is synchronous,
//! treats unknown ids as a silent no-op, and leaves the scene satisfying its invariants:
//! the selection set and the per-element `selected` flags agree, z-indices are unique, and
//! geometry stays finite and clamped.

use crate::elements::{Element, ElementDraft, ElementId, ElementPatch};
use crate::geometry::{clamp_dimension, rotate_about_center};
use crate::viewport::{Viewport, ViewportPatch};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Default number of undo snapshots kept.
pub const DEFAULT_UNDO_HISTORY: usize = 50;

/// Elements in paint order, the selection and the viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    elements: Vec<Element>,
    #[serde(default)]
    selected_ids: HashSet<ElementId>,
    #[serde(default)]
    viewport: Viewport,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements in paint order, bottom first.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn selected_ids(&self) -> &HashSet<ElementId> {
        &self.selected_ids
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_ids.is_empty()
    }

    /// Selected elements in paint order.
    pub fn selection(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| self.selected_ids.contains(&e.id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Topmost element containing the canvas point (rotation aware).
    pub fn element_at(&self, point: Point) -> Option<&Element> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.geometry.contains(point))
    }

    fn max_z_index(&self) -> Option<u64> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    fn next_z_index(&self) -> u64 {
        self.max_z_index().map_or(0, |z| z + 1)
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Copy without transient interaction flags, suitable for persistence.
    pub fn snapshot(&self) -> Self {
        Self {
            elements: self.elements.iter().map(Element::persisted).collect(),
            selected_ids: self.selected_ids.clone(),
            viewport: self.viewport,
        }
    }

    /// Whether every scene invariant currently holds.
    pub fn is_consistent(&self) -> bool {
        let ids: HashSet<ElementId> = self.elements.iter().map(|e| e.id).collect();
        let z: HashSet<u64> = self.elements.iter().map(|e| e.z_index).collect();
        let ordered = self.elements.windows(2).all(|w| w[0].z_index < w[1].z_index);
        ids.len() == self.elements.len()
            && z.len() == self.elements.len()
            && ordered
            && self.selected_ids.iter().all(|id| ids.contains(id))
            && self
                .elements
                .iter()
                .all(|e| e.selected == self.selected_ids.contains(&e.id))
            && self.elements.iter().all(|e| {
                e.geometry.is_finite()
                    && e.geometry.width >= crate::geometry::MIN_ELEMENT_SIZE
                    && e.geometry.height >= crate::geometry::MIN_ELEMENT_SIZE
                    && (0.0..360.0).contains(&e.geometry.rotation)
                    && e.geometry.scale > 0.0
            })
            && (crate::viewport::MIN_ZOOM..=crate::viewport::MAX_ZOOM)
                .contains(&self.viewport.zoom)
    }

    /// Repair a scene from an untrusted source so that every invariant holds.
    pub fn sanitized(mut self) -> Self {
        let mut seen = HashSet::new();
        self.elements.retain(|e| seen.insert(e.id));
        // Stable sort keeps file order for duplicate z-indices
        self.elements.sort_by_key(|e| e.z_index);
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.z_index = index as u64;
            element.geometry = element.geometry.sanitized();
            element.is_dragging = false;
            element.is_highlighted = false;
        }
        self.viewport = self.viewport.sanitized();
        self.resync_selection();
        self
    }

    /// Drop unknown selected ids and rewrite every `selected` flag from the set.
    fn resync_selection(&mut self) {
        let ids: HashSet<ElementId> = self.elements.iter().map(|e| e.id).collect();
        self.selected_ids.retain(|id| ids.contains(id));
        for element in &mut self.elements {
            element.selected = self.selected_ids.contains(&element.id);
        }
    }

    fn renumber(&mut self) {
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.z_index = index as u64;
        }
    }
}

/// What an effective mutation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneChange {
    /// Elements were added; they are now the selection.
    Added(Vec<ElementId>),
    /// Element fields changed.
    Updated(Vec<ElementId>),
    /// Elements were removed.
    Removed(Vec<ElementId>),
    /// Paint order changed.
    Reordered,
    /// Selection changed.
    Selection,
    /// Viewport changed.
    Viewport,
    /// Transient flags changed.
    Interaction(Vec<ElementId>),
    /// The element list was replaced (load, undo, redo, clear).
    Replaced,
}

/// Handle returned by [`SceneStore::subscribe`].
pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&SceneChange, &Scene)>;

/// Paint-order operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZOrder {
    Front,
    Back,
    Forward,
    Backward,
}

/// Owner of the scene. Notifies subscribers after every effective change.
pub struct SceneStore {
    scene: Scene,
    undo_stack: Vec<Vec<Element>>,
    redo_stack: Vec<Vec<Element>>,
    history_limit: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    revision: u64,
}

impl fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneStore")
            .field("scene", &self.scene)
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("listeners", &format!("<{} listeners>", self.listeners.len()))
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self::with_scene(Scene::new())
    }

    /// Create a store around an existing scene, repairing it first.
    pub fn with_scene(scene: Scene) -> Self {
        Self {
            scene: scene.sanitized(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            history_limit: DEFAULT_UNDO_HISTORY,
            listeners: Vec::new(),
            next_subscription: 0,
            revision: 0,
        }
    }

    /// Read-only view of the current scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Counter bumped by every effective change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        self.trim_history();
    }

    /// Register a change callback.
    pub fn subscribe(&mut self, listener: impl FnMut(&SceneChange, &Scene) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn commit(&mut self, change: SceneChange) {
        self.revision += 1;
        log::trace!("scene change r{}: {:?}", self.revision, change);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change, &self.scene);
        }
    }

    // --- history ---

    fn trim_history(&mut self) {
        if self.undo_stack.len() > self.history_limit {
            let excess = self.undo_stack.len() - self.history_limit;
            self.undo_stack.drain(..excess);
        }
    }

    fn persisted_elements(&self) -> Vec<Element> {
        self.scene.elements.iter().map(Element::persisted).collect()
    }

    fn push_undo(&mut self, snapshot: Vec<Element>) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        self.trim_history();
    }

    /// Record the current elements as an undo step and clear redo.
    pub fn checkpoint(&mut self) {
        let snapshot = self.persisted_elements();
        self.push_undo(snapshot);
    }

    /// Run `edit` as one undo step. The step is recorded only if the edit changed the scene;
    /// otherwise history and redo are left alone. Returns whether anything changed.
    pub fn undoable(&mut self, edit: impl FnOnce(&mut Self)) -> bool {
        let before = self.persisted_elements();
        let revision = self.revision;
        edit(self);
        if self.revision == revision {
            return false;
        }
        self.push_undo(before);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Restore the previous checkpoint. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.persisted_elements();
        self.redo_stack.push(current);
        self.restore_elements(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.persisted_elements();
        self.undo_stack.push(current);
        self.restore_elements(snapshot);
        true
    }

    fn restore_elements(&mut self, elements: Vec<Element>) {
        self.scene.elements = elements;
        self.scene.resync_selection();
        self.commit(SceneChange::Replaced);
    }

    // --- element lifecycle ---

    /// Add an element with a fresh id and the next z-index; it becomes the sole selection.
    pub fn add_element(&mut self, draft: ElementDraft) -> ElementId {
        self.checkpoint();
        let id = self.insert(draft);
        self.scene.selected_ids.clear();
        self.scene.selected_ids.insert(id);
        self.scene.resync_selection();
        self.commit(SceneChange::Added(vec![id]));
        id
    }

    /// Add several elements in order at the top of the paint order; together they become
    /// the selection.
    pub fn add_elements(&mut self, drafts: Vec<ElementDraft>) -> Vec<ElementId> {
        if drafts.is_empty() {
            return Vec::new();
        }
        self.checkpoint();
        let ids: Vec<ElementId> = drafts.into_iter().map(|d| self.insert(d)).collect();
        self.scene.selected_ids = ids.iter().copied().collect();
        self.scene.resync_selection();
        self.commit(SceneChange::Added(ids.clone()));
        ids
    }

    fn insert(&mut self, draft: ElementDraft) -> ElementId {
        let id = Uuid::new_v4();
        let z_index = self.scene.next_z_index();
        self.scene
            .elements
            .push(Element::from_draft(draft, id, z_index));
        id
    }

    /// Merge `patch` into the element with `id`. Missing ids are ignored.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) {
        self.update_elements(&[id], patch);
    }

    /// Merge `patch` into every element whose id is listed.
    pub fn update_elements(&mut self, ids: &[ElementId], patch: &ElementPatch) {
        let mut changed = Vec::new();
        for element in &mut self.scene.elements {
            if ids.contains(&element.id) && patch.apply(element) {
                changed.push(element.id);
            }
        }
        if !changed.is_empty() {
            self.commit(SceneChange::Updated(changed));
        }
    }

    /// Remove every selected element and clear the selection.
    pub fn delete_selected(&mut self) {
        if self.scene.selected_ids.is_empty() {
            return;
        }
        self.checkpoint();
        let selected = std::mem::take(&mut self.scene.selected_ids);
        let removed: Vec<ElementId> = self
            .scene
            .elements
            .iter()
            .filter(|e| selected.contains(&e.id))
            .map(|e| e.id)
            .collect();
        self.scene.elements.retain(|e| !selected.contains(&e.id));
        self.commit(SceneChange::Removed(removed));
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        if self.scene.elements.is_empty() {
            return;
        }
        self.checkpoint();
        self.scene.elements.clear();
        self.scene.selected_ids.clear();
        self.commit(SceneChange::Replaced);
    }

    /// Replace the whole scene, e.g. after loading a snapshot. History is discarded.
    pub fn replace_scene(&mut self, scene: Scene) {
        self.scene = scene.sanitized();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.commit(SceneChange::Replaced);
    }

    /// Move an element in the paint order.
    pub fn reorder(&mut self, id: ElementId, order: ZOrder) {
        let Some(index) = self.scene.index_of(id) else {
            return;
        };
        let last = self.scene.elements.len() - 1;
        let target = match order {
            ZOrder::Front => last,
            ZOrder::Back => 0,
            ZOrder::Forward => (index + 1).min(last),
            ZOrder::Backward => index.saturating_sub(1),
        };
        if target == index {
            return;
        }
        self.checkpoint();
        let element = self.scene.elements.remove(index);
        self.scene.elements.insert(target, element);
        self.scene.renumber();
        self.commit(SceneChange::Reordered);
    }

    // --- selection ---

    /// Select `id`. Non-additive makes it the sole selection; additive toggles membership.
    pub fn select(&mut self, id: ElementId, additive: bool) {
        if self.scene.index_of(id).is_none() {
            return;
        }
        let before = self.scene.selected_ids.clone();
        if additive {
            if !self.scene.selected_ids.remove(&id) {
                self.scene.selected_ids.insert(id);
            }
        } else {
            self.scene.selected_ids.clear();
            self.scene.selected_ids.insert(id);
        }
        self.finish_selection(before);
    }

    /// Replace the selection with the given ids; unknown ids are dropped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        let before = self.scene.selected_ids.clone();
        self.scene.selected_ids = ids.into_iter().collect();
        self.finish_selection(before);
    }

    /// Add the given ids to the selection.
    pub fn extend_selection(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        let before = self.scene.selected_ids.clone();
        self.scene.selected_ids.extend(ids);
        self.finish_selection(before);
    }

    pub fn select_all(&mut self) {
        let ids: Vec<ElementId> = self.scene.elements.iter().map(|e| e.id).collect();
        self.set_selection(ids);
    }

    pub fn clear_selection(&mut self) {
        let before = std::mem::take(&mut self.scene.selected_ids);
        self.finish_selection(before);
    }

    fn finish_selection(&mut self, before: HashSet<ElementId>) {
        self.scene.resync_selection();
        if self.scene.selected_ids != before {
            self.commit(SceneChange::Selection);
        }
    }

    // --- bulk geometry on the selection ---

    fn update_selected(&mut self, mut f: impl FnMut(&mut Element)) {
        let mut changed = Vec::new();
        for element in &mut self.scene.elements {
            if !element.selected {
                continue;
            }
            let before = element.geometry;
            f(element);
            if element.geometry != before {
                changed.push(element.id);
            }
        }
        if !changed.is_empty() {
            self.commit(SceneChange::Updated(changed));
        }
    }

    /// Translate every selected element by the same canvas delta.
    pub fn move_selected(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.update_selected(|e| {
            e.geometry.x += dx;
            e.geometry.y += dy;
        });
    }

    /// Rotate every selected element by `degrees` about its own center.
    pub fn rotate_selected(&mut self, degrees: f64) {
        if !degrees.is_finite() {
            return;
        }
        self.update_selected(|e| {
            e.geometry.rotation = rotate_about_center(e.geometry.rotation, degrees);
        });
    }

    /// Add the same raw size delta to every selected element, clamped per element.
    pub fn resize_selected(&mut self, dw: f64, dh: f64) {
        if !(dw.is_finite() && dh.is_finite()) {
            return;
        }
        self.update_selected(|e| {
            e.geometry.width = clamp_dimension(e.geometry.width + dw);
            e.geometry.height = clamp_dimension(e.geometry.height + dh);
        });
    }

    // --- viewport ---

    /// Merge a partial viewport update, clamping the zoom.
    pub fn set_viewport(&mut self, patch: ViewportPatch) {
        let next = self.scene.viewport.patched(&patch);
        if next != self.scene.viewport {
            self.scene.viewport = next;
            self.commit(SceneChange::Viewport);
        }
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        let next = self.scene.viewport.panned(delta);
        self.set_viewport(next.into());
    }

    /// Zoom by `factor` keeping the canvas point under `screen_pivot` fixed.
    pub fn zoom_about(&mut self, screen_pivot: Point, factor: f64) {
        let next = self.scene.viewport.zoomed_about(screen_pivot, factor);
        self.set_viewport(next.into());
    }

    // --- transient flags ---

    /// Set `is_dragging` on every selected element (and clear it elsewhere).
    pub fn set_dragging(&mut self, dragging: bool) {
        let mut changed = Vec::new();
        for element in &mut self.scene.elements {
            let value = dragging && element.selected;
            if element.is_dragging != value {
                element.is_dragging = value;
                changed.push(element.id);
            }
        }
        if !changed.is_empty() {
            self.commit(SceneChange::Interaction(changed));
        }
    }

    pub fn set_highlighted(&mut self, id: ElementId, highlighted: bool) {
        let Some(index) = self.scene.index_of(id) else {
            return;
        };
        let element = &mut self.scene.elements[index];
        if element.is_highlighted != highlighted {
            element.is_highlighted = highlighted;
            self.commit(SceneChange::Interaction(vec![id]));
        }
    }

    pub fn clear_highlights(&mut self) {
        let mut changed = Vec::new();
        for element in &mut self.scene.elements {
            if element.is_highlighted {
                element.is_highlighted = false;
                changed.push(element.id);
            }
        }
        if !changed.is_empty() {
            self.commit(SceneChange::Interaction(changed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_with_rect(x: f64, y: f64) -> (SceneStore, ElementId) {
        let mut store = SceneStore::new();
        let id = store.add_element(ElementDraft::rectangle(x, y, 100.0, 100.0));
        (store, id)
    }

    #[test]
    fn test_add_assigns_increasing_z_and_sole_selection() {
        let mut store = SceneStore::new();
        let first = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let second = store.add_element(ElementDraft::rectangle(10.0, 10.0, 50.0, 50.0));

        let scene = store.scene();
        assert_eq!(scene.get(first).unwrap().z_index, 0);
        assert_eq!(scene.get(second).unwrap().z_index, 1);
        assert_eq!(scene.selected_ids().len(), 1);
        assert!(scene.is_selected(second));
        assert!(!scene.get(first).unwrap().selected);
        assert!(scene.is_consistent());
    }

    #[test]
    fn test_move_selected() {
        let mut store = SceneStore::new();
        let id = store.add_element(ElementDraft::rectangle(0.0, 0.0, 100.0, 100.0));
        store.clear_selection();
        store.select(id, false);
        store.move_selected(10.0, -5.0);

        let element = store.scene().get(id).unwrap();
        assert!((element.geometry.x - 10.0).abs() < f64::EPSILON);
        assert!((element.geometry.y + 5.0).abs() < f64::EPSILON);
        assert!((element.geometry.width - 100.0).abs() < f64::EPSILON);
        assert!(element.selected);
        assert_eq!(store.scene().selected_ids().len(), 1);
        assert!(store.scene().is_selected(id));
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let (mut store, _) = store_with_rect(0.0, 0.0);
        let before = store.scene().clone();
        let revision = store.revision();
        store.update_element(Uuid::new_v4(), &ElementPatch::position(99.0, 99.0));
        assert_eq!(store.scene(), &before);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_update_elements_bulk() {
        let mut store = SceneStore::new();
        let a = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        store.update_elements(&[a, b], &ElementPatch::rotation(45.0));
        for id in [a, b] {
            assert!((store.scene().get(id).unwrap().geometry.rotation - 45.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_select_additive_toggles() {
        let mut store = SceneStore::new();
        let a = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));

        store.select(a, true);
        assert!(store.scene().is_selected(a) && store.scene().is_selected(b));
        store.select(b, true);
        assert!(store.scene().is_selected(a) && !store.scene().is_selected(b));
        store.select(b, false);
        assert_eq!(store.scene().selected_ids().len(), 1);
        assert!(store.scene().is_consistent());
    }

    #[test]
    fn test_select_missing_is_noop() {
        let (mut store, id) = store_with_rect(0.0, 0.0);
        store.select(Uuid::new_v4(), false);
        assert!(store.scene().is_selected(id));
    }

    #[test]
    fn test_delete_selected() {
        let mut store = SceneStore::new();
        let a = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        store.delete_selected();
        assert!(store.scene().get(b).is_none());
        assert!(store.scene().get(a).is_some());
        assert!(!store.scene().has_selection());
        assert!(store.scene().is_consistent());
    }

    #[test]
    fn test_z_index_stays_unique_after_delete_and_add() {
        let mut store = SceneStore::new();
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        store.select(b, false);
        store.delete_selected();
        let c = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        assert_eq!(store.scene().get(c).unwrap().z_index, 3);
        assert!(store.scene().is_consistent());
    }

    #[test]
    fn test_rotate_and_resize_selected_clamp() {
        let (mut store, id) = store_with_rect(0.0, 0.0);
        store.rotate_selected(350.0);
        store.rotate_selected(20.0);
        store.resize_selected(-500.0, 20.0);
        let g = store.scene().get(id).unwrap().geometry;
        assert!((g.rotation - 10.0).abs() < 1e-9);
        assert!((g.width - 10.0).abs() < f64::EPSILON);
        assert!((g.height - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_applies_same_raw_delta() {
        let mut store = SceneStore::new();
        let a = store.add_element(ElementDraft::rectangle(0.0, 0.0, 100.0, 100.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 20.0, 200.0));
        store.select_all();
        store.resize_selected(-15.0, 10.0);
        let ga = store.scene().get(a).unwrap().geometry;
        let gb = store.scene().get(b).unwrap().geometry;
        assert!((ga.width - 85.0).abs() < f64::EPSILON);
        assert!((gb.width - 10.0).abs() < f64::EPSILON);
        assert!((gb.height - 210.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_viewport_clamps_zoom() {
        let mut store = SceneStore::new();
        store.set_viewport(ViewportPatch {
            pan: None,
            zoom: Some(0.0001),
        });
        assert!((store.scene().viewport().zoom - crate::viewport::MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reorder_renumbers() {
        let mut store = SceneStore::new();
        let a = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let c = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));

        store.reorder(a, ZOrder::Front);
        let order: Vec<ElementId> = store.scene().elements().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, c, a]);

        store.reorder(a, ZOrder::Backward);
        let order: Vec<ElementId> = store.scene().elements().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, a, c]);

        store.reorder(c, ZOrder::Back);
        let order: Vec<ElementId> = store.scene().elements().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![c, b, a]);
        assert!(store.scene().is_consistent());
    }

    #[test]
    fn test_element_at_returns_topmost() {
        let mut store = SceneStore::new();
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 100.0, 100.0));
        let top = store.add_element(ElementDraft::rectangle(50.0, 50.0, 100.0, 100.0));
        assert_eq!(store.scene().element_at(Point::new(75.0, 75.0)).map(|e| e.id), Some(top));
        assert!(store.scene().element_at(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_undo_redo_restores_elements_and_prunes_selection() {
        let mut store = SceneStore::new();
        let a = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        assert!(store.scene().is_selected(b));

        assert!(store.undo());
        assert!(store.scene().get(b).is_none());
        assert!(store.scene().get(a).is_some());
        assert!(!store.scene().has_selection());
        assert!(store.scene().is_consistent());

        assert!(store.redo());
        assert!(store.scene().get(b).is_some());
        assert!(store.scene().is_consistent());
    }

    #[test]
    fn test_history_limit() {
        let mut store = SceneStore::new();
        store.set_history_limit(3);
        for _ in 0..10 {
            store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        }
        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(store.scene().len(), 7);
    }

    #[test]
    fn test_undoable_skips_no_op_edits() {
        let mut store = SceneStore::new();
        let id = store.add_element(ElementDraft::rectangle(0.0, 0.0, 10.0, 10.0));
        assert!(store.undoable(|s| s.move_selected(5.0, 5.0)));
        assert!(store.undo());
        assert!(store.can_redo());

        assert!(!store.undoable(|s| s.resize_selected(-20.0, -20.0)));
        assert!(!store.undoable(|s| s.move_selected(0.0, 0.0)));
        assert!(store.can_redo());

        // One step for the move and one for the add
        assert!(store.redo());
        assert!((store.scene().get(id).unwrap().geometry.x - 5.0).abs() < f64::EPSILON);
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
    }

    #[test]
    fn test_subscribers_see_effective_changes_only() {
        let mut store = SceneStore::new();
        let seen: Rc<RefCell<Vec<SceneChange>>> = Rc::default();
        let sink = seen.clone();
        store.subscribe(move |change, scene| {
            assert!(scene.is_consistent());
            sink.borrow_mut().push(change.clone());
        });

        let id = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        store.select(id, false); // already the sole selection
        store.move_selected(0.0, 0.0);
        store.move_selected(1.0, 0.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], SceneChange::Added(vec![id]));
        assert_eq!(seen[1], SceneChange::Updated(vec![id]));
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = SceneStore::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let sub = store.subscribe(move |_, _| *sink.borrow_mut() += 1);
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        assert!(store.unsubscribe(sub));
        store.clear();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_dragging_flags_follow_selection() {
        let mut store = SceneStore::new();
        let a = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(ElementDraft::rectangle(0.0, 0.0, 50.0, 50.0));
        store.set_dragging(true);
        assert!(store.scene().get(b).unwrap().is_dragging);
        assert!(!store.scene().get(a).unwrap().is_dragging);
        store.set_dragging(false);
        assert!(!store.scene().get(b).unwrap().is_dragging);
    }

    #[test]
    fn test_snapshot_drops_transient_flags() {
        let (mut store, id) = store_with_rect(0.0, 0.0);
        store.set_dragging(true);
        store.set_highlighted(id, true);
        let snapshot = store.scene().snapshot();
        let element = snapshot.get(id).unwrap();
        assert!(!element.is_dragging && !element.is_highlighted);
        assert!(element.selected);
    }

    #[test]
    fn test_sanitized_repairs_untrusted_scene() {
        let (store, id) = store_with_rect(0.0, 0.0);
        let mut json = serde_json::to_value(store.scene()).unwrap();
        json["elements"][0]["width"] = serde_json::json!(1.0);
        json["elements"][0]["selected"] = serde_json::json!(false);
        json["viewport"]["zoom"] = serde_json::json!(99.0);
        let scene: Scene = serde_json::from_value(json).unwrap();
        let scene = scene.sanitized();
        assert!(scene.is_consistent());
        assert!(scene.get(id).unwrap().selected);
        assert!((scene.viewport().zoom - crate::viewport::MAX_ZOOM).abs() < f64::EPSILON);
    }
}
