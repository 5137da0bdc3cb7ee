//! In-process clipboard of element snapshots.

use crate::elements::{Element, ElementDraft};
use crate::scene::Scene;

/// Copied elements. Holds snapshots, not ids, so later edits or deletes do not affect it.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<Element>,
    pastes: u32,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Snapshot the current selection in paint order. Returns how many elements were copied;
    /// an empty selection leaves the clipboard untouched.
    pub fn copy(&mut self, scene: &Scene) -> usize {
        let items: Vec<Element> = scene.selection().map(Element::persisted).collect();
        if items.is_empty() {
            return 0;
        }
        self.items = items;
        self.pastes = 0;
        self.items.len()
    }

    /// Drafts for the next paste, shifted by `offset` times the number of pastes so far
    /// (including this one).
    pub fn paste_drafts(&mut self, offset: f64) -> Vec<ElementDraft> {
        if self.items.is_empty() {
            return Vec::new();
        }
        self.pastes += 1;
        let shift = offset * f64::from(self.pastes);
        self.items
            .iter()
            .map(|item| {
                let mut draft = item.to_draft();
                draft.geometry.x += shift;
                draft.geometry.y += shift;
                draft
            })
            .collect()
    }
}
