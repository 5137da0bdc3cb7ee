//! JSON export and import of scenes.
//!
//! The document format is `{ "elements": [Element, ...] }`. Import ignores incoming ids,
//! assigns fresh ones and appends the elements on top of the paint order, keeping their
//! relative order.

use crate::elements::{Element, ElementDraft, ElementId, ElementKind, Geometry};
use crate::scene::{Scene, SceneStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Export/import errors. The scene is never modified when one is returned.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Invalid scene document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid element at index {index}: {reason}")]
    InvalidElement { index: usize, reason: String },
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Exported document.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub elements: Vec<Element>,
}

/// Element as read from a document. Ids and selection state are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedElement {
    #[serde(flatten)]
    geometry: Geometry,
    #[serde(default)]
    z_index: Option<u64>,
    kind: ElementKind,
}

#[derive(Debug, Deserialize)]
struct ImportDocument {
    elements: Vec<ImportedElement>,
}

/// Serialize the scene's elements in paint order, without transient flags.
pub fn export_json(scene: &Scene) -> ExchangeResult<String> {
    let document = ExportDocument {
        elements: scene.elements().iter().map(Element::persisted).collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse and validate a document into drafts, ordered by their stored z-index.
pub fn parse_import(json: &str) -> ExchangeResult<Vec<ElementDraft>> {
    let document: ImportDocument = serde_json::from_str(json)?;

    let mut indexed = Vec::with_capacity(document.elements.len());
    for (index, element) in document.elements.into_iter().enumerate() {
        if !element.geometry.is_finite() {
            return Err(ExchangeError::InvalidElement {
                index,
                reason: "geometry is not finite".to_string(),
            });
        }
        if element.geometry.width <= 0.0 || element.geometry.height <= 0.0 {
            return Err(ExchangeError::InvalidElement {
                index,
                reason: "size must be positive".to_string(),
            });
        }
        // Elements without a z-index keep their document position.
        let order = element.z_index.unwrap_or(index as u64);
        indexed.push((order, ElementDraft::new(element.geometry, element.kind)));
    }
    indexed.sort_by_key(|(order, _)| *order);

    Ok(indexed.into_iter().map(|(_, draft)| draft).collect())
}

/// Import a document into the store. The imported elements become the selection.
pub fn import_json(store: &mut SceneStore, json: &str) -> ExchangeResult<Vec<ElementId>> {
    let drafts = parse_import(json)?;
    let ids = store.add_elements(drafts);
    log::info!("Imported {} element(s)", ids.len());
    Ok(ids)
}
