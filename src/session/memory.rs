//! In-memory drawing database, loadable from JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Drawing, Metadata, NewEntity, Selection};
use crate::error::{ConvertError, Result};
use crate::kernel::SolidId;
use crate::model::{Element, ElementId, ElementKind, Extents, Geometry, Point2};

/// A drawing held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDrawing {
    /// Elements in insertion order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Solids appended by committed batches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solids: Vec<CommittedSolid>,
}

/// A solid appended to model space, tagged with its part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedSolid {
    pub part: ElementId,
    pub solid: SolidId,
}

impl MemoryDrawing {
    /// Create an empty drawing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a drawing from JSON.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a drawing from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// One past the highest id in use, or `None` once `u64::MAX` is taken.
    fn next_id(&self) -> Option<ElementId> {
        let max = self.elements.iter().map(|e| e.id.0).max().unwrap_or(0);
        max.checked_add(1).map(ElementId)
    }

    /// Lowest positive id not in use.
    fn free_id(&self) -> ElementId {
        let mut used: Vec<u64> = self.elements.iter().map(|e| e.id.0).collect();
        used.sort_unstable();
        used.dedup();
        let mut candidate = 1;
        for id in used {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }
        ElementId(candidate)
    }

    fn allocate_id(&self) -> ElementId {
        self.next_id().unwrap_or_else(|| self.free_id())
    }

    /// Add an element on a layer and return its handle.
    ///
    /// Ids grow from the highest one in use. When that is `u64::MAX` the
    /// lowest free id is reused instead.
    pub fn add(&mut self, layer: &str, geometry: Geometry) -> ElementId {
        let id = self.allocate_id();
        self.elements.push(Element::new(id, layer, geometry));
        id
    }

    /// Add a prepared element. Its id is replaced if already taken.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        if self.elements.iter().any(|e| e.id == element.id) {
            element.id = self.allocate_id();
        }
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Add a closed polyline.
    pub fn add_polyline(&mut self, layer: &str, vertices: &[Point2], closed: bool) -> ElementId {
        self.add(
            layer,
            Geometry::Polyline {
                vertices: vertices.to_vec(),
                closed,
            },
        )
    }

    /// Add a circle.
    pub fn add_circle(&mut self, layer: &str, center: Point2, radius: f64) -> ElementId {
        self.add(layer, Geometry::Circle { center, radius })
    }

    /// Add a border block reference with attribute tags.
    pub fn add_border(
        &mut self,
        name: &str,
        extents: Extents,
        attributes: &[(&str, &str)],
    ) -> ElementId {
        let attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.add(
            "0",
            Geometry::BlockReference {
                name: name.to_string(),
                extents,
                attributes,
            },
        )
    }

    /// Elements on a layer (exact match).
    pub fn on_layer<'a>(&'a self, layer: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.layer == layer)
    }
}

impl Selection for MemoryDrawing {
    fn select_by_kind(&mut self, kind: ElementKind) -> Option<Vec<ElementId>> {
        Some(
            self.elements
                .iter()
                .filter(|e| e.kind() == kind)
                .map(|e| e.id)
                .collect(),
        )
    }

    fn select_crossing(&mut self, window: &Extents) -> Option<Vec<ElementId>> {
        Some(
            self.elements
                .iter()
                .filter(|e| e.extents().is_some_and(|x| x.overlaps(window)))
                .map(|e| e.id)
                .collect(),
        )
    }
}

impl Metadata for MemoryDrawing {
    fn tags_of(&self, id: ElementId) -> BTreeMap<String, String> {
        match self.element(id).map(|e| &e.geometry) {
            Some(Geometry::BlockReference { attributes, .. }) => attributes.clone(),
            _ => BTreeMap::new(),
        }
    }
}

impl Drawing for MemoryDrawing {
    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn persist(&mut self, entities: Vec<NewEntity>) -> Result<()> {
        // committed lines always land after every existing element
        let annotations = entities
            .iter()
            .filter(|e| matches!(e, NewEntity::Annotation { .. }))
            .count() as u64;
        let last = self.elements.iter().map(|e| e.id.0).max().unwrap_or(0);
        if annotations > 0 && last.checked_add(annotations).is_none() {
            return Err(ConvertError::PersistFailed {
                message: format!(
                    "no element ids left for {} annotation line(s) after {}",
                    annotations,
                    ElementId(last)
                ),
            });
        }

        for entity in entities {
            match entity {
                NewEntity::Solid { part, solid } => {
                    self.solids.push(CommittedSolid { part, solid });
                }
                NewEntity::Annotation { layer, line, .. } => {
                    let id = self.next_id().ok_or_else(|| ConvertError::PersistFailed {
                        message: "element ids exhausted".to_string(),
                    })?;
                    self.elements.push(Element::new(
                        id,
                        layer,
                        Geometry::Line {
                            start: line.start,
                            end: line.end,
                        },
                    ));
                    debug!("Appended annotation line {}", id);
                }
            }
        }
        Ok(())
    }
}
