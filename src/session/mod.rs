//! Host drawing session interfaces.
//!
//! The pipeline reaches the outside world only through these traits:
//! element selection, attribute lookup, persistence of new geometry and
//! interactive prompts.

mod memory;
mod prompt;

pub use memory::MemoryDrawing;
pub use prompt::{ConsolePrompt, DeclinePrompt, ScriptedPrompt};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::kernel::SolidId;
use crate::model::{Element, ElementId, ElementKind, Extents, LineSegment};

/// Element selection. `None` means the user cancelled.
pub trait Selection {
    /// Select elements of one kind.
    fn select_by_kind(&mut self, kind: ElementKind) -> Option<Vec<ElementId>>;

    /// Select every element touching or inside a window.
    fn select_crossing(&mut self, window: &Extents) -> Option<Vec<ElementId>>;
}

/// Attribute tags attached to block-style components.
pub trait Metadata {
    fn tags_of(&self, id: ElementId) -> BTreeMap<String, String>;
}

/// Geometry created by the pipeline, handed to the drawing on commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NewEntity {
    /// A kernel solid to be appended to model space.
    Solid { part: ElementId, solid: SolidId },
    /// A line annotation on the given layer.
    Annotation {
        part: ElementId,
        layer: String,
        line: LineSegment,
    },
}

impl NewEntity {
    /// Part the entity was created for.
    pub fn part(&self) -> ElementId {
        match self {
            NewEntity::Solid { part, .. } | NewEntity::Annotation { part, .. } => *part,
        }
    }
}

/// The drawing database.
pub trait Drawing: Selection + Metadata {
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// Append committed geometry. Called once per batch.
    fn persist(&mut self, entities: Vec<NewEntity>) -> Result<()>;
}

/// Numeric prompt restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberConstraints {
    pub allow_negative: bool,
    pub allow_zero: bool,
}

impl NumberConstraints {
    /// Positive, non-zero values only.
    pub const POSITIVE: NumberConstraints = NumberConstraints {
        allow_negative: false,
        allow_zero: false,
    };

    /// Check a candidate answer.
    pub fn accepts(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if value == 0.0 {
            return self.allow_zero;
        }
        value > 0.0 || self.allow_negative
    }
}

/// Interactive user I/O.
pub trait Interaction {
    /// Ask for a number. `None` means the user declined.
    fn prompt_number(
        &mut self,
        message: &str,
        default: f64,
        constraints: NumberConstraints,
    ) -> Option<f64>;

    /// Show a diagnostic message.
    fn message(&mut self, text: &str);
}
