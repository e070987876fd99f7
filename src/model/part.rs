//! Part instance and the per-curve records the pipeline produces for it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ElementId, Extents};
use crate::kernel::SolidHandle;

/// Curve class as far as extrusion is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Polyline to be turned into a region and extruded.
    ClosedPolyline,
    /// Circle to be turned into a cylinder.
    Circle,
    /// Anything else; never extruded.
    Other,
}

/// Reference to one classified drawing element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRef {
    pub id: ElementId,
    pub kind: CurveKind,
    pub layer: String,
}

/// Lifecycle status of a part instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartStatus {
    #[default]
    Pending,
    Converted,
    /// Nothing to convert; the drawing is untouched.
    Skipped,
    Failed,
}

/// Pipeline stage a part instance has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Selected,
    MetadataResolved,
    CurvesGathered,
    Extruded,
    Composed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Selected => "selected",
            Stage::MetadataResolved => "metadata resolved",
            Stage::CurvesGathered => "curves gathered",
            Stage::Extruded => "extruded",
            Stage::Composed => "composed",
        };
        f.write_str(name)
    }
}

/// One CNC border nominated for conversion.
#[derive(Debug, Clone)]
pub struct PartInstance {
    /// The border block reference.
    pub border: ElementId,
    /// Block name of the border.
    pub name: String,
    /// Geometric extents of the border.
    pub bounds: Extents,
    /// Nominal board thickness; 0 until resolved.
    pub thickness: f64,
    /// Candidate curves inside the border.
    pub curves: Vec<CurveRef>,
    pub status: PartStatus,
    pub stage: Stage,
}

impl PartInstance {
    /// Create a new pending instance.
    pub fn new(border: ElementId, name: impl Into<String>, bounds: Extents) -> Self {
        Self {
            border,
            name: name.into(),
            bounds,
            thickness: 0.0,
            curves: Vec::new(),
            status: PartStatus::Pending,
            stage: Stage::Selected,
        }
    }

    /// Move to the next stage.
    pub fn advance(&mut self, stage: Stage) {
        tracing::debug!("Part {}: {} -> {}", self.border, self.stage, stage);
        self.stage = stage;
    }

    /// Number of curves that will be handed to the extrusion engine.
    pub fn usable_curves(&self) -> usize {
        self.curves
            .iter()
            .filter(|c| c.kind != CurveKind::Other)
            .count()
    }
}

/// A solid produced from one curve of a part.
#[derive(Debug)]
pub struct ExtrudedSolid {
    /// Owning part (border element).
    pub part: ElementId,
    /// Curve the solid was extruded from.
    pub source: ElementId,
    /// Cut depth below the top face of the board.
    pub depth: f64,
    /// Kernel handle; consumed when the solid is subtracted.
    pub solid: SolidHandle,
}
