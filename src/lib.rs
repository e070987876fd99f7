//! cnc-solidify - Turn CNC part drawings into 3D solids.
//!
//! A drawing holds part borders (block references whose name contains
//! `CNC_BORDER`) with the part's outline, pockets, routes and drill holes drawn
//! on layers named after their cut depth. Each border is converted into one
//! solid: the outline is extruded through the board thickness and every
//! interfering pocket or hole is subtracted from it.
//!
//! # Example
//!
//! ```no_run
//! use cnc_solidify::{
//!     convert_to_cnc_parts, DeclinePrompt, MemoryDrawing, PipelineConfig, PrismKernel,
//! };
//! use std::path::Path;
//!
//! let mut drawing = MemoryDrawing::from_json_file(Path::new("parts.json")).unwrap();
//! let mut kernel = PrismKernel::new();
//! let report = convert_to_cnc_parts(
//!     &mut drawing,
//!     &mut kernel,
//!     &mut DeclinePrompt,
//!     &PipelineConfig::default(),
//! )
//! .unwrap();
//! println!("{} part(s) converted", report.converted());
//! ```

pub mod config;
pub mod error;
pub mod kernel;
pub mod layers;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod transform;

// Re-exports for convenience
pub use config::PipelineConfig;
pub use error::{ConvertError, ErrorCode, Result};
pub use kernel::{PrismKernel, SolidHandle, SolidId, SolidKernel};
pub use layers::{resolve_depth, Depth, DepthRule, LayerTable};
pub use model::{Element, ElementId, Extents, Geometry, PartInstance, Point2, Stage};
pub use pipeline::{BatchReport, InstanceOutcome, InstanceReport, Pipeline};
pub use session::{
    ConsolePrompt, DeclinePrompt, Drawing, Interaction, MemoryDrawing, ScriptedPrompt,
};

/// Convert every CNC border in a drawing into a solid.
///
/// This is the main high-level entry point:
/// 1. Select the border block references
/// 2. Resolve each part's board thickness, prompting if needed
/// 3. Extrude the polylines and circles inside each border
/// 4. Subtract pockets and holes from the largest solid
/// 5. Commit all new geometry to the drawing in one step
///
/// Parts that fail are marked with a cross and reported; they do not stop the
/// batch. An error is returned only when the final commit fails.
pub fn convert_to_cnc_parts<D, K>(
    drawing: &mut D,
    kernel: &mut K,
    prompt: &mut dyn Interaction,
    config: &PipelineConfig,
) -> Result<BatchReport>
where
    D: Drawing + ?Sized,
    K: SolidKernel + ?Sized,
{
    let report = Pipeline::new(drawing, kernel, prompt, config).run()?;

    for instance in &report.instances {
        if let InstanceOutcome::Failed { reason, .. } = &instance.outcome {
            tracing::warn!("{} '{}': {}", instance.border, instance.name, reason);
        }
    }

    Ok(report)
}
