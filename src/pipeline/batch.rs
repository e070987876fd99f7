//! Batch conversion of every CNC border in a drawing.
//!
//! Each border is converted on its own: resolve the board thickness, gather
//! the curves inside the border, extrude them, then cut the pockets out of the
//! base. A failing border gets a cross drawn over it and the batch moves on.
//! All new geometry is committed once at the end.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::unit_of_work::{CommitSummary, UnitOfWork};
use crate::config::PipelineConfig;
use crate::error::{ConvertError, Result};
use crate::kernel::{SolidId, SolidKernel};
use crate::model::{
    CurveKind, Element, ElementId, ElementKind, Extents, Geometry, PartInstance, PartStatus, Stage,
};
use crate::session::{Drawing, Interaction};
use crate::transform::{classify, compose, extrude_curve, resolve_thickness, usable_curves};

/// Shown to the operator when a part could not be converted.
pub const FAILURE_MESSAGE: &str = "Part failed to be extruded. Check for open polylines";

/// What happened to one part.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InstanceOutcome {
    /// The part now has a solid.
    Converted {
        thickness: f64,
        solid: SolidId,
        volume: f64,
        /// Curves cut out of the base.
        subtracted: Vec<ElementId>,
        /// Solids that did not touch the base.
        survivors: Vec<SolidId>,
    },
    /// Nothing to do.
    NoOp { reason: String },
    /// The part was marked with a failure cross.
    Failed {
        stage: Stage,
        code: i32,
        reason: String,
    },
}

/// Outcome of one part with its identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReport {
    pub border: ElementId,
    pub name: String,
    pub bounds: Extents,
    #[serde(flatten)]
    pub outcome: InstanceOutcome,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub instances: Vec<InstanceReport>,
    pub commit: CommitSummary,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, InstanceOutcome::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, InstanceOutcome::NoOp { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, InstanceOutcome::Failed { .. }))
    }

    /// True if no part failed.
    pub fn passed(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&InstanceOutcome) -> bool) -> usize {
        self.instances.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// One conversion batch over a drawing.
pub struct Pipeline<'a, D: ?Sized, K: ?Sized> {
    drawing: &'a mut D,
    kernel: &'a mut K,
    prompt: &'a mut dyn Interaction,
    config: &'a PipelineConfig,
}

impl<'a, D, K> Pipeline<'a, D, K>
where
    D: Drawing + ?Sized,
    K: SolidKernel + ?Sized,
{
    pub fn new(
        drawing: &'a mut D,
        kernel: &'a mut K,
        prompt: &'a mut dyn Interaction,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            drawing,
            kernel,
            prompt,
            config,
        }
    }

    /// Convert every border and commit the result.
    pub fn run(mut self) -> Result<BatchReport> {
        let parts = self.choose_parts();
        info!("Found {} CNC border(s)", parts.len());

        let mut uow = UnitOfWork::begin();
        let mut instances = Vec::with_capacity(parts.len());
        for mut part in parts {
            let outcome = self.process(&mut uow, &mut part);
            instances.push(InstanceReport {
                border: part.border,
                name: part.name,
                bounds: part.bounds,
                outcome,
            });
        }

        let commit = uow.commit(&mut *self.drawing)?;
        let report = BatchReport { instances, commit };
        info!(
            "Batch done: {} converted, {} skipped, {} failed",
            report.converted(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Border block references in the drawing.
    pub fn choose_parts(&mut self) -> Vec<PartInstance> {
        let Some(ids) = self.drawing.select_by_kind(ElementKind::BlockReference) else {
            info!("Border selection cancelled");
            return Vec::new();
        };

        let mut parts = Vec::new();
        for id in ids {
            match self.drawing.element(id).map(|e| &e.geometry) {
                Some(Geometry::BlockReference { name, extents, .. }) => {
                    if self.config.is_border_block(name) {
                        parts.push(PartInstance::new(id, name.clone(), *extents));
                    } else {
                        debug!("Ignoring block '{}' ({})", name, id);
                    }
                }
                Some(_) => debug!("{} is not a block reference", id),
                None => warn!("Selected element {} is not in the drawing", id),
            }
        }
        parts
    }

    /// Convert one part, turning errors and panics into a failure outcome.
    fn process(&mut self, uow: &mut UnitOfWork, part: &mut PartInstance) -> InstanceOutcome {
        info!("Converting part {} '{}'", part.border, part.name);

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.convert_instance(uow, part)));
        let err = match result {
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(e)) => e,
            Err(payload) => ConvertError::Panicked {
                message: panic_message(payload),
            },
        };
        self.fail(uow, part, &err)
    }

    fn convert_instance(
        &mut self,
        uow: &mut UnitOfWork,
        part: &mut PartInstance,
    ) -> Result<InstanceOutcome> {
        part.thickness = resolve_thickness(&*self.drawing, part.border, self.prompt, self.config);
        part.advance(Stage::MetadataResolved);

        let Some(ids) = self.drawing.select_crossing(&part.bounds) else {
            return Ok(skip(part, "curve selection cancelled"));
        };
        let elements = ids
            .into_iter()
            .filter(|id| *id != part.border)
            .map(|id| {
                self.drawing
                    .element(id)
                    .cloned()
                    .ok_or(ConvertError::ElementNotFound { id })
            })
            .collect::<Result<Vec<Element>>>()?;

        part.curves = usable_curves(&elements);
        if part.usable_curves() == 0 {
            return Ok(skip(part, "no polylines or circles inside the border"));
        }
        part.advance(Stage::CurvesGathered);

        let mut solids = Vec::new();
        for element in elements
            .iter()
            .filter(|e| classify(e.kind()) != CurveKind::Other)
        {
            if let Some(solid) = extrude_curve(
                &mut *self.kernel,
                uow,
                part.border,
                element,
                part.thickness,
                self.config,
            )? {
                solids.push(solid);
            }
        }
        part.advance(Stage::Extruded);

        let composition = compose(&mut *self.kernel, uow, solids)?;
        part.advance(Stage::Composed);
        part.status = PartStatus::Converted;

        Ok(InstanceOutcome::Converted {
            thickness: part.thickness,
            solid: composition.base.solid.id(),
            volume: composition.volume,
            subtracted: composition.subtracted,
            survivors: composition
                .survivors
                .iter()
                .map(|s| s.solid.id())
                .collect(),
        })
    }

    /// Drop the part's solids and mark its border with a cross.
    fn fail(
        &mut self,
        uow: &mut UnitOfWork,
        part: &mut PartInstance,
        err: &ConvertError,
    ) -> InstanceOutcome {
        error!(
            "Part {} failed after stage '{}': {}",
            part.border, part.stage, err
        );

        uow.discard_part(part.border);
        for line in part.bounds.diagonals() {
            uow.stage_annotation(part.border, &self.config.annotation_layer, line);
        }
        self.prompt.message(FAILURE_MESSAGE);
        part.status = PartStatus::Failed;

        InstanceOutcome::Failed {
            stage: part.stage,
            code: err.code_value(),
            reason: err.to_string(),
        }
    }
}

fn skip(part: &mut PartInstance, reason: &str) -> InstanceOutcome {
    info!("Part {}: nothing to convert ({})", part.border, reason);
    part.status = PartStatus::Skipped;
    InstanceOutcome::NoOp {
        reason: reason.to_string(),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{KernelResult, PolygonRegion, PrismKernel, SolidHandle};
    use crate::model::{Color, Point2, Vector3};
    use crate::session::{MemoryDrawing, ScriptedPrompt};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    fn border(drawing: &mut MemoryDrawing, x0: f64, y0: f64, x1: f64, y1: f64) -> ElementId {
        drawing.add_border(
            "CNC_BORDER",
            Extents::new(Point2::new(x0, y0), Point2::new(x1, y1)),
            &[("THICKNESS", "0.75")],
        )
    }

    fn run(drawing: &mut MemoryDrawing, prompt: &mut ScriptedPrompt) -> BatchReport {
        let mut kernel = PrismKernel::new();
        let config = PipelineConfig::default();
        Pipeline::new(drawing, &mut kernel, prompt, &config)
            .run()
            .unwrap()
    }

    /// Kernel that panics on every extrusion.
    struct PanickingKernel(PrismKernel);

    impl SolidKernel for PanickingKernel {
        type Region = PolygonRegion;

        fn region_from_closed_curve(
            &mut self,
            vertices: &[Point2],
            closed: bool,
        ) -> KernelResult<PolygonRegion> {
            self.0.region_from_closed_curve(vertices, closed)
        }
        fn extrude(&mut self, _: PolygonRegion, _: f64, _: f64) -> KernelResult<SolidHandle> {
            panic!("kernel crashed");
        }
        fn cylinder(&mut self, h: f64, r1: f64, r2: f64) -> KernelResult<SolidHandle> {
            self.0.cylinder(h, r1, r2)
        }
        fn translate(&mut self, s: &SolidHandle, v: Vector3) -> KernelResult<()> {
            self.0.translate(s, v)
        }
        fn record_history(&mut self, s: &SolidHandle, e: ElementId) -> KernelResult<()> {
            self.0.record_history(s, e)
        }
        fn set_color(&mut self, s: &SolidHandle, c: Color) -> KernelResult<()> {
            self.0.set_color(s, c)
        }
        fn volume(&self, s: &SolidHandle) -> KernelResult<f64> {
            self.0.volume(s)
        }
        fn interferes(&self, a: &SolidHandle, b: &SolidHandle) -> KernelResult<bool> {
            self.0.interferes(a, b)
        }
        fn subtract(&mut self, base: &SolidHandle, cutter: SolidHandle) -> KernelResult<()> {
            self.0.subtract(base, cutter)
        }
    }

    // ==================== Part selection tests ====================

    #[test]
    fn test_choose_parts_filters_border_blocks() {
        let mut drawing = MemoryDrawing::new();
        let b = border(&mut drawing, 0.0, 0.0, 10.0, 5.0);
        drawing.add_border(
            "TITLE_BLOCK",
            Extents::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)),
            &[],
        );
        drawing.add_circle("Drill", Point2::new(1.0, 1.0), 0.25);

        let mut kernel = PrismKernel::new();
        let mut prompt = ScriptedPrompt::default();
        let config = PipelineConfig::default();
        let parts = Pipeline::new(&mut drawing, &mut kernel, &mut prompt, &config).choose_parts();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].border, b);
        assert_eq!(parts[0].stage, Stage::Selected);
    }

    // ==================== Instance tests ====================

    #[test]
    fn test_converts_board_with_drill() {
        let mut drawing = MemoryDrawing::new();
        let b = border(&mut drawing, 0.0, 0.0, 10.0, 5.0);
        drawing.add_polyline("FULL DEPTH", &rect(0.0, 0.0, 10.0, 5.0), true);
        let hole = drawing.add_circle("Drill", Point2::new(5.0, 2.5), 0.25);

        let mut prompt = ScriptedPrompt::default();
        let report = run(&mut drawing, &mut prompt);

        assert_eq!(report.converted(), 1);
        assert!(report.passed());
        match &report.instances[0].outcome {
            InstanceOutcome::Converted {
                thickness,
                volume,
                subtracted,
                ..
            } => {
                assert_eq!(*thickness, 0.75);
                let expected = 10.0 * 5.0 * 0.75 - std::f64::consts::PI * 0.0625 * 0.75;
                assert!((volume - expected).abs() < 1e-9);
                assert_eq!(subtracted, &vec![hole]);
            }
            other => panic!("Expected Converted, got {:?}", other),
        }
        assert_eq!(report.instances[0].border, b);
        assert_eq!(report.commit.solids, 1);
        assert_eq!(drawing.solids.len(), 1);
        assert_eq!(drawing.solids[0].part, b);
        assert!(prompt.prompts.is_empty());
    }

    #[test]
    fn test_empty_border_is_noop() {
        let mut drawing = MemoryDrawing::new();
        border(&mut drawing, 0.0, 0.0, 10.0, 5.0);
        drawing.add_polyline("FULL DEPTH", &rect(20.0, 0.0, 30.0, 5.0), true);

        let mut prompt = ScriptedPrompt::default();
        let report = run(&mut drawing, &mut prompt);

        assert!(matches!(
            report.instances[0].outcome,
            InstanceOutcome::NoOp { .. }
        ));
        assert_eq!(report.commit, CommitSummary::default());
        assert!(drawing.solids.is_empty());
    }

    #[test]
    fn test_open_polyline_marks_border() {
        let mut drawing = MemoryDrawing::new();
        border(&mut drawing, 0.0, 0.0, 10.0, 5.0);
        drawing.add_polyline("FULL DEPTH", &rect(0.0, 0.0, 10.0, 5.0), false);
        drawing.add_circle("Drill", Point2::new(5.0, 2.5), 0.25);

        let mut prompt = ScriptedPrompt::default();
        let report = run(&mut drawing, &mut prompt);

        match &report.instances[0].outcome {
            InstanceOutcome::Failed { stage, code, .. } => {
                assert_eq!(*stage, Stage::CurvesGathered);
                assert_eq!(*code, 100);
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(!report.passed());
        assert!(drawing.solids.is_empty());
        let lines = drawing
            .on_layer("0")
            .filter(|e| e.kind() == ElementKind::Line)
            .count();
        assert_eq!(lines, 2);
        assert_eq!(prompt.messages, vec![FAILURE_MESSAGE]);
    }

    #[test]
    fn test_no_solids_is_failure() {
        let mut drawing = MemoryDrawing::new();
        border(&mut drawing, 0.0, 0.0, 10.0, 5.0);
        drawing.add_polyline("NOTES", &rect(1.0, 1.0, 2.0, 2.0), true);

        let mut prompt = ScriptedPrompt::default();
        let report = run(&mut drawing, &mut prompt);

        match &report.instances[0].outcome {
            InstanceOutcome::Failed { stage, code, .. } => {
                assert_eq!(*stage, Stage::Extruded);
                assert_eq!(*code, 200);
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_becomes_failure() {
        let mut drawing = MemoryDrawing::new();
        border(&mut drawing, 0.0, 0.0, 10.0, 5.0);
        drawing.add_polyline("FULL DEPTH", &rect(0.0, 0.0, 10.0, 5.0), true);

        let mut kernel = PanickingKernel(PrismKernel::new());
        let mut prompt = ScriptedPrompt::default();
        let config = PipelineConfig::default();
        let report = Pipeline::new(&mut drawing, &mut kernel, &mut prompt, &config)
            .run()
            .unwrap();

        match &report.instances[0].outcome {
            InstanceOutcome::Failed { code, reason, .. } => {
                assert_eq!(*code, 301);
                assert!(reason.contains("kernel crashed"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(42)), "unknown panic");
    }
}
