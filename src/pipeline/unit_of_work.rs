//! Deferred persistence of generated geometry.
//!
//! Everything a batch creates is staged here and handed to the drawing in a
//! single [`UnitOfWork::commit`]. Parts that fail drop their staged solids
//! before the commit so nothing partial reaches the drawing.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::kernel::SolidId;
use crate::model::{ElementId, LineSegment};
use crate::session::{Drawing, NewEntity};

/// Counts of what a commit wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub solids: usize,
    pub annotations: usize,
}

/// Staged entities for one batch.
#[derive(Debug)]
pub struct UnitOfWork {
    staged: Vec<NewEntity>,
    open: bool,
}

impl UnitOfWork {
    /// Start a new, empty unit of work.
    pub fn begin() -> Self {
        debug!("Unit of work started");
        Self {
            staged: Vec::new(),
            open: true,
        }
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Solids currently staged for a part.
    pub fn staged_solids(&self, part: ElementId) -> Vec<SolidId> {
        self.staged
            .iter()
            .filter_map(|e| match e {
                NewEntity::Solid { part: p, solid } if *p == part => Some(*solid),
                _ => None,
            })
            .collect()
    }

    /// Stage a newly created solid.
    pub fn stage_solid(&mut self, part: ElementId, solid: SolidId) {
        self.staged.push(NewEntity::Solid { part, solid });
    }

    /// Stage an annotation line.
    pub fn stage_annotation(&mut self, part: ElementId, layer: &str, line: LineSegment) {
        self.staged.push(NewEntity::Annotation {
            part,
            layer: layer.to_string(),
            line,
        });
    }

    /// Unstage a solid that was consumed by a subtraction. Returns whether it
    /// was staged.
    pub fn retire_solid(&mut self, solid: SolidId) -> bool {
        let before = self.staged.len();
        self.staged
            .retain(|e| !matches!(e, NewEntity::Solid { solid: s, .. } if *s == solid));
        before != self.staged.len()
    }

    /// Drop every solid staged for a part. Annotations stay.
    pub fn discard_part(&mut self, part: ElementId) -> usize {
        let before = self.staged.len();
        self.staged
            .retain(|e| !(matches!(e, NewEntity::Solid { .. }) && e.part() == part));
        let dropped = before - self.staged.len();
        if dropped > 0 {
            debug!("Part {}: discarded {} staged solid(s)", part, dropped);
        }
        dropped
    }

    /// Hand the staged entities to the drawing.
    pub fn commit<D: Drawing + ?Sized>(mut self, drawing: &mut D) -> Result<CommitSummary> {
        self.open = false;
        let staged = std::mem::take(&mut self.staged);
        let summary = staged.iter().fold(CommitSummary::default(), |mut s, e| {
            match e {
                NewEntity::Solid { .. } => s.solids += 1,
                NewEntity::Annotation { .. } => s.annotations += 1,
            }
            s
        });

        drawing.persist(staged).map_err(|e| match e {
            ConvertError::PersistFailed { .. } => e,
            other => ConvertError::PersistFailed {
                message: other.to_string(),
            },
        })?;

        debug!(
            "Committed {} solid(s) and {} annotation(s)",
            summary.solids, summary.annotations
        );
        Ok(summary)
    }

    /// Abandon everything staged.
    pub fn rollback(mut self) {
        self.open = false;
        debug!("Rolled back {} staged entities", self.staged.len());
        self.staged.clear();
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.open && !self.staged.is_empty() {
            warn!(
                "Unit of work dropped with {} uncommitted entities",
                self.staged.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point2;
    use crate::session::MemoryDrawing;

    const A: ElementId = ElementId(1);
    const B: ElementId = ElementId(2);

    fn line() -> LineSegment {
        LineSegment::new(Point2::new(0.0, 1.0), Point2::new(1.0, 0.0))
    }

    #[test]
    fn test_retire_solid() {
        let mut uow = UnitOfWork::begin();
        uow.stage_solid(A, SolidId(1));
        uow.stage_solid(A, SolidId(2));
        assert!(uow.retire_solid(SolidId(2)));
        assert!(!uow.retire_solid(SolidId(2)));
        assert_eq!(uow.staged_solids(A), vec![SolidId(1)]);
        uow.rollback();
    }

    #[test]
    fn test_discard_part_keeps_other_parts_and_annotations() {
        let mut uow = UnitOfWork::begin();
        uow.stage_solid(A, SolidId(1));
        uow.stage_solid(B, SolidId(2));
        uow.stage_solid(A, SolidId(3));
        uow.stage_annotation(A, "0", line());

        assert_eq!(uow.discard_part(A), 2);
        assert_eq!(uow.staged_solids(A), Vec::<SolidId>::new());
        assert_eq!(uow.staged_solids(B), vec![SolidId(2)]);
        assert_eq!(uow.len(), 2);
        uow.rollback();
    }

    #[test]
    fn test_commit_persists_everything_once() {
        let mut drawing = MemoryDrawing::new();
        let mut uow = UnitOfWork::begin();
        uow.stage_solid(A, SolidId(1));
        uow.stage_annotation(B, "0", line());
        uow.stage_annotation(B, "0", line());

        let summary = uow.commit(&mut drawing).unwrap();
        assert_eq!(
            summary,
            CommitSummary {
                solids: 1,
                annotations: 2
            }
        );
        assert_eq!(drawing.solids.len(), 1);
        assert_eq!(drawing.on_layer("0").count(), 2);
    }

    #[test]
    fn test_rollback_persists_nothing() {
        let drawing = MemoryDrawing::new();
        let mut uow = UnitOfWork::begin();
        uow.stage_solid(A, SolidId(1));
        uow.rollback();
        assert!(drawing.solids.is_empty());
    }
}
