//! Base-part selection and subtraction.
//!
//! The largest solid of a part is the board itself; every other solid that
//! touches it is a pocket, route or drill and gets cut out of it. Solids that
//! do not touch the base are left alone.

use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::kernel::{KernelResult, SolidKernel};
use crate::model::{ElementId, ExtrudedSolid};
use crate::pipeline::UnitOfWork;

/// Result of composing a part's solids.
#[derive(Debug)]
pub struct Composition {
    /// The base solid, with cutters removed.
    pub base: ExtrudedSolid,
    /// Volume of the base after subtraction.
    pub volume: f64,
    /// Curves whose solids were cut out of the base.
    pub subtracted: Vec<ElementId>,
    /// Solids that did not interfere with the base.
    pub survivors: Vec<ExtrudedSolid>,
}

/// Index of the strictly largest positive volume. The first of equal
/// volumes wins.
pub fn select_base(volumes: &[f64]) -> Option<usize> {
    let mut max = 0.0;
    let mut best = None;
    for (i, &volume) in volumes.iter().enumerate() {
        if volume > max {
            max = volume;
            best = Some(i);
        }
    }
    best
}

/// Pick the base solid and subtract every interfering solid from it.
pub fn compose<K: SolidKernel + ?Sized>(
    kernel: &mut K,
    uow: &mut UnitOfWork,
    solids: Vec<ExtrudedSolid>,
) -> Result<Composition> {
    if solids.is_empty() {
        return Err(ConvertError::NoSolids);
    }

    let volumes = solids
        .iter()
        .map(|s| kernel.volume(&s.solid))
        .collect::<KernelResult<Vec<f64>>>()?;
    let index = select_base(&volumes).ok_or(ConvertError::NoPositiveVolume {
        count: solids.len(),
    })?;

    let mut solids = solids;
    let base = solids.remove(index);
    debug!(
        "Base solid {} from {} (volume {})",
        base.solid.id(),
        base.source,
        volumes[index]
    );

    let mut subtracted = Vec::new();
    let mut survivors = Vec::new();
    for solid in solids {
        if !kernel.interferes(&base.solid, &solid.solid)? {
            survivors.push(solid);
            continue;
        }
        let id = solid.solid.id();
        kernel.subtract(&base.solid, solid.solid)?;
        uow.retire_solid(id);
        subtracted.push(solid.source);
    }

    let volume = kernel.volume(&base.solid)?;
    info!(
        "Part {}: cut {} solid(s) from base, {} left standing, volume {:.4}",
        base.part,
        subtracted.len(),
        survivors.len(),
        volume
    );

    Ok(Composition {
        base,
        volume,
        subtracted,
        survivors,
    })
}
