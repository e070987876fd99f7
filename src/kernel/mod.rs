//! Solid-modeling kernel interface.
//!
//! The pipeline never looks inside a solid. It builds primitives, asks for
//! volumes and interference, and subtracts. Boolean subtraction consumes the
//! cutter: [`SolidHandle`] is neither `Clone` nor `Copy`, so a handle passed to
//! [`SolidKernel::subtract`] cannot be used again.

mod prism;
mod profile;

pub use prism::{PolygonRegion, PrismKernel, PrismSolid, Profile};
pub use profile::{
    point_in_polygon, polygon_area, polygon_self_intersection, segments_cross, signed_area,
};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Color, ElementId, Point2, Vector3};

/// Identity of a kernel solid, stable across in-place modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolidId(pub u64);

impl fmt::Display for SolidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "solid#{}", self.0)
    }
}

/// Owning handle to a kernel solid.
#[derive(Debug, PartialEq, Eq)]
pub struct SolidHandle(SolidId);

impl SolidHandle {
    /// Wrap a freshly created solid. Only kernels mint handles.
    pub fn new(id: SolidId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> SolidId {
        self.0
    }
}

/// Errors reported by a kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("curve is not closed")]
    OpenCurve,

    #[error("region needs at least 3 distinct vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("region has zero area")]
    DegenerateRegion,

    #[error("curve self-intersects between edges {first} and {second}")]
    SelfIntersecting { first: usize, second: usize },

    #[error("invalid {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("unknown {0}")]
    UnknownSolid(SolidId),
}

pub type KernelResult<T> = std::result::Result<T, KernelError>;

/// Services the pipeline needs from a solid modeler.
pub trait SolidKernel {
    /// Planar region bounded by a closed curve.
    type Region;

    /// Build a region from a polyline. Fails when the polyline is open,
    /// degenerate or self-intersecting.
    fn region_from_closed_curve(
        &mut self,
        vertices: &[Point2],
        closed: bool,
    ) -> KernelResult<Self::Region>;

    /// Extrude a region along the plane normal. Negative heights extrude into
    /// the drawing plane.
    fn extrude(
        &mut self,
        region: Self::Region,
        height: f64,
        taper_angle: f64,
    ) -> KernelResult<SolidHandle>;

    /// Frustum centered on the origin, spanning `-height/2..height/2`.
    fn cylinder(
        &mut self,
        height: f64,
        radius_bottom: f64,
        radius_top: f64,
    ) -> KernelResult<SolidHandle>;

    /// Move a solid in place.
    fn translate(&mut self, solid: &SolidHandle, offset: Vector3) -> KernelResult<()>;

    /// Record the curve a solid was made from.
    fn record_history(&mut self, solid: &SolidHandle, source: ElementId) -> KernelResult<()>;

    /// Give a solid the display color of the curve it was made from.
    fn set_color(&mut self, solid: &SolidHandle, color: Color) -> KernelResult<()>;

    fn volume(&self, solid: &SolidHandle) -> KernelResult<f64>;

    /// True if the two solids share a positive volume.
    fn interferes(&self, a: &SolidHandle, b: &SolidHandle) -> KernelResult<bool>;

    /// Remove `cutter` from `base`. The base keeps its identity; the cutter
    /// ceases to exist.
    fn subtract(&mut self, base: &SolidHandle, cutter: SolidHandle) -> KernelResult<()>;
}
