//! Per-part transformations: curve classification, thickness resolution,
//! extrusion and composition.

mod composition;
mod curves;
mod extrude;
mod thickness;

pub use composition::*;
pub use curves::*;
pub use extrude::*;
pub use thickness::*;
