//! Data model types for drawing-to-solid conversion.

mod element;
mod geometry;
mod part;

pub use element::{Color, Element, ElementId, ElementKind, Geometry};
pub use geometry::{Extents, LineSegment, Point2, Vector3};
pub use part::{CurveKind, CurveRef, ExtrudedSolid, PartInstance, PartStatus, Stage};
