//! Extrusion of classified curves into solids.
//!
//! Polylines become prisms extruded into the board (negative height). Circles
//! become cylinders built centered on the origin and then moved so they span
//! the same `-depth..0` range as the prisms, which keeps subtraction aligned.

use tracing::debug;

use crate::config::{float_cmp, PipelineConfig};
use crate::error::{ConvertError, Result};
use crate::kernel::SolidKernel;
use crate::model::{CurveKind, Element, ElementId, ExtrudedSolid, Geometry, Point2, Vector3};
use crate::pipeline::UnitOfWork;

use super::classify;

/// Extrude one element of a part.
///
/// Returns `Ok(None)` when the element is not extruded at all: unsupported
/// type, or a layer that is not a cut layer. Geometry the kernel cannot turn
/// into a solid is an error for the whole part.
pub fn extrude_curve<K: SolidKernel + ?Sized>(
    kernel: &mut K,
    uow: &mut UnitOfWork,
    part: ElementId,
    element: &Element,
    thickness: f64,
    config: &PipelineConfig,
) -> Result<Option<ExtrudedSolid>> {
    match (classify(element.kind()), &element.geometry) {
        (CurveKind::ClosedPolyline, Geometry::Polyline { vertices, closed }) => {
            extrude_polyline(kernel, uow, part, element, vertices, *closed, thickness, config)
        }
        (CurveKind::Circle, Geometry::Circle { center, radius }) => {
            extrude_circle(kernel, uow, part, element, *center, *radius, thickness, config)
        }
        _ => Ok(None),
    }
}

#[allow(clippy::too_many_arguments)]
fn extrude_polyline<K: SolidKernel + ?Sized>(
    kernel: &mut K,
    uow: &mut UnitOfWork,
    part: ElementId,
    element: &Element,
    vertices: &[Point2],
    closed: bool,
    thickness: f64,
    config: &PipelineConfig,
) -> Result<Option<ExtrudedSolid>> {
    let depth = config.layers.resolve_depth(&element.layer, thickness);
    if float_cmp::approx_zero(depth) {
        debug!("Skipping {} on layer '{}'", element.id, element.layer);
        return Ok(None);
    }

    let region = kernel
        .region_from_closed_curve(vertices, closed)
        .map_err(|source| ConvertError::InvalidRegion {
            element: element.id,
            source,
        })?;

    let solid = kernel.extrude(region, -depth, 0.0)?;
    uow.stage_solid(part, solid.id());
    kernel.record_history(&solid, element.id)?;

    debug!(
        "Extruded {} on '{}' to depth {} as {}",
        element.id,
        element.layer,
        depth,
        solid.id()
    );

    Ok(Some(ExtrudedSolid {
        part,
        source: element.id,
        depth,
        solid,
    }))
}

#[allow(clippy::too_many_arguments)]
fn extrude_circle<K: SolidKernel + ?Sized>(
    kernel: &mut K,
    uow: &mut UnitOfWork,
    part: ElementId,
    element: &Element,
    center: Point2,
    radius: f64,
    thickness: f64,
    config: &PipelineConfig,
) -> Result<Option<ExtrudedSolid>> {
    // drills go through the board whatever the layer table says
    let drill = config.is_drill_layer(&element.layer);
    let depth = if drill {
        thickness
    } else {
        config.layers.resolve_depth(&element.layer, thickness)
    };
    if !drill && float_cmp::approx_zero(depth) {
        debug!("Skipping {} on layer '{}'", element.id, element.layer);
        return Ok(None);
    }

    let solid = kernel.cylinder(depth, radius, radius)?;
    uow.stage_solid(part, solid.id());
    kernel.record_history(&solid, element.id)?;
    if let Some(color) = element.color {
        kernel.set_color(&solid, color)?;
    }
    kernel.translate(&solid, Vector3::new(center.x, center.y, -depth / 2.0))?;

    debug!(
        "Cylinder {} r={} on '{}' to depth {} as {}",
        element.id,
        radius,
        element.layer,
        depth,
        solid.id()
    );

    Ok(Some(ExtrudedSolid {
        part,
        source: element.id,
        depth,
        solid,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{KernelError, PrismKernel, Profile};
    use crate::model::Color;
    use std::f64::consts::PI;

    const PART: ElementId = ElementId(100);

    fn rect(layer: &str, closed: bool) -> Element {
        Element::new(
            ElementId(1),
            layer,
            Geometry::Polyline {
                vertices: vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(4.0, 0.0),
                    Point2::new(4.0, 2.0),
                    Point2::new(0.0, 2.0),
                ],
                closed,
            },
        )
    }

    fn circle(layer: &str) -> Element {
        Element::new(
            ElementId(2),
            layer,
            Geometry::Circle {
                center: Point2::new(1.0, 1.0),
                radius: 0.25,
            },
        )
    }

    fn run(
        kernel: &mut PrismKernel,
        uow: &mut UnitOfWork,
        element: &Element,
    ) -> Result<Option<ExtrudedSolid>> {
        extrude_curve(kernel, uow, PART, element, 0.75, &PipelineConfig::default())
    }

    // ==================== Polyline tests ====================

    #[test]
    fn test_full_depth_polyline() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let solid = run(&mut kernel, &mut uow, &rect("FULL DEPTH", true))
            .unwrap()
            .expect("solid");

        assert_eq!(solid.depth, 0.75);
        assert_eq!(solid.source, ElementId(1));
        assert_eq!(solid.part, PART);
        let prism = kernel.solid(solid.solid.id()).unwrap();
        assert_eq!(prism.z_min, -0.75);
        assert_eq!(prism.z_max, 0.0);
        assert_eq!(prism.history, Some(ElementId(1)));
        assert!((kernel.volume(&solid.solid).unwrap() - 6.0).abs() < 1e-12);
        assert_eq!(uow.staged_solids(PART), vec![solid.solid.id()]);
    }

    #[test]
    fn test_pocket_polyline_depth_is_fixed() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let solid = extrude_curve(
            &mut kernel,
            &mut uow,
            PART,
            &rect("POCKET CUT 3/8", true),
            1.5,
            &PipelineConfig::default(),
        )
        .unwrap()
        .expect("solid");
        assert_eq!(solid.depth, 0.375);
        assert_eq!(kernel.solid(solid.solid.id()).unwrap().z_min, -0.375);
    }

    #[test]
    fn test_unknown_layer_creates_nothing() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let result = run(&mut kernel, &mut uow, &rect("DIMENSIONS", true)).unwrap();
        assert!(result.is_none());
        assert!(kernel.is_empty());
        assert!(uow.is_empty());
    }

    #[test]
    fn test_unknown_layer_skips_even_open_polyline() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let result = run(&mut kernel, &mut uow, &rect("NOTES", false)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_open_polyline_is_region_error() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        match run(&mut kernel, &mut uow, &rect("FULL DEPTH", false)) {
            Err(ConvertError::InvalidRegion { element, source }) => {
                assert_eq!(element, ElementId(1));
                assert_eq!(source, KernelError::OpenCurve);
            }
            other => panic!("Expected InvalidRegion, got {:?}", other),
        }
        assert!(kernel.is_empty());
    }

    // ==================== Circle tests ====================

    #[test]
    fn test_drill_circle_goes_full_thickness() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let solid = run(&mut kernel, &mut uow, &circle("Drill"))
            .unwrap()
            .expect("solid");

        assert_eq!(solid.depth, 0.75);
        let cyl = kernel.solid(solid.solid.id()).unwrap();
        assert_eq!(
            cyl.profile,
            Profile::Circle {
                center: Point2::new(1.0, 1.0),
                radius: 0.25
            }
        );
        assert!((cyl.z_min + 0.75).abs() < 1e-12);
        assert!(cyl.z_max.abs() < 1e-12);
        assert!((kernel.volume(&solid.solid).unwrap() - PI * 0.0625 * 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_drill_ignores_named_pocket_depth() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let solid = run(&mut kernel, &mut uow, &circle("1/4 DRILL"))
            .unwrap()
            .expect("solid");
        assert_eq!(solid.depth, 0.75);
    }

    #[test]
    fn test_route_circle_uses_layer_depth() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let solid = run(&mut kernel, &mut uow, &circle("1/8 ROUTE"))
            .unwrap()
            .expect("solid");
        assert_eq!(solid.depth, 0.125);
        let cyl = kernel.solid(solid.solid.id()).unwrap();
        assert!((cyl.z_min + 0.125).abs() < 1e-12);
        assert!(cyl.z_max.abs() < 1e-12);
    }

    #[test]
    fn test_circle_on_unknown_layer_creates_nothing() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        assert!(run(&mut kernel, &mut uow, &circle("CENTERLINES"))
            .unwrap()
            .is_none());
        assert!(kernel.is_empty());
    }

    #[test]
    fn test_drill_without_thickness_fails() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let result = extrude_curve(
            &mut kernel,
            &mut uow,
            PART,
            &circle("Drill"),
            0.0,
            &PipelineConfig::default(),
        );
        assert!(matches!(
            result,
            Err(ConvertError::Kernel(KernelError::InvalidDimension { .. }))
        ));
    }

    #[test]
    fn test_circle_inherits_color() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let element = circle("Drill").with_color(Color(3));
        let solid = run(&mut kernel, &mut uow, &element).unwrap().expect("solid");
        assert_eq!(kernel.solid(solid.solid.id()).unwrap().color, Some(Color(3)));
    }

    #[test]
    fn test_other_elements_create_nothing() {
        let mut kernel = PrismKernel::new();
        let mut uow = UnitOfWork::begin();
        let line = Element::new(
            ElementId(3),
            "FULL DEPTH",
            Geometry::Line {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(1.0, 1.0),
            },
        );
        assert!(run(&mut kernel, &mut uow, &line).unwrap().is_none());
    }
}
