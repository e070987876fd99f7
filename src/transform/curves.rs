//! Curve classification by element type.

use crate::model::{CurveKind, CurveRef, Element, ElementKind};

/// Class of an element, decided by its type tag alone.
pub fn classify(kind: ElementKind) -> CurveKind {
    match kind {
        ElementKind::Polyline => CurveKind::ClosedPolyline,
        ElementKind::Circle => CurveKind::Circle,
        ElementKind::Line | ElementKind::Text | ElementKind::BlockReference => CurveKind::Other,
    }
}

/// Classify an element into a curve reference.
pub fn curve_ref(element: &Element) -> CurveRef {
    CurveRef {
        id: element.id,
        kind: classify(element.kind()),
        layer: element.layer.clone(),
    }
}

/// Classify elements, dropping the ones that are never extruded.
pub fn usable_curves<'a, I>(elements: I) -> Vec<CurveRef>
where
    I: IntoIterator<Item = &'a Element>,
{
    elements
        .into_iter()
        .map(curve_ref)
        .filter(|c| c.kind != CurveKind::Other)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementId, Geometry, Point2};

    #[test]
    fn test_classify_by_kind() {
        assert_eq!(classify(ElementKind::Polyline), CurveKind::ClosedPolyline);
        assert_eq!(classify(ElementKind::Circle), CurveKind::Circle);
        assert_eq!(classify(ElementKind::Line), CurveKind::Other);
        assert_eq!(classify(ElementKind::Text), CurveKind::Other);
        assert_eq!(classify(ElementKind::BlockReference), CurveKind::Other);
    }

    #[test]
    fn test_open_polyline_still_classified_as_polyline() {
        let element = Element::new(
            ElementId(1),
            "FULL DEPTH",
            Geometry::Polyline {
                vertices: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
                closed: false,
            },
        );
        let curve = curve_ref(&element);
        assert_eq!(curve.kind, CurveKind::ClosedPolyline);
        assert_eq!(curve.layer, "FULL DEPTH");
    }

    #[test]
    fn test_usable_curves_drops_other() {
        let elements = vec![
            Element::new(
                ElementId(1),
                "DIMENSIONS",
                Geometry::Line {
                    start: Point2::new(0.0, 0.0),
                    end: Point2::new(1.0, 0.0),
                },
            ),
            Element::new(
                ElementId(2),
                "Drill",
                Geometry::Circle {
                    center: Point2::new(0.0, 0.0),
                    radius: 0.1,
                },
            ),
            Element::new(
                ElementId(3),
                "NOTES",
                Geometry::Text {
                    position: Point2::new(0.0, 0.0),
                    value: "PART A".to_string(),
                },
            ),
        ];
        let curves = usable_curves(&elements);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].id, ElementId(2));
    }
}
