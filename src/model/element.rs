//! Drawing elements as the host session exposes them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Extents, Point2};

/// Handle of an element owned by the drawing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Color index (ACI) carried from 2D curves onto their solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u8);

/// Element type tag used for selection filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Polyline,
    Circle,
    Line,
    Text,
    BlockReference,
}

impl ElementKind {
    /// DXF entity name for this kind.
    pub fn dxf_name(&self) -> &'static str {
        match self {
            ElementKind::Polyline => "LWPOLYLINE",
            ElementKind::Circle => "CIRCLE",
            ElementKind::Line => "LINE",
            ElementKind::Text => "TEXT",
            ElementKind::BlockReference => "INSERT",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dxf_name())
    }
}

/// Element geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    /// Polyline through the given vertices. `closed` mirrors the host's closed flag.
    Polyline {
        vertices: Vec<Point2>,
        #[serde(default)]
        closed: bool,
    },
    Circle {
        center: Point2,
        radius: f64,
    },
    Line {
        start: Point2,
        end: Point2,
    },
    Text {
        position: Point2,
        value: String,
    },
    /// Inserted block with its attribute tags and host-computed extents.
    BlockReference {
        name: String,
        extents: Extents,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },
}

impl Geometry {
    /// Type tag of this geometry.
    pub fn kind(&self) -> ElementKind {
        match self {
            Geometry::Polyline { .. } => ElementKind::Polyline,
            Geometry::Circle { .. } => ElementKind::Circle,
            Geometry::Line { .. } => ElementKind::Line,
            Geometry::Text { .. } => ElementKind::Text,
            Geometry::BlockReference { .. } => ElementKind::BlockReference,
        }
    }

    /// Geometric extents in the drawing plane.
    pub fn extents(&self) -> Option<Extents> {
        match self {
            Geometry::Polyline { vertices, .. } => Extents::from_points(vertices),
            Geometry::Circle { center, radius } => Some(Extents::new(
                Point2::new(center.x - radius, center.y - radius),
                Point2::new(center.x + radius, center.y + radius),
            )),
            Geometry::Line { start, end } => Some(Extents::new(*start, *end)),
            Geometry::Text { position, .. } => Some(Extents::new(*position, *position)),
            Geometry::BlockReference { extents, .. } => Some(*extents),
        }
    }
}

/// One graphical element of the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// Drafting layer name.
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Element {
    /// Create a new element.
    pub fn new(id: ElementId, layer: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id,
            layer: layer.into(),
            color: None,
            geometry,
        }
    }

    /// Set the color index.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.geometry.kind()
    }

    pub fn extents(&self) -> Option<Extents> {
        self.geometry.extents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_extents() {
        let g = Geometry::Circle {
            center: Point2::new(5.0, 5.0),
            radius: 2.0,
        };
        let e = g.extents().unwrap();
        assert_eq!(e.min, Point2::new(3.0, 3.0));
        assert_eq!(e.max, Point2::new(7.0, 7.0));
    }

    #[test]
    fn test_empty_polyline_has_no_extents() {
        let g = Geometry::Polyline {
            vertices: vec![],
            closed: true,
        };
        assert!(g.extents().is_none());
    }

    #[test]
    fn test_element_json_shape() {
        let json = r#"{
            "id": 7,
            "layer": "Drill",
            "color": 1,
            "type": "circle",
            "center": { "x": 1.0, "y": 2.0 },
            "radius": 0.25
        }"#;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.id, ElementId(7));
        assert_eq!(element.kind(), ElementKind::Circle);
        assert_eq!(element.color, Some(Color(1)));
    }
}
