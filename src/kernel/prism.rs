//! In-memory reference kernel of swept profiles.
//!
//! Every solid is a planar profile (polygon or circle) swept over a z range,
//! minus the solids that have been subtracted from it. Volumes are exact when
//! every cutter sits inside the base profile and the cutters do not overlap
//! each other; anything else is integrated on a sample grid.

use std::collections::BTreeMap;

use serde::Serialize;

use super::profile::{
    dedup_ring, distance_to_boundary, intersection_area, point_in_polygon, polygon_area,
    polygon_contains_polygon, polygon_self_intersection, AREA_EPS,
};
use super::{KernelError, KernelResult, SolidHandle, SolidId, SolidKernel};
use crate::config::{float_cmp, EPS};
use crate::model::{Color, ElementId, Extents, Point2, Vector3};

/// Grid resolution per axis for sampled volumes.
pub const VOLUME_SAMPLES: usize = 400;

/// Cross-section of a swept solid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Profile {
    Polygon { vertices: Vec<Point2> },
    Circle { center: Point2, radius: f64 },
}

impl Profile {
    pub fn area(&self) -> f64 {
        match self {
            Profile::Polygon { vertices } => polygon_area(vertices),
            Profile::Circle { radius, .. } => std::f64::consts::PI * radius * radius,
        }
    }

    pub fn extents(&self) -> Extents {
        match self {
            Profile::Polygon { vertices } => Extents::from_points(vertices)
                .unwrap_or(Extents::new(Point2::ORIGIN, Point2::ORIGIN)),
            Profile::Circle { center, radius } => Extents::new(
                Point2::new(center.x - radius, center.y - radius),
                Point2::new(center.x + radius, center.y + radius),
            ),
        }
    }

    /// Point membership used for sampling.
    pub fn contains(&self, p: &Point2) -> bool {
        match self {
            Profile::Polygon { vertices } => point_in_polygon(p, vertices),
            Profile::Circle { center, radius } => center.distance(p) < *radius,
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Profile::Polygon { vertices } => {
                for v in vertices.iter_mut() {
                    v.x += dx;
                    v.y += dy;
                }
            }
            Profile::Circle { center, .. } => {
                center.x += dx;
                center.y += dy;
            }
        }
    }

    /// True if the profiles share a positive area.
    pub fn overlaps(&self, other: &Profile) -> bool {
        match (self, other) {
            (
                Profile::Circle {
                    center: c1,
                    radius: r1,
                },
                Profile::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => c1.distance(c2) < r1 + r2 - EPS,
            (Profile::Circle { center, radius }, Profile::Polygon { vertices })
            | (Profile::Polygon { vertices }, Profile::Circle { center, radius }) => {
                point_in_polygon(center, vertices)
                    || distance_to_boundary(center, vertices) < radius - EPS
            }
            (Profile::Polygon { vertices: a }, Profile::Polygon { vertices: b }) => {
                self.extents().overlaps(&other.extents()) && intersection_area(a, b) > AREA_EPS
            }
        }
    }

    /// True if `inner` lies entirely within this profile.
    pub fn encloses(&self, inner: &Profile) -> bool {
        match (self, inner) {
            (Profile::Polygon { vertices: outer }, Profile::Polygon { vertices: inner }) => {
                polygon_contains_polygon(outer, inner)
            }
            (Profile::Polygon { vertices }, Profile::Circle { center, radius }) => {
                point_in_polygon(center, vertices)
                    && distance_to_boundary(center, vertices) >= radius - EPS
            }
            (Profile::Circle { center, radius }, Profile::Polygon { vertices }) => {
                vertices.iter().all(|v| center.distance(v) <= radius + EPS)
            }
            (
                Profile::Circle {
                    center: c1,
                    radius: r1,
                },
                Profile::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => c1.distance(c2) + r2 <= r1 + EPS,
        }
    }
}

/// Remove the `cuts` ranges from `ranges`.
fn subtract_ranges(ranges: Vec<(f64, f64)>, cuts: &[(f64, f64)]) -> Vec<(f64, f64)> {
    cuts.iter().fold(ranges, |acc, &(lo, hi)| {
        acc.into_iter()
            .flat_map(|(a, b)| {
                if hi <= a || lo >= b {
                    return vec![(a, b)];
                }
                let mut pieces = Vec::with_capacity(2);
                if lo > a {
                    pieces.push((a, lo));
                }
                if hi < b {
                    pieces.push((hi, b));
                }
                pieces
            })
            .collect()
    })
}

/// A swept profile with the solids subtracted from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrismSolid {
    pub profile: Profile,
    pub z_min: f64,
    pub z_max: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cutters: Vec<PrismSolid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl PrismSolid {
    fn new(profile: Profile, z_min: f64, z_max: f64) -> Self {
        Self {
            profile,
            z_min,
            z_max,
            cutters: Vec::new(),
            history: None,
            color: None,
        }
    }

    /// Volume before any subtraction.
    pub fn gross_volume(&self) -> f64 {
        self.profile.area() * (self.z_max - self.z_min)
    }

    fn z_overlap(&self, other: &PrismSolid) -> f64 {
        (self.z_max.min(other.z_max) - self.z_min.max(other.z_min)).max(0.0)
    }

    /// True if the two solids' envelopes share a positive volume.
    pub fn interferes(&self, other: &PrismSolid) -> bool {
        self.z_overlap(other) > EPS && self.profile.overlaps(&other.profile)
    }

    pub fn volume(&self) -> f64 {
        if self.cutters.is_empty() {
            return self.gross_volume();
        }
        if self.has_enclosed_disjoint_cutters() {
            let removed: f64 = self
                .cutters
                .iter()
                .map(|c| c.profile.area() * self.z_overlap(c))
                .sum();
            return self.gross_volume() - removed;
        }
        self.sampled_volume()
    }

    fn has_enclosed_disjoint_cutters(&self) -> bool {
        let simple = self
            .cutters
            .iter()
            .all(|c| c.cutters.is_empty() && self.profile.encloses(&c.profile));
        if !simple {
            return false;
        }
        self.cutters.iter().enumerate().all(|(i, a)| {
            self.cutters[i + 1..].iter().all(|b| !a.interferes(b))
        })
    }

    /// Solid z ranges above a point of the drawing plane.
    fn z_coverage(&self, p: &Point2) -> Vec<(f64, f64)> {
        if !self.profile.contains(p) {
            return Vec::new();
        }
        self.cutters
            .iter()
            .fold(vec![(self.z_min, self.z_max)], |ranges, cutter| {
                subtract_ranges(ranges, &cutter.z_coverage(p))
            })
    }

    /// Midpoint-rule integration over the profile's extents.
    fn sampled_volume(&self) -> f64 {
        let extents = self.profile.extents();
        let dx = extents.width() / VOLUME_SAMPLES as f64;
        let dy = extents.height() / VOLUME_SAMPLES as f64;
        let mut total = 0.0;
        for i in 0..VOLUME_SAMPLES {
            for j in 0..VOLUME_SAMPLES {
                let p = Point2::new(
                    extents.min.x + (i as f64 + 0.5) * dx,
                    extents.min.y + (j as f64 + 0.5) * dy,
                );
                total += self
                    .z_coverage(&p)
                    .iter()
                    .map(|(lo, hi)| hi - lo)
                    .sum::<f64>();
            }
        }
        total * dx * dy
    }

    fn translate(&mut self, offset: Vector3) {
        self.profile.translate(offset.x, offset.y);
        self.z_min += offset.z;
        self.z_max += offset.z;
        for cutter in &mut self.cutters {
            cutter.translate(offset);
        }
    }
}

/// Region accepted by [`PrismKernel::extrude`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRegion {
    vertices: Vec<Point2>,
}

impl PolygonRegion {
    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices)
    }
}

/// Reference kernel storing swept solids in memory.
#[derive(Debug, Default)]
pub struct PrismKernel {
    solids: BTreeMap<SolidId, PrismSolid>,
    next_id: u64,
}

impl PrismKernel {
    /// Create an empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live solid.
    pub fn solid(&self, id: SolidId) -> Option<&PrismSolid> {
        self.solids.get(&id)
    }

    /// Number of live solids.
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    fn insert(&mut self, solid: PrismSolid) -> SolidHandle {
        self.next_id += 1;
        let id = SolidId(self.next_id);
        self.solids.insert(id, solid);
        SolidHandle::new(id)
    }

    fn get(&self, handle: &SolidHandle) -> KernelResult<&PrismSolid> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::UnknownSolid(handle.id()))
    }

    fn get_mut(&mut self, handle: &SolidHandle) -> KernelResult<&mut PrismSolid> {
        self.solids
            .get_mut(&handle.id())
            .ok_or(KernelError::UnknownSolid(handle.id()))
    }
}

impl SolidKernel for PrismKernel {
    type Region = PolygonRegion;

    fn region_from_closed_curve(
        &mut self,
        vertices: &[Point2],
        closed: bool,
    ) -> KernelResult<PolygonRegion> {
        let ends_meet = match (vertices.first(), vertices.last()) {
            (Some(first), Some(last)) => vertices.len() > 1 && first.approx_eq(last),
            _ => false,
        };
        if !closed && !ends_meet {
            return Err(KernelError::OpenCurve);
        }

        let ring = dedup_ring(vertices);
        if ring.len() < 3 {
            return Err(KernelError::TooFewVertices { count: ring.len() });
        }
        if let Some((first, second)) = polygon_self_intersection(&ring) {
            return Err(KernelError::SelfIntersecting { first, second });
        }
        if float_cmp::approx_zero(polygon_area(&ring)) {
            return Err(KernelError::DegenerateRegion);
        }

        Ok(PolygonRegion { vertices: ring })
    }

    fn extrude(
        &mut self,
        region: PolygonRegion,
        height: f64,
        taper_angle: f64,
    ) -> KernelResult<SolidHandle> {
        if !float_cmp::approx_zero(taper_angle) {
            return Err(KernelError::Unsupported(format!(
                "tapered extrusion ({} rad)",
                taper_angle
            )));
        }
        if !height.is_finite() || float_cmp::approx_zero(height) {
            return Err(KernelError::InvalidDimension {
                name: "height",
                value: height,
            });
        }

        let profile = Profile::Polygon {
            vertices: region.vertices,
        };
        Ok(self.insert(PrismSolid::new(profile, height.min(0.0), height.max(0.0))))
    }

    fn cylinder(
        &mut self,
        height: f64,
        radius_bottom: f64,
        radius_top: f64,
    ) -> KernelResult<SolidHandle> {
        if !height.is_finite() || height <= EPS {
            return Err(KernelError::InvalidDimension {
                name: "height",
                value: height,
            });
        }
        if !radius_bottom.is_finite() || radius_bottom <= EPS {
            return Err(KernelError::InvalidDimension {
                name: "radius",
                value: radius_bottom,
            });
        }
        if !float_cmp::approx_eq(radius_bottom, radius_top) {
            return Err(KernelError::Unsupported(format!(
                "tapered frustum ({} to {})",
                radius_bottom, radius_top
            )));
        }

        let profile = Profile::Circle {
            center: Point2::ORIGIN,
            radius: radius_bottom,
        };
        Ok(self.insert(PrismSolid::new(profile, -height / 2.0, height / 2.0)))
    }

    fn translate(&mut self, solid: &SolidHandle, offset: Vector3) -> KernelResult<()> {
        self.get_mut(solid)?.translate(offset);
        Ok(())
    }

    fn record_history(&mut self, solid: &SolidHandle, source: ElementId) -> KernelResult<()> {
        self.get_mut(solid)?.history = Some(source);
        Ok(())
    }

    fn set_color(&mut self, solid: &SolidHandle, color: Color) -> KernelResult<()> {
        self.get_mut(solid)?.color = Some(color);
        Ok(())
    }

    fn volume(&self, solid: &SolidHandle) -> KernelResult<f64> {
        Ok(self.get(solid)?.volume())
    }

    fn interferes(&self, a: &SolidHandle, b: &SolidHandle) -> KernelResult<bool> {
        Ok(self.get(a)?.interferes(self.get(b)?))
    }

    fn subtract(&mut self, base: &SolidHandle, cutter: SolidHandle) -> KernelResult<()> {
        if base.id() == cutter.id() {
            return Err(KernelError::Unsupported(
                "subtracting a solid from itself".to_string(),
            ));
        }
        if !self.solids.contains_key(&base.id()) {
            return Err(KernelError::UnknownSolid(base.id()));
        }
        let cut = self
            .solids
            .remove(&cutter.id())
            .ok_or(KernelError::UnknownSolid(cutter.id()))?;
        self.get_mut(base)?.cutters.push(cut);
        Ok(())
    }
}
