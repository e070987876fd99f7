//! Planar polygon helpers for profile construction and containment tests.

use crate::config::EPS;
use crate::model::Point2;

/// Signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Unsigned polygon area.
pub fn polygon_area(points: &[Point2]) -> f64 {
    signed_area(points).abs()
}

/// Ray-casting point-in-polygon test. Boundary points may go either way.
pub fn point_in_polygon(p: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// True if segments `a1-a2` and `b1-b2` cross at a single interior point.
///
/// Touching at endpoints and collinear overlap do not count.
pub fn segments_cross(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);
    ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
}

/// Shortest distance from a point to a segment.
pub fn point_segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < EPS * EPS {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(&Point2::new(a.x + t * dx, a.y + t * dy))
}

/// Shortest distance from a point to the polygon boundary.
pub fn distance_to_boundary(p: &Point2, polygon: &[Point2]) -> f64 {
    edges(polygon)
        .map(|(a, b)| point_segment_distance(p, a, b))
        .fold(f64::INFINITY, f64::min)
}

/// Closed edge loop of a polygon.
pub fn edges(polygon: &[Point2]) -> impl Iterator<Item = (&Point2, &Point2)> {
    let n = polygon.len();
    (0..n).map(move |i| (&polygon[i], &polygon[(i + 1) % n]))
}

/// First pair of non-adjacent edges that cross, if any.
pub fn polygon_self_intersection(polygon: &[Point2]) -> Option<(usize, usize)> {
    let n = polygon.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        let (a1, a2) = (&polygon[i], &polygon[(i + 1) % n]);
        for j in i + 2..n {
            // first and last edges share a vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (&polygon[j], &polygon[(j + 1) % n]);
            if segments_cross(a1, a2, b1, b2) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Drop repeated consecutive vertices and a closing vertex equal to the first.
pub fn dedup_ring(vertices: &[Point2]) -> Vec<Point2> {
    let mut ring: Vec<Point2> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if ring.last().map_or(true, |last| !last.approx_eq(v)) {
            ring.push(*v);
        }
    }
    while ring.len() > 1 && ring[0].approx_eq(&ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}

/// Areas at or below this are treated as empty.
pub const AREA_EPS: f64 = EPS * EPS;

/// Point where segments `a1-a2` and `b1-b2` meet, endpoints included.
///
/// Parallel segments have no single meeting point and give `None`.
pub fn segment_intersection(
    a1: &Point2,
    a2: &Point2,
    b1: &Point2,
    b2: &Point2,
) -> Option<Point2> {
    let (rx, ry) = (a2.x - a1.x, a2.y - a1.y);
    let (sx, sy) = (b2.x - b1.x, b2.y - b1.y);
    let denom = rx * sy - ry * sx;
    if denom.abs() < 1e-12 {
        return None;
    }
    let (qx, qy) = (b1.x - a1.x, b1.y - a1.y);
    let t = (qx * sy - qy * sx) / denom;
    let u = (qx * ry - qy * rx) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point2::new(a1.x + t * rx, a1.y + t * ry))
    } else {
        None
    }
}

/// Inside intervals of a polygon along the vertical line at `x` (even-odd).
fn vertical_section(polygon: &[Point2], x: f64) -> Vec<(f64, f64)> {
    let mut ys: Vec<f64> = edges(polygon)
        .filter(|(a, b)| (a.x > x) != (b.x > x))
        .map(|(a, b)| a.y + (x - a.x) * (b.y - a.y) / (b.x - a.x))
        .collect();
    ys.sort_by(f64::total_cmp);
    ys.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

fn shared_length(a: &[(f64, f64)], b: &[(f64, f64)]) -> f64 {
    a.iter()
        .flat_map(|&(a0, a1)| b.iter().map(move |&(b0, b1)| (a1.min(b1) - a0.max(b0)).max(0.0)))
        .sum()
}

/// Exact area shared by two simple polygons.
///
/// The plane is cut into vertical slabs at every vertex and every edge
/// crossing. Inside a slab the shared section length is linear in x, so the
/// section at the slab's middle times its width is the slab's exact area.
pub fn intersection_area(a: &[Point2], b: &[Point2]) -> f64 {
    if a.len() < 3 || b.len() < 3 {
        return 0.0;
    }
    let mut xs: Vec<f64> = a.iter().chain(b.iter()).map(|p| p.x).collect();
    for (a1, a2) in edges(a) {
        for (b1, b2) in edges(b) {
            if let Some(p) = segment_intersection(a1, a2, b1, b2) {
                xs.push(p.x);
            }
        }
    }
    xs.sort_by(f64::total_cmp);
    xs.dedup_by(|x, prev| (*x - *prev).abs() < 1e-12);

    xs.windows(2)
        .map(|w| {
            let mid = (w[0] + w[1]) * 0.5;
            let shared = shared_length(&vertical_section(a, mid), &vertical_section(b, mid));
            shared * (w[1] - w[0])
        })
        .sum()
}

/// True if `inner` lies within `outer`. Shared boundary is allowed.
pub fn polygon_contains_polygon(outer: &[Point2], inner: &[Point2]) -> bool {
    polygon_area(inner) - intersection_area(outer, inner) <= AREA_EPS
}
