//! Topology-preserving Douglas–Peucker simplification
//!
//! Lines and rings go through [`geo::Simplify`], which pins endpoints and keeps
//! rings closed with at least four coordinates. Polygon results are checked
//! with [`geo::Validation`]; an invalid result is retried at half the
//! tolerance and, when every retry fails, the original polygon is returned
//! unchanged.

use geo::{Area, Geometry, GeometryCollection, LineString, MultiPolygon, Polygon, Simplify, Validation};

/// Halvings of the tolerance tried before falling back to the source geometry
pub const MAX_RETRIES: usize = 8;

/// Simplify a geometry at `tolerance`, in the units of its coordinates.
///
/// A tolerance of zero (or less) returns the geometry unchanged.
pub fn simplify_geometry(geometry: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    if tolerance <= 0.0 {
        return geometry.clone();
    }

    match geometry {
        Geometry::LineString(ls) => Geometry::LineString(simplify_line(ls, tolerance)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(mls.simplify(tolerance)),
        Geometry::Polygon(poly) => {
            Geometry::Polygon(preserve_topology(poly, tolerance, simplify_polygon_checked))
        }
        Geometry::MultiPolygon(mp) => {
            Geometry::MultiPolygon(preserve_topology(mp, tolerance, |mp, tol| {
                MultiPolygon::new(mp.iter().map(|p| simplify_polygon_checked(p, tol)).collect())
            }))
        }
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection::new_from(
            gc.iter().map(|g| simplify_geometry(g, tolerance)).collect(),
        )),
        // Points, lines, rects and triangles have nothing to remove
        other => other.clone(),
    }
}

/// Simplify a line string, keeping at least its two endpoints
pub fn simplify_line(line: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    line.simplify(tolerance)
}

/// Simplify a single polygon once, without validity retries.
///
/// Holes that lose their area or flip orientation are kept as they were.
pub fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let simplified = polygon.simplify(tolerance);
    let (exterior, interiors) = simplified.into_inner();

    let interiors = polygon
        .interiors()
        .iter()
        .zip(interiors)
        .map(|(ring, candidate)| if ring_collapsed(ring, &candidate) { ring.clone() } else { candidate })
        .collect();

    Polygon::new(exterior, interiors)
}

fn simplify_polygon_checked(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    preserve_topology(polygon, tolerance, simplify_polygon)
}

/// Run `simplify` with decreasing tolerance until the result is valid.
///
/// A source that is already invalid cannot be judged by validity, so the first
/// attempt is accepted as-is.
fn preserve_topology<G, F>(original: &G, tolerance: f64, simplify: F) -> G
where
    G: Validation + Clone,
    F: Fn(&G, f64) -> G,
{
    if !original.is_valid() {
        return simplify(original, tolerance);
    }

    let mut current = tolerance;
    for attempt in 0..=MAX_RETRIES {
        let candidate = simplify(original, current);
        if candidate.is_valid() {
            return candidate;
        }
        tracing::debug!(
            "Simplification at tolerance {} produced invalid geometry (attempt {})",
            current,
            attempt + 1
        );
        current /= 2.0;
    }

    tracing::debug!("Keeping unsimplified geometry after {} retries", MAX_RETRIES);
    original.clone()
}

/// A ring collapsed when it lost all area or flipped orientation
fn ring_collapsed(original: &LineString<f64>, simplified: &LineString<f64>) -> bool {
    let before = ring_area(original);
    let after = ring_area(simplified);
    after == 0.0 || before.signum() != after.signum()
}

fn ring_area(ring: &LineString<f64>) -> f64 {
    Polygon::new(ring.clone(), vec![]).signed_area()
}
