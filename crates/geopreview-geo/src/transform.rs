//! CRS transformation and normalization

use geo::{Coord, Geometry, MapCoords};
use geopreview_core::error::{GeopreviewError, Result};
use geopreview_core::models::Crs;
use proj::Proj;

use crate::dataset::VectorDataset;

/// A PROJ transform between two CRS definitions
pub struct Reprojector {
    proj: Proj,
    from: Crs,
    to: Crs,
}

impl Reprojector {
    /// Create a transform from `from` to `to`
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        let proj = Proj::new_known_crs(&from.definition, &to.definition, None).map_err(|e| {
            GeopreviewError::reprojection(
                from.to_string(),
                format!("Failed to create projection to {}: {}", to, e),
            )
        })?;

        Ok(Self { proj, from: from.clone(), to: to.clone() })
    }

    /// Transform a single coordinate
    pub fn convert(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let (x, y) = self.proj.convert((coord.x, coord.y)).map_err(|e| {
            GeopreviewError::reprojection(self.from.to_string(), format!("Projection failed: {}", e))
        })?;

        if !x.is_finite() || !y.is_finite() {
            return Err(GeopreviewError::reprojection(
                self.from.to_string(),
                format!("({}, {}) has no finite image in {}", coord.x, coord.y, self.to),
            ));
        }

        Ok(Coord { x, y })
    }

    /// Transform every coordinate of a geometry
    pub fn geometry(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|coord| self.convert(coord))
    }
}

/// Reproject a geometry from one CRS to another
pub fn reproject_geometry(geometry: &Geometry<f64>, from: &Crs, to: &Crs) -> Result<Geometry<f64>> {
    if from.matches(to) {
        return Ok(geometry.clone());
    }
    Reprojector::new(from, to)?.geometry(geometry)
}

/// Reproject every feature of a dataset, preserving order and attributes
pub fn reproject_dataset(dataset: &VectorDataset, to: &Crs) -> Result<VectorDataset> {
    if dataset.crs().matches(to) {
        return Ok(dataset.clone());
    }

    let reprojector = Reprojector::new(dataset.crs(), to)?;
    let geometries = dataset
        .features()
        .iter()
        .map(|feature| reprojector.geometry(&feature.geometry))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Reprojected {} features from {} to {}",
        geometries.len(),
        dataset.crs(),
        to
    );

    Ok(dataset.with_geometries(geometries, to.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{point, polygon};

    #[test]
    fn test_same_crs_is_noop() {
        let geom = Geometry::Point(point!(x: -84.0, y: 9.5));
        let out = reproject_geometry(&geom, &Crs::wgs84(), &Crs::wgs84()).unwrap();
        assert_eq!(out, geom);
    }

    #[test]
    fn test_web_mercator_round_trip() {
        let geom = Geometry::Polygon(polygon![
            (x: -85.0, y: 8.0),
            (x: -82.0, y: 8.0),
            (x: -82.0, y: 11.0),
            (x: -85.0, y: 11.0),
            (x: -85.0, y: 8.0),
        ]);

        let merc = reproject_geometry(&geom, &Crs::wgs84(), &Crs::web_mercator()).unwrap();
        let Geometry::Polygon(ref p) = merc else { panic!("expected polygon") };
        // -85 degrees of longitude on the sphere
        assert_relative_eq!(p.exterior().0[0].x, -9_462_156.717, epsilon = 1e-2);

        let back = reproject_geometry(&merc, &Crs::web_mercator(), &Crs::wgs84()).unwrap();
        let (Geometry::Polygon(a), Geometry::Polygon(b)) = (&geom, &back) else {
            panic!("expected polygons")
        };
        for (c1, c2) in a.exterior().0.iter().zip(b.exterior().0.iter()) {
            assert_relative_eq!(c1.x, c2.x, epsilon = 1e-9);
            assert_relative_eq!(c1.y, c2.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_unknown_crs_is_reprojection_error() {
        let bogus = Crs::from_epsg(999_999, "bogus");
        let err = Reprojector::new(&bogus, &Crs::wgs84()).err().unwrap();
        assert!(matches!(err, GeopreviewError::Reprojection { .. }));
    }
}
