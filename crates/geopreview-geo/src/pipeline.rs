//! Vector simplification pipeline
//!
//! `load_canonical_vector` -> `simplify` turns a Shapefile into a GeoJSON
//! FeatureCollection ready for a web map, along with its bounds and the column
//! to label features by. [`VectorPipeline`] memoizes both steps.

use geo::{BoundingRect, CoordsIter, Geometry, GeometryCollection};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use geopreview_core::cache::{CachePolicy, MemoCache};
use geopreview_core::config::DEFAULT_LABEL_FIELD;
use geopreview_core::error::{GeopreviewError, Result};
use geopreview_core::models::{Bounds, Crs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dataset::VectorDataset;
use crate::reader::read_shapefile;
use crate::simplify::simplify_geometry;
use crate::transform::{reproject_dataset, Reprojector};

/// Simplified boundaries ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedVectorResult {
    /// GeoJSON FeatureCollection text
    pub serialized_geometry: String,
    /// Envelope of all simplified geometries, in EPSG:4326
    pub bounds: Bounds,
    pub label_field: String,
    pub feature_count: usize,
}

/// Load a Shapefile and normalize it to EPSG:4326.
///
/// Datasets without a `.prj` are assumed to already be in EPSG:4326.
pub fn load_canonical_vector(path: &Path) -> Result<VectorDataset> {
    let dataset = read_shapefile(path)?;

    if dataset.crs().is_geographic_wgs84() {
        return Ok(dataset);
    }

    tracing::debug!("Normalizing {} from {} to EPSG:4326", path.display(), dataset.crs());
    reproject_dataset(&dataset, &Crs::wgs84())
}

/// Simplify a canonical dataset at `tolerance_m` metres, labelling by
/// `NOMB_UGER` when present
pub fn simplify(dataset: &VectorDataset, tolerance_m: f64) -> Result<SimplifiedVectorResult> {
    simplify_with_label(dataset, tolerance_m, DEFAULT_LABEL_FIELD)
}

/// Simplify a canonical dataset at `tolerance_m` metres.
///
/// Geometries are simplified in Web Mercator so the tolerance is metric, then
/// brought back to EPSG:4326 and serialized with their attributes.
pub fn simplify_with_label(
    dataset: &VectorDataset,
    tolerance_m: f64,
    preferred_label: &str,
) -> Result<SimplifiedVectorResult> {
    if !tolerance_m.is_finite() || tolerance_m < 0.0 {
        return Err(GeopreviewError::Simplification {
            tolerance: tolerance_m,
            reason: "Tolerance must be a non-negative number of metres".to_string(),
        });
    }

    let wgs84 = Crs::wgs84();
    let mercator = Crs::web_mercator();
    let to_metric = Reprojector::new(dataset.crs(), &mercator)?;
    let to_geographic = Reprojector::new(&mercator, &wgs84)?;

    let geometries = dataset
        .features()
        .iter()
        .map(|feature| {
            let metric = to_metric.geometry(&feature.geometry)?;
            let simplified = simplify_geometry(&metric, tolerance_m);
            to_geographic.geometry(&simplified)
        })
        .collect::<Result<Vec<Geometry<f64>>>>()?;

    if geometries.iter().all(|g| g.coords_count() == 0) {
        return Err(GeopreviewError::Simplification {
            tolerance: tolerance_m,
            reason: "Every simplified geometry is empty".to_string(),
        });
    }

    let features = dataset
        .features()
        .iter()
        .zip(&geometries)
        .enumerate()
        .map(|(index, (feature, geometry))| Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
            id: Some(Id::String(index.to_string())),
            properties: Some(feature.properties_json()),
            foreign_members: None,
        })
        .collect();

    let collection = FeatureCollection { bbox: None, features, foreign_members: None };
    let label_field = select_label_field(dataset.columns(), preferred_label);

    let feature_count = geometries.len();
    let bounds = GeometryCollection::new_from(geometries)
        .bounding_rect()
        .map(|rect| Bounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
        .ok_or_else(|| GeopreviewError::Simplification {
            tolerance: tolerance_m,
            reason: "Simplified geometries have no extent".to_string(),
        })?;

    tracing::debug!(
        "Simplified {} features at {} m, bounds {:?}",
        feature_count,
        tolerance_m,
        bounds.to_array()
    );

    Ok(SimplifiedVectorResult {
        serialized_geometry: collection.to_string(),
        bounds,
        label_field,
        feature_count,
    })
}

/// Preferred column when present, else the first column, else `"id"`
pub fn select_label_field(columns: &[String], preferred: &str) -> String {
    if columns.iter().any(|c| c == preferred) {
        return preferred.to_string();
    }
    columns.first().cloned().unwrap_or_else(|| "id".to_string())
}

/// Memoizing front end of the vector pipeline
pub struct VectorPipeline {
    label_field: String,
    datasets: MemoCache<PathBuf, VectorDataset>,
    results: MemoCache<(PathBuf, u64), SimplifiedVectorResult>,
}

impl VectorPipeline {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            label_field: DEFAULT_LABEL_FIELD.to_string(),
            datasets: MemoCache::new(policy),
            results: MemoCache::new(policy),
        }
    }

    /// Use a different preferred label column
    pub fn with_label_field(mut self, label_field: impl Into<String>) -> Self {
        self.label_field = label_field.into();
        self
    }

    pub fn label_field(&self) -> &str {
        &self.label_field
    }

    /// Canonical dataset for `path`, loaded once
    pub fn load(&self, path: &Path) -> Result<Arc<VectorDataset>> {
        self.datasets
            .get_or_try_insert_with(path.to_path_buf(), || load_canonical_vector(path))
    }

    /// Simplified result for `(path, tolerance_m)`, computed once
    pub fn simplify(&self, path: &Path, tolerance_m: f64) -> Result<Arc<SimplifiedVectorResult>> {
        // -0.0 and 0.0 share an entry
        let tolerance_m = if tolerance_m == 0.0 { 0.0 } else { tolerance_m };
        let key = (path.to_path_buf(), tolerance_m.to_bits());

        self.results.get_or_try_insert_with(key, || {
            let dataset = self.load(path)?;
            simplify_with_label(&dataset, tolerance_m, &self.label_field)
        })
    }

    pub fn clear(&self) {
        self.datasets.clear();
        self.results.clear();
    }
}

impl Default for VectorPipeline {
    fn default() -> Self {
        Self::new(CachePolicy::Unbounded)
    }
}
