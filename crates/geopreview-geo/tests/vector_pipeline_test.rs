//! Integration tests for the vector simplification pipeline
//!
//! These tests write real Shapefiles to a temporary directory and verify:
//! - bounds and feature counts of simplified boundaries
//! - CRS handling for missing, ESRI-style and projected .prj files
//! - determinism and memoization

mod common;

use approx::assert_abs_diff_eq;
use common::{panama_quadrants, write_regions, Region, ESRI_WGS84_WKT, UTM_17N_WKT};
use geo::{CoordsIter, Geometry};
use geojson::FeatureCollection;
use geopreview_core::cache::CachePolicy;
use geopreview_core::models::Crs;
use geopreview_core::GeopreviewError;
use geopreview_geo::{load_canonical_vector, simplify, AttributeValue, VectorPipeline};
use std::sync::Arc;
use tempfile::TempDir;

fn parse_geometries(serialized: &str) -> Vec<Geometry<f64>> {
    let collection: FeatureCollection = serialized.parse().unwrap();
    collection
        .features
        .into_iter()
        .map(|f| Geometry::<f64>::try_from(f.geometry.unwrap()).unwrap())
        .collect()
}

#[test]
fn test_quadrants_simplified_at_200m() {
    let dir = TempDir::new().unwrap();
    let shp = write_regions(dir.path(), "regions", &panama_quadrants(), None);

    let dataset = load_canonical_vector(&shp).unwrap();
    let result = simplify(&dataset, 200.0).unwrap();

    assert_eq!(result.feature_count, 4);
    assert_eq!(result.label_field, "NOMB_UGER");
    assert_abs_diff_eq!(result.bounds.min_x, -85.0, epsilon = 0.01);
    assert_abs_diff_eq!(result.bounds.min_y, 8.0, epsilon = 0.01);
    assert_abs_diff_eq!(result.bounds.max_x, -82.0, epsilon = 0.01);
    assert_abs_diff_eq!(result.bounds.max_y, 11.0, epsilon = 0.01);

    let collection: FeatureCollection = result.serialized_geometry.parse().unwrap();
    assert_eq!(collection.features.len(), 4);

    let first = &collection.features[0];
    let props = first.properties.as_ref().unwrap();
    assert_eq!(props["NOMB_UGER"], serde_json::json!("Ngabe"));
    assert_eq!(props["CODIGO"], serde_json::json!(0.0));

    // ~44 m of noise disappears at a 200 m tolerance
    let source_vertices: usize =
        dataset.features().iter().map(|f| f.geometry.coords_count()).sum();
    let simplified_vertices: usize =
        parse_geometries(&result.serialized_geometry).iter().map(|g| g.coords_count()).sum();
    assert!(simplified_vertices < source_vertices / 10);
}

#[test]
fn test_simplification_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let shp = write_regions(dir.path(), "regions", &panama_quadrants(), None);

    let a = simplify(&load_canonical_vector(&shp).unwrap(), 200.0).unwrap();
    let b = simplify(&load_canonical_vector(&shp).unwrap(), 200.0).unwrap();

    assert_eq!(a.serialized_geometry, b.serialized_geometry);
    assert_eq!(a.bounds, b.bounds);
}

#[test]
fn test_every_coordinate_within_bounds() {
    let dir = TempDir::new().unwrap();
    let shp = write_regions(dir.path(), "regions", &panama_quadrants(), None);

    let result = simplify(&load_canonical_vector(&shp).unwrap(), 1_000.0).unwrap();

    for geometry in parse_geometries(&result.serialized_geometry) {
        for coord in geometry.coords_iter() {
            assert!(result.bounds.contains(coord.x, coord.y), "{:?} outside bounds", coord);
        }
    }
}

#[test]
fn test_zero_tolerance_keeps_geometry() {
    let dir = TempDir::new().unwrap();
    let shp = write_regions(dir.path(), "regions", &panama_quadrants(), None);

    let dataset = load_canonical_vector(&shp).unwrap();
    let result = simplify(&dataset, 0.0).unwrap();

    let simplified = parse_geometries(&result.serialized_geometry);
    for (feature, geometry) in dataset.features().iter().zip(&simplified) {
        assert_eq!(feature.geometry.coords_count(), geometry.coords_count());
        for (a, b) in feature.geometry.coords_iter().zip(geometry.coords_iter()) {
            assert!((a.x - b.x).abs() < 1e-6);
            assert!((a.y - b.y).abs() < 1e-6);
        }
    }
}

#[test]
fn test_missing_prj_assumed_wgs84() {
    let dir = TempDir::new().unwrap();
    let regions = vec![Region {
        name: "Colon".to_string(),
        ring: vec![(-80.0, 9.0), (-80.0, 9.5), (-79.5, 9.5), (-79.5, 9.0), (-80.0, 9.0)],
    }];
    let shp = write_regions(dir.path(), "colon", &regions, None);

    let dataset = load_canonical_vector(&shp).unwrap();

    assert_eq!(dataset.crs(), &Crs::wgs84());
    assert_eq!(dataset.columns(), &["NOMB_UGER".to_string(), "CODIGO".to_string()]);
    assert_eq!(
        dataset.features()[0].property("NOMB_UGER"),
        Some(&AttributeValue::Text("Colon".to_string()))
    );

    let xs: Vec<f64> = dataset.features()[0].geometry.coords_iter().map(|c| c.x).collect();
    assert!(xs.iter().all(|x| *x == -80.0 || *x == -79.5));
}

#[test]
fn test_esri_wgs84_prj_is_not_reprojected() {
    let dir = TempDir::new().unwrap();
    let shp = write_regions(dir.path(), "esri", &panama_quadrants(), Some(ESRI_WGS84_WKT));

    let dataset = load_canonical_vector(&shp).unwrap();

    assert!(dataset.crs().is_geographic_wgs84());
    let first = dataset.features()[0].geometry.coords_iter().next().unwrap();
    assert!(first.x >= -85.001 && first.x <= -83.499);
}

#[test]
fn test_projected_prj_is_normalized() {
    let dir = TempDir::new().unwrap();
    let regions = vec![Region {
        name: "Zona".to_string(),
        ring: vec![
            (500_000.0, 1_000_000.0),
            (500_000.0, 1_010_000.0),
            (510_000.0, 1_010_000.0),
            (510_000.0, 1_000_000.0),
            (500_000.0, 1_000_000.0),
        ],
    }];
    let shp = write_regions(dir.path(), "utm", &regions, Some(UTM_17N_WKT));

    let dataset = load_canonical_vector(&shp).unwrap();
    assert_eq!(dataset.crs().epsg, Some(4326));

    let result = simplify(&dataset, 200.0).unwrap();
    // The false easting sits on the central meridian
    assert_abs_diff_eq!(result.bounds.min_x, -81.0, epsilon = 1e-3);
    assert!(result.bounds.min_y > 9.0 && result.bounds.max_y < 9.2);
    assert!(result.bounds.max_x > -81.0 && result.bounds.max_x < -80.85);
}

#[test]
fn test_custom_projection_without_root_authority_is_reprojected() {
    let dir = TempDir::new().unwrap();
    // Same projection with only nested authorities left, as custom .prj files ship
    let custom = UTM_17N_WKT
        .replace("WGS 84 / UTM zone 17N", "Custom TM -81")
        .replace(r#",AUTHORITY["EPSG","32617"]]"#, "]");
    let regions = vec![Region {
        name: "Zona".to_string(),
        ring: vec![
            (500_000.0, 1_000_000.0),
            (500_000.0, 1_010_000.0),
            (510_000.0, 1_010_000.0),
            (510_000.0, 1_000_000.0),
            (500_000.0, 1_000_000.0),
        ],
    }];
    let shp = write_regions(dir.path(), "custom", &regions, Some(&custom));

    let dataset = load_canonical_vector(&shp).unwrap();
    let result = simplify(&dataset, 200.0).unwrap();
    assert_abs_diff_eq!(result.bounds.min_x, -81.0, epsilon = 1e-3);
    assert!(result.bounds.min_y > 9.0 && result.bounds.max_y < 9.2);
}

#[test]
fn test_missing_file_is_data_load_error() {
    let dir = TempDir::new().unwrap();
    let err = load_canonical_vector(&dir.path().join("nowhere.shp")).unwrap_err();
    assert!(matches!(err, GeopreviewError::DataLoad { .. }));
}

#[test]
fn test_negative_tolerance_is_simplification_error() {
    let dir = TempDir::new().unwrap();
    let shp = write_regions(dir.path(), "regions", &panama_quadrants(), None);

    let err = simplify(&load_canonical_vector(&shp).unwrap(), -5.0).unwrap_err();
    assert!(matches!(err, GeopreviewError::Simplification { .. }));
}

#[test]
fn test_pipeline_memoizes_results() {
    let dir = TempDir::new().unwrap();
    let shp = write_regions(dir.path(), "regions", &panama_quadrants(), None);
    let pipeline = VectorPipeline::new(CachePolicy::Unbounded).with_label_field("CODIGO");

    let first = pipeline.simplify(&shp, 200.0).unwrap();
    let second = pipeline.simplify(&shp, 200.0).unwrap();
    let other = pipeline.simplify(&shp, 500.0).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(first.label_field, "CODIGO");

    let a = pipeline.load(&shp).unwrap();
    let b = pipeline.load(&shp).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
