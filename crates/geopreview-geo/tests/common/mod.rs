//! Shapefile fixtures shared by the integration tests

#![allow(dead_code)]

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use std::fs;
use std::path::{Path, PathBuf};

pub const UTM_17N_WKT: &str = r#"PROJCS["WGS 84 / UTM zone 17N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",-81],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1,AUTHORITY["EPSG","9001"]],AXIS["Easting",EAST],AXIS["Northing",NORTH],AUTHORITY["EPSG","32617"]]"#;

pub const ESRI_WGS84_WKT: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// A named polygon ring given as (x, y) pairs
pub struct Region {
    pub name: String,
    pub ring: Vec<(f64, f64)>,
}

/// Write a polygon Shapefile with a `NOMB_UGER` and `CODIGO` column
pub fn write_regions(dir: &Path, stem: &str, regions: &[Region], prj: Option<&str>) -> PathBuf {
    let shp = dir.join(format!("{}.shp", stem));

    {
        let table = TableWriterBuilder::new()
            .add_character_field(FieldName::try_from("NOMB_UGER").unwrap(), 50)
            .add_numeric_field(FieldName::try_from("CODIGO").unwrap(), 10, 0);
        let mut writer = shapefile::Writer::from_path(&shp, table).unwrap();

        for (index, region) in regions.iter().enumerate() {
            let points: Vec<Point> = region.ring.iter().map(|&(x, y)| Point::new(x, y)).collect();
            let polygon = Polygon::with_rings(vec![PolygonRing::Outer(points)]);

            let mut record = Record::default();
            record.insert("NOMB_UGER".to_string(), FieldValue::Character(Some(region.name.clone())));
            record.insert("CODIGO".to_string(), FieldValue::Numeric(Some(index as f64)));

            writer.write_shape_and_record(&polygon, &record).unwrap();
        }
    }

    if let Some(wkt) = prj {
        fs::write(shp.with_extension("prj"), wkt).unwrap();
    }

    shp
}

/// Closed square ring with `steps` vertices per edge, every other one pushed
/// outwards by `noise`
pub fn noisy_square(x0: f64, y0: f64, size: f64, steps: usize, noise: f64) -> Vec<(f64, f64)> {
    let corners = [(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size)];
    let mut ring = Vec::new();

    for i in 0..4 {
        let (ax, ay) = corners[i];
        let (bx, by) = corners[(i + 1) % 4];
        let (nx, ny) = ((by - ay) / size, (ax - bx) / size);
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            let offset = if s % 2 == 1 { noise } else { 0.0 };
            ring.push((ax + t * (bx - ax) + offset * nx, ay + t * (by - ay) + offset * ny));
        }
    }

    ring.push(ring[0]);
    ring
}

/// Four quadrants tiling lon [-85, -82] x lat [8, 11]
pub fn panama_quadrants() -> Vec<Region> {
    let names = ["Ngabe", "Chiriqui", "Bocas del Toro", "Veraguas"];
    let origins = [(-85.0, 8.0), (-83.5, 8.0), (-85.0, 9.5), (-83.5, 9.5)];

    names
        .iter()
        .zip(origins)
        .map(|(name, (x, y))| Region {
            name: name.to_string(),
            ring: noisy_square(x, y, 1.5, 60, 0.0004),
        })
        .collect()
}
