//! Shapefile reader
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj).
//! The first three are required; a missing .prj means the coordinates are
//! taken to be WGS 84 longitude/latitude.

use chrono::NaiveDate;
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use geopreview_core::error::{GeopreviewError, Result};
use geopreview_core::models::Crs;
use shapefile::dbase::FieldValue as DbaseFieldValue;
use shapefile::{PolygonRing, Shape};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::{AttributeValue, VectorDataset, VectorFeature};

const REQUIRED_COMPONENTS: [&str; 3] = ["shp", "shx", "dbf"];

/// Read a Shapefile in its declared CRS
pub fn read_shapefile(path: &Path) -> Result<VectorDataset> {
    verify_components(path)?;

    let crs = extract_crs(path)?;
    let columns = read_columns(path)?;

    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|e| GeopreviewError::data_load(path, format!("Failed to open Shapefile: {}", e)))?;

    let mut features = Vec::new();
    let mut skipped = 0usize;

    for (row, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result.map_err(|e| {
            GeopreviewError::data_load(path, format!("Failed to read feature {}: {}", row, e))
        })?;

        let Some(geometry) = convert_shape(path, shape)? else {
            skipped += 1;
            continue;
        };

        let properties = columns
            .iter()
            .map(|name| {
                let value = record.get(name).map(convert_dbase_value).unwrap_or(AttributeValue::Null);
                (name.clone(), value)
            })
            .collect();

        features.push(VectorFeature::new(geometry, properties));
    }

    if features.is_empty() {
        return Err(GeopreviewError::data_load(path, "Shapefile contains no features"));
    }

    tracing::debug!(
        "Read {} features ({} null shapes skipped) from {} in {}",
        features.len(),
        skipped,
        path.display(),
        crs
    );

    Ok(VectorDataset::new(features, columns, crs))
}

/// Base path of a Shapefile (without extension)
fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);

    if !is_shp {
        return Err(GeopreviewError::data_load(path, "Not a Shapefile (.shp)"));
    }

    Ok(path.with_extension(""))
}

/// Verify that all required Shapefile component files exist
fn verify_components(path: &Path) -> Result<()> {
    let base = shapefile_base(path)?;

    let missing: Vec<String> = REQUIRED_COMPONENTS
        .iter()
        .filter(|ext| !base.with_extension(ext).exists())
        .map(|ext| format!(".{}", ext))
        .collect();

    if !missing.is_empty() {
        return Err(GeopreviewError::data_load(
            path,
            format!("Missing required component files: {}", missing.join(", ")),
        ));
    }

    Ok(())
}

/// Extract the CRS from the .prj component
fn extract_crs(path: &Path) -> Result<Crs> {
    let prj_path = shapefile_base(path)?.with_extension("prj");

    if !prj_path.exists() {
        tracing::debug!("No .prj next to {}, assuming EPSG:4326", path.display());
        return Ok(Crs::wgs84());
    }

    let wkt = fs::read_to_string(&prj_path).map_err(|e| {
        GeopreviewError::data_load(&prj_path, format!("Failed to read .prj file: {}", e))
    })?;

    if wkt.trim().is_empty() {
        return Ok(Crs::wgs84());
    }

    Ok(Crs::from_wkt(&wkt))
}

/// Attribute column names in DBF header order
fn read_columns(path: &Path) -> Result<Vec<String>> {
    let dbf_path = shapefile_base(path)?.with_extension("dbf");
    let reader = shapefile::dbase::Reader::from_path(&dbf_path).map_err(|e| {
        GeopreviewError::data_load(&dbf_path, format!("Failed to read attribute table: {}", e))
    })?;

    Ok(reader
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .filter(|name| name != "DeletionFlag")
        .collect())
}

/// Convert a shape to a geo geometry; `None` for null shapes
fn convert_shape(path: &Path, shape: Shape) -> Result<Option<Geometry<f64>>> {
    let geometry = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::Polyline(line) => lines_to_geometry(line.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolylineM(line) => lines_to_geometry(line.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolylineZ(line) => lines_to_geometry(line.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::Polygon(poly) => rings_to_geometry(poly.rings(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolygonM(poly) => rings_to_geometry(poly.rings(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolygonZ(poly) => rings_to_geometry(poly.rings(), |p| Coord { x: p.x, y: p.y }),
        Shape::Multipoint(mp) => Geometry::MultiPoint(MultiPoint::new(
            mp.points().iter().map(|p| Point::new(p.x, p.y)).collect(),
        )),
        Shape::MultipointM(mp) => Geometry::MultiPoint(MultiPoint::new(
            mp.points().iter().map(|p| Point::new(p.x, p.y)).collect(),
        )),
        Shape::MultipointZ(mp) => Geometry::MultiPoint(MultiPoint::new(
            mp.points().iter().map(|p| Point::new(p.x, p.y)).collect(),
        )),
        Shape::Multipatch(_) => {
            return Err(GeopreviewError::data_load(
                path,
                "Multipatch geometry type is not supported",
            ))
        }
    };

    Ok(Some(geometry))
}

fn lines_to_geometry<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> Coord<f64>) -> Geometry<f64> {
    let mut lines: Vec<LineString<f64>> =
        parts.iter().map(|part| LineString::new(part.iter().map(&xy).collect())).collect();

    if lines.len() == 1 {
        Geometry::LineString(lines.remove(0))
    } else {
        Geometry::MultiLineString(MultiLineString::new(lines))
    }
}

/// Group rings into polygons: each outer ring opens a polygon and the inner
/// rings that follow it become its holes
fn rings_to_geometry<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> Geometry<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();

    for ring in rings {
        let coords = LineString::new(ring.points().iter().map(&xy).collect());
        match ring {
            PolygonRing::Outer(_) => polygons.push((coords, Vec::new())),
            PolygonRing::Inner(_) => match polygons.last_mut() {
                Some((_, holes)) => holes.push(coords),
                // A hole before any shell is promoted to a shell
                None => polygons.push((coords, Vec::new())),
            },
        }
    }

    let mut polygons: Vec<Polygon<f64>> = polygons
        .into_iter()
        .map(|(exterior, interiors)| Polygon::new(exterior, interiors))
        .collect();

    if polygons.len() == 1 {
        Geometry::Polygon(polygons.remove(0))
    } else {
        Geometry::MultiPolygon(MultiPolygon::new(polygons))
    }
}

/// Convert a dBase field value to an attribute value
fn convert_dbase_value(value: &DbaseFieldValue) -> AttributeValue {
    match value {
        DbaseFieldValue::Character(Some(s)) => AttributeValue::Text(s.trim_end().to_string()),
        DbaseFieldValue::Numeric(Some(n)) => AttributeValue::Number(*n),
        DbaseFieldValue::Logical(Some(b)) => AttributeValue::Bool(*b),
        DbaseFieldValue::Float(Some(f)) => AttributeValue::Number(*f as f64),
        DbaseFieldValue::Integer(i) => AttributeValue::Integer(i64::from(*i)),
        DbaseFieldValue::Currency(c) => AttributeValue::Number(*c),
        DbaseFieldValue::Double(d) => AttributeValue::Number(*d),
        DbaseFieldValue::Memo(s) => AttributeValue::Text(s.clone()),
        DbaseFieldValue::Date(Some(date)) => {
            dbase_date(date.year(), date.month(), date.day())
        }
        // dbase exposes no time-of-day accessors, so timestamps keep their date
        DbaseFieldValue::DateTime(dt) => {
            let date = dt.date();
            dbase_date(date.year(), date.month(), date.day())
        }
        DbaseFieldValue::Character(None)
        | DbaseFieldValue::Numeric(None)
        | DbaseFieldValue::Logical(None)
        | DbaseFieldValue::Float(None)
        | DbaseFieldValue::Date(None) => AttributeValue::Null,
    }
}

fn dbase_date(year: u32, month: u32, day: u32) -> AttributeValue {
    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        .map(AttributeValue::Date)
        .unwrap_or_else(|| AttributeValue::Text(format!("{:04}-{:02}-{:02}", year, month, day)))
}
