//! Native GeoTIFF reading
//!
//! Uses the `tiff` crate for TIFF decoding and reads the georeferencing from
//! the GeoTIFF tags directly:
//! - ModelPixelScale (33550) + ModelTiepoint (33922), or ModelTransformation (34264)
//! - GeoKeyDirectory (34735): ProjectedCSTypeGeoKey / GeographicTypeGeoKey
//! - GDAL_NODATA (42113)

use geopreview_core::error::{GeopreviewError, Result};
use geopreview_core::models::Crs;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::affine::Affine;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;
const USER_DEFINED: u16 = 32767;

/// Band 1 of a GeoTIFF with its georeferencing
#[derive(Debug, Clone)]
pub struct RasterDataset {
    pub path: PathBuf,
    /// Band 1, row 0 at the top; no-data samples are NaN
    pub band: Array2<f64>,
    pub band_count: usize,
    /// Pixel (col, row) to CRS transform
    pub transform: Affine,
    pub crs: Option<Crs>,
    pub nodata: Option<f64>,
}

impl RasterDataset {
    pub fn width(&self) -> usize {
        self.band.ncols()
    }

    pub fn height(&self) -> usize {
        self.band.nrows()
    }
}

/// Open a GeoTIFF and read band 1.
///
/// The file handle is released before this returns.
pub fn open_geotiff(path: &Path) -> Result<RasterDataset> {
    let file = File::open(path).map_err(|e| GeopreviewError::data_load(path, e.to_string()))?;
    decode_geotiff(path, BufReader::new(file))
}

fn decode_geotiff<R: Read + Seek>(path: &Path, reader: R) -> Result<RasterDataset> {
    let mut decoder = Decoder::new(reader)
        .map_err(|e| GeopreviewError::data_load(path, format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| GeopreviewError::data_load(path, format!("Cannot read dimensions: {}", e)))?;
    let (cols, rows) = (width as usize, height as usize);

    let band_count = decoder.get_tag_u32(Tag::SamplesPerPixel).map(|n| n as usize).unwrap_or(1);
    if band_count == 0 || cols == 0 || rows == 0 {
        return Err(GeopreviewError::data_load(path, "Raster has no bands or no pixels"));
    }

    let transform = read_geotransform(&mut decoder)
        .ok_or_else(|| GeopreviewError::data_load(path, "Missing GeoTIFF georeferencing tags"))?;
    if transform.inverse().is_none() {
        return Err(GeopreviewError::data_load(path, "Singular geotransform (zero or non-finite pixel size)"));
    }
    let crs = read_crs(&mut decoder);
    let nodata = read_nodata(&mut decoder);

    let image = decoder
        .read_image()
        .map_err(|e| GeopreviewError::data_load(path, format!("Cannot read image data: {}", e)))?;

    let samples = to_f64(path, image)?;
    if samples.len() != rows * cols * band_count {
        return Err(GeopreviewError::data_load(
            path,
            format!(
                "Expected {} samples for {}x{}x{}, found {}",
                rows * cols * band_count,
                cols,
                rows,
                band_count,
                samples.len()
            ),
        ));
    }

    // De-interleave band 1 and mask the no-data sentinel
    let band1: Vec<f64> = samples
        .iter()
        .step_by(band_count)
        .map(|&v| match nodata {
            Some(nd) if v == nd => f64::NAN,
            _ => v,
        })
        .collect();

    let band = Array2::from_shape_vec((rows, cols), band1)
        .map_err(|e| GeopreviewError::data_load(path, e.to_string()))?;

    tracing::debug!(
        "Opened {} ({}x{}, {} band(s), crs {:?}, nodata {:?})",
        path.display(),
        cols,
        rows,
        band_count,
        crs.as_ref().map(|c| c.to_string()),
        nodata
    );

    Ok(RasterDataset { path: path.to_path_buf(), band, band_count, transform, crs, nodata })
}

fn to_f64(path: &Path, image: DecodingResult) -> Result<Vec<f64>> {
    let values = match image {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        #[allow(unreachable_patterns)]
        _ => return Err(GeopreviewError::data_load(path, "Unsupported TIFF sample format")),
    };
    Ok(values)
}

/// `Tag` for a numeric GeoTIFF tag, whether or not `tiff` names it
fn geotiff_tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<Affine> {
    if let (Ok(scale), Ok(tiepoint)) = (
        decoder.get_tag_f64_vec(geotiff_tag(MODEL_PIXEL_SCALE)),
        decoder.get_tag_f64_vec(geotiff_tag(MODEL_TIEPOINT)),
    ) {
        if let Some(transform) = Affine::from_tiepoint(&tiepoint, &scale) {
            return Some(transform);
        }
    }

    decoder
        .get_tag_f64_vec(geotiff_tag(MODEL_TRANSFORMATION))
        .ok()
        .and_then(|matrix| Affine::from_model_transformation(&matrix))
}

/// EPSG code from the GeoKey directory; user-defined CRSs yield `None`
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<Crs> {
    let keys = decoder.get_tag_u16_vec(geotiff_tag(GEO_KEY_DIRECTORY)).ok()?;
    let code = epsg_from_geokeys(&keys)?;
    let name = if code == 4326 { "WGS 84".to_string() } else { format!("EPSG:{}", code) };
    Some(Crs::from_epsg(u32::from(code), name))
}

/// Look up ProjectedCSTypeGeoKey, then GeographicTypeGeoKey, in a raw
/// GeoKeyDirectory (`[version, revision, minor, count, (id, location, count, value)*]`)
pub fn epsg_from_geokeys(keys: &[u16]) -> Option<u16> {
    let count = usize::from(*keys.get(3)?);
    let entries: Vec<&[u16]> = keys[4..].chunks_exact(4).take(count).collect();

    let value_of = |key: u16| {
        entries
            .iter()
            .find(|entry| entry[0] == key && entry[1] == 0)
            .map(|entry| entry[3])
            .filter(|code| *code != USER_DEFINED && *code != 0)
    };

    value_of(PROJECTED_CS_TYPE_KEY).or_else(|| value_of(GEOGRAPHIC_TYPE_KEY))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let raw = decoder.get_tag_ascii_string(geotiff_tag(GDAL_NODATA)).ok()?;
    raw.trim_matches(|c: char| c == '\0' || c.is_whitespace()).parse::<f64>().ok()
}
