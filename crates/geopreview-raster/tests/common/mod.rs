//! GeoTIFF fixtures shared by the integration tests

#![allow(dead_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// How the fixture declares its CRS
pub enum GeoKeys {
    /// GeographicTypeGeoKey (2048)
    Geographic(u16),
    /// ProjectedCSTypeGeoKey (3072)
    Projected(u16),
    /// No GeoKeyDirectory at all
    Missing,
}

/// A single-band float raster georeferenced by tiepoint and pixel scale
pub struct Fixture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
    /// Upper-left corner in CRS units
    pub origin: (f64, f64),
    pub pixel_size: f64,
    pub keys: GeoKeys,
    pub nodata: Option<&'static str>,
}

impl Fixture {
    /// `width` x `height` raster with values from `f(col, row)`, declared as EPSG:4326
    pub fn grid(width: u32, height: u32, origin: (f64, f64), pixel_size: f64, f: impl Fn(u32, u32) -> f32) -> Self {
        let data = (0..height).flat_map(|row| (0..width).map(move |col| (col, row))).map(|(c, r)| f(c, r)).collect();
        Self { width, height, data, origin, pixel_size, keys: GeoKeys::Geographic(4326), nodata: None }
    }

    pub fn with_keys(mut self, keys: GeoKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_nodata(mut self, nodata: &'static str) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let file = BufWriter::new(File::create(&path).unwrap());
        let mut encoder = TiffEncoder::new(file).unwrap();
        let mut image = encoder.new_image::<Gray32Float>(self.width, self.height).unwrap();

        let scale = [self.pixel_size, self.pixel_size, 0.0];
        image.encoder().write_tag(Tag::Unknown(33550), &scale[..]).unwrap();

        let tiepoint = [0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0];
        image.encoder().write_tag(Tag::Unknown(33922), &tiepoint[..]).unwrap();

        let geokeys: Option<Vec<u16>> = match self.keys {
            GeoKeys::Geographic(code) => Some(vec![
                1, 1, 0, 3, //
                1024, 0, 1, 2, // ModelTypeGeographic
                1025, 0, 1, 1, // RasterPixelIsArea
                2048, 0, 1, code,
            ]),
            GeoKeys::Projected(code) => Some(vec![
                1, 1, 0, 3, //
                1024, 0, 1, 1, // ModelTypeProjected
                1025, 0, 1, 1, // RasterPixelIsArea
                3072, 0, 1, code,
            ]),
            GeoKeys::Missing => None,
        };
        if let Some(keys) = geokeys {
            image.encoder().write_tag(Tag::Unknown(34735), &keys[..]).unwrap();
        }

        if let Some(nodata) = self.nodata {
            image.encoder().write_tag(Tag::Unknown(42113), nodata).unwrap();
        }

        image.write_data(&self.data).unwrap();
        path
    }
}

/// Decode a PNG into (width, height, RGBA pixels)
pub fn decode_png(png: &[u8]) -> (u32, u32, Vec<[u8; 4]>) {
    let image = image::load_from_memory(png).unwrap().to_rgba8();
    let (w, h) = image.dimensions();
    (w, h, image.pixels().map(|p| p.0).collect())
}
