//! Raster visualization pipeline
//!
//! `render_raster` opens a GeoTIFF, warps it to EPSG:4326 on read at no more
//! than `max_edge_px` on the long side, stretches and color-maps band 1, and
//! encodes the result as an RGBA PNG together with its lat/lon bounds.

use geopreview_core::cache::{CachePolicy, MemoCache};
use geopreview_core::config::{DEFAULT_COLORMAP, DEFAULT_MAX_EDGE_PX};
use geopreview_core::encoding::encode_as_data_uri;
use geopreview_core::error::{GeopreviewError, Result};
use geopreview_core::models::Bounds;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::colormap::Colormap;
use crate::geotiff::open_geotiff;
use crate::stretch::{display_range, normalize};
use crate::warp::WarpedView;

/// Rendering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Longest edge of the output image in pixels
    pub max_edge_px: u32,
    pub colormap: String,
    /// Explicit display range; used only when both ends are set
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_edge_px: DEFAULT_MAX_EDGE_PX,
            colormap: DEFAULT_COLORMAP.to_string(),
            value_min: None,
            value_max: None,
        }
    }
}

/// A color-mapped raster overlay ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRaster {
    /// RGBA PNG bytes
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `[[min_lat, min_lon], [max_lat, max_lon]]`
    pub bounds: [[f64; 2]; 2],
    pub value_min: f64,
    pub value_max: f64,
}

impl DisplayRaster {
    /// The PNG as `data:image/png;base64,...`
    pub fn data_uri(&self) -> String {
        encode_as_data_uri(&self.png, "image/png")
    }

    /// Bounds as lon/lat [`Bounds`]
    pub fn extent(&self) -> Bounds {
        let [[min_lat, min_lon], [max_lat, max_lon]] = self.bounds;
        Bounds::new(min_lon, min_lat, max_lon, max_lat)
    }
}

/// Output dimensions for a `width` x `height` view under a `max_edge` budget.
///
/// Never upsamples; each axis keeps at least one pixel.
pub fn target_dimensions(width: usize, height: usize, max_edge: u32) -> (usize, usize) {
    let longest = width.max(height).max(1) as f64;
    let scale = (f64::from(max_edge) / longest).min(1.0);
    let scaled = |dim: usize| ((dim as f64 * scale).round() as usize).max(1);
    (scaled(width), scaled(height))
}

/// Render band 1 of the GeoTIFF at `path` as a color-mapped PNG
pub fn render_raster(path: &Path, options: &RenderOptions) -> Result<DisplayRaster> {
    let colormap: Colormap = options.colormap.parse()?;
    if options.max_edge_px == 0 {
        return Err(GeopreviewError::config_invalid("max_edge_px", "Must be at least 1 pixel"));
    }

    let dataset = open_geotiff(path)?;
    let view = WarpedView::new(&dataset)?;

    let (out_w, out_h) = target_dimensions(view.width(), view.height(), options.max_edge_px);
    let data = view.read(out_w, out_h);

    let transform = view.output_transform(out_w, out_h);
    let (min_lon, min_lat) = transform.forward(0.0, out_h as f64);
    let (max_lon, max_lat) = transform.forward(out_w as f64, 0.0);

    let (value_min, value_max) = display_range(&data, options.value_min, options.value_max, path)?;
    let rgba = colorize(&data, colormap, value_min, value_max);
    let png = encode_png(&rgba, out_w as u32, out_h as u32)?;

    tracing::debug!(
        "Rendered {} at {}x{} with {} over [{}, {}]",
        path.display(),
        out_w,
        out_h,
        colormap,
        value_min,
        value_max
    );

    Ok(DisplayRaster {
        png,
        width: out_w as u32,
        height: out_h as u32,
        bounds: [[min_lat, min_lon], [max_lat, max_lon]],
        value_min,
        value_max,
    })
}

/// Row-major RGBA pixels; non-finite samples are fully transparent
fn colorize(data: &Array2<f64>, colormap: Colormap, min: f64, max: f64) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len() * 4);
    for &value in data.iter() {
        rgba.extend_from_slice(&colormap.rgba(normalize(value, min, max)));
    }
    rgba
}

fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive)
        .write_image(rgba, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| GeopreviewError::Serialization(format!("PNG encoding failed: {}", e)))?;
    Ok(buf)
}

type RenderKey = (PathBuf, u32, Colormap, Option<u64>, Option<u64>);

/// Memoizing front end of the raster pipeline
pub struct RasterPipeline {
    results: MemoCache<RenderKey, DisplayRaster>,
}

impl RasterPipeline {
    pub fn new(policy: CachePolicy) -> Self {
        Self { results: MemoCache::new(policy) }
    }

    /// Rendered overlay for `(path, options)`, computed once
    pub fn render(&self, path: &Path, options: &RenderOptions) -> Result<Arc<DisplayRaster>> {
        // Spellings of the same ramp share an entry
        let colormap: Colormap = options.colormap.parse()?;
        let key = (
            path.to_path_buf(),
            options.max_edge_px,
            colormap,
            options.value_min.map(f64::to_bits),
            options.value_max.map(f64::to_bits),
        );

        self.results.get_or_try_insert_with(key, || render_raster(path, options))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&self) {
        self.results.clear();
    }
}

impl Default for RasterPipeline {
    fn default() -> Self {
        Self::new(CachePolicy::Unbounded)
    }
}
