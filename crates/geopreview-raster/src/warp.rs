//! Virtual warped view into EPSG:4326
//!
//! Nothing is materialized when the view is built: the output grid is derived
//! from the source footprint, and pixels are only pulled from the source when
//! [`WarpedView::read`] samples it at a requested resolution.

use geopreview_core::error::{GeopreviewError, Result};
use geopreview_core::models::Crs;
use ndarray::{Array2, ArrayView2};
use proj::Proj;

use crate::affine::Affine;
use crate::geotiff::RasterDataset;

/// Sample points per source edge when estimating the target footprint
const EDGE_SAMPLES: usize = 21;

/// A bilinear, read-time reprojection of a raster to WGS 84
pub struct WarpedView<'a> {
    source: &'a RasterDataset,
    source_inverse: Affine,
    width: usize,
    height: usize,
    transform: Affine,
    /// WGS 84 to source CRS; `None` when the source is already WGS 84
    to_source: Option<Proj>,
}

impl<'a> WarpedView<'a> {
    /// Build the view, choosing the output grid the way GDAL suggests a warp
    /// output: the densified source edges give the target extent, and square
    /// pixels are sized so the target diagonal holds as many pixels as the
    /// source diagonal.
    pub fn new(source: &'a RasterDataset) -> Result<Self> {
        let crs = source.crs.as_ref().ok_or_else(|| {
            GeopreviewError::reprojection("undefined", "Raster has no usable CRS to warp from")
        })?;
        let source_inverse = source
            .transform
            .inverse()
            .ok_or_else(|| GeopreviewError::data_load(&source.path, "Singular geotransform"))?;

        if crs.is_geographic_wgs84() {
            return Ok(Self {
                source,
                source_inverse,
                width: source.width(),
                height: source.height(),
                transform: source.transform,
                to_source: None,
            });
        }

        let wgs84 = Crs::wgs84();
        let to_target = known_crs(crs, &wgs84)?;
        let to_source = known_crs(&wgs84, crs)?;

        let (min_x, min_y, max_x, max_y) = footprint(source, &to_target).ok_or_else(|| {
            GeopreviewError::reprojection(crs.to_string(), "No part of the raster maps to EPSG:4326")
        })?;

        let (src_w, src_h) = (source.width() as f64, source.height() as f64);
        let (ext_w, ext_h) = (max_x - min_x, max_y - min_y);
        let res = (ext_w * ext_w + ext_h * ext_h).sqrt() / (src_w * src_w + src_h * src_h).sqrt();

        let width = ((ext_w / res).round() as usize).max(1);
        let height = ((ext_h / res).round() as usize).max(1);
        let transform = Affine::new(res, 0.0, min_x, 0.0, -res, max_y);

        tracing::debug!(
            "Warped view {} -> EPSG:4326: {}x{} at {} deg/px",
            crs,
            width,
            height,
            res
        );

        Ok(Self { source, source_inverse, width, height, transform, to_source: Some(to_source) })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel to lon/lat transform of the full-resolution view
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Transform of the view resampled to `out_width` x `out_height`
    pub fn output_transform(&self, out_width: usize, out_height: usize) -> Affine {
        self.transform
            * Affine::scale(
                self.width as f64 / out_width as f64,
                self.height as f64 / out_height as f64,
            )
    }

    /// Read the view at `out_width` x `out_height`, sampling the source
    /// bilinearly at each output pixel centre. Pixels that fall outside the
    /// source or on no-data are NaN.
    pub fn read(&self, out_width: usize, out_height: usize) -> Array2<f64> {
        let out_transform = self.output_transform(out_width, out_height);
        let band = self.source.band.view();

        Array2::from_shape_fn((out_height, out_width), |(row, col)| {
            let (lon, lat) = out_transform.forward(col as f64 + 0.5, row as f64 + 0.5);

            let (x, y) = match &self.to_source {
                Some(proj) => match proj.convert((lon, lat)) {
                    Ok(xy) => xy,
                    Err(_) => return f64::NAN,
                },
                None => (lon, lat),
            };

            let (src_col, src_row) = self.source_inverse.forward(x, y);
            sample_bilinear(&band, src_col, src_row)
        })
    }
}

fn known_crs(from: &Crs, to: &Crs) -> Result<Proj> {
    Proj::new_known_crs(&from.definition, &to.definition, None).map_err(|e| {
        GeopreviewError::reprojection(from.to_string(), format!("Failed to create projection to {}: {}", to, e))
    })
}

/// Extent in the target CRS of the densified source edges
fn footprint(source: &RasterDataset, to_target: &Proj) -> Option<(f64, f64, f64, f64)> {
    let (w, h) = (source.width() as f64, source.height() as f64);
    let steps = (EDGE_SAMPLES - 1) as f64;

    let mut edge_points = Vec::with_capacity(EDGE_SAMPLES * 4);
    for i in 0..EDGE_SAMPLES {
        let t = i as f64 / steps;
        edge_points.push((t * w, 0.0));
        edge_points.push((t * w, h));
        edge_points.push((0.0, t * h));
        edge_points.push((w, t * h));
    }

    edge_points
        .into_iter()
        .filter_map(|(col, row)| {
            let (x, y) = source.transform.forward(col, row);
            to_target.convert((x, y)).ok()
        })
        .filter(|(x, y): &(f64, f64)| x.is_finite() && y.is_finite())
        .fold(None, |acc, (x, y)| match acc {
            None => Some((x, y, x, y)),
            Some((min_x, min_y, max_x, max_y)) => {
                Some((min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)))
            }
        })
}

/// Bilinear sample at pixel-corner coordinates (`col`, `row`).
///
/// The 2x2 neighbourhood is clamped at the grid edges. NaN neighbours are
/// dropped and the remaining weights renormalized; the result is NaN when the
/// point lies outside the grid or the pixel containing it is NaN.
pub fn sample_bilinear(band: &ArrayView2<'_, f64>, col: f64, row: f64) -> f64 {
    let (rows, cols) = band.dim();
    if !(col >= 0.0 && row >= 0.0 && col < cols as f64 && row < rows as f64) {
        return f64::NAN;
    }

    if band[(row as usize, col as usize)].is_nan() {
        return f64::NAN;
    }

    // Centre-based coordinates
    let cx = col - 0.5;
    let cy = row - 0.5;
    let x0 = cx.floor();
    let y0 = cy.floor();
    let dx = cx - x0;
    let dy = cy - y0;

    let clamp_col = |c: f64| c.clamp(0.0, (cols - 1) as f64) as usize;
    let clamp_row = |r: f64| r.clamp(0.0, (rows - 1) as f64) as usize;
    let (c0, c1) = (clamp_col(x0), clamp_col(x0 + 1.0));
    let (r0, r1) = (clamp_row(y0), clamp_row(y0 + 1.0));

    let neighbours = [
        (band[(r0, c0)], (1.0 - dx) * (1.0 - dy)),
        (band[(r0, c1)], dx * (1.0 - dy)),
        (band[(r1, c0)], (1.0 - dx) * dy),
        (band[(r1, c1)], dx * dy),
    ];

    let (sum, weight) = neighbours
        .iter()
        .filter(|(value, _)| !value.is_nan())
        .fold((0.0, 0.0), |(sum, weight), (value, w)| (sum + value * w, weight + w));

    if weight > 0.0 {
        sum / weight
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::path::PathBuf;

    fn dataset(band: Array2<f64>, transform: Affine, crs: Option<Crs>) -> RasterDataset {
        RasterDataset { path: PathBuf::from("test.tif"), band, band_count: 1, transform, crs, nodata: None }
    }

    #[test]
    fn test_pixel_center_exact() {
        let arr = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        assert_relative_eq!(sample_bilinear(&arr.view(), 1.5, 1.5), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_midpoint_interpolation() {
        let arr = array![[0.0, 10.0], [0.0, 10.0]];
        assert_relative_eq!(sample_bilinear(&arr.view(), 1.0, 0.5), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_edges_are_clamped() {
        let arr = array![[1.0, 2.0], [3.0, 4.0]];
        // Left of the first pixel centre only the first column contributes
        assert_relative_eq!(sample_bilinear(&arr.view(), 0.1, 0.5), 1.0, epsilon = 1e-10);
        assert!(sample_bilinear(&arr.view(), 2.0, 0.5).is_nan());
        assert!(sample_bilinear(&arr.view(), -0.1, 0.5).is_nan());
    }

    #[test]
    fn test_nan_neighbours_renormalized() {
        let arr = array![[1.0, f64::NAN], [3.0, 5.0]];
        // Containing pixel (1,1) is finite; the NaN neighbour is dropped
        let v = sample_bilinear(&arr.view(), 1.0, 1.0);
        assert_relative_eq!(v, 3.0, epsilon = 1e-10);
        // Containing pixel is NaN
        assert!(sample_bilinear(&arr.view(), 1.5, 0.5).is_nan());
    }

    #[test]
    fn test_missing_crs_is_reprojection_error() {
        let ds = dataset(Array2::zeros((4, 4)), Affine::new(1.0, 0.0, 0.0, 0.0, -1.0, 4.0), None);
        let err = WarpedView::new(&ds).err().unwrap();
        assert!(matches!(err, GeopreviewError::Reprojection { .. }));
    }

    #[test]
    fn test_singular_transform_is_data_load_error() {
        let ds = dataset(Array2::zeros((4, 4)), Affine::new(0.0, 0.0, -85.0, 0.0, 0.0, 11.0), Some(Crs::wgs84()));
        match WarpedView::new(&ds).err() {
            Some(GeopreviewError::DataLoad { path, .. }) => assert_eq!(path, PathBuf::from("test.tif")),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_wgs84_source_keeps_grid() {
        let transform = Affine::new(0.5, 0.0, -85.0, 0.0, -0.5, 11.0);
        let band = Array2::from_shape_fn((6, 6), |(r, c)| (r * 6 + c) as f64);
        let ds = dataset(band.clone(), transform, Some(Crs::wgs84()));

        let view = WarpedView::new(&ds).unwrap();
        assert_eq!((view.width(), view.height()), (6, 6));
        assert_eq!(view.transform(), transform);

        let full = view.read(6, 6);
        assert_eq!(full, band);

        let half = view.read(3, 3);
        assert_eq!(half.dim(), (3, 3));
        assert_eq!(view.output_transform(3, 3).a, 1.0);
    }

    #[test]
    fn test_projected_source_lands_in_lon_lat() {
        // 10 km UTM 17N tile east of the central meridian
        let transform = Affine::new(100.0, 0.0, 500_000.0, 0.0, -100.0, 1_010_000.0);
        let ds = dataset(Array2::from_elem((100, 100), 7.0), transform, Some(Crs::from_epsg(32617, "UTM 17N")));

        let view = WarpedView::new(&ds).unwrap();
        let t = view.transform();
        assert_relative_eq!(t.c, -81.0, epsilon = 1e-3);
        assert!(t.f > 9.1 && t.f < 9.2);
        assert_relative_eq!(t.a, -t.e);
        // Near-square footprint keeps a near-square grid
        assert!((view.width() as i64 - view.height() as i64).abs() <= 2);

        let data = view.read(50, 50);
        let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
        assert!(finite.len() > 2000);
        assert!(finite.iter().all(|v| (*v - 7.0).abs() < 1e-9));
    }
}
