//! geopreview raster - raster side of the preview pipeline
//!
//! Opens a single-band GeoTIFF, warps it to WGS 84 on read, downsamples it to
//! a pixel budget and renders a color-mapped, alpha-masked PNG overlay with
//! its geographic bounds.

pub mod affine;
pub mod colormap;
pub mod geotiff;
pub mod render;
pub mod stretch;
pub mod warp;

pub use affine::Affine;
pub use colormap::Colormap;
pub use geotiff::{open_geotiff, RasterDataset};
pub use render::{render_raster, DisplayRaster, RasterPipeline, RenderOptions};
pub use warp::WarpedView;
