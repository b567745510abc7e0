use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geopreview - Web-map previews of boundary layers and raster surfaces
#[derive(Parser, Debug)]
#[command(name = "geopreview")]
#[command(about = "Simplified GeoJSON and color-mapped raster overlays for web maps", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./geopreview.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simplify a Shapefile into GeoJSON for display
    Vector(VectorArgs),

    /// Render a GeoTIFF as a color-mapped PNG overlay
    Raster(RasterArgs),

    /// List portal modules and their dashboards
    Catalog(CatalogArgs),

    /// Print a static asset as a data URI
    Encode(EncodeArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct VectorArgs {
    /// Path to the .shp file
    pub path: PathBuf,

    /// Simplification tolerance in metres
    #[arg(long, value_name = "METRES", allow_negative_numbers = true)]
    pub tolerance: Option<f64>,

    /// Preferred attribute column for feature labels
    #[arg(long, value_name = "NAME")]
    pub label_field: Option<String>,

    /// Write the GeoJSON FeatureCollection to this file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RasterArgs {
    /// Path to the GeoTIFF
    pub path: PathBuf,

    /// Longest edge of the output image in pixels
    #[arg(long, value_name = "PX")]
    pub max_edge: Option<u32>,

    /// Color ramp (viridis, plasma, inferno, magma, cividis, terrain, greys, coolwarm)
    #[arg(long, value_name = "NAME")]
    pub colormap: Option<String>,

    /// Lower end of the display range (requires --vmax)
    #[arg(long, requires = "vmax", allow_negative_numbers = true)]
    pub vmin: Option<f64>,

    /// Upper end of the display range (requires --vmin)
    #[arg(long, requires = "vmin", allow_negative_numbers = true)]
    pub vmax: Option<f64>,

    /// Write the PNG to this file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the PNG as a data URI
    #[arg(long)]
    pub data_uri: bool,
}

#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Show the dashboards of one module
    #[arg(long, value_name = "KEY")]
    pub module: Option<String>,

    /// Catalog TOML file to use instead of the built-in one
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Image file (PNG, SVG, JPEG)
    pub file: PathBuf,
}
