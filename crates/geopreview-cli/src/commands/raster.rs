//! Raster command implementation

use crate::cli::RasterArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::RasterOutput;
use anyhow::{Context, Result};
use geopreview_core::cache::CachePolicy;
use geopreview_core::config::CliConfigOverrides;
use geopreview_raster::{RasterPipeline, RenderOptions};
use std::fs;
use std::path::Path;

pub fn execute(args: RasterArgs, output: &OutputWriter, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliConfigOverrides {
        max_edge_px: args.max_edge,
        colormap: args.colormap,
        ..Default::default()
    };
    let config = load_config_with_overrides(config_path, overrides)?;

    let options = RenderOptions {
        max_edge_px: config.max_edge_px.value,
        colormap: config.colormap.value.clone(),
        value_min: args.vmin,
        value_max: args.vmax,
    };

    let pipeline = RasterPipeline::new(CachePolicy::from_capacity(config.cache_capacity.value));
    let raster = pipeline
        .render(&args.path, &options)
        .with_context(|| format!("Failed to render {}", args.path.display()))?;

    if let Some(ref target) = args.output {
        fs::write(target, &raster.png)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }

    let data_uri = args.data_uri.then(|| raster.data_uri());

    if output.is_json() {
        output.result(RasterOutput {
            path: args.path.display().to_string(),
            width: raster.width,
            height: raster.height,
            bounds: raster.bounds,
            colormap: options.colormap,
            value_min: raster.value_min,
            value_max: raster.value_max,
            png_bytes: raster.png.len(),
            output: args.output.as_ref().map(|p| p.display().to_string()),
            data_uri,
        })?;
        return Ok(());
    }

    if let Some(uri) = data_uri {
        // Bare URI so it can be piped
        println!("{}", uri);
        return Ok(());
    }

    let [[min_lat, min_lon], [max_lat, max_lon]] = raster.bounds;
    output.section("Raster Preview");
    output.kv("Source", args.path.display());
    output.kv("Size", format!("{} x {} px", raster.width, raster.height));
    output.kv(
        "Bounds",
        format!("({:.6}, {:.6}) - ({:.6}, {:.6}) lat/lon", min_lat, min_lon, max_lat, max_lon),
    );
    output.kv("Colormap", &options.colormap);
    output.kv("Range", format!("{} .. {}", raster.value_min, raster.value_max));
    output.kv("PNG", format!("{} bytes", raster.png.len()));

    match args.output {
        Some(target) => output.success(format!("PNG written to {}", target.display())),
        None => output.info("Use --output FILE.png or --data-uri to get the image"),
    }

    Ok(())
}
