//! Vector command implementation

use crate::cli::VectorArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::VectorOutput;
use anyhow::{Context, Result};
use geopreview_core::cache::CachePolicy;
use geopreview_core::config::CliConfigOverrides;
use geopreview_geo::VectorPipeline;
use std::fs;
use std::path::Path;

pub fn execute(args: VectorArgs, output: &OutputWriter, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliConfigOverrides {
        tolerance_m: args.tolerance,
        label_field: args.label_field,
        ..Default::default()
    };
    let config = load_config_with_overrides(config_path, overrides)?;
    let tolerance_m = config.tolerance_m.value;

    let pipeline = VectorPipeline::new(CachePolicy::from_capacity(config.cache_capacity.value))
        .with_label_field(config.label_field.value.as_str());

    let result = pipeline
        .simplify(&args.path, tolerance_m)
        .with_context(|| format!("Failed to simplify {}", args.path.display()))?;

    if result.label_field != pipeline.label_field() {
        output.warning(format!(
            "Column '{}' not found, labelling features by '{}'",
            pipeline.label_field(),
            result.label_field
        ));
    }

    if let Some(ref target) = args.output {
        fs::write(target, &result.serialized_geometry)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }

    let bounds = result.bounds;
    let (center_lon, center_lat) = bounds.center();

    if output.is_json() {
        let geojson = match args.output {
            Some(_) => None,
            None => Some(serde_json::from_str(&result.serialized_geometry)?),
        };
        output.result(VectorOutput {
            path: args.path.display().to_string(),
            tolerance_m,
            feature_count: result.feature_count,
            label_field: result.label_field.clone(),
            bounds: bounds.to_array(),
            center: [center_lon, center_lat],
            output: args.output.as_ref().map(|p| p.display().to_string()),
            geojson,
        })?;
    } else {
        output.section("Vector Preview");
        output.kv("Source", args.path.display());
        output.kv("Tolerance", format!("{} m", tolerance_m));
        output.kv("Features", result.feature_count);
        output.kv("Label Field", &result.label_field);
        output.kv(
            "Bounds",
            format!(
                "[{:.6}, {:.6}] - [{:.6}, {:.6}]",
                bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
            ),
        );
        output.kv("Center", format!("{:.6}, {:.6}", center_lon, center_lat));

        match args.output {
            Some(target) => output.success(format!("GeoJSON written to {}", target.display())),
            None => output.info("Use --output FILE to save the GeoJSON"),
        }
    }

    Ok(())
}
