//! Config command implementation

use crate::config_loader::{load_config, resolve_config_path};
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, InspectConfigOutput};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use tabled::Tabled;

pub fn execute(output: &OutputWriter, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let config_file = resolve_config_path(config_path).map(|p| p.display().to_string());
    let inspection_map = config.to_inspection_map();

    if output.is_json() {
        let entry = |key: &str| {
            inspection_map
                .get(key)
                .map(|(value, source)| ConfigEntry { value: value.clone(), source: format!("{:?}", source) })
                .unwrap_or_else(|| ConfigEntry { value: String::new(), source: "Default".to_string() })
        };

        output.result(InspectConfigOutput {
            config_file,
            tolerance_m: entry("tolerance_m"),
            max_edge_px: entry("max_edge_px"),
            colormap: entry("colormap"),
            label_field: entry("label_field"),
            cache_capacity: entry("cache_capacity"),
        })?;
    } else {
        output.section("Configuration Values");
        output.kv("Config File", config_file.as_deref().unwrap_or("(none)"));
        output.table(config_rows(inspection_map));

        output.section("Configuration Precedence");
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

fn config_rows(inspection_map: HashMap<String, (String, geopreview_core::config::ConfigSource)>) -> Vec<ConfigRow> {
    let mut rows: Vec<ConfigRow> = inspection_map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();

    // Sort by key for consistent output
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}
