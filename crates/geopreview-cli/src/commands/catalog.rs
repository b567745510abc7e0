//! Catalog command implementation

use crate::cli::CatalogArgs;
use crate::output::OutputWriter;
use crate::output_types::{CatalogOutput, DashboardInfo, ModuleInfo, ModuleOutput};
use anyhow::Result;
use geopreview_core::catalog::Catalog;
use geopreview_core::GeopreviewError;
use tabled::Tabled;

pub fn execute(args: CatalogArgs, output: &OutputWriter) -> Result<()> {
    let catalog = match args.file {
        Some(ref path) => Catalog::load_from_file(path)?,
        None => Catalog::builtin()?,
    };

    match args.module {
        Some(ref key) => show_module(&catalog, key, output),
        None => list_modules(&catalog, output),
    }
}

/// List every module
fn list_modules(catalog: &Catalog, output: &OutputWriter) -> Result<()> {
    if output.is_json() {
        let modules = catalog
            .modules()
            .iter()
            .map(|m| ModuleInfo {
                key: m.key.clone(),
                title: m.title.clone(),
                logo: m.logo.clone(),
                dashboards: m.dashboards.clone(),
            })
            .collect();
        return output.result(CatalogOutput { modules });
    }

    output.section("Modules");

    #[derive(Tabled)]
    struct ModuleRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Dashboards")]
        dashboards: usize,
    }

    let rows: Vec<ModuleRow> = catalog
        .modules()
        .iter()
        .map(|m| ModuleRow { key: m.key.clone(), title: m.title.clone(), dashboards: m.dashboards.len() })
        .collect();

    output.table(rows);
    Ok(())
}

/// Show one module's dashboards with their descriptions
fn show_module(catalog: &Catalog, key: &str, output: &OutputWriter) -> Result<()> {
    let (module, dashboards) = match (catalog.module(key), catalog.dashboards_for(key)) {
        (Some(module), Some(dashboards)) => (module, dashboards),
        _ => {
            let known: Vec<&str> = catalog.modules().iter().map(|m| m.key.as_str()).collect();
            return Err(GeopreviewError::config_invalid(
                "module",
                format!("Unknown module '{}' (available: {})", key, known.join(", ")),
            )
            .into());
        }
    };

    if output.is_json() {
        return output.result(ModuleOutput {
            key: module.key.clone(),
            title: module.title.clone(),
            dashboards: dashboards
                .into_iter()
                .map(|(name, description)| DashboardInfo {
                    name: name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        });
    }

    output.section(&module.title);
    output.kv("Logo", &module.logo);

    #[derive(Tabled)]
    struct DashboardRow {
        #[tabled(rename = "Dashboard")]
        name: String,
        #[tabled(rename = "Description")]
        description: String,
    }

    let rows: Vec<DashboardRow> = dashboards
        .into_iter()
        .map(|(name, description)| DashboardRow {
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect();

    output.table(rows);
    Ok(())
}
