//! Module and dashboard catalog shown by the portal.
//!
//! The catalog is read-only reference data: loaded once, validated, and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{GeopreviewError, Result};

const DEFAULT_CATALOG: &str = include_str!("default_catalog.toml");

/// A topical module grouping several dashboards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub key: String,
    pub title: String,
    /// Path to the module's logo asset
    pub logo: String,
    /// Dashboard names in display order
    pub dashboards: Vec<String>,
}

/// Immutable module/dashboard catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    modules: Vec<Module>,
    dashboards: BTreeMap<String, String>,
}

impl Catalog {
    /// The catalog bundled with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeopreviewError::ConfigInvalid {
                key: "catalog".to_string(),
                reason: format!("Failed to read catalog file: {}", e),
            })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content).map_err(|e| GeopreviewError::ConfigInvalid {
            key: "catalog".to_string(),
            reason: format!("Failed to parse TOML: {}", e),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut keys = HashSet::new();
        for module in &self.modules {
            if !keys.insert(module.key.as_str()) {
                return Err(GeopreviewError::config_invalid(
                    "catalog",
                    format!("Duplicate module key '{}'", module.key),
                ));
            }
            if let Some(missing) =
                module.dashboards.iter().find(|name| !self.dashboards.contains_key(*name))
            {
                return Err(GeopreviewError::config_invalid(
                    "catalog",
                    format!("Dashboard '{}' in module '{}' has no description", missing, module.key),
                ));
            }
        }
        Ok(())
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, key: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.key == key)
    }

    pub fn description(&self, dashboard: &str) -> Option<&str> {
        self.dashboards.get(dashboard).map(String::as_str)
    }

    /// Dashboards of a module with their descriptions, in display order
    pub fn dashboards_for(&self, key: &str) -> Option<Vec<(&str, &str)>> {
        let module = self.module(key)?;
        Some(
            module
                .dashboards
                .iter()
                .filter_map(|name| self.description(name).map(|desc| (name.as_str(), desc)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.modules().len(), 6);

        let salud = catalog.module("salud_seg").unwrap();
        assert_eq!(salud.title, "Salud y Seguridad");
        assert_eq!(salud.dashboards.len(), 3);
    }

    #[test]
    fn test_dashboards_for_keeps_order() {
        let catalog = Catalog::builtin().unwrap();
        let dashboards = catalog.dashboards_for("demo").unwrap();
        let names: Vec<&str> = dashboards.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["Censo poblacional", "Tendencias demográficas", "Migración interna", "Uso del suelo"]
        );
        assert!(catalog.dashboards_for("missing").is_none());
    }

    #[test]
    fn test_missing_description_rejected() {
        let toml = r#"
[[modules]]
key = "a"
title = "A"
logo = "a.png"
dashboards = ["Orphan"]

[dashboards]
"#;
        let err = Catalog::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("Orphan"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let toml = r#"
[[modules]]
key = "a"
title = "A"
logo = "a.png"
dashboards = []

[[modules]]
key = "a"
title = "Again"
logo = "a.png"
dashboards = []

[dashboards]
"#;
        assert!(Catalog::from_toml_str(toml).is_err());
    }
}
