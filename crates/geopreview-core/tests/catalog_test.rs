use geopreview_core::catalog::Catalog;
use geopreview_core::GeopreviewError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_every_builtin_dashboard_is_described() {
    let catalog = Catalog::builtin().unwrap();

    let keys: Vec<&str> = catalog.modules().iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["demo", "eco", "salud_seg", "infra", "medioamb", "opinion"]);

    for module in catalog.modules() {
        assert!(!module.dashboards.is_empty(), "module {} has no dashboards", module.key);
        for name in &module.dashboards {
            let desc = catalog.description(name).unwrap();
            assert!(!desc.is_empty());
        }
        assert!(module.logo.starts_with("./static/logos/"));
    }
}

#[test]
fn test_load_custom_catalog_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.toml");
    fs::write(
        &path,
        r#"
[[modules]]
key = "hidro"
title = "Hidrología"
logo = "./static/logos/hidro.png"
dashboards = ["Caudales", "Cuencas"]

[dashboards]
"Caudales" = "Caudales medios mensuales."
"Cuencas" = "Delimitación de cuencas."
"Sin uso" = "Descripción sin módulo."
"#,
    )
    .unwrap();

    let catalog = Catalog::load_from_file(&path).unwrap();
    assert_eq!(catalog.modules().len(), 1);

    let dashboards = catalog.dashboards_for("hidro").unwrap();
    assert_eq!(
        dashboards,
        vec![("Caudales", "Caudales medios mensuales."), ("Cuencas", "Delimitación de cuencas.")]
    );
    assert_eq!(catalog.description("Sin uso"), Some("Descripción sin módulo."));
}

#[test]
fn test_missing_catalog_file() {
    let dir = TempDir::new().unwrap();
    let err = Catalog::load_from_file(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, GeopreviewError::ConfigInvalid { .. }));
}
