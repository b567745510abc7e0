use serde::Serialize;

/// Output for vector command
#[derive(Debug, Serialize)]
pub struct VectorOutput {
    pub path: String,
    pub tolerance_m: f64,
    pub feature_count: usize,
    pub label_field: String,
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub bounds: [f64; 4],
    /// `[lon, lat]`
    pub center: [f64; 2],
    pub output: Option<String>,
    /// Inline GeoJSON when no output file was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<serde_json::Value>,
}

/// Output for raster command
#[derive(Debug, Serialize)]
pub struct RasterOutput {
    pub path: String,
    pub width: u32,
    pub height: u32,
    /// `[[min_lat, min_lon], [max_lat, max_lon]]`
    pub bounds: [[f64; 2]; 2],
    pub colormap: String,
    pub value_min: f64,
    pub value_max: f64,
    pub png_bytes: usize,
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_uri: Option<String>,
}

/// Output for catalog command
#[derive(Debug, Serialize)]
pub struct CatalogOutput {
    pub modules: Vec<ModuleInfo>,
}

#[derive(Debug, Serialize)]
pub struct ModuleInfo {
    pub key: String,
    pub title: String,
    pub logo: String,
    pub dashboards: Vec<String>,
}

/// Output for catalog --module command
#[derive(Debug, Serialize)]
pub struct ModuleOutput {
    pub key: String,
    pub title: String,
    pub dashboards: Vec<DashboardInfo>,
}

#[derive(Debug, Serialize)]
pub struct DashboardInfo {
    pub name: String,
    pub description: String,
}

/// Output for encode command
#[derive(Debug, Serialize)]
pub struct EncodeOutput {
    pub path: String,
    pub data_uri: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct InspectConfigOutput {
    pub config_file: Option<String>,
    pub tolerance_m: ConfigEntry,
    pub max_edge_px: ConfigEntry,
    pub colormap: ConfigEntry,
    pub label_field: ConfigEntry,
    pub cache_capacity: ConfigEntry,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}
