use console::style;
use geopreview_core::GeopreviewError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new(), help_command: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }

    /// Print the error as a JSON object on stdout
    pub fn display_json(&self) {
        let output = serde_json::json!({
            "status": "error",
            "message": self.message,
            "context": self.context,
            "suggestions": self.suggestions,
        });
        println!("{}", output);
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Error for a source dataset that cannot be read
pub fn data_load_failed(path: &str, reason: &str) -> CliError {
    CliError::new("Cannot load dataset")
        .with_context(format!("Path: {}\nReason: {}", path, reason))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Shapefiles need their .shx and .dbf next to the .shp")
        .with_suggestion("Rasters must be georeferenced GeoTIFFs")
}

/// Error for a raster without a single valid sample
pub fn no_data(path: &str) -> CliError {
    CliError::new("Raster has no valid data")
        .with_context(format!("Every sample in {} is no-data or NaN.", path))
        .with_suggestion("Pass an explicit range with --vmin and --vmax")
        .with_help("Run: geopreview raster --help")
}

/// Error for a CRS that cannot be used
pub fn reprojection_failed(crs: &str, reason: &str) -> CliError {
    CliError::new("Cannot reproject to EPSG:4326")
        .with_context(format!("Source CRS: {}\nReason: {}", crs, reason))
        .with_suggestion("Make sure the dataset declares its coordinate reference system")
        .with_suggestion("For Shapefiles, check the .prj file")
}

/// Error for a tolerance the simplifier rejected
pub fn simplification_failed(tolerance: f64, reason: &str) -> CliError {
    CliError::new("Simplification failed")
        .with_context(format!("Tolerance: {} m\nReason: {}", tolerance, reason))
        .with_suggestion("Use a smaller, non-negative --tolerance")
        .with_help("Run: geopreview vector --help")
}

/// Error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check geopreview.toml and GEOPREVIEW_* environment variables")
        .with_suggestion("Inspect the effective values: geopreview config")
        .with_help("Run: geopreview --help")
}

fn from_geopreview(error: &GeopreviewError) -> CliError {
    match error {
        GeopreviewError::DataLoad { path, reason } => {
            data_load_failed(&path.display().to_string(), reason)
        }
        GeopreviewError::NoData { path } => no_data(&path.display().to_string()),
        GeopreviewError::Reprojection { crs, reason } => reprojection_failed(crs, reason),
        GeopreviewError::Simplification { tolerance, reason } => {
            simplification_failed(*tolerance, reason)
        }
        GeopreviewError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        other => CliError::new(other.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(inner) = error.downcast_ref::<GeopreviewError>() {
        return from_geopreview(inner);
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("ermission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(format!("{:#}", error))
    }
}
