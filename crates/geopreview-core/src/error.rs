//! Error types for geopreview

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeopreviewError {
    // Source errors
    #[error("Failed to load {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("No finite sample values in {path}")]
    NoData { path: PathBuf },

    // Geometry errors
    #[error("Cannot reproject from {crs}: {reason}")]
    Reprojection { crs: String, reason: String },

    #[error("Simplification failed at tolerance {tolerance} m: {reason}")]
    Simplification { tolerance: f64, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeopreviewError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataLoad { path: path.into(), reason: reason.into() }
    }

    pub fn reprojection(crs: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reprojection { crs: crs.into(), reason: reason.into() }
    }

    pub fn config_invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid { key: key.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, GeopreviewError>;
