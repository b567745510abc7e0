//! geopreview core - errors, configuration, shared models and helpers
//!
//! Shared by the vector and raster preview pipelines and the CLI adapter.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod encoding;
pub mod error;
pub mod models;

pub use error::{GeopreviewError, Result};
