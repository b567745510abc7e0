//! geopreview geo - vector side of the preview pipeline
//!
//! Reads Shapefiles, normalizes them to WGS 84, simplifies boundaries at a
//! metric tolerance and serializes them to GeoJSON for web maps.

pub mod dataset;
pub mod pipeline;
pub mod reader;
pub mod simplify;
pub mod transform;

pub use dataset::{AttributeValue, VectorDataset, VectorFeature};
pub use pipeline::{
    load_canonical_vector, select_label_field, simplify, simplify_with_label,
    SimplifiedVectorResult, VectorPipeline,
};
