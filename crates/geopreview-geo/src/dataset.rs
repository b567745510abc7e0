//! In-memory vector dataset model

use chrono::NaiveDate;
use geo::Geometry;
use geopreview_core::models::Crs;
use serde::{Deserialize, Serialize};

/// A single DBF cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    Date(NaiveDate),
}

impl AttributeValue {
    /// JSON form used in GeoJSON properties.
    ///
    /// Dates become ISO-8601 strings and non-finite numbers become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Text(s) => serde_json::Value::String(s.clone()),
            AttributeValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            AttributeValue::Integer(i) => serde_json::Value::Number((*i).into()),
            AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
            AttributeValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// A geometry with its attribute row
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeature {
    pub geometry: Geometry<f64>,
    /// Attribute values in column order
    pub properties: Vec<(String, AttributeValue)>,
}

impl VectorFeature {
    pub fn new(geometry: Geometry<f64>, properties: Vec<(String, AttributeValue)>) -> Self {
        Self { geometry, properties }
    }

    pub fn property(&self, name: &str) -> Option<&AttributeValue> {
        self.properties.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    /// Properties as a GeoJSON property object
    pub fn properties_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.properties.iter().map(|(key, value)| (key.clone(), value.to_json())).collect()
    }
}

/// Ordered features, attribute columns and the CRS they are expressed in
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDataset {
    features: Vec<VectorFeature>,
    columns: Vec<String>,
    crs: Crs,
}

impl VectorDataset {
    pub fn new(features: Vec<VectorFeature>, columns: Vec<String>, crs: Crs) -> Self {
        Self { features, columns, crs }
    }

    pub fn features(&self) -> &[VectorFeature] {
        &self.features
    }

    /// Attribute column names in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Replace every geometry, keeping attributes, columns and order
    pub(crate) fn with_geometries(&self, geometries: Vec<Geometry<f64>>, crs: Crs) -> Self {
        let features = self
            .features
            .iter()
            .zip(geometries)
            .map(|(feature, geometry)| VectorFeature::new(geometry, feature.properties.clone()))
            .collect();
        Self { features, columns: self.columns.clone(), crs }
    }
}
