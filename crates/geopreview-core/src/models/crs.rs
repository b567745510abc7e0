//! Coordinate reference system model.
//!
//! A `Crs` wraps a PROJ-compatible definition (`EPSG:<code>` or WKT) so that
//! both authority codes and raw `.prj` contents can be handed to PROJ.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG code when the definition carries one
    pub epsg: Option<u32>,
    /// Definition string accepted by PROJ
    pub definition: String,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg: Some(epsg), definition: format!("EPSG:{}", epsg), name: name.into() }
    }

    /// WGS 84 (EPSG:4326), the canonical geographic frame
    pub fn wgs84() -> Self {
        Self::from_epsg(4326, "WGS 84")
    }

    /// Web Mercator (EPSG:3857), the metric frame used for simplification
    pub fn web_mercator() -> Self {
        Self::from_epsg(3857, "Web Mercator")
    }

    /// Build a CRS from WKT, as found in a Shapefile `.prj`.
    ///
    /// When the root node carries an `AUTHORITY["EPSG", ...]` (or an
    /// `ID["EPSG", ...]` in WKT2) the CRS collapses to that code, otherwise the
    /// WKT itself becomes the PROJ definition.
    pub fn from_wkt(wkt: &str) -> Self {
        let wkt = wkt.trim();
        let name = wkt_name(wkt).unwrap_or_else(|| "unnamed".to_string());

        match parse_epsg_from_wkt(wkt) {
            Some(epsg) => Self::from_epsg(epsg, name),
            None => Self { epsg: None, definition: wkt.to_string(), name },
        }
    }

    /// Check whether this is the canonical lon/lat WGS 84 frame
    pub fn is_geographic_wgs84(&self) -> bool {
        match self.epsg {
            Some(code) => code == 4326,
            None => {
                let def = self.definition.replace(' ', "").to_ascii_uppercase();
                def.starts_with("GEOGCS[\"GCS_WGS_1984\"") || def.starts_with("GEOGCS[\"WGS84\"")
            }
        }
    }

    /// Check if two CRS definitions describe the same frame
    pub fn matches(&self, other: &Crs) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            _ => self.definition == other.definition,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epsg {
            Some(code) => write!(f, "EPSG:{} ({})", code, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Extract the EPSG code that identifies the whole CRS.
///
/// Only an `AUTHORITY["EPSG",code]` (WKT1) or `ID["EPSG",code]` (WKT2) that is
/// a direct child of the root node counts. Nested datum, GEOGCS and unit
/// authorities describe parts of the CRS, not the CRS itself.
pub fn parse_epsg_from_wkt(wkt: &str) -> Option<u32> {
    if let Some(code) = wkt.trim().strip_prefix("EPSG:") {
        return code.trim().parse().ok();
    }

    let upper = wkt.to_ascii_uppercase();
    let mut depth = 0usize;
    let mut in_quotes = false;

    for (index, c) in upper.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '[' | '(' => {
                depth += 1;
                if depth == 2 && matches!(node_keyword(&upper[..index]), "AUTHORITY" | "ID") {
                    if let Some(code) = epsg_code(&upper[index + 1..]) {
                        return Some(code);
                    }
                }
            }
            ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    None
}

/// Keyword immediately before an opening bracket
fn node_keyword(before: &str) -> &str {
    before.rsplit([',', '[', '(']).next().unwrap_or("").trim()
}

/// Code from the arguments of an authority node, `"EPSG","4326"]...`
fn epsg_code(args: &str) -> Option<u32> {
    let end = args.find([']', ')'])?;
    let mut parts = args[..end].split(',').map(|part| part.trim().trim_matches('"'));
    if parts.next()? != "EPSG" {
        return None;
    }
    parts.next()?.parse().ok()
}

fn wkt_name(wkt: &str) -> Option<String> {
    let start = wkt.find('"')? + 1;
    let end = wkt[start..].find('"')? + start;
    Some(wkt[start..end].to_string())
}
