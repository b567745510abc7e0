//! Named color ramps and multi-stop interpolation

use geopreview_core::error::{GeopreviewError, Result};
use std::fmt;
use std::str::FromStr;

/// RGB color with values in 0..=255
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    const fn hex(t: f64, rgb: u32) -> Self {
        Self { t, color: Rgb::hex(rgb) }
    }
}

/// Fully transparent pixel used for non-finite samples
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Available color ramps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colormap {
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    /// Blue -> green -> sand -> brown -> white (elevation)
    Terrain,
    /// White -> black
    Greys,
    /// Blue -> grey -> red (divergent data)
    Coolwarm,
}

impl Colormap {
    pub const ALL: &[Colormap] = &[
        Self::Viridis,
        Self::Plasma,
        Self::Inferno,
        Self::Magma,
        Self::Cividis,
        Self::Terrain,
        Self::Greys,
        Self::Coolwarm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Viridis => "viridis",
            Self::Plasma => "plasma",
            Self::Inferno => "inferno",
            Self::Magma => "magma",
            Self::Cividis => "cividis",
            Self::Terrain => "terrain",
            Self::Greys => "greys",
            Self::Coolwarm => "coolwarm",
        }
    }

    fn stops(&self) -> &'static [ColorStop] {
        match self {
            Self::Viridis => VIRIDIS_STOPS,
            Self::Plasma => PLASMA_STOPS,
            Self::Inferno => INFERNO_STOPS,
            Self::Magma => MAGMA_STOPS,
            Self::Cividis => CIVIDIS_STOPS,
            Self::Terrain => TERRAIN_STOPS,
            Self::Greys => GREYS_STOPS,
            Self::Coolwarm => COOLWARM_STOPS,
        }
    }

    /// Evaluate the ramp at normalized position `t` in [0, 1]
    pub fn evaluate(&self, t: f64) -> Rgb {
        multi_stop(self.stops(), t)
    }

    /// RGBA for a normalized sample; NaN maps to [`TRANSPARENT`]
    pub fn rgba(&self, t: f64) -> [u8; 4] {
        if t.is_nan() {
            return TRANSPARENT;
        }
        let c = self.evaluate(t);
        [c.r, c.g, c.b, 255]
    }
}

impl FromStr for Colormap {
    type Err = GeopreviewError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        // matplotlib spells the grey ramp "Greys"; accept "gray" too
        let wanted = match wanted.as_str() {
            "gray" | "grey" | "grays" => "greys",
            other => other,
        };

        Self::ALL.iter().copied().find(|cmap| cmap.name() == wanted).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
            GeopreviewError::config_invalid(
                "colormap",
                format!("Unknown colormap '{}' (expected one of: {})", s, known.join(", ")),
            )
        })
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Perceptually uniform ramps sampled at nine evenly spaced positions

const VIRIDIS_STOPS: &[ColorStop] = &[
    ColorStop::hex(0.000, 0x440154),
    ColorStop::hex(0.125, 0x472c7a),
    ColorStop::hex(0.250, 0x3b518b),
    ColorStop::hex(0.375, 0x2c718e),
    ColorStop::hex(0.500, 0x21908d),
    ColorStop::hex(0.625, 0x27ad81),
    ColorStop::hex(0.750, 0x5cc863),
    ColorStop::hex(0.875, 0xaadc32),
    ColorStop::hex(1.000, 0xfde725),
];

const PLASMA_STOPS: &[ColorStop] = &[
    ColorStop::hex(0.000, 0x0d0887),
    ColorStop::hex(0.125, 0x4c02a1),
    ColorStop::hex(0.250, 0x7e03a8),
    ColorStop::hex(0.375, 0xa92395),
    ColorStop::hex(0.500, 0xcc4778),
    ColorStop::hex(0.625, 0xe56b5d),
    ColorStop::hex(0.750, 0xf89441),
    ColorStop::hex(0.875, 0xfdc328),
    ColorStop::hex(1.000, 0xf0f921),
];

const INFERNO_STOPS: &[ColorStop] = &[
    ColorStop::hex(0.000, 0x000004),
    ColorStop::hex(0.125, 0x1f0c48),
    ColorStop::hex(0.250, 0x550f6d),
    ColorStop::hex(0.375, 0x88226a),
    ColorStop::hex(0.500, 0xba3655),
    ColorStop::hex(0.625, 0xe35933),
    ColorStop::hex(0.750, 0xf98e09),
    ColorStop::hex(0.875, 0xf9cb35),
    ColorStop::hex(1.000, 0xfcffa4),
];

const MAGMA_STOPS: &[ColorStop] = &[
    ColorStop::hex(0.000, 0x000004),
    ColorStop::hex(0.125, 0x1c1044),
    ColorStop::hex(0.250, 0x4f127b),
    ColorStop::hex(0.375, 0x812581),
    ColorStop::hex(0.500, 0xb5367a),
    ColorStop::hex(0.625, 0xe55064),
    ColorStop::hex(0.750, 0xfb8761),
    ColorStop::hex(0.875, 0xfec287),
    ColorStop::hex(1.000, 0xfcfdbf),
];

const CIVIDIS_STOPS: &[ColorStop] = &[
    ColorStop::hex(0.000, 0x00224e),
    ColorStop::hex(0.125, 0x1d3a6d),
    ColorStop::hex(0.250, 0x434e6c),
    ColorStop::hex(0.375, 0x61646f),
    ColorStop::hex(0.500, 0x7d7c78),
    ColorStop::hex(0.625, 0x9b9477),
    ColorStop::hex(0.750, 0xbcae6e),
    ColorStop::hex(0.875, 0xdfcb5d),
    ColorStop::hex(1.000, 0xfee838),
];

const TERRAIN_STOPS: &[ColorStop] = &[
    ColorStop::hex(0.00, 0x333399),
    ColorStop::hex(0.15, 0x0099ff),
    ColorStop::hex(0.25, 0x00cc66),
    ColorStop::hex(0.50, 0xffff99),
    ColorStop::hex(0.75, 0x805c54),
    ColorStop::hex(1.00, 0xffffff),
];

const GREYS_STOPS: &[ColorStop] = &[ColorStop::hex(0.0, 0xffffff), ColorStop::hex(1.0, 0x000000)];

const COOLWARM_STOPS: &[ColorStop] = &[
    ColorStop::hex(0.00, 0x3b4cc0),
    ColorStop::hex(0.25, 0x8db0fe),
    ColorStop::hex(0.50, 0xdddcdc),
    ColorStop::hex(0.75, 0xf4987a),
    ColorStop::hex(1.00, 0xb40426),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}
