//! Display range selection and normalization

use geopreview_core::error::{GeopreviewError, Result};
use ndarray::Array2;
use std::path::Path;

/// Lower percentile of the robust stretch
pub const LOW_PERCENTILE: f64 = 2.0;
/// Upper percentile of the robust stretch
pub const HIGH_PERCENTILE: f64 = 98.0;

/// Separation applied to a degenerate range near zero
const MIN_SPAN: f64 = 1e-6;

/// Percentile of sorted values, interpolating linearly between the two
/// closest order statistics (numpy's default)
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// The `(min, max)` used to normalize `data`.
///
/// An explicit range is used only when both ends are given. Otherwise the
/// 2nd/98th percentiles of the finite samples are used. A range whose ends
/// coincide is widened by `1e-6`, or by a few ulps when that is lost to
/// rounding at the value's magnitude.
pub fn display_range(
    data: &Array2<f64>,
    explicit_min: Option<f64>,
    explicit_max: Option<f64>,
    path: &Path,
) -> Result<(f64, f64)> {
    let (min, max) = match (explicit_min, explicit_max) {
        (Some(min), Some(max)) => {
            if !min.is_finite() || !max.is_finite() {
                return Err(GeopreviewError::config_invalid(
                    "value_range",
                    format!("Range ends must be finite, got [{}, {}]", min, max),
                ));
            }
            if min > max {
                return Err(GeopreviewError::config_invalid(
                    "value_range",
                    format!("Minimum {} is greater than maximum {}", min, max),
                ));
            }
            (min, max)
        }
        _ => {
            let mut finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
            if finite.is_empty() {
                return Err(GeopreviewError::NoData { path: path.to_path_buf() });
            }
            finite.sort_by(f64::total_cmp);

            let min = percentile(&finite, LOW_PERCENTILE).unwrap_or(finite[0]);
            let max = percentile(&finite, HIGH_PERCENTILE).unwrap_or(finite[finite.len() - 1]);
            (min, max)
        }
    };

    if min == max {
        return Ok(widen(min));
    }
    Ok((min, max))
}

/// Non-empty range starting at `value`, or ending there at the top of `f64`
fn widen(value: f64) -> (f64, f64) {
    let span = MIN_SPAN.max(value.abs() * f64::EPSILON * 4.0);
    let upper = value + span;
    if upper.is_finite() {
        (value, upper)
    } else {
        (value - span, value)
    }
}

/// Map `value` into [0, 1]; non-finite values stay NaN
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
