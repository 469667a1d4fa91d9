//! numeric.rs
//!
//! Repair of a single axis value out of dirty free-text numerals.
//!
//! The feeds mix decimal-comma entry, thousand separators injected by
//! spreadsheet re-typing, and magnitude errors from dropped decimal points.
//! One normalizer handles all three; the origin of a row is not tracked, so
//! there is no per-source configuration.

use crate::types::{Band, GeoCfg};

use super::is_absent;

/// Hard cap on the divide-by-10 correction loop.
const MAX_RESCALE: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisKind {
    Lat,
    Lon,
}

/// Separator disambiguation and junk stripping, no plausibility check.
///
/// A comma anywhere makes the comma the decimal separator and every period a
/// thousand separator. With no comma, more than one period means the periods
/// are all thousand separators. Anything that still fails float conversion
/// is absent, never an error.
pub fn clean_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_absent(s) {
        return None;
    }
    let mut t = s.to_string();
    if t.contains(',') {
        t = t.replace('.', "").replace(',', ".");
    } else if t.matches('.').count() > 1 {
        t = t.replace('.', "");
    }
    let t: String = t
        .chars()
        .filter(|&c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        .collect();
    let v: f64 = t.parse().ok()?;
    v.is_finite().then_some(v)
}

/// Divide by 10 until the value sits inside the band. Corrects magnitudes
/// corrupted by an extra injected digit group ("1037952395" meant
/// "103.7952395"). Stops immediately at zero; a value still outside the band
/// when the cap expires is absent, never clamped.
pub fn rescale_into(v: f64, band: &Band) -> Option<f64> {
    if !v.is_finite() {
        return None;
    }
    let mut v = v;
    for _ in 0..=MAX_RESCALE {
        if band.contains(v) {
            return Some(v);
        }
        if v == 0.0 {
            return None;
        }
        v /= 10.0;
    }
    None
}

/// Full per-axis normalization: sentinel absorption, separator repair,
/// rescale into the configured plausible band.
pub fn normalize_axis(raw: &str, kind: AxisKind, cfg: &GeoCfg) -> Option<f64> {
    let band = match kind {
        AxisKind::Lat => &cfg.lat_ok,
        AxisKind::Lon => &cfg.lon_ok,
    };
    clean_number(raw).and_then(|v| rescale_into(v, band))
}
