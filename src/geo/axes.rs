//! axes.rs
//!
//! Detect and correct transposed latitude/longitude assignment.
//!
//! Two checks, applied under one policy: the per-row check runs first (when
//! the deployment has regional bands configured) and the column-level median
//! check runs only if no row qualified. Running both on the same table could
//! swap a row twice and restore the original error.

use crate::types::GeoCfg;

/// Column-level trigger: latitude column median magnitude above this is
/// implausible.
const COL_SWAP_LAT_OVER: f64 = 90.0;
/// Column-level trigger: longitude column median magnitude below this looks
/// like latitude data.
const COL_SWAP_LON_UNDER: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapOutcome {
    None,
    /// Individual transposed rows corrected.
    Rows(usize),
    /// The two columns were systematically mislabeled and swapped wholesale.
    Columns,
}

pub fn reconcile_axes(
    lat: &mut Vec<Option<f64>>,
    lon: &mut Vec<Option<f64>>,
    cfg: &GeoCfg,
) -> SwapOutcome {
    if let Some((lat_band, lon_band)) = cfg.row_swap {
        let mut swapped = 0usize;
        for i in 0..lat.len().min(lon.len()) {
            if let (Some(a), Some(o)) = (lat[i], lon[i]) {
                if lon_band.contains(a) && lat_band.contains(o) {
                    lat[i] = Some(o);
                    lon[i] = Some(a);
                    swapped += 1;
                }
            }
        }
        if swapped > 0 {
            return SwapOutcome::Rows(swapped);
        }
    }

    let (med_lat, med_lon) = (median_abs(lat), median_abs(lon));
    if let (Some(ml), Some(mo)) = (med_lat, med_lon) {
        if ml > COL_SWAP_LAT_OVER && mo < COL_SWAP_LON_UNDER {
            std::mem::swap(lat, lon);
            return SwapOutcome::Columns;
        }
    }

    SwapOutcome::None
}

fn median_abs(values: &[Option<f64>]) -> Option<f64> {
    let mut xs: Vec<f64> = values.iter().flatten().map(|v| v.abs()).collect();
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(f64::total_cmp);
    let m = xs.len() / 2;
    Some(if xs.len() % 2 == 1 {
        xs[m]
    } else {
        (xs[m - 1] + xs[m]) / 2.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Band, GeoCfg};

    #[test]
    fn column_swap_when_medians_are_transposed() {
        // lat column holds longitude magnitudes, lon column holds latitudes
        let mut lat = vec![Some(103.6), Some(102.9), Some(104.1)];
        let mut lon = vec![Some(-1.6), Some(-2.1), Some(-1.2)];
        let cfg = GeoCfg::default(); // no row bands: column check only
        assert_eq!(reconcile_axes(&mut lat, &mut lon, &cfg), SwapOutcome::Columns);
        assert_eq!(lat, vec![Some(-1.6), Some(-2.1), Some(-1.2)]);
        assert_eq!(lon, vec![Some(103.6), Some(102.9), Some(104.1)]);
    }

    #[test]
    fn no_column_swap_for_plausible_data() {
        let mut lat = vec![Some(-1.6), Some(-2.1)];
        let mut lon = vec![Some(103.6), Some(102.9)];
        assert_eq!(
            reconcile_axes(&mut lat, &mut lon, &GeoCfg::default()),
            SwapOutcome::None
        );
        assert_eq!(lat[0], Some(-1.6));
    }

    #[test]
    fn row_swap_corrects_individual_transpositions() {
        let mut lat = vec![Some(-1.61), Some(103.7), None];
        let mut lon = vec![Some(103.61), Some(-1.7), Some(103.9)];
        let cfg = GeoCfg::jambi();
        assert_eq!(reconcile_axes(&mut lat, &mut lon, &cfg), SwapOutcome::Rows(1));
        assert_eq!(lat[1], Some(-1.7));
        assert_eq!(lon[1], Some(103.7));
        // untouched rows stay put
        assert_eq!(lat[0], Some(-1.61));
        assert_eq!(lat[2], None);
    }

    #[test]
    fn row_swap_suppresses_column_fallback() {
        // one transposed row plus a column-swap-looking majority: the
        // row-level pass wins and the wholesale swap must not also run
        let mut lat = vec![Some(103.7), Some(100.0), Some(101.0)];
        let mut lon = vec![Some(-1.7), Some(200.0), Some(201.0)];
        let cfg = GeoCfg::jambi();
        assert_eq!(reconcile_axes(&mut lat, &mut lon, &cfg), SwapOutcome::Rows(1));
        assert_eq!(lat[0], Some(-1.7));
        assert_eq!(lat[1], Some(100.0));
    }

    #[test]
    fn column_fallback_when_no_row_qualifies() {
        // rows out of the regional longitude band, but medians transposed
        let mut lat = vec![Some(150.0), Some(151.0), Some(152.0)];
        let mut lon = vec![Some(10.0), Some(11.0), Some(12.0)];
        let cfg = GeoCfg {
            row_swap: Some((Band::new(-90.0, 90.0), Band::new(95.0, 141.0))),
            ..GeoCfg::default()
        };
        assert_eq!(reconcile_axes(&mut lat, &mut lon, &cfg), SwapOutcome::Columns);
        assert_eq!(lat[0], Some(10.0));
    }

    #[test]
    fn absent_rows_are_ignored() {
        let mut lat: Vec<Option<f64>> = vec![None, None];
        let mut lon: Vec<Option<f64>> = vec![None, None];
        assert_eq!(
            reconcile_axes(&mut lat, &mut lon, &GeoCfg::jambi()),
            SwapOutcome::None
        );
    }
}
