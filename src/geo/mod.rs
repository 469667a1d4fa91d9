//! Coordinate cleanup pipeline.
//!
//! One canonical implementation shared by every consumer (map, recap,
//! upload): locate the location column(s), extract raw axis values, fix
//! transposed axes, then validate into the configured plausible bands.
//! Every stage degrades bad input to "absent" — a malformed cell can never
//! take down a load or corrupt a neighboring row.

pub mod axes;
pub mod cell;
pub mod columns;
pub mod numeric;

use tracing::info;

use crate::types::{GeoCfg, Table};

use columns::ColumnPick;

/// Values treated as "no data" wherever a cell or axis is read.
const SENTINELS: [&str; 4] = ["nan", "none", "null", "-"];

pub(crate) fn is_absent(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || SENTINELS.iter().any(|x| t.eq_ignore_ascii_case(x))
}

/// Fill the table's `lat`/`lon` columns in place.
///
/// Stage order: identify, populate raw values, reconcile axes, then rescale
/// and band-validate. The plausibility rescale must run after the swap pass:
/// dividing a transposed 103.x "latitude" into band first would erase the
/// signal the reconciler needs.
///
/// Never fails; a table with no usable location column comes back with the
/// axis columns present and all-absent.
pub fn geocode_table(table: &mut Table, cfg: &GeoCfg) -> ColumnPick {
    let n = table.n_rows();
    table.lat = vec![None; n];
    table.lon = vec![None; n];

    let pick = columns::find_location_columns(table, cfg);
    match pick {
        ColumnPick::Split { lat, lon } => {
            for i in 0..n {
                table.lat[i] = numeric::clean_number(table.cell(i, lat));
                table.lon[i] = numeric::clean_number(table.cell(i, lon));
            }
        }
        ColumnPick::Combined(c) => {
            for i in 0..n {
                if let Some((la, lo)) = cell::parse_cell(table.cell(i, c)) {
                    table.lat[i] = Some(la);
                    table.lon[i] = Some(lo);
                }
            }
        }
        ColumnPick::NotFound => {
            info!("no usable location column found ({} columns scanned)", table.headers.len());
            return pick;
        }
    }

    let outcome = axes::reconcile_axes(&mut table.lat, &mut table.lon, cfg);
    if outcome != axes::SwapOutcome::None {
        info!("axis reconciliation: {:?}", outcome);
    }

    // final validation: rescale into band, drop half-valid pairs whole
    for i in 0..n {
        let la = table.lat[i].and_then(|v| numeric::rescale_into(v, &cfg.lat_ok));
        let lo = table.lon[i].and_then(|v| numeric::rescale_into(v, &cfg.lon_ok));
        match (la, lo) {
            (Some(a), Some(o)) => {
                table.lat[i] = Some(a);
                table.lon[i] = Some(o);
            }
            _ => {
                table.lat[i] = None;
                table.lon[i] = None;
            }
        }
    }

    pick
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn combined_column_end_to_end() {
        let mut t = table(
            &["tanggal", "tikor", "status"],
            &[
                &["01/02/2025", "-1.61, 103.61", "open"],
                &["02/02/2025", "POINT(103,7 -1,7)", "closed"],
                &["03/02/2025", "", "open"],
                &["04/02/2025", "103.8, -1.8", "open"], // transposed row
            ],
        );
        geocode_table(&mut t, &GeoCfg::jambi());
        assert!(close(t.lat[0].unwrap(), -1.61));
        assert!(close(t.lon[0].unwrap(), 103.61));
        assert!(close(t.lat[1].unwrap(), -1.7));
        assert!(close(t.lon[1].unwrap(), 103.7));
        assert_eq!(t.lat[2], None);
        assert_eq!(t.lon[2], None);
        // the transposed row was fixed by the reconciler
        assert!(close(t.lat[3].unwrap(), -1.8));
        assert!(close(t.lon[3].unwrap(), 103.8));
        assert_eq!(t.geocoded(), 3);
    }

    #[test]
    fn split_columns_are_normalized_per_axis() {
        let mut t = table(
            &["lat", "lon"],
            &[
                &["-1,2148376", "103,5"],
                &["-1.61", "1.037.952.395"],
                &["nan", "103.6"],
            ],
        );
        geocode_table(&mut t, &GeoCfg::jambi());
        assert!(close(t.lat[0].unwrap(), -1.2148376));
        assert!(close(t.lon[1].unwrap(), 103.7952395));
        // half-valid pair dropped whole
        assert_eq!(t.lat[2], None);
        assert_eq!(t.lon[2], None);
    }

    #[test]
    fn out_of_band_values_become_absent_not_clamped() {
        let mut t = table(&["lat", "lon"], &[&["99999", "103.6"]]);
        geocode_table(&mut t, &GeoCfg::jambi());
        assert_eq!(t.lat[0], None);
        assert_eq!(t.lon[0], None);
    }

    #[test]
    fn arbitrary_garbage_never_panics() {
        let rows: Vec<Vec<String>> = [
            "🙂🙂🙂", "", "nan", "-", "\u{0}\u{1}\u{2}", "a,b,c,d",
            "POINT(", "1.2.3.4.5", "   ", "<<<>>>",
        ]
        .iter()
        .map(|s| vec![s.to_string()])
        .collect();
        let mut t = Table::new(vec!["lokasi".into()], rows);
        geocode_table(&mut t, &GeoCfg::jambi());
        assert_eq!(t.n_rows(), 10);
        assert!(t.lat.iter().all(Option::is_none));
        assert!(t.lon.iter().all(Option::is_none));
        assert_eq!(t.geocoded(), 0);
    }

    #[test]
    fn table_without_location_data_keeps_absent_axes() {
        let mut t = table(&["id", "note"], &[&["1", "hello"], &["2", "world"]]);
        let pick = geocode_table(&mut t, &GeoCfg::default());
        assert_eq!(pick, columns::ColumnPick::NotFound);
        assert_eq!(t.lat.len(), 2);
        assert!(t.lat.iter().all(Option::is_none));
    }
}
