//! types.rs
//! Shared models: the ingested table, geocoding configuration, service
//! configuration, KPIs and the snapshot state served by the API.

use serde::Serialize;

/// One loaded dataset: normalized headers, raw string cells, and the two
/// axis columns filled in by the geocoding pipeline. Rows are never dropped;
/// a row that could not be geocoded keeps `None` in both axis columns.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub lat: Vec<Option<f64>>,
    pub lon: Vec<Option<f64>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let n = rows.len();
        Self { headers, rows, lat: vec![None; n], lon: vec![None; n] }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Exact header lookup (headers are already lowercased and trimmed).
    pub fn col(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First column matching one of the exact names, else one containing a
    /// substring needle. Mirrors the loose header matching the feeds need.
    pub fn find_col(&self, exact: &[&str], subs: &[&str]) -> Option<usize> {
        if let Some(i) = self
            .headers
            .iter()
            .position(|h| exact.iter().any(|e| h == e))
        {
            return Some(i);
        }
        self.headers
            .iter()
            .position(|h| subs.iter().any(|s| h.contains(s)))
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Rows with both axes present.
    pub fn geocoded(&self) -> usize {
        self.lat
            .iter()
            .zip(&self.lon)
            .filter(|(a, o)| a.is_some() && o.is_some())
            .count()
    }
}

/// Closed interval of plausible values for one axis, in decimal degrees.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Geocoding configuration. Keyword lists and bands are data, not code, so
/// the same pipeline can be pointed at a different deployment region.
#[derive(Clone, Debug)]
pub struct GeoCfg {
    /// Header substrings that mark a column as coordinate-bearing.
    pub keywords: Vec<String>,
    /// Plausible latitude band used for rescaling and final validation.
    pub lat_ok: Band,
    /// Plausible longitude band used for rescaling and final validation.
    pub lon_ok: Band,
    /// Row-level swap bands as (expected latitude band, expected longitude
    /// band). `None` disables the per-row check, leaving only the
    /// column-level median heuristic.
    pub row_swap: Option<(Band, Band)>,
    /// Cells sampled per candidate column when scoring.
    pub sample_max: usize,
    /// Fixed seed: repeated runs on the same input pick the same column.
    pub sample_seed: u64,
}

const COORD_KEYWORDS: [&str; 11] = [
    "koordinat", "coord", "coordinate", "latlon", "tikor", "lokasi", "geotag",
    "geom", "geo", "maps", "map",
];

impl Default for GeoCfg {
    fn default() -> Self {
        Self {
            keywords: COORD_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            lat_ok: Band::new(-90.0, 90.0),
            lon_ok: Band::new(-180.0, 180.0),
            row_swap: None,
            sample_max: 200,
            sample_seed: 0,
        }
    }
}

impl GeoCfg {
    /// Jambi deployment: narrow bands, per-row transposition check enabled.
    pub fn jambi() -> Self {
        Self {
            lat_ok: Band::new(-6.0, 0.0),
            lon_ok: Band::new(95.0, 141.0),
            row_swap: Some((Band::new(-90.0, 90.0), Band::new(95.0, 141.0))),
            ..Self::default()
        }
    }

    pub fn for_region(region: &str) -> Self {
        match region {
            "jambi" => Self::jambi(),
            _ => Self::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppCfg {
    pub bind: String,
    /// CSV export endpoint of the source spreadsheet. Empty disables the
    /// refresh loop (upload-only operation).
    pub data_url: String,
    /// Optional local delimited file loaded at startup.
    pub data_path: String,
    pub t_refresh_s: u64,
    pub region: String,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
            data_url: "https://docs.google.com/spreadsheets/d/1Cd9vbcHwFcq8rSARG7Kh7iNomFh5o8tVrEo946DbqX8/export?format=csv".into(),
            data_path: String::new(),
            t_refresh_s: 180,
            region: "jambi".into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Kpis {
    pub rows: usize,
    pub geocoded: usize,
    pub snapshot_ts_utc: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DataState {
    pub table: Table,
    pub kpis: Kpis,
}
