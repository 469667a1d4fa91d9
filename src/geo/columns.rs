//! columns.rs
//!
//! Locate the column(s) holding location data in a loaded table.
//!
//! - `lat`/`lon` already present → use them directly.
//! - Otherwise score keyword-named candidates (falling back to every
//!   text-typed column) by how many sampled cells the cell parser can
//!   decode, and split the winner.
//! - Otherwise fall back to fuzzy single-axis column names
//!   (latitude/longitude, koordinat_x/y, x/y).
//!
//! The sample is capped and seeded: repeated loads of the same sheet pick
//! the same column.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::types::{GeoCfg, Table};

use super::cell;

/// Share of parsable non-empty cells above which a column counts as numeric
/// (and is therefore skipped by the combined-column fallback scan).
const NUMERIC_COL_THRESHOLD: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnPick {
    /// Two already-split axis columns (indices into `Table::headers`).
    Split { lat: usize, lon: usize },
    /// One combined coordinate column to run through the cell parser.
    Combined(usize),
    /// Nothing usable; the table keeps all-absent axis columns.
    NotFound,
}

pub fn find_location_columns(table: &Table, cfg: &GeoCfg) -> ColumnPick {
    if let (Some(lat), Some(lon)) = (table.col("lat"), table.col("lon")) {
        return ColumnPick::Split { lat, lon };
    }

    let mut candidates: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| cfg.keywords.iter().any(|k| h.contains(k.as_str())))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        candidates = (0..table.headers.len())
            .filter(|&c| !is_numeric_column(table, c))
            .collect();
    }

    // strictly highest hit count wins; ties stay with the first candidate
    let mut best: Option<usize> = None;
    let mut best_hits = 0usize;
    for &c in &candidates {
        let hits = score_column(table, c, cfg);
        if hits > best_hits {
            best_hits = hits;
            best = Some(c);
        }
    }
    if let Some(c) = best {
        return ColumnPick::Combined(c);
    }

    match (pick_axis_col(table, Fuzzy::Lat), pick_axis_col(table, Fuzzy::Lon)) {
        (Some(lat), Some(lon)) if lat != lon => ColumnPick::Split { lat, lon },
        _ => ColumnPick::NotFound,
    }
}

/// Count sampled cells the cell parser can decode. Bounded, deterministic.
fn score_column(table: &Table, col: usize, cfg: &GeoCfg) -> usize {
    let n = table.n_rows();
    let take = cfg.sample_max.min(n);
    if take == 0 {
        return 0;
    }
    let mut rng = StdRng::seed_from_u64(cfg.sample_seed);
    rand::seq::index::sample(&mut rng, n, take)
        .iter()
        .filter(|&i| cell::parse_cell(table.cell(i, col)).is_some())
        .count()
}

fn is_numeric_column(table: &Table, col: usize) -> bool {
    let mut non_empty = 0usize;
    let mut numeric = 0usize;
    for i in 0..table.n_rows() {
        let v = table.cell(i, col).trim();
        if v.is_empty() {
            continue;
        }
        non_empty += 1;
        if v.parse::<f64>().is_ok() {
            numeric += 1;
        }
    }
    non_empty > 0 && numeric as f64 / non_empty as f64 >= NUMERIC_COL_THRESHOLD
}

#[derive(Clone, Copy)]
enum Fuzzy {
    Lat,
    Lon,
}

/// Loose single-axis header match: exact well-known names first, then a
/// substring pattern.
fn pick_axis_col(table: &Table, which: Fuzzy) -> Option<usize> {
    let (exact, subs): (&[&str], &[&str]) = match which {
        Fuzzy::Lat => (&["lat", "latitude", "y", "koordinat_y", "coord_y"], &["lat"]),
        Fuzzy::Lon => (
            &["lon", "longitude", "lng", "long", "x", "koordinat_x", "coord_x"],
            &["lon", "lng", "long"],
        ),
    };
    table.find_col(exact, subs)
}
