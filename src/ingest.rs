//! ingest.rs
//!
//! Delimited text (spreadsheet CSV export or uploaded file) → `Table`.
//!
//! The delimiter is sniffed from the header line; headers are trimmed and
//! lowercased so downstream keyword matching works on one normal form.
//! Ragged rows are padded/truncated to the header width rather than
//! rejected — the sheets this ingests are hand-edited.

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};

use crate::geo;
use crate::types::{DataState, GeoCfg, Kpis, Table};

fn sniff_delimiter(header_line: &str) -> u8 {
    let semi = header_line.matches(';').count();
    let tab = header_line.matches('\t').count();
    let comma = header_line.matches(',').count();
    if semi > comma && semi >= tab {
        b';'
    } else if tab > comma {
        b'\t'
    } else {
        b','
    }
}

pub fn parse_delimited(text: &str) -> Result<Table> {
    let text = text.trim_start_matches('\u{feff}');
    let header_line = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .context("empty input")?;
    let delim = sniff_delimiter(header_line);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if headers.is_empty() {
        bail!("no columns in header row");
    }

    let width = headers.len();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for rec in rdr.records() {
        let rec = match rec {
            Ok(r) => r,
            // one unreadable line must not sink the load
            Err(_) => continue,
        };
        let mut row: Vec<String> = rec.iter().map(|c| c.trim().to_string()).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

/// Parse, geocode and stamp a fresh snapshot.
pub fn build_state(text: &str, geo_cfg: &GeoCfg) -> Result<DataState> {
    let mut table = parse_delimited(text)?;
    geo::geocode_table(&mut table, geo_cfg);
    let kpis = Kpis {
        rows: table.n_rows(),
        geocoded: table.geocoded(),
        snapshot_ts_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    Ok(DataState { table, kpis })
}

pub fn load_file(path: &str, geo_cfg: &GeoCfg) -> Result<DataState> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    build_state(&text, geo_cfg)
}
