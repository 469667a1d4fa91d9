//! rekap.rs
//!
//! Daily/weekly recap series for the chart view.
//!
//! - Date column found by keyword, values parsed through a tolerant format
//!   list; rows with unreadable dates are skipped silently.
//! - Daily counts with gap days filled as zero, weekly totals bucketed to
//!   weeks ending Monday.
//! - Spikes flagged by rolling z-score (window 7, z > 2.0).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::Table;

const DATE_EXACT: [&str; 4] = ["tanggal", "tgl", "date", "waktu"];
const DATE_SUBS: [&str; 2] = ["tanggal", "date"];

const DATE_FMTS: [&str; 6] = [
    "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y",
];
const DATETIME_FMTS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M",
];

const SPIKE_WINDOW: usize = 7;
const SPIKE_Z: f64 = 2.0;

pub fn detect_date_col(table: &Table) -> Option<usize> {
    table.find_col(&DATE_EXACT, &DATE_SUBS)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    for f in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(t, f) {
            return Some(d);
        }
    }
    for f in DATETIME_FMTS {
        if let Ok(d) = NaiveDateTime::parse_from_str(t, f) {
            return Some(d.date());
        }
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub count: u64,
    pub spike: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RecapSummary {
    pub last: u64,
    pub prev: u64,
    pub last7: u64,
    pub prev7: u64,
    /// Week-over-week change in percent; absent while there is no full
    /// previous week to compare against.
    pub wow_pct: Option<f64>,
    pub peak_date: Option<NaiveDate>,
    pub peak: u64,
    pub median: f64,
}

/// Count per day over the detected date column, gap days filled with zero,
/// optionally clipped to [from, to]. Empty result when no date column is
/// found — informational, not an error.
pub fn daily_series(
    table: &Table,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<SeriesPoint> {
    let Some(col) = detect_date_col(table) else {
        return Vec::new();
    };

    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for i in 0..table.n_rows() {
        if let Some(d) = parse_date(table.cell(i, col)) {
            *counts.entry(d).or_insert(0) += 1;
        }
    }
    let (Some(&first), Some(&last)) = (
        counts.keys().next(),
        counts.keys().next_back(),
    ) else {
        return Vec::new();
    };

    let start = from.map_or(first, |f| f.max(first));
    let end = to.map_or(last, |t| t.min(last));

    let mut out = Vec::new();
    let mut d = start;
    while d <= end {
        out.push(SeriesPoint {
            date: d,
            count: counts.get(&d).copied().unwrap_or(0),
            spike: false,
        });
        d = d + Duration::days(1);
    }
    flag_spikes(&mut out);
    out
}

/// Weekly totals from a daily series, weeks labeled by their closing Monday.
pub fn weekly_series(daily: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for p in daily {
        let offset = (7 - p.date.weekday().num_days_from_monday()) % 7;
        let label = p.date + Duration::days(offset as i64);
        *buckets.entry(label).or_insert(0) += p.count;
    }
    let mut out: Vec<SeriesPoint> = buckets
        .into_iter()
        .map(|(date, count)| SeriesPoint { date, count, spike: false })
        .collect();
    flag_spikes(&mut out);
    out
}

/// Rolling z-score over a trailing window; a point is a spike when the
/// window's sample deviation is positive and the point sits more than
/// `SPIKE_Z` deviations above the window mean.
fn flag_spikes(series: &mut [SeriesPoint]) {
    if series.len() < SPIKE_WINDOW {
        return;
    }
    let values: Vec<f64> = series.iter().map(|p| p.count as f64).collect();
    for i in (SPIKE_WINDOW - 1)..values.len() {
        let win = &values[i + 1 - SPIKE_WINDOW..=i];
        let mean = win.iter().sum::<f64>() / SPIKE_WINDOW as f64;
        let var = win.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (SPIKE_WINDOW - 1) as f64;
        let std = var.sqrt();
        if std > 0.0 && (values[i] - mean) / std > SPIKE_Z {
            series[i].spike = true;
        }
    }
}

pub fn summarize(daily: &[SeriesPoint]) -> RecapSummary {
    if daily.is_empty() {
        return RecapSummary::default();
    }
    let n = daily.len();
    let last = daily[n - 1].count;
    let prev = if n > 1 { daily[n - 2].count } else { 0 };
    let last7: u64 = daily.iter().rev().take(7).map(|p| p.count).sum();
    let prev7: u64 = if n > 7 {
        daily[..n - 7].iter().rev().take(7).map(|p| p.count).sum()
    } else {
        0
    };
    let wow_pct = (prev7 > 0)
        .then(|| (last7 as f64 - prev7 as f64) / prev7 as f64 * 100.0);

    let peak_idx = daily
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.count.cmp(&b.count).then(ib.cmp(ia)))
        .map(|(i, _)| i);

    let mut sorted: Vec<u64> = daily.iter().map(|p| p.count).collect();
    sorted.sort_unstable();
    let m = n / 2;
    let median = if n % 2 == 1 {
        sorted[m] as f64
    } else {
        (sorted[m - 1] + sorted[m]) as f64 / 2.0
    };

    RecapSummary {
        last,
        prev,
        last7,
        prev7,
        wow_pct,
        peak_date: peak_idx.map(|i| daily[i].date),
        peak: peak_idx.map_or(0, |i| daily[i].count),
        median,
    }
}
