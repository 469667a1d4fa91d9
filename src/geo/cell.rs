//! cell.rs
//!
//! Parser for combined coordinate cells: one free-text cell in, one
//! (lat, lon) pair or nothing out.
//!
//! Recognizers run in fixed priority order; the first pattern that matches
//! wins and later ones are not attempted. A matched pattern whose numerals
//! fail conversion drops the whole cell — a pair is never half-valid.
//!
//! Order matters for one reason: WKT is the single notation that stores
//! longitude first, so it must be recognized before the generic pair.

use once_cell::sync::Lazy;
use regex::{Match, Regex};

use super::is_absent;
use super::numeric::clean_number;

static WKT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*POINT\s*\(\s*([-0-9.,]+)\s+([-0-9.,]+)\s*\)\s*$").unwrap()
});

static PAIR_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(?:[.,]\d+)?$").unwrap());

// "1°2'3 S, 103°4'5 E" with minutes/seconds optional; d/m/: accepted as
// degree and minute marks since the sheets use all of them
static DMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<lat_deg>-?\d+(?:\.\d+)?)\s*[°d:\s]?\s*(?P<lat_min>\d+(?:\.\d+)?)?\s*['m:\s]?\s*(?P<lat_sec>\d+(?:\.\d+)?)?\s*(?P<lat_hem>[NS])?[,\s/]+(?P<lon_deg>-?\d+(?:\.\d+)?)\s*[°d:\s]?\s*(?P<lon_min>\d+(?:\.\d+)?)?\s*['m:\s]?\s*(?P<lon_sec>\d+(?:\.\d+)?)?\s*(?P<lon_hem>[EW])?\s*$",
    )
    .unwrap()
});

/// Extract a raw (lat, lon) pair from one cell. Values are separator-repaired
/// but not yet band-validated; the pipeline rescales and validates after the
/// axis reconciliation pass.
pub fn parse_cell(raw: &str) -> Option<(f64, f64)> {
    let s = raw.trim();
    if is_absent(s) {
        return None;
    }

    // WKT: POINT(lon lat) — the one lon-first notation
    if let Some(c) = WKT_RE.captures(s) {
        let lon = clean_number(&c[1])?;
        let lat = clean_number(&c[2])?;
        return Some((lat, lon));
    }

    // "lat,lon" / "lat lon" / "[lat, lon]" / "(lat;lon)". Comma split is
    // tried first; a whitespace-only split keeps decimal commas inside the
    // tokens ("-1,61 103,61").
    let flat: String = s
        .replace(';', ",")
        .chars()
        .map(|ch| if matches!(ch, '[' | ']' | '(' | ')') { ' ' } else { ch })
        .collect();
    for sep in [',', ' '] {
        let parts: Vec<&str> = flat
            .split(|ch: char| if sep == ',' { ch == ',' } else { ch.is_whitespace() })
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() == 2 && parts.iter().all(|p| PAIR_TOKEN_RE.is_match(p)) {
            let lat = clean_number(parts[0])?;
            let lon = clean_number(parts[1])?;
            return Some((lat, lon));
        }
    }

    if let Some(c) = DMS_RE.captures(s) {
        let lat = dms_to_dd(
            c.name("lat_deg")?.as_str(),
            c.name("lat_min"),
            c.name("lat_sec"),
            c.name("lat_hem"),
        )?;
        let lon = dms_to_dd(
            c.name("lon_deg")?.as_str(),
            c.name("lon_min"),
            c.name("lon_sec"),
            c.name("lon_hem"),
        )?;
        return Some((lat, lon));
    }

    None
}

/// degrees + minutes/60 + seconds/3600; a hemisphere letter fixes the sign
/// regardless of any sign in the numeral.
fn dms_to_dd(
    deg: &str,
    minute: Option<Match>,
    second: Option<Match>,
    hem: Option<Match>,
) -> Option<f64> {
    let mut v: f64 = deg.parse().ok()?;
    if let Some(m) = minute {
        v += m.as_str().parse::<f64>().ok()? / 60.0;
    }
    if let Some(s) = second {
        v += s.as_str().parse::<f64>().ok()? / 3600.0;
    }
    if let Some(h) = hem {
        v = if h.as_str().eq_ignore_ascii_case("s") || h.as_str().eq_ignore_ascii_case("w") {
            -v.abs()
        } else {
            v.abs()
        };
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wkt_is_lon_first() {
        let (lat, lon) = parse_cell("POINT(103.61 -1.61)").unwrap();
        assert!(close(lat, -1.61));
        assert!(close(lon, 103.61));
    }

    #[test]
    fn wkt_tolerates_decimal_commas_and_case() {
        let (lat, lon) = parse_cell("point( 103,61  -1,61 )").unwrap();
        assert!(close(lat, -1.61));
        assert!(close(lon, 103.61));
    }

    #[test]
    fn delimited_pair_is_lat_first() {
        let (lat, lon) = parse_cell("-1.61, 103.61").unwrap();
        assert!(close(lat, -1.61));
        assert!(close(lon, 103.61));
    }

    #[test]
    fn pair_separators_and_wrapping() {
        for s in [
            "-1.61;103.61",
            "-1.61 103.61",
            "[-1.61, 103.61]",
            "(-1,61 103,61)",
        ] {
            let (lat, lon) = parse_cell(s).unwrap();
            assert!(close(lat, -1.61), "{s}");
            assert!(close(lon, 103.61), "{s}");
        }
    }

    #[test]
    fn dms_with_hemisphere_letters() {
        let (lat, lon) = parse_cell("1°36'36 S, 103°36'36 E").unwrap();
        assert!(close(lat, -1.61));
        assert!(close(lon, 103.61));
    }

    #[test]
    fn dms_minutes_optional() {
        let (lat, lon) = parse_cell("1.61 S / 103.61 E").unwrap();
        assert!(close(lat, -1.61));
        assert!(close(lon, 103.61));
    }

    #[test]
    fn hemisphere_overrides_numeric_sign() {
        let (lat, _lon) = parse_cell("-1.61 N, 103.61 E").unwrap();
        assert!(close(lat, 1.61));
    }

    #[test]
    fn sentinels_are_absent() {
        for s in ["", "  ", "nan", "NaN", "None", "null", "-"] {
            assert_eq!(parse_cell(s), None, "sentinel {s:?}");
        }
    }

    #[test]
    fn garbage_is_absent() {
        for s in ["jalan sudirman", "12", "a,b", "🙂", "POINT()", "1.5, abc"] {
            assert_eq!(parse_cell(s), None, "{s:?}");
        }
    }

    #[test]
    fn three_tokens_do_not_pair() {
        assert_eq!(parse_cell("1, 2, 3"), None);
    }
}
