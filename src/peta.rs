//! peta.rs
//!
//! Map payloads: GeoJSON point features with popup fields, heatmap pairs,
//! and the preset kabupaten/kota centers for the Jambi deployment.
//!
//! Rows with absent coordinates are excluded here, never earlier — the
//! table itself keeps every row.

use serde_json::{json, Value};

use crate::types::Table;

/// Kabupaten/kota centers used to recenter the map.
pub const KABUPATEN: [(&str, f64, f64); 11] = [
    ("Batang Hari", -1.70, 103.08),
    ("Bungo", -1.60, 102.13),
    ("Kerinci", -2.18, 101.50),
    ("Merangin", -2.08, 101.4747),
    ("Muaro Jambi", -1.73, 103.61),
    ("Sarolangun", -2.30, 102.70),
    ("Tanjung Jabung Barat", -0.79, 103.46),
    ("Tanjung Jabung Timur", -1.20, 103.90),
    ("Tebo", -1.490917, 102.445194),
    ("Kota Jambi", -1.61, 103.61),
    ("Kota Sungai Penuh", -2.06, 101.39),
];

const STATUS_EXACT: [&str; 5] = ["status sc", "status_sc", "status", "keterangan", "info"];
const STO_EXACT: [&str; 1] = ["sto"];
const SEKTOR_EXACT: [&str; 2] = ["sektor", "sector"];

#[derive(Clone, Copy, Debug, Default)]
pub struct MapFilter {
    pub center: Option<(f64, f64)>,
    pub radius_km: Option<f64>,
}

pub fn center_by_name(name: &str) -> Option<(f64, f64)> {
    KABUPATEN
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, la, lo)| (*la, *lo))
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let r = 6371.0_f64;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * r * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Mean of the geocoded rows; the map's default center.
pub fn mean_center(table: &Table) -> Option<(f64, f64)> {
    let mut n = 0usize;
    let (mut sa, mut so) = (0.0, 0.0);
    for (a, o) in table.lat.iter().zip(&table.lon) {
        if let (Some(a), Some(o)) = (a, o) {
            sa += a;
            so += o;
            n += 1;
        }
    }
    (n > 0).then(|| (sa / n as f64, so / n as f64))
}

/// Zoom ladder by how many points sit near the chosen center.
pub fn suggest_zoom(nearby: usize) -> u8 {
    match nearby {
        n if n > 1000 => 13,
        n if n > 200 => 12,
        n if n > 50 => 11,
        _ => 10,
    }
}

/// GeoJSON FeatureCollection of the geocoded rows, optionally clipped to a
/// radius around a center. Popup fields come from keyword-detected columns.
pub fn points_geojson(table: &Table, filter: &MapFilter) -> Value {
    let tgl_col = crate::rekap::detect_date_col(table);
    let status_col = table.find_col(&STATUS_EXACT, &["status"]);
    let sto_col = table.find_col(&STO_EXACT, &["sto"]);
    let sektor_col = table.find_col(&SEKTOR_EXACT, &["sektor", "sector"]);

    let mut features = Vec::new();
    for i in 0..table.n_rows() {
        let (Some(lat), Some(lon)) = (table.lat[i], table.lon[i]) else {
            continue;
        };
        if let Some((clat, clon)) = filter.center {
            let radius = filter.radius_km.unwrap_or(50.0);
            if haversine_km(clat, clon, lat, lon) > radius {
                continue;
            }
        }
        let mut props = serde_json::Map::new();
        if let Some(c) = tgl_col {
            props.insert("tanggal".into(), json!(table.cell(i, c)));
        }
        if let Some(c) = status_col {
            props.insert("status".into(), json!(table.cell(i, c)));
        }
        if let Some(c) = sto_col {
            props.insert("sto".into(), json!(table.cell(i, c)));
        }
        if let Some(c) = sektor_col {
            props.insert("sektor".into(), json!(table.cell(i, c)));
        }
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [lon, lat] },
            "properties": Value::Object(props),
        }));
    }

    json!({ "type": "FeatureCollection", "features": features })
}

/// Bare [lat, lon] pairs for the heat layer.
pub fn heat_points(table: &Table) -> Vec<[f64; 2]> {
    table
        .lat
        .iter()
        .zip(&table.lon)
        .filter_map(|(a, o)| match (a, o) {
            (Some(a), Some(o)) => Some([*a, *o]),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut t = Table::new(
            vec!["tanggal".into(), "status".into(), "sto".into()],
            vec![
                vec!["01/02/2025".into(), "open".into(), "JMB".into()],
                vec!["02/02/2025".into(), "closed".into(), "JMB".into()],
                vec!["03/02/2025".into(), "open".into(), "KRC".into()],
            ],
        );
        t.lat = vec![Some(-1.61), None, Some(-2.18)];
        t.lon = vec![Some(103.61), None, Some(101.50)];
        t
    }

    #[test]
    fn null_rows_are_not_plotted() {
        let fc = points_geojson(&table(), &MapFilter::default());
        assert_eq!(fc["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn geometry_is_lon_lat_order() {
        let fc = points_geojson(&table(), &MapFilter::default());
        let coords = &fc["features"][0]["geometry"]["coordinates"];
        assert_eq!(coords[0], 103.61);
        assert_eq!(coords[1], -1.61);
    }

    #[test]
    fn popup_fields_come_from_detected_columns() {
        let fc = points_geojson(&table(), &MapFilter::default());
        let props = &fc["features"][0]["properties"];
        assert_eq!(props["tanggal"], "01/02/2025");
        assert_eq!(props["status"], "open");
        assert_eq!(props["sto"], "JMB");
    }

    #[test]
    fn radius_filter_clips_far_points() {
        // Kota Jambi center keeps the -1.61/103.61 row, drops Kerinci
        let filter = MapFilter {
            center: center_by_name("Kota Jambi"),
            radius_km: Some(50.0),
        };
        let fc = points_geojson(&table(), &filter);
        assert_eq!(fc["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn haversine_sanity() {
        assert!(haversine_km(-1.61, 103.61, -1.61, 103.61) < 1e-9);
        let d = haversine_km(-1.61, 103.61, -2.18, 101.50);
        assert!(d > 200.0 && d < 300.0, "{d}");
    }

    #[test]
    fn heat_points_are_lat_lon_pairs() {
        let h = heat_points(&table());
        assert_eq!(h.len(), 2);
        assert_eq!(h[0], [-1.61, 103.61]);
    }

    #[test]
    fn mean_center_ignores_null_rows() {
        let (la, lo) = mean_center(&table()).unwrap();
        assert!((la - (-1.895)).abs() < 1e-9);
        assert!((lo - 102.555).abs() < 1e-9);
    }

    #[test]
    fn zoom_ladder() {
        assert_eq!(suggest_zoom(2000), 13);
        assert_eq!(suggest_zoom(300), 12);
        assert_eq!(suggest_zoom(60), 11);
        assert_eq!(suggest_zoom(3), 10);
    }
}
