//! GeoJSON export of water masks and time series

use crate::core::contour::{trace_external_contours, Contour};
use crate::core::timeseries::TimeSeriesPoint;
use crate::types::{BinaryMask, GeoTransform, RiverResult};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value as GeoValue};
use std::path::Path;

/// Polygon ring in world coordinates, closed (first vertex repeated)
fn contour_ring(contour: &Contour, geo_transform: Option<&GeoTransform>) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = contour
        .iter()
        .map(|&(row, col)| match geo_transform {
            Some(gt) => {
                let (x, y) = gt.pixel_to_world(row as f64, col as f64);
                vec![x, y]
            }
            // Pixel space: x = column, y = row
            None => vec![col as f64, row as f64],
        })
        .collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn feature(geometry: Option<Geometry>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// FeatureCollection with one Polygon per traced object.
///
/// Objects whose outline has fewer than three vertices (single pixels and
/// one-pixel-wide straight runs) are skipped. Without a geotransform the
/// coordinates are pixel (column, row). `name` is stored as a foreign member
/// of the collection and as a property of every feature.
pub fn mask_to_feature_collection(
    mask: &BinaryMask,
    geo_transform: Option<&GeoTransform>,
    name: &str,
) -> FeatureCollection {
    let contours = trace_external_contours(mask);
    let total = contours.len();

    let features: Vec<Feature> = contours
        .iter()
        .filter(|c| c.len() >= 3)
        .enumerate()
        .map(|(index, contour)| {
            let polygon = GeoValue::Polygon(vec![contour_ring(contour, geo_transform)]);
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), JsonValue::from(name));
            properties.insert("index".to_string(), JsonValue::from(index));
            feature(Some(Geometry::new(polygon)), properties)
        })
        .collect();

    if features.len() < total {
        log::debug!("Skipped {} degenerate outlines", total - features.len());
    }

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("name".to_string(), JsonValue::from(name));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Null-geometry features carrying `date` (YYYY-MM-DD) and `value`
pub fn time_series_feature_collection(points: &[TimeSeriesPoint]) -> FeatureCollection {
    let features = points
        .iter()
        .map(|p| {
            let mut properties = JsonObject::new();
            properties.insert(
                "date".to_string(),
                JsonValue::from(p.date.format("%Y-%m-%d").to_string()),
            );
            properties.insert("value".to_string(), JsonValue::from(p.value));
            feature(None, properties)
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Pretty-printed GeoJSON file
pub fn write_geojson<P: AsRef<Path>>(path: P, collection: &FeatureCollection) -> RiverResult<()> {
    log::info!("Writing GeoJSON to {}", path.as_ref().display());
    std::fs::write(path, serde_json::to_string_pretty(collection)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn polygon_ring(feature: &Feature) -> Vec<Vec<f64>> {
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(GeoValue::Polygon(rings)) => rings[0].clone(),
            other => panic!("expected a polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_square_becomes_closed_polygon() {
        let mut mask = BinaryMask::zeros((6, 6));
        for i in 1..4 {
            for j in 1..4 {
                mask[[i, j]] = 1;
            }
        }
        mask[[5, 5]] = 1; // lone pixel, skipped

        let gt = GeoTransform::from_gdal([78.0, 0.01, 0.0, 21.0, 0.0, -0.01]);
        let fc = mask_to_feature_collection(&mask, Some(&gt), "River Channel");

        assert_eq!(fc.features.len(), 1);
        let ring = polygon_ring(&fc.features[0]);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert!((ring[0][0] - 78.015).abs() < 1e-9);
        assert!((ring[0][1] - 20.985).abs() < 1e-9);

        assert_eq!(fc.features[0].property("name"), Some(&JsonValue::from("River Channel")));
        let members = fc.foreign_members.as_ref().unwrap();
        assert_eq!(members["name"], "River Channel");
    }

    #[test]
    fn test_time_series_features() {
        let point = |month: u32, value: Option<f64>| TimeSeriesPoint {
            date: NaiveDate::from_ymd_opt(2023, month, 5).unwrap(),
            value,
        };
        let points = vec![point(4, Some(0.25)), point(5, None)];
        let fc = time_series_feature_collection(&points);

        assert_eq!(fc.features[0].property("date"), Some(&JsonValue::from("2023-04-05")));
        assert_eq!(fc.features[0].property("value"), Some(&JsonValue::from(0.25)));
        assert_eq!(fc.features[1].property("value"), Some(&JsonValue::Null));
        assert!(fc.features[0].geometry.is_none());
    }

    #[test]
    fn test_write_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        let fc = mask_to_feature_collection(&BinaryMask::zeros((3, 3)), None, "empty");

        write_geojson(&path, &fc).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: FeatureCollection =
            text.parse::<geojson::GeoJson>().unwrap().try_into().unwrap();
        assert!(parsed.features.is_empty());
        assert!(text.contains("\"FeatureCollection\""));
    }
}
